//! Staffing, promotion and location suggestions derived from the hourly
//! profile.

use crate::analytics::perturbation::PerturbationSource;
use crate::analytics::temporal::{HourlyBucket, time_slot_label};
use serde::Serialize;

/// One staff member covers this many customers per hour.
pub const CUSTOMERS_PER_STAFF_MEMBER: f64 = 15.0;
pub const RANKED_HOURS: usize = 3;
pub const PEAK_REASON: &str = "Peak traffic period";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Offer {
    pub discount_percent: u8,
    pub description: &'static str,
}

pub const OFFER_CATALOG: [Offer; 3] = [
    Offer {
        discount_percent: 20,
        description: "Flash sale to boost foot traffic",
    },
    Offer {
        discount_percent: 15,
        description: "Happy hour special",
    },
    Offer {
        discount_percent: 25,
        description: "Limited time offer",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocationSuggestion {
    pub area: &'static str,
    pub suggestion: &'static str,
    pub impact: Impact,
}

// Templated; not derived from bin geometry.
pub const LOCATION_SUGGESTIONS: [LocationSuggestion; 3] = [
    LocationSuggestion {
        area: "High density zone detected",
        suggestion: "Consider placing outdoor signage or banners in this area",
        impact: Impact::High,
    },
    LocationSuggestion {
        area: "Customer cluster 250m north",
        suggestion: "Deploy promotional materials or street team",
        impact: Impact::Medium,
    },
    LocationSuggestion {
        area: "Low visibility area identified",
        suggestion: "Install directional signage to improve discoverability",
        impact: Impact::Medium,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffingRecommendation {
    pub hour: u8,
    pub time_slot: String,
    pub average: f64,
    pub staff_count: u32,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingRecommendation {
    pub hour: u8,
    pub time_slot: String,
    pub discount_percent: u8,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    /// Rounded mean of the observed hourly averages.
    pub avg_footfall: u64,
    pub peak_hours: Vec<u8>,
    pub low_hours: Vec<u8>,
    pub staffing: Vec<StaffingRecommendation>,
    pub marketing: Vec<MarketingRecommendation>,
    pub location: Vec<LocationSuggestion>,
}

pub fn staff_needed(average: f64) -> u32 {
    (average / CUSTOMERS_PER_STAFF_MEMBER).ceil() as u32
}

/// Up to [`RANKED_HOURS`] observed hours, busiest first. Ties keep
/// ascending hour order.
pub fn peak_hours(hourly: &[HourlyBucket]) -> Vec<&HourlyBucket> {
    let mut observed: Vec<&HourlyBucket> = hourly.iter().filter(|b| b.has_data()).collect();
    observed.sort_by(|a, b| b.average.total_cmp(&a.average));
    observed.truncate(RANKED_HOURS);
    observed
}

/// Up to [`RANKED_HOURS`] observed hours, quietest first. Ties keep
/// ascending hour order.
pub fn low_hours(hourly: &[HourlyBucket]) -> Vec<&HourlyBucket> {
    let mut observed: Vec<&HourlyBucket> = hourly.iter().filter(|b| b.has_data()).collect();
    observed.sort_by(|a, b| a.average.total_cmp(&b.average));
    observed.truncate(RANKED_HOURS);
    observed
}

/// `None` when no hour has observations.
pub fn recommend(
    hourly: &[HourlyBucket],
    has_location_data: bool,
    source: &mut dyn PerturbationSource,
) -> Option<Recommendations> {
    let observed: Vec<f64> = hourly
        .iter()
        .filter(|bucket| bucket.has_data())
        .map(|bucket| bucket.average)
        .collect();
    if observed.is_empty() {
        return None;
    }
    let avg_footfall = (observed.iter().sum::<f64>() / observed.len() as f64).round() as u64;

    let peak = peak_hours(hourly);
    let low = low_hours(hourly);

    let staffing = peak
        .iter()
        .map(|bucket| StaffingRecommendation {
            hour: bucket.hour,
            time_slot: time_slot_label(bucket.hour),
            average: bucket.average,
            staff_count: staff_needed(bucket.average),
            reason: PEAK_REASON,
        })
        .collect();

    let marketing = low
        .iter()
        .map(|bucket| {
            let offer = OFFER_CATALOG[source.next_index(OFFER_CATALOG.len())];
            MarketingRecommendation {
                hour: bucket.hour,
                time_slot: time_slot_label(bucket.hour),
                discount_percent: offer.discount_percent,
                description: offer.description,
            }
        })
        .collect();

    let location = if has_location_data {
        LOCATION_SUGGESTIONS.to_vec()
    } else {
        Vec::new()
    };

    Some(Recommendations {
        avg_footfall,
        peak_hours: peak.iter().map(|bucket| bucket.hour).collect(),
        low_hours: low.iter().map(|bucket| bucket.hour).collect(),
        staffing,
        marketing,
        location,
    })
}
