//! Next-day projection from a seasonal hourly baseline.
//!
//! The baseline is the per-hour average of the trailing week of records
//! (168 records, chronological). Each of the next 24 hours takes its
//! baseline value plus a bounded perturbation, floored at
//! [`MIN_PREDICTED_FOOTFALL`].

use crate::analytics::perturbation::PerturbationSource;
use crate::analytics::temporal::{HOURS_PER_DAY, hourly_averages};
use crate::record::{FootfallRecord, chronological};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

pub const BASELINE_WINDOW: usize = 7 * HOURS_PER_DAY;
pub const FORECAST_HORIZON_HOURS: usize = HOURS_PER_DAY;
/// Full width of the uniform perturbation, i.e. `[-2.5, 2.5)`.
pub const PERTURBATION_WIDTH: f64 = 5.0;
pub const MIN_PREDICTED_FOOTFALL: u64 = 5;
pub const HIGH_CONFIDENCE_MAX_VARIANCE: f64 = 100.0;
pub const MEDIUM_CONFIDENCE_MAX_VARIANCE: f64 = 300.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub hours_ahead: u8,
    /// `HH:mm` of `timestamp`.
    pub label: String,
    pub predicted_footfall: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastInsights {
    pub total_predicted: u64,
    pub avg_predicted: u64,
    /// Label of the first point with the highest prediction.
    pub peak_hour: String,
    pub peak_predicted: u64,
    /// Sum of the most recent 24 observed records.
    pub last_observed_total: u64,
    pub trend_direction: TrendDirection,
    /// Percentage change against `last_observed_total`, one decimal.
    /// `None` when the observed total is zero.
    pub trend_percent: Option<f64>,
    pub baseline_variance: f64,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    /// Rounded per-hour averages of the trailing window, indexed by hour.
    pub baseline: [u64; HOURS_PER_DAY],
    pub insights: ForecastInsights,
}

/// `None` only for empty input. The horizon is cut short when it would run
/// past the last representable date.
pub fn forecast(
    records: &[FootfallRecord],
    source: &mut dyn PerturbationSource,
) -> Option<Forecast> {
    let ordered = chronological(records);
    let last_timestamp = ordered.last()?.timestamp;

    let window = &ordered[ordered.len().saturating_sub(BASELINE_WINDOW)..];
    let buckets = hourly_averages(window.iter().copied());
    let baseline: [u64; HOURS_PER_DAY] =
        std::array::from_fn(|hour| buckets[hour].average.round() as u64);

    let mut points = Vec::with_capacity(FORECAST_HORIZON_HOURS);
    for hours_ahead in 1..=FORECAST_HORIZON_HOURS as u8 {
        let Some(timestamp) = last_timestamp.checked_add(Duration::hours(i64::from(hours_ahead)))
        else {
            warn!(hours_ahead, "Forecast horizon ends at the last representable date");
            break;
        };
        let base = baseline[usize::from(timestamp.hour())] as f64;
        let trend = source.next_centered(PERTURBATION_WIDTH);
        let predicted_footfall =
            (base + trend).round().max(MIN_PREDICTED_FOOTFALL as f64) as u64;
        points.push(ForecastPoint {
            timestamp,
            hours_ahead,
            label: clock_label(timestamp),
            predicted_footfall,
        });
    }

    let last_observed_total: u64 = window[window.len().saturating_sub(HOURS_PER_DAY)..]
        .iter()
        .map(|record| record.footfall)
        .sum();

    let insights = derive_insights(&points, &baseline, last_observed_total)?;
    debug!(
        total_predicted = insights.total_predicted,
        confidence = ?insights.confidence,
        "Forecast computed"
    );

    Some(Forecast {
        points,
        baseline,
        insights,
    })
}

fn derive_insights(
    points: &[ForecastPoint],
    baseline: &[u64; HOURS_PER_DAY],
    last_observed_total: u64,
) -> Option<ForecastInsights> {
    let total_predicted: u64 = points.iter().map(|point| point.predicted_footfall).sum();
    let avg_predicted = (total_predicted as f64 / points.len() as f64).round() as u64;

    let mut peak = points.first()?;
    for point in &points[1..] {
        if point.predicted_footfall > peak.predicted_footfall {
            peak = point;
        }
    }

    let trend_direction = if total_predicted > last_observed_total {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };
    let trend_percent = trend_percent(total_predicted, last_observed_total);
    if trend_percent.is_none() {
        warn!("Last observed day has zero footfall, trend percentage undefined");
    }

    let baseline_variance = variance_around(baseline, avg_predicted as f64);

    Some(ForecastInsights {
        total_predicted,
        avg_predicted,
        peak_hour: peak.label.clone(),
        peak_predicted: peak.predicted_footfall,
        last_observed_total,
        trend_direction,
        trend_percent,
        baseline_variance,
        confidence: classify_confidence(baseline_variance),
    })
}

/// `|predicted - observed| / observed * 100` rounded to one decimal.
pub fn trend_percent(predicted_total: u64, observed_total: u64) -> Option<f64> {
    if observed_total == 0 {
        return None;
    }
    let change = predicted_total.abs_diff(observed_total) as f64 / observed_total as f64 * 100.0;
    Some((change * 10.0).round() / 10.0)
}

/// Population variance of `values` around `center`.
pub fn variance_around(values: &[u64], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let squared: f64 = values
        .iter()
        .map(|value| {
            let diff = *value as f64 - center;
            diff * diff
        })
        .sum();
    squared / values.len() as f64
}

pub fn classify_confidence(variance: f64) -> Confidence {
    if variance < HIGH_CONFIDENCE_MAX_VARIANCE {
        Confidence::High
    } else if variance < MEDIUM_CONFIDENCE_MAX_VARIANCE {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn clock_label(timestamp: OffsetDateTime) -> String {
    format!("{:02}:{:02}", timestamp.hour(), timestamp.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::perturbation::{FixedSource, SeededSource, SequenceSource};
    use time::macros::datetime;

    fn hourly_series(
        start: OffsetDateTime,
        hours: i64,
        footfall: impl Fn(i64) -> u64,
    ) -> Vec<FootfallRecord> {
        (0..hours)
            .map(|hour| FootfallRecord::new(start + Duration::hours(hour), footfall(hour)))
            .collect()
    }

    #[test]
    fn flat_day_forecasts_baseline_with_high_confidence() {
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |_| 20);

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert_eq!(forecast.points.len(), 24);
        assert!(forecast.points.iter().all(|p| p.predicted_footfall == 20));
        assert_eq!(forecast.insights.total_predicted, 480);
        assert_eq!(forecast.insights.avg_predicted, 20);
        assert_eq!(forecast.insights.baseline_variance, 0.0);
        assert_eq!(forecast.insights.confidence, Confidence::High);
        assert_eq!(forecast.insights.trend_direction, TrendDirection::Down);
        assert_eq!(forecast.insights.trend_percent, Some(0.0));
    }

    #[test]
    fn points_start_one_hour_after_latest_timestamp() {
        let mut records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |_| 10);
        // Latest record arrives first in upload order.
        records.rotate_right(1);

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert_eq!(forecast.points[0].timestamp, datetime!(2024-01-02 00:00 UTC));
        assert_eq!(forecast.points[0].label, "00:00");
        assert_eq!(forecast.points[0].hours_ahead, 1);
        assert_eq!(forecast.points[23].timestamp, datetime!(2024-01-02 23:00 UTC));
    }

    #[test]
    fn prediction_never_drops_below_floor() {
        let records =
            hourly_series(datetime!(2024-01-01 00:00 UTC), 48, |hour| (hour % 3) as u64);

        let forecast = forecast(&records, &mut FixedSource::new(0.0)).expect("forecast");

        assert!(
            forecast
                .points
                .iter()
                .all(|p| p.predicted_footfall >= MIN_PREDICTED_FOOTFALL)
        );
    }

    #[test]
    fn baseline_uses_only_trailing_week() {
        // Two weeks: first week at 100, second at 10.
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 336, |hour| {
            if hour < 168 { 100 } else { 10 }
        });

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert!(forecast.baseline.iter().all(|value| *value == 10));
        assert_eq!(forecast.insights.last_observed_total, 240);
    }

    #[test]
    fn perturbation_is_bounded_and_rounded() {
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |_| 50);

        let high = forecast(&records, &mut FixedSource::new(1.0)).expect("forecast");
        let low = forecast(&records, &mut FixedSource::new(0.0)).expect("forecast");

        assert!(high.points.iter().all(|p| matches!(p.predicted_footfall, 52 | 53)));
        assert!(low.points.iter().all(|p| matches!(p.predicted_footfall, 47 | 48)));
    }

    #[test]
    fn seeded_forecasts_are_identical() {
        let records =
            hourly_series(datetime!(2024-01-01 00:00 UTC), 72, |hour| 10 + (hour % 24) as u64);

        let first = forecast(&records, &mut SeededSource::from_seed(99)).expect("forecast");
        let second = forecast(&records, &mut SeededSource::from_seed(99)).expect("forecast");

        assert_eq!(first.points, second.points);
        assert_eq!(first.insights, second.insights);
    }

    #[test]
    fn peak_hour_is_first_maximum() {
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |hour| {
            if hour == 5 || hour == 9 { 80 } else { 10 }
        });

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert_eq!(forecast.insights.peak_hour, "05:00");
        assert_eq!(forecast.insights.peak_predicted, 80);
    }

    #[test]
    fn zero_observed_day_has_undefined_trend_percent() {
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |_| 0);

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert_eq!(forecast.insights.last_observed_total, 0);
        assert_eq!(forecast.insights.trend_percent, None);
        assert_eq!(forecast.insights.trend_direction, TrendDirection::Up);
    }

    #[test]
    fn trend_percent_rounds_to_one_decimal() {
        assert_eq!(trend_percent(110, 100), Some(10.0));
        assert_eq!(trend_percent(2, 3), Some(33.3));
        assert_eq!(trend_percent(5, 0), None);
    }

    #[test]
    fn confidence_thresholds_are_exclusive() {
        assert_eq!(classify_confidence(99.9), Confidence::High);
        assert_eq!(classify_confidence(100.0), Confidence::Medium);
        assert_eq!(classify_confidence(299.9), Confidence::Medium);
        assert_eq!(classify_confidence(300.0), Confidence::Low);
    }

    #[test]
    fn confidence_never_improves_as_variance_grows() {
        let mut previous = classify_confidence(0.0);
        for step in 0..100 {
            let current = classify_confidence(step as f64 * 7.5);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn spread_baseline_lowers_confidence() {
        let records = hourly_series(datetime!(2024-01-01 00:00 UTC), 24, |hour| {
            if hour % 2 == 0 { 0 } else { 60 }
        });

        let forecast = forecast(&records, &mut SequenceSource::new(vec![0.5])).expect("forecast");

        assert_eq!(forecast.insights.confidence, Confidence::Low);
    }

    #[test]
    fn empty_input_has_no_forecast() {
        assert!(forecast(&[], &mut FixedSource::neutral()).is_none());
    }

    #[test]
    fn horizon_stops_at_last_representable_date() {
        let records = vec![FootfallRecord::new(datetime!(9999-12-31 12:00 UTC), 40)];

        let forecast = forecast(&records, &mut FixedSource::neutral()).expect("forecast");

        assert_eq!(forecast.points.len(), 11);
        assert_eq!(forecast.points[10].timestamp, datetime!(9999-12-31 23:00 UTC));
        assert_eq!(forecast.insights.total_predicted, 5 * 11);
    }
}
