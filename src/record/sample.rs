//! Demo dataset: hourly footfall for a store with lunch and evening peaks,
//! busier weekends and quiet nights, scattered around a central coordinate.

use crate::analytics::perturbation::PerturbationSource;
use crate::record::{Dataset, FootfallRecord};
use time::macros::datetime;
use time::{Duration, OffsetDateTime, Weekday};

pub const DEFAULT_SAMPLE_DAYS: u32 = 30;
/// Ten years of hourly rows.
pub const MAX_SAMPLE_DAYS: u32 = 3653;
pub const SAMPLE_START: OffsetDateTime = datetime!(2024-01-01 00:00 UTC);
pub const SAMPLE_CENTER: (f64, f64) = (19.0760, 72.8777);

const BASE_FOOTFALL: f64 = 20.0;
const WEEKEND_BOOST: f64 = 15.0;
const PEAK_BOOST: f64 = 25.0;
const NIGHT_DROP: f64 = 10.0;
const NOISE_WIDTH: f64 = 15.0;
const COORDINATE_SPREAD: f64 = 0.01;
const MIN_FOOTFALL: f64 = 5.0;

fn expected_footfall(hour: u8, weekday: Weekday) -> f64 {
    let mut base = BASE_FOOTFALL;
    if matches!(weekday, Weekday::Saturday | Weekday::Sunday) {
        base += WEEKEND_BOOST;
    }
    if (11..=13).contains(&hour) || (17..=20).contains(&hour) {
        base += PEAK_BOOST;
    }
    if hour <= 7 {
        base -= NIGHT_DROP;
    }
    base
}

pub fn generate(
    start: OffsetDateTime,
    days: u32,
    source: &mut dyn PerturbationSource,
) -> Vec<FootfallRecord> {
    let days = days.min(MAX_SAMPLE_DAYS);
    let mut records = Vec::with_capacity(days as usize * 24);
    for offset in 0..i64::from(days) * 24 {
        let Some(timestamp) = start.checked_add(Duration::hours(offset)) else {
            break;
        };
        let base = expected_footfall(timestamp.hour(), timestamp.weekday());
        let footfall = (base + source.next_centered(NOISE_WIDTH))
            .floor()
            .max(MIN_FOOTFALL) as u64;
        let latitude = SAMPLE_CENTER.0 + source.next_centered(COORDINATE_SPREAD);
        let longitude = SAMPLE_CENTER.1 + source.next_centered(COORDINATE_SPREAD);
        records.push(
            FootfallRecord::new(timestamp, footfall).with_location(latitude, longitude),
        );
    }
    records
}

pub fn sample_dataset(days: u32, source: &mut dyn PerturbationSource) -> Dataset {
    Dataset::new(generate(SAMPLE_START, days, source), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::perturbation::{FixedSource, SeededSource};

    #[test]
    fn generates_one_record_per_hour() {
        let records = generate(SAMPLE_START, 2, &mut FixedSource::neutral());

        assert_eq!(records.len(), 48);
        assert_eq!(records[0].timestamp, SAMPLE_START);
        assert_eq!(records[47].timestamp, SAMPLE_START + Duration::hours(47));
    }

    #[test]
    fn neutral_noise_reproduces_the_demand_shape() {
        // 2024-01-06 is a Saturday.
        let records = generate(SAMPLE_START, 7, &mut FixedSource::neutral());

        assert_eq!(records[3].footfall, 10);
        assert_eq!(records[9].footfall, 20);
        assert_eq!(records[12].footfall, 45);
        assert_eq!(records[5 * 24 + 12].footfall, 60);
        assert_eq!(records[5 * 24 + 3].footfall, 25);
        assert_eq!(records[0].coordinates(), Some(SAMPLE_CENTER));
    }

    #[test]
    fn footfall_floor_and_coordinate_spread_hold() {
        let records = generate(SAMPLE_START, 30, &mut SeededSource::from_seed(11));

        assert!(records.iter().all(|r| r.footfall >= 5));
        assert!(records.iter().all(|r| {
            let (lat, lng) = r.coordinates().unwrap_or((0.0, 0.0));
            (lat - SAMPLE_CENTER.0).abs() <= 0.005 && (lng - SAMPLE_CENTER.1).abs() <= 0.005
        }));
    }

    #[test]
    fn sample_dataset_advertises_location() {
        let dataset = sample_dataset(1, &mut FixedSource::neutral());

        assert!(dataset.has_location_data);
        assert_eq!(dataset.len(), 24);
    }

    #[test]
    fn generation_stops_at_last_representable_date() {
        let start = datetime!(9999-12-30 00:00 UTC);

        let records = generate(start, 5, &mut FixedSource::neutral());

        assert_eq!(records.len(), 48);
        assert_eq!(records[47].timestamp, datetime!(9999-12-31 23:00 UTC));
    }

    #[test]
    fn day_count_is_capped() {
        let records = generate(SAMPLE_START, u32::MAX, &mut FixedSource::neutral());

        assert_eq!(records.len(), MAX_SAMPLE_DAYS as usize * 24);
    }
}
