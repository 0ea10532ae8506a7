//! Hour-of-day and calendar-day aggregation plus the headline KPIs.

use crate::record::{FootfallRecord, date_key};
use serde::Serialize;
use std::collections::HashMap;

pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyBucket {
    pub hour: u8,
    /// Footfall values observed at this hour, in input order.
    #[serde(skip)]
    pub values: Vec<u64>,
    pub count: usize,
    /// Mean of `values`, 0 when the hour has no observations.
    pub average: f64,
}

impl HourlyBucket {
    fn empty(hour: u8) -> Self {
        Self {
            hour,
            values: Vec::new(),
            count: 0,
            average: 0.0,
        }
    }

    pub fn total(&self) -> u64 {
        self.values.iter().sum()
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    /// `YYYY-MM-DD` in the timestamp's own offset.
    pub date: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryKpis {
    pub record_count: usize,
    pub total: u64,
    pub average: u64,
    pub peak_hour: u8,
    pub lowest_hour: u8,
    pub peak_day: String,
    pub peak_day_total: u64,
}

/// Dense 24-entry table indexed by hour of day.
pub fn hourly_averages<'a, I>(records: I) -> [HourlyBucket; HOURS_PER_DAY]
where
    I: IntoIterator<Item = &'a FootfallRecord>,
{
    let mut buckets: [HourlyBucket; HOURS_PER_DAY] =
        std::array::from_fn(|hour| HourlyBucket::empty(hour as u8));

    for record in records {
        buckets[usize::from(record.hour())]
            .values
            .push(record.footfall);
    }

    for bucket in &mut buckets {
        bucket.count = bucket.values.len();
        if bucket.count > 0 {
            bucket.average = bucket.total() as f64 / bucket.count as f64;
        }
    }
    buckets
}

/// Daily sums in first-seen date order.
pub fn daily_totals(records: &[FootfallRecord]) -> Vec<DailyBucket> {
    let mut index_by_date = HashMap::new();
    let mut buckets: Vec<DailyBucket> = Vec::new();

    for record in records {
        let index = *index_by_date.entry(record.date()).or_insert_with(|| {
            buckets.push(DailyBucket {
                date: date_key(record.date()),
                total: 0,
            });
            buckets.len() - 1
        });
        buckets[index].total += record.footfall;
    }
    buckets
}

/// Hour with the highest average among observed hours; ties go to the
/// earlier hour.
pub fn peak_hour(buckets: &[HourlyBucket]) -> Option<u8> {
    extreme_hour(buckets, |candidate, best| candidate > best)
}

/// Hour with the lowest average among observed hours; ties go to the
/// earlier hour.
pub fn lowest_hour(buckets: &[HourlyBucket]) -> Option<u8> {
    extreme_hour(buckets, |candidate, best| candidate < best)
}

fn extreme_hour(buckets: &[HourlyBucket], better: impl Fn(f64, f64) -> bool) -> Option<u8> {
    let mut best: Option<&HourlyBucket> = None;
    for bucket in buckets.iter().filter(|bucket| bucket.has_data()) {
        match best {
            Some(current) if !better(bucket.average, current.average) => {}
            _ => best = Some(bucket),
        }
    }
    best.map(|bucket| bucket.hour)
}

/// Headline KPIs, or `None` when there are no records.
pub fn summary_kpis(records: &[FootfallRecord]) -> Option<SummaryKpis> {
    if records.is_empty() {
        return None;
    }

    let total: u64 = records.iter().map(|record| record.footfall).sum();
    let average = (total as f64 / records.len() as f64).round() as u64;

    let hourly = hourly_averages(records);
    let peak_hour = peak_hour(&hourly)?;
    let lowest_hour = lowest_hour(&hourly)?;

    let daily = daily_totals(records);
    let mut peak_day = daily.first()?;
    for day in &daily[1..] {
        if day.total > peak_day.total {
            peak_day = day;
        }
    }

    Some(SummaryKpis {
        record_count: records.len(),
        total,
        average,
        peak_hour,
        lowest_hour,
        peak_day: peak_day.date.clone(),
        peak_day_total: peak_day.total,
    })
}

/// `"H:00"`, as shown on the dashboard.
pub fn hour_label(hour: u8) -> String {
    format!("{hour}:00")
}

/// `"H:00 - H+1:00"`.
pub fn time_slot_label(hour: u8) -> String {
    format!("{hour}:00 - {}:00", u16::from(hour) + 1)
}
