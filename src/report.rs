//! The combined insights report behind the export page: every analytics
//! output for one dataset, computed in a single pass.

use crate::analytics::geo::{Heatmap, LocationBin, bin, heatmap, top_bins};
use crate::analytics::temporal::{DailyBucket, HOURS_PER_DAY, HourlyBucket};
use crate::analytics::{
    Forecast, PerturbationSource, Recommendations, SummaryKpis, daily_totals, forecast,
    hourly_averages, recommend, summary_kpis,
};
use crate::record::{DataPeriod, Dataset};
use serde::Serialize;
use time::OffsetDateTime;

pub const TOP_LOCATIONS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub record_count: usize,
    pub period: DataPeriod,
    pub summary: SummaryKpis,
    pub hourly: [HourlyBucket; HOURS_PER_DAY],
    pub daily: Vec<DailyBucket>,
    pub heatmap: Heatmap,
    pub top_locations: Vec<LocationBin>,
    pub forecast: Forecast,
    pub recommendations: Recommendations,
}

/// `None` for an empty dataset. Forecast perturbations are drawn from
/// `source` before offer picks.
pub fn build_report(
    dataset: &Dataset,
    source: &mut dyn PerturbationSource,
    generated_at: OffsetDateTime,
) -> Option<InsightsReport> {
    let records = dataset.records();
    let summary = summary_kpis(records)?;
    let period = dataset.period()?;
    let hourly = hourly_averages(records);
    let forecast = forecast(records, source)?;
    let recommendations = recommend(&hourly, dataset.has_location_data, source)?;
    let top_locations = if dataset.has_location_data {
        top_bins(&bin(records), TOP_LOCATIONS)
    } else {
        Vec::new()
    };

    Some(InsightsReport {
        generated_at,
        record_count: dataset.len(),
        period,
        summary,
        daily: daily_totals(records),
        hourly,
        heatmap: heatmap(dataset),
        top_locations,
        forecast,
        recommendations,
    })
}
