use crate::analytics::geo::{Heatmap, LocationBin};
use crate::analytics::temporal::{DailyBucket, HOURS_PER_DAY, HourlyBucket};
use crate::analytics::{Forecast, Recommendations, SummaryKpis};
use crate::record::FootfallRecord;
use crate::record::validate::ValidationReport;
use crate::report::InsightsReport;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SampleSuccessResponse {
    pub has_location_data: bool,
    pub records: Vec<FootfallRecord>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationSuccessResponse {
    pub validation: ValidationReport,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSuccessResponse {
    pub summary: SummaryKpis,
    pub hourly: [HourlyBucket; HOURS_PER_DAY],
    pub daily: Vec<DailyBucket>,
    pub validation: ValidationReport,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct HeatmapSuccessResponse {
    pub heatmap: Heatmap,
    pub top_locations: Vec<LocationBin>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ForecastSuccessResponse {
    pub forecast: Forecast,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsSuccessResponse {
    pub recommendations: Recommendations,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ReportSuccessResponse {
    pub report: InsightsReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorResponse {
    pub error_code: ErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidSchema,
    NoData,
    InternalError,
}
