use crate::analytics::geo::{bin, heatmap, top_bins};
use crate::analytics::{daily_totals, forecast, hourly_averages, recommend, summary_kpis};
use crate::api::responses::{
    AnalyticsSuccessResponse, ErrorCode, ErrorResponse, ForecastSuccessResponse, HealthStatus,
    HealthSuccessResponse, HeatmapSuccessResponse, RecommendationsSuccessResponse,
    ReportSuccessResponse, SampleSuccessResponse, ValidationSuccessResponse,
};
use crate::error::SchemaError;
use crate::record::Dataset;
use crate::record::validate::{RawRow, ValidationReport, validate};
use crate::report::{TOP_LOCATIONS, build_report};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{error, info, warn};

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

#[derive(Debug)]
pub enum ApiResponse<T> {
    Success(T),
    Error {
        status: StatusCode,
        body: ErrorResponse,
    },
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ApiResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedQuery {
    pub seed: Option<u64>,
}

pub async fn get_health() -> impl IntoResponse {
    build_health_response(SystemTime::now())
}

pub async fn get_sample(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    build_sample_response(&state, SystemTime::now())
}

pub async fn post_validate(Json(rows): Json<Vec<RawRow>>) -> impl IntoResponse {
    build_validation_response(&rows, SystemTime::now())
}

pub async fn post_analytics(Json(rows): Json<Vec<RawRow>>) -> impl IntoResponse {
    build_analytics_response(&rows, SystemTime::now())
}

pub async fn post_heatmap(Json(rows): Json<Vec<RawRow>>) -> impl IntoResponse {
    build_heatmap_response(&rows, SystemTime::now())
}

pub async fn post_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
    Json(rows): Json<Vec<RawRow>>,
) -> impl IntoResponse {
    build_forecast_response(&state, &rows, query.seed, SystemTime::now())
}

pub async fn post_recommendations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
    Json(rows): Json<Vec<RawRow>>,
) -> impl IntoResponse {
    build_recommendations_response(&state, &rows, query.seed, SystemTime::now())
}

pub async fn post_report(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeedQuery>,
    Json(rows): Json<Vec<RawRow>>,
) -> impl IntoResponse {
    build_report_response(&state, &rows, query.seed, SystemTime::now())
}

fn build_health_response(now: SystemTime) -> ApiResponse<HealthSuccessResponse> {
    with_timestamp(now, |timestamp| HealthSuccessResponse {
        status: HealthStatus::Ok,
        timestamp,
    })
}

fn build_sample_response(state: &AppState, now: SystemTime) -> ApiResponse<SampleSuccessResponse> {
    let dataset = state.sample_dataset();
    info!(records = dataset.len(), "Serving sample dataset");
    with_timestamp(now, |timestamp| SampleSuccessResponse {
        has_location_data: dataset.has_location_data,
        records: dataset.records,
        timestamp,
    })
}

fn build_validation_response(
    rows: &[RawRow],
    now: SystemTime,
) -> ApiResponse<ValidationSuccessResponse> {
    let (_dataset, validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    with_timestamp(now, |timestamp| ValidationSuccessResponse {
        validation,
        timestamp,
    })
}

fn build_analytics_response(
    rows: &[RawRow],
    now: SystemTime,
) -> ApiResponse<AnalyticsSuccessResponse> {
    let (dataset, validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    let Some(summary) = summary_kpis(dataset.records()) else {
        return no_data(now);
    };
    let hourly = hourly_averages(dataset.records());
    let daily = daily_totals(dataset.records());
    with_timestamp(now, |timestamp| AnalyticsSuccessResponse {
        summary,
        hourly,
        daily,
        validation,
        timestamp,
    })
}

fn build_heatmap_response(rows: &[RawRow], now: SystemTime) -> ApiResponse<HeatmapSuccessResponse> {
    let (dataset, _validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    let heatmap = heatmap(&dataset);
    let top_locations = if heatmap.available {
        top_bins(&bin(dataset.records()), TOP_LOCATIONS)
    } else {
        Vec::new()
    };
    with_timestamp(now, |timestamp| HeatmapSuccessResponse {
        heatmap,
        top_locations,
        timestamp,
    })
}

fn build_forecast_response(
    state: &AppState,
    rows: &[RawRow],
    seed: Option<u64>,
    now: SystemTime,
) -> ApiResponse<ForecastSuccessResponse> {
    let (dataset, _validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    let mut source = state.perturbation_source(seed);
    let Some(forecast) = forecast(dataset.records(), &mut source) else {
        return no_data(now);
    };
    with_timestamp(now, |timestamp| ForecastSuccessResponse {
        forecast,
        timestamp,
    })
}

fn build_recommendations_response(
    state: &AppState,
    rows: &[RawRow],
    seed: Option<u64>,
    now: SystemTime,
) -> ApiResponse<RecommendationsSuccessResponse> {
    let (dataset, _validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    let mut source = state.perturbation_source(seed);
    let hourly = hourly_averages(dataset.records());
    let Some(recommendations) = recommend(&hourly, dataset.has_location_data, &mut source) else {
        return no_data(now);
    };
    with_timestamp(now, |timestamp| RecommendationsSuccessResponse {
        recommendations,
        timestamp,
    })
}

fn build_report_response(
    state: &AppState,
    rows: &[RawRow],
    seed: Option<u64>,
    now: SystemTime,
) -> ApiResponse<ReportSuccessResponse> {
    let (dataset, _validation) = match validated(rows, now) {
        Ok(validated) => validated,
        Err(response) => return response,
    };
    let mut source = state.perturbation_source(seed);
    match build_report(&dataset, &mut source, OffsetDateTime::from(now)) {
        Some(report) => ApiResponse::Success(ReportSuccessResponse { report }),
        None => no_data(now),
    }
}

fn validated<T>(
    rows: &[RawRow],
    now: SystemTime,
) -> Result<(Dataset, ValidationReport), ApiResponse<T>> {
    match validate(rows) {
        Ok(validated) => Ok(validated),
        Err(SchemaError::EmptyTable) => Err(no_data(now)),
        Err(err) => {
            warn!(error = %err, "Rejected uploaded table");
            Err(error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::InvalidSchema,
                err.to_string(),
                now,
            ))
        }
    }
}

fn with_timestamp<T>(now: SystemTime, build: impl FnOnce(String) -> T) -> ApiResponse<T> {
    match format_timestamp(now) {
        Ok(formatted) => ApiResponse::Success(build(formatted)),
        Err(_err) => internal_error("timestamp formatting failure"),
    }
}

fn no_data<T>(now: SystemTime) -> ApiResponse<T> {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::NoData,
        "No footfall records available".to_string(),
        now,
    )
}

fn error_response<T>(
    status: StatusCode,
    error_code: ErrorCode,
    error_message: String,
    now: SystemTime,
) -> ApiResponse<T> {
    match format_timestamp(now) {
        Ok(timestamp) => ApiResponse::Error {
            status,
            body: ErrorResponse {
                error_code,
                error_message,
                timestamp,
            },
        },
        Err(_err) => internal_error("timestamp formatting failure"),
    }
}

fn internal_error<T>(message: &str) -> ApiResponse<T> {
    error!(message = message, "Internal error while handling request");
    let formatted = format_timestamp(SystemTime::now()).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format internal error timestamp");
        "1970-01-01T00:00:00Z".to_string()
    });
    ApiResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            error_code: ErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: formatted,
        },
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    datetime.format(&Rfc3339).map_err(TimestampError::Format)
}
