//! Footfall analytics: hourly and daily aggregation, geospatial density
//! bins, a next-day forecast and staffing/marketing recommendations, served
//! over a small JSON API.

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod state;
