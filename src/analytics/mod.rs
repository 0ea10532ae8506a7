//! The analytics engine. Every entry point is a pure function of the records
//! it is given; "no data" is `None`, never zero-valued statistics.

pub mod forecast;
pub mod geo;
pub mod perturbation;
pub mod recommend;
pub mod temporal;

pub use forecast::{Confidence, Forecast, ForecastInsights, ForecastPoint, TrendDirection, forecast};
pub use geo::{Heatmap, HeatmapCell, LocationBin, MapCenter, bin, heatmap};
pub use perturbation::{FixedSource, PerturbationSource, SeededSource, SequenceSource};
pub use recommend::{Recommendations, recommend};
pub use temporal::{
    DailyBucket, HourlyBucket, SummaryKpis, daily_totals, hourly_averages, summary_kpis,
};
