use crate::analytics::perturbation::SeededSource;
use crate::config::Config;
use crate::record::Dataset;
use crate::record::sample::{DEFAULT_SAMPLE_DAYS, sample_dataset};

/// Settings shared by every request. Holds no dataset: each request carries
/// its own records and the engine recomputes from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    engine_seed: Option<u64>,
    sample_days: u32,
    sample_seed: Option<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            engine_seed: None,
            sample_days: DEFAULT_SAMPLE_DAYS,
            sample_seed: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            engine_seed: config.engine_seed(),
            sample_days: config.sample_days(),
            sample_seed: config.sample_seed(),
        }
    }

    pub fn with_engine_seed(mut self, seed: Option<u64>) -> Self {
        self.engine_seed = seed;
        self
    }

    pub fn engine_seed(&self) -> Option<u64> {
        self.engine_seed
    }

    /// Source for one request. A request seed wins over the configured one.
    pub fn perturbation_source(&self, request_seed: Option<u64>) -> SeededSource {
        SeededSource::for_seed(request_seed.or(self.engine_seed))
    }

    pub fn sample_dataset(&self) -> Dataset {
        let mut source = SeededSource::for_seed(self.sample_seed);
        sample_dataset(self.sample_days, &mut source)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
