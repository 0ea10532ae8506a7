//! Random draws used by the forecaster, the offer picker and the demo data
//! generator. Callers own the source, so a seeded source makes every
//! computation reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait PerturbationSource {
    /// Next draw, uniform in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[-width / 2, width / 2)`.
    fn next_centered(&mut self, width: f64) -> f64 {
        (self.next_unit() - 0.5) * width
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        let index = (self.next_unit() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }
}

#[derive(Debug, Clone)]
pub struct SeededSource {
    rng: StdRng,
}

impl SeededSource {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn for_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }
}

impl PerturbationSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }
}

/// Always returns the same draw. `0.5` yields zero perturbation.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    value: f64,
}

impl FixedSource {
    pub fn new(value: f64) -> Self {
        Self {
            value: value.clamp(0.0, 1.0 - f64::EPSILON),
        }
    }

    pub fn neutral() -> Self {
        Self::new(0.5)
    }
}

impl PerturbationSource for FixedSource {
    fn next_unit(&mut self) -> f64 {
        self.value
    }
}

/// Replays a list of draws in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    next: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|value| value.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, next: 0 }
    }
}

impl PerturbationSource for SequenceSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
