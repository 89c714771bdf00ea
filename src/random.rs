// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Source of uniform randomness for forecasts and reply selection
pub trait RandomSource: Send + Sync {
    /// Uniform sample in `[0, 1)`
    fn next_f64(&self) -> f64;

    /// Uniform sample in `[low, high)`
    fn in_range(&self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn pick(&self, len: usize) -> usize {
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

/// Thread-local RNG, used in production
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible RNG from a fixed seed
pub struct SeededRandom {
    rng: Mutex<SmallRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen::<f64>(),
            Err(poisoned) => poisoned.into_inner().gen::<f64>(),
        }
    }
}

/// Always returns the same fraction
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0.clamp(0.0, 0.999_999)
    }
}
