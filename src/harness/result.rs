//! Benchmark results

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-operation latency distribution of one phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub min: Duration,
    pub p50: Duration,
    pub p99: Duration,
    pub max: Duration,
}

impl LatencySummary {
    /// Summarize samples; all zero when there are none
    pub fn from_samples(mut samples: Vec<Duration>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_unstable();
        let last = samples.len() - 1;
        Self {
            min: samples[0],
            p50: samples[samples.len() / 2],
            p99: samples[(samples.len() * 99 / 100).min(last)],
            max: samples[last],
        }
    }
}

/// Outcome of one phase against one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub phase: String,
    pub backend: String,

    /// Wall-clock time from first dispatch to last response
    pub elapsed: Duration,

    /// Operations attempted
    pub operations: usize,

    /// Operations that returned an error
    pub errors: usize,

    pub latency: LatencySummary,
}

impl BenchmarkResult {
    /// Attempted operations per second
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.operations as f64 / secs
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<10} : {:>10.3?} ({} ops, {} errors, {:.0} ops/s, p50 {:?}, p99 {:?})",
            self.backend,
            self.phase,
            self.elapsed,
            self.operations,
            self.errors,
            self.ops_per_sec(),
            self.latency.p50,
            self.latency.p99
        )
    }
}
