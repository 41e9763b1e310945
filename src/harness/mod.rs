//! Benchmark Harness
//!
//! Replays a workload against backends phase by phase and times it.
//!
//! ## Rules
//! - Iteration `i` uses keys `key-i`
//! - A failed operation is counted and the phase goes on; nothing is retried
//! - Phases run one after another; a phase's connections are released
//!   before the next one starts
//! - Unsupported phases fail before the first operation

mod workload;
mod result;

use std::fmt;
use std::time::{Duration, Instant};

pub use result::{BenchmarkResult, LatencySummary};
pub use workload::{suffixed_key, Workload, WorkloadEntry};

use crate::backend::Backend;
use crate::config::BenchConfig;
use crate::error::{BackendError, HarnessError};

/// Operation a phase issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    PutAsync,
    PutSync,
    Get,
    Delete,
}

/// A named phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub name: String,
    pub kind: PhaseKind,
}

impl Phase {
    pub fn new(name: impl Into<String>, kind: PhaseKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn put_async() -> Self {
        Self::new("PUT ASYNC", PhaseKind::PutAsync)
    }

    pub fn put_sync() -> Self {
        Self::new("PUT SYNC", PhaseKind::PutSync)
    }

    pub fn get() -> Self {
        Self::new("GET", PhaseKind::Get)
    }

    pub fn delete() -> Self {
        Self::new("DEL", PhaseKind::Delete)
    }

    /// PUT ASYNC, PUT SYNC, GET
    pub fn defaults() -> Vec<Phase> {
        vec![Self::put_async(), Self::put_sync(), Self::get()]
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Run one phase against one backend
pub fn run_phase(
    phase: &Phase,
    backend: &mut dyn Backend,
    workload: &Workload,
    repeat_count: usize,
) -> Result<BenchmarkResult, HarnessError> {
    if workload.is_empty() {
        return Err(HarnessError::EmptyWorkload);
    }
    if repeat_count == 0 {
        return Err(HarnessError::ZeroRepeat);
    }
    if !backend.supports(phase.kind) {
        return Err(HarnessError::Unsupported {
            backend: backend.name().to_string(),
            phase: phase.name.clone(),
        });
    }

    let name = backend.name().to_string();
    let operations = workload.len() * repeat_count;
    let mut latencies = Vec::with_capacity(operations);
    let mut errors = 0;

    let mut scope = PhaseScope::begin(backend, phase.kind);

    let start = Instant::now();
    for iteration in 0..repeat_count {
        for entry in workload.entries() {
            let key = suffixed_key(&entry.key, iteration);

            let op_start = Instant::now();
            let outcome = dispatch(phase.kind, &mut *scope.backend, &key, &entry.value);
            latencies.push(op_start.elapsed());

            if let Err(e) = outcome {
                errors += 1;
                tracing::warn!(
                    "{} {} '{}' failed: {}",
                    name,
                    phase,
                    String::from_utf8_lossy(&key),
                    e
                );
            }
        }
    }
    let elapsed = start.elapsed();
    drop(scope);

    let result = BenchmarkResult {
        phase: phase.name.clone(),
        backend: name,
        elapsed,
        operations,
        errors,
        latency: LatencySummary::from_samples(latencies),
    };
    tracing::info!("{}", result);

    Ok(result)
}

/// Brackets a phase with `begin_phase`/`end_phase`, ending it on every
/// exit path
struct PhaseScope<'a> {
    backend: &'a mut dyn Backend,
}

impl<'a> PhaseScope<'a> {
    fn begin(backend: &'a mut dyn Backend, kind: PhaseKind) -> Self {
        backend.begin_phase(kind);
        Self { backend }
    }
}

impl Drop for PhaseScope<'_> {
    fn drop(&mut self) {
        self.backend.end_phase();
    }
}

fn dispatch(
    kind: PhaseKind,
    backend: &mut dyn Backend,
    key: &[u8],
    value: &[u8],
) -> Result<(), BackendError> {
    match kind {
        PhaseKind::PutAsync => backend.put(key, value),
        PhaseKind::PutSync => backend.put_sync(key, value),
        PhaseKind::Get => backend.get(key).map(|_| ()),
        PhaseKind::Delete => backend.delete(key),
    }
}

/// Runs a list of phases against several backends
#[derive(Debug, Clone)]
pub struct Harness {
    repeat_count: usize,
    phases: Vec<Phase>,
}

impl Harness {
    pub fn new(repeat_count: usize, phases: Vec<Phase>) -> Self {
        Self {
            repeat_count,
            phases,
        }
    }

    /// Harness with the default phases
    pub fn from_config(config: &BenchConfig) -> Self {
        Self::new(config.repeat_count, Phase::defaults())
    }

    pub fn repeat_count(&self) -> usize {
        self.repeat_count
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Check every phase against a backend without running anything
    pub fn check(&self, backend: &dyn Backend) -> Result<(), HarnessError> {
        match self.phases.iter().find(|phase| !backend.supports(phase.kind)) {
            Some(phase) => Err(HarnessError::Unsupported {
                backend: backend.name().to_string(),
                phase: phase.name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Run every phase on one backend, in order
    pub fn run_backend(
        &self,
        backend: &mut dyn Backend,
        workload: &Workload,
    ) -> Result<Vec<BenchmarkResult>, HarnessError> {
        self.check(backend)?;
        tracing::info!(
            "{}: {} phases x {} entries x {} iterations",
            backend.name(),
            self.phases.len(),
            workload.len(),
            self.repeat_count
        );

        self.phases
            .iter()
            .map(|phase| run_phase(phase, backend, workload, self.repeat_count))
            .collect()
    }

    /// Run every phase on every backend, one backend after another
    pub fn run(
        &self,
        backends: &mut [Box<dyn Backend>],
        workload: &Workload,
    ) -> Result<Vec<BenchmarkResult>, HarnessError> {
        for backend in backends.iter() {
            self.check(backend.as_ref())?;
        }

        let mut results = Vec::with_capacity(backends.len() * self.phases.len());
        for backend in backends.iter_mut() {
            results.extend(self.run_backend(backend.as_mut(), workload)?);
        }
        Ok(results)
    }
}

/// Total elapsed time over a set of results
pub fn total_elapsed(results: &[BenchmarkResult]) -> Duration {
    results.iter().map(|r| r.elapsed).sum()
}
