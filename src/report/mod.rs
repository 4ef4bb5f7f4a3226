//! Ranking of a finished batch.

mod render;

pub use render::*;

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::probe::Latency;
use crate::scheduler::Batch;
use crate::worlds::WorldId;

/// Report error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("all {failed} probes failed")]
    AllProbesFailed {
        failed: usize,
        /// Worlds a cancelled pass never heard from.
        missing: Vec<WorldId>,
    },
}

/// A world together with its measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub world: WorldId,
    #[serde(flatten)]
    pub latency: Latency,
}

/// A world that produced no measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failed {
    pub world: WorldId,
    pub cause: String,
}

/// Best and worst world of one batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub best: Option<Ranked>,
    pub worst: Option<Ranked>,
    pub failures: Vec<Failed>,
    /// Worlds left without any outcome by a cancelled pass.
    pub missing: Vec<WorldId>,
}

/// Picks the lowest and highest average latency of a batch.
#[derive(Debug, Clone)]
pub struct Reporter {
    show_worst: bool,
}

impl Reporter {
    pub fn new(cfg: &Config) -> Self {
        Self {
            show_worst: cfg.show_worst_of_batch,
        }
    }

    /// Rank the successful probes of `batch`.
    ///
    /// Ties go to the world listed first. Failed probes are listed but not
    /// ranked; if nothing succeeded the batch has no ranking at all.
    pub fn summarize(&self, batch: &Batch) -> Result<Summary, ReportError> {
        let mut summary = Summary {
            missing: batch.missing(),
            ..Summary::default()
        };
        let mut successes = 0;

        for (world, result) in batch.iter() {
            match result {
                Ok(latency) => {
                    successes += 1;
                    let entry = Ranked {
                        world,
                        latency: *latency,
                    };
                    if summary.best.map_or(true, |b| latency.average < b.latency.average) {
                        summary.best = Some(entry);
                    }
                    if summary.worst.map_or(true, |w| latency.average > w.latency.average) {
                        summary.worst = Some(entry);
                    }
                }
                Err(e) => summary.failures.push(Failed {
                    world,
                    cause: e.to_string(),
                }),
            }
        }

        if successes == 0 && !summary.failures.is_empty() {
            return Err(ReportError::AllProbesFailed {
                failed: summary.failures.len(),
                missing: summary.missing,
            });
        }

        // A lone result has nothing to compare against.
        if !self.show_worst || successes < 2 {
            summary.worst = None;
        }

        Ok(summary)
    }
}
