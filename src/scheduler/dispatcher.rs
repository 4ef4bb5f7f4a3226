//! Fan-out side of a probing pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use super::collector::Outcome;
use crate::config::Config;
use crate::probe::Prober;
use crate::worlds::WorldId;

/// Starts one probe task per world, in bursts separated by a cooldown.
pub struct Dispatcher<P> {
    prober: Arc<P>,
    burst_size: usize,
    burst_cooldown: Duration,
    in_flight: Option<Arc<Semaphore>>,
}

impl<P: Prober> Dispatcher<P> {
    pub fn new(prober: Arc<P>, cfg: &Config) -> Self {
        Self {
            prober,
            burst_size: cfg.burst_size.max(1),
            burst_cooldown: cfg.burst_cooldown,
            in_flight: cfg.max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Start a probe for every world and return how many were started.
    ///
    /// Returns as soon as the last task is spawned; results arrive on `tx`
    /// in whatever order the probes finish. A cancelled dispatch starts no
    /// further probes and abandons the ones still running.
    pub async fn dispatch(
        &self,
        worlds: &[WorldId],
        tx: mpsc::Sender<Outcome>,
        cancel: &CancellationToken,
    ) -> usize {
        let mut started = 0;

        for (i, &world) in worlds.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            let permit = match &self.in_flight {
                Some(limit) => tokio::select! {
                    permit = limit.clone().acquire_owned() => permit.ok(),
                    _ = cancel.cancelled() => break,
                },
                None => None,
            };

            let prober = self.prober.clone();
            let tx = tx.clone();
            let task_cancel = cancel.clone();

            tokio::spawn(async move {
                let _permit = permit; // Hold permit until done

                let result = tokio::select! {
                    result = prober.probe(world) => result,
                    _ = task_cancel.cancelled() => {
                        tracing::debug!("Probe for {} abandoned", world);
                        return;
                    }
                };

                if let Err(e) = &result {
                    tracing::warn!("Probe failed for {}: {}", world, e);
                }

                if tx.send(Outcome { world, result }).await.is_err() {
                    tracing::debug!("Collector gone, dropping result for {}", world);
                }
            });
            started += 1;

            // Sleep after each full burst unless nothing is left to start
            let more = i + 1 < worlds.len();
            if more && started % self.burst_size == 0 {
                tracing::debug!("Started {} probes, cooling down for {:?}", started, self.burst_cooldown);
                tokio::select! {
                    _ = tokio::time::sleep(self.burst_cooldown) => {}
                    _ = cancel.cancelled() => break,
                }
            }
        }

        started
    }
}
