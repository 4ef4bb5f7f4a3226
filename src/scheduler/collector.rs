//! Fan-in side of a probing pass.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::probe::{Latency, ProbeError};
use crate::worlds::WorldId;

/// What one probe task hands back to the collector.
#[derive(Debug)]
pub struct Outcome {
    pub world: WorldId,
    pub result: Result<Latency, ProbeError>,
}

/// Outcomes of one probing pass, keyed by world.
#[derive(Debug, Default)]
pub struct Batch {
    order: Vec<WorldId>,
    outcomes: HashMap<WorldId, Result<Latency, ProbeError>>,
}

impl Batch {
    fn new(order: Vec<WorldId>) -> Self {
        let outcomes = HashMap::with_capacity(order.len());
        Self { order, outcomes }
    }

    /// Record an outcome, keeping the first one seen per world.
    ///
    /// Returns false when the outcome was ignored.
    fn record(&mut self, outcome: Outcome) -> bool {
        if !self.order.contains(&outcome.world) {
            tracing::warn!("Collector: ignoring result for unexpected world {}", outcome.world);
            return false;
        }
        if self.outcomes.contains_key(&outcome.world) {
            tracing::debug!("Collector: ignoring duplicate result for {}", outcome.world);
            return false;
        }
        self.outcomes.insert(outcome.world, outcome.result);
        true
    }

    /// Give every world still waiting the same failure.
    fn fail_outstanding(&mut self, err: ProbeError) {
        for world in &self.order {
            self.outcomes
                .entry(*world)
                .or_insert_with(|| Err(err.clone()));
        }
    }

    /// Worlds requested, in category order.
    pub fn worlds(&self) -> &[WorldId] {
        &self.order
    }

    pub fn get(&self, world: WorldId) -> Option<&Result<Latency, ProbeError>> {
        self.outcomes.get(&world)
    }

    /// Recorded outcomes in category order, skipping worlds without one.
    pub fn iter(&self) -> impl Iterator<Item = (WorldId, &Result<Latency, ProbeError>)> {
        self.order
            .iter()
            .filter_map(|w| self.outcomes.get(w).map(|r| (*w, r)))
    }

    /// Worlds that never produced an outcome (only after cancellation).
    pub fn missing(&self) -> Vec<WorldId> {
        self.order
            .iter()
            .copied()
            .filter(|w| !self.outcomes.contains_key(w))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// True once every requested world has exactly one outcome.
    pub fn is_complete(&self) -> bool {
        self.outcomes.len() == self.order.len()
    }
}

/// Receive outcomes until every expected world has one.
///
/// Stops early when `deadline` passes (outstanding worlds time out), when
/// `cancel` fires (the batch is returned partial) or when every sender is
/// gone (outstanding worlds are reported lost).
pub async fn collect(
    rx: &mut mpsc::Receiver<Outcome>,
    expected: &[WorldId],
    deadline: Duration,
    cancel: &CancellationToken,
) -> Batch {
    let mut seen = HashSet::with_capacity(expected.len());
    let order: Vec<WorldId> = expected.iter().copied().filter(|w| seen.insert(*w)).collect();
    let mut batch = Batch::new(order);

    let timer = tokio::time::sleep(deadline);
    tokio::pin!(timer);

    while !batch.is_complete() {
        // Cancelled probe tasks drop their senders, so cancellation has to
        // win over the intake closing.
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::warn!("Collector: cancelled, returning partial batch");
                break;
            }
            received = rx.recv() => match received {
                Some(outcome) => {
                    batch.record(outcome);
                }
                None if cancel.is_cancelled() => break,
                None => {
                    tracing::error!(
                        "Collector: intake closed with {} worlds outstanding",
                        batch.missing().len()
                    );
                    batch.fail_outstanding(ProbeError::Lost);
                }
            },
            _ = &mut timer => {
                tracing::warn!(
                    "Collector: deadline of {:?} reached with {} worlds outstanding",
                    deadline,
                    batch.missing().len()
                );
                batch.fail_outstanding(ProbeError::Timeout(deadline));
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(world: u16, average: u32) -> Outcome {
        Outcome {
            world: WorldId(world),
            result: Ok(Latency {
                average,
                minimum: average,
                maximum: average,
            }),
        }
    }

    const LONG: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_empty_batch_completes_immediately() {
        let (_tx, mut rx) = mpsc::channel(1);
        let batch = collect(&mut rx, &[], LONG, &CancellationToken::new()).await;
        assert!(batch.is_empty());
        assert!(batch.is_complete());
    }

    #[tokio::test]
    async fn test_out_of_order_results() {
        let (tx, mut rx) = mpsc::channel(8);
        for o in [ok(3, 30), ok(1, 10), ok(2, 20)] {
            tx.send(o).await.unwrap();
        }
        let worlds = [WorldId(1), WorldId(2), WorldId(3)];
        let batch = collect(&mut rx, &worlds, LONG, &CancellationToken::new()).await;
        assert!(batch.is_complete());
        let order: Vec<_> = batch.iter().map(|(w, _)| w).collect();
        assert_eq!(order, worlds);
    }

    #[tokio::test]
    async fn test_duplicates_and_strangers_ignored() {
        let (tx, mut rx) = mpsc::channel(8);
        for o in [ok(1, 10), ok(1, 99), ok(7, 5), ok(2, 20)] {
            tx.send(o).await.unwrap();
        }
        let worlds = [WorldId(1), WorldId(2)];
        let batch = collect(&mut rx, &worlds, LONG, &CancellationToken::new()).await;
        assert!(batch.is_complete());
        assert_eq!(batch.len(), 2);
        assert!(batch.get(WorldId(7)).is_none());
        let first = batch.get(WorldId(1)).unwrap().as_ref().unwrap();
        assert_eq!(first.average, 10);
    }

    #[tokio::test]
    async fn test_failures_count_toward_completion() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(ok(1, 10)).await.unwrap();
        tx.send(Outcome {
            world: WorldId(2),
            result: Err(ProbeError::Unreachable("w2".to_string())),
        })
        .await
        .unwrap();
        let batch = collect(&mut rx, &[WorldId(1), WorldId(2)], LONG, &CancellationToken::new()).await;
        assert!(batch.is_complete());
        assert!(batch.get(WorldId(2)).unwrap().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_times_out_outstanding() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(ok(1, 10)).await.unwrap();
        let batch = collect(&mut rx, &[WorldId(1), WorldId(2)], LONG, &CancellationToken::new()).await;
        assert!(batch.is_complete());
        assert_eq!(batch.get(WorldId(2)), Some(&Err(ProbeError::Timeout(LONG))));
        drop(tx);
    }

    #[tokio::test]
    async fn test_closed_intake_marks_lost() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(ok(1, 10)).await.unwrap();
        drop(tx);
        let batch = collect(&mut rx, &[WorldId(1), WorldId(2)], LONG, &CancellationToken::new()).await;
        assert!(batch.is_complete());
        assert_eq!(batch.get(WorldId(2)), Some(&Err(ProbeError::Lost)));
    }

    #[tokio::test]
    async fn test_cancel_returns_partial() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(ok(2, 10)).await.unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            trigger.cancel();
        });
        let batch = collect(&mut rx, &[WorldId(1), WorldId(2)], LONG, &cancel).await;
        assert!(!batch.is_complete());
        assert_eq!(batch.missing(), [WorldId(1)]);
        drop(tx);
    }

    #[tokio::test]
    async fn test_cancel_wins_over_closed_intake() {
        for _ in 0..32 {
            let (tx, mut rx) = mpsc::channel(8);
            tx.send(ok(1, 10)).await.unwrap();
            let cancel = CancellationToken::new();
            cancel.cancel();
            drop(tx);

            let batch = collect(&mut rx, &[WorldId(1), WorldId(2)], LONG, &cancel).await;
            assert!(!batch.is_complete());
            assert!(batch.get(WorldId(2)).is_none());
        }
    }
}
