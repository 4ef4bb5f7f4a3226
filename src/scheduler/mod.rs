//! Scheduler module for running one probing pass per category.
//!
//! A pass fans out through the [`Dispatcher`] and fans back in through
//! [`collect`]; both run at the same time over one mpsc channel.

mod collector;
mod dispatcher;

pub use collector::*;
pub use dispatcher::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::probe::Prober;
use crate::worlds::WorldId;

/// Runs probing passes with a shared cancellation token.
pub struct Scheduler<P> {
    dispatcher: Dispatcher<P>,
    batch_deadline: Duration,
    cancel: CancellationToken,
}

impl<P: Prober> Scheduler<P> {
    pub fn new(prober: Arc<P>, cfg: &Config) -> Self {
        Self {
            dispatcher: Dispatcher::new(prober, cfg),
            batch_deadline: cfg.batch_deadline,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that aborts the running pass and every later one.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Probe every world once and wait for the batch.
    pub async fn measure(&self, worlds: &[WorldId]) -> Batch {
        if worlds.is_empty() {
            return Batch::default();
        }

        let (tx, mut rx) = mpsc::channel(worlds.len());

        // Once the batch is settled nothing of this pass may keep running.
        let pass = self.cancel.child_token();
        let collecting = async {
            let batch = collect(&mut rx, worlds, self.batch_deadline, &pass).await;
            pass.cancel();
            batch
        };

        let (started, batch) = tokio::join!(
            self.dispatcher.dispatch(worlds, tx, &pass),
            collecting,
        );

        tracing::info!(
            "Scheduler: {} probes started, {} of {} worlds reported",
            started,
            batch.iter().count(),
            batch.len()
        );

        batch
    }
}
