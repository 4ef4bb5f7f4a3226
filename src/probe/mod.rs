//! Probe module for measuring round trip latency to a world.
//!
//! The scheduler only depends on the [`Prober`] trait; [`PingProber`] is the
//! implementation backed by the operating system's `ping` utility.

mod ping;

pub use ping::*;

use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use crate::worlds::WorldId;

/// Probe error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("host unreachable: {0}")]
    Unreachable(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("unrecognized ping output: {0}")]
    Parse(String),
    #[error("probe ended without reporting a result")]
    Lost,
}

/// Summary of one probe, in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Latency {
    pub average: u32,
    pub minimum: u32,
    pub maximum: u32,
}

/// Something that can measure the latency of a single world.
///
/// One call is one blocking round trip measurement; implementations report
/// failures through [`ProbeError`] instead of panicking.
pub trait Prober: Send + Sync + 'static {
    fn probe(&self, world: WorldId) -> impl Future<Output = Result<Latency, ProbeError>> + Send;
}
