//! worldping - find the lowest latency Old School RuneScape world.
//!
//! The crate is split the way a probing pass flows:
//!
//! - **worlds**: category tables and world number formatting
//! - **probe**: the [`probe::Prober`] contract and the system `ping` backend
//! - **scheduler**: bursty fan-out of probes and fan-in of their outcomes
//! - **report**: best / worst ranking and console or JSON output
//!
//! The `worldping` binary wires these together with [`config::Config`].

pub mod config;
pub mod probe;
pub mod report;
pub mod scheduler;
pub mod worlds;
