//! Configuration module for worldping.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Probe and report configuration, fixed at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Echo requests per probe (default: 10)
    pub probe_count: u32,
    /// Probes started before each cooldown pause (default: 10)
    pub burst_size: usize,
    /// Pause between bursts (default: 500ms)
    pub burst_cooldown: Duration,
    /// Worlds listed per progress line (default: 20)
    pub display_chunk_size: usize,
    /// Whether reports include the highest latency world (default: true)
    pub show_worst_of_batch: bool,
    pub show_members: bool,
    pub show_ftp: bool,
    pub show_pvp: bool,
    /// Upper bound for a single ping invocation (default: 30s)
    pub probe_timeout: Duration,
    /// Upper bound for collecting one category (default: 120s)
    pub batch_deadline: Duration,
    /// Optional cap on probes alive at the same time (default: none)
    pub max_in_flight: Option<usize>,
    pub host_prefix: String,
    pub host_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_count: 10,
            burst_size: 10,
            burst_cooldown: Duration::from_millis(500),
            display_chunk_size: 20,
            show_worst_of_batch: true,
            show_members: true,
            show_ftp: false,
            show_pvp: true,
            probe_timeout: Duration::from_secs(30),
            batch_deadline: Duration::from_secs(120),
            max_in_flight: None,
            host_prefix: "oldschool".to_string(),
            host_suffix: ".runescape.com".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WORLDPING_PING_COUNT`: echoes per probe
    /// - `WORLDPING_BURST_SIZE`: probes per burst
    /// - `WORLDPING_BURST_COOLDOWN_MS`: pause between bursts in milliseconds
    /// - `WORLDPING_DISPLAY_CHUNK`: worlds per progress line
    /// - `WORLDPING_SHOW_WORST`: show the highest latency world
    /// - `WORLDPING_MEMBERS`, `WORLDPING_FTP`, `WORLDPING_PVP`: category flags
    /// - `WORLDPING_PROBE_TIMEOUT_SECS`: single probe timeout
    /// - `WORLDPING_BATCH_DEADLINE_SECS`: whole category deadline
    /// - `WORLDPING_MAX_IN_FLIGHT`: cap on concurrently running probes
    /// - `WORLDPING_HOST_PREFIX`, `WORLDPING_HOST_SUFFIX`: ping host naming
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Values that fail to parse, or zero where zero makes no sense, keep
    /// their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(n) = positive::<u32>(&lookup, "WORLDPING_PING_COUNT") {
            cfg.probe_count = n;
        }
        if let Some(n) = positive::<usize>(&lookup, "WORLDPING_BURST_SIZE") {
            cfg.burst_size = n;
        }
        if let Some(ms) = parsed::<u64>(&lookup, "WORLDPING_BURST_COOLDOWN_MS") {
            cfg.burst_cooldown = Duration::from_millis(ms);
        }
        if let Some(n) = positive::<usize>(&lookup, "WORLDPING_DISPLAY_CHUNK") {
            cfg.display_chunk_size = n;
        }
        if let Some(b) = flag(&lookup, "WORLDPING_SHOW_WORST") {
            cfg.show_worst_of_batch = b;
        }
        if let Some(b) = flag(&lookup, "WORLDPING_MEMBERS") {
            cfg.show_members = b;
        }
        if let Some(b) = flag(&lookup, "WORLDPING_FTP") {
            cfg.show_ftp = b;
        }
        if let Some(b) = flag(&lookup, "WORLDPING_PVP") {
            cfg.show_pvp = b;
        }
        if let Some(secs) = positive::<u64>(&lookup, "WORLDPING_PROBE_TIMEOUT_SECS") {
            cfg.probe_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = positive::<u64>(&lookup, "WORLDPING_BATCH_DEADLINE_SECS") {
            cfg.batch_deadline = Duration::from_secs(secs);
        }
        if let Some(n) = positive::<usize>(&lookup, "WORLDPING_MAX_IN_FLIGHT") {
            cfg.max_in_flight = Some(n);
        }
        if let Some(prefix) = lookup("WORLDPING_HOST_PREFIX") {
            cfg.host_prefix = prefix;
        }
        if let Some(suffix) = lookup("WORLDPING_HOST_SUFFIX") {
            cfg.host_suffix = suffix;
        }

        cfg
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

fn positive<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr + PartialEq + Default,
{
    parsed::<T>(lookup, key).filter(|v| *v != T::default())
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Ignoring invalid flag for {}: {:?}", key, raw);
            None
        }
    }
}
