//! Ping probe backed by the system `ping` command.
//!
//! Each probe runs in its own child process, so a crash or hang in the
//! transport only affects that world.

use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::Command;

use super::{Latency, ProbeError, Prober};
use crate::config::Config;
use crate::worlds::WorldId;

/// Runs `ping` against `<prefix><world><suffix>` and parses its summary.
#[derive(Debug, Clone)]
pub struct PingProber {
    count: u32,
    timeout: Duration,
    host_prefix: String,
    host_suffix: String,
}

impl PingProber {
    pub fn new(cfg: &Config) -> Self {
        Self {
            count: cfg.probe_count,
            timeout: cfg.probe_timeout,
            host_prefix: cfg.host_prefix.clone(),
            host_suffix: cfg.host_suffix.clone(),
        }
    }

    /// Host name pinged for a world, e.g. `oldschool32.runescape.com`.
    pub fn host(&self, world: WorldId) -> String {
        format!("{}{}{}", self.host_prefix, world.0, self.host_suffix)
    }
}

impl Prober for PingProber {
    async fn probe(&self, world: WorldId) -> Result<Latency, ProbeError> {
        let host = self.host(world);
        match tokio::time::timeout(self.timeout, run_ping_command(&host, self.count)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        }
    }
}

fn count_flag() -> &'static str {
    if cfg!(windows) {
        "-n"
    } else {
        "-c"
    }
}

/// Run ping via command execution.
async fn run_ping_command(host: &str, count: u32) -> Result<Latency, ProbeError> {
    let output = Command::new("ping")
        .args([count_flag(), &count.to_string(), host])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ProbeError::Command(format!("failed to execute ping: {}", e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.contains("100% packet loss")
            || stdout.contains("100.0% packet loss")
            || stdout.contains("(100% loss)")
            || stderr.contains("unknown host")
            || stderr.contains("Name or service not known")
            || stdout.contains("could not find host")
        {
            return Err(ProbeError::Unreachable(host.to_string()));
        }
        return Err(ProbeError::Command(format!(
            "ping exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    parse_ping_output(&stdout)
}

/// Parse the statistics summary printed at the end of a ping run.
pub(crate) fn parse_ping_output(output: &str) -> Result<Latency, ProbeError> {
    // Windows: "Minimum = 12ms, Maximum = 15ms, Average = 13ms"
    static WINDOWS: OnceLock<Regex> = OnceLock::new();
    let windows = WINDOWS.get_or_init(|| {
        Regex::new(
            r"Minimum = (?P<min>[0-9]+)ms, Maximum = (?P<max>[0-9]+)ms, Average = (?P<avg>[0-9]+)ms",
        )
        .unwrap()
    });

    if let Some(caps) = windows.captures(output) {
        return Ok(Latency {
            average: millis(&caps["avg"])?,
            minimum: millis(&caps["min"])?,
            maximum: millis(&caps["max"])?,
        });
    }

    // Linux "rtt min/avg/max/mdev = a/b/c/d ms" and
    // macOS "round-trip min/avg/max/stddev = a/b/c/d ms"
    static UNIX: OnceLock<Regex> = OnceLock::new();
    let unix = UNIX.get_or_init(|| {
        Regex::new(
            r"(?:rtt|round-trip)\s+min/avg/max/(?:mdev|stddev)\s*=\s*(?P<min>[0-9.]+)/(?P<avg>[0-9.]+)/(?P<max>[0-9.]+)",
        )
        .unwrap()
    });

    if let Some(caps) = unix.captures(output) {
        return Ok(Latency {
            average: millis(&caps["avg"])?,
            minimum: millis(&caps["min"])?,
            maximum: millis(&caps["max"])?,
        });
    }

    Err(ProbeError::Parse(
        output.lines().last().unwrap_or_default().trim().to_string(),
    ))
}

fn millis(raw: &str) -> Result<u32, ProbeError> {
    raw.parse::<f64>()
        .ok()
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .map(|ms| ms.round() as u32)
        .ok_or_else(|| ProbeError::Parse(format!("bad latency value {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ping_output_windows() {
        let output = r#"
Pinging oldschool32.runescape.com [8.8.8.8] with 32 bytes of data:
Reply from 8.8.8.8: bytes=32 time=14ms TTL=117

Ping statistics for 8.8.8.8:
    Packets: Sent = 10, Received = 10, Lost = 0 (0% loss),
Approximate round trip times in milli-seconds:
    Minimum = 12ms, Maximum = 31ms, Average = 15ms"#;
        let latency = parse_ping_output(output).unwrap();
        assert_eq!(
            latency,
            Latency {
                average: 15,
                minimum: 12,
                maximum: 31
            }
        );
    }

    #[test]
    fn test_parse_ping_output_linux_summary() {
        let output = r#"PING 8.8.8.8 (8.8.8.8) 56(84) bytes of data.
64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=12.3 ms

--- 8.8.8.8 ping statistics ---
3 packets transmitted, 3 received, 0% packet loss, time 2003ms
rtt min/avg/max/mdev = 12.300/14.612/17.501/2.100 ms"#;
        let latency = parse_ping_output(output).unwrap();
        assert_eq!(latency.minimum, 12);
        assert_eq!(latency.average, 15);
        assert_eq!(latency.maximum, 18);
    }

    #[test]
    fn test_parse_ping_output_macos_summary() {
        let output = r#"PING google.com (142.250.69.174): 56 data bytes

--- google.com ping statistics ---
1 packets transmitted, 1 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 17.906/17.906/17.906/0.000 ms"#;
        let latency = parse_ping_output(output).unwrap();
        assert_eq!(latency.average, 18);
        assert_eq!(latency.minimum, latency.maximum);
    }

    #[test]
    fn test_parse_ping_output_garbage() {
        let err = parse_ping_output("Request timed out.").unwrap_err();
        assert_eq!(err, ProbeError::Parse("Request timed out.".to_string()));
    }

    #[test]
    fn test_host_name() {
        let prober = PingProber::new(&Config::default());
        assert_eq!(prober.host(WorldId(32)), "oldschool32.runescape.com");
        assert_eq!(prober.host(WorldId(116)), "oldschool116.runescape.com");
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails() {
        let cfg = Config {
            probe_count: 1,
            probe_timeout: Duration::from_secs(5),
            host_prefix: "worldping-".to_string(),
            host_suffix: ".invalid".to_string(),
            ..Config::default()
        };
        let result = PingProber::new(&cfg).probe(WorldId(1)).await;
        tokio_test::assert_err!(result);
    }
}
