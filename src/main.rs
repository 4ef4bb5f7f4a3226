//! worldping binary entry point.
//!
//! Pings every world of the enabled categories (or one given world) and
//! reports the best and worst average round trip per category.

use worldping::{
    config::Config,
    probe::{PingProber, Prober},
    report::{self, CategoryReport, Reporter},
    scheduler::Scheduler,
    worlds::{Registry, WorldError, WorldId},
};

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Measure latency to Old School RuneScape worlds.
#[derive(Parser, Debug)]
#[command(name = "worldping", version)]
struct Cli {
    /// A single world to ping, either as shown in game (332, 416) or bare (32, 116)
    world: Option<String>,

    /// Print results as JSON lines instead of the console report
    #[arg(long)]
    json: bool,
}

/// One category's worth of worlds to probe.
struct Request {
    title: String,
    worlds: Vec<WorldId>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("worldping=info".parse()?))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load();
    let registry = Registry::standard();

    let requests = match build_requests(&cli, &registry, &cfg) {
        Ok(requests) => requests,
        Err(e) => {
            eprintln!("The argument given is not a valid world: {}", e);
            eprintln!("(Keep in mind DMM, tournament, or other seasonal worlds are not considered valid)");
            return Ok(ExitCode::FAILURE);
        }
    };

    tracing::info!(
        "Probing {} categories: {} echoes per world, bursts of {} every {:?}",
        requests.len(),
        cfg.probe_count,
        cfg.burst_size,
        cfg.burst_cooldown
    );

    let prober = Arc::new(PingProber::new(&cfg));
    run(&cfg, prober, &requests, cli.json).await?;

    Ok(ExitCode::SUCCESS)
}

/// Turn the command line into the passes to run.
///
/// A world argument yields a single pass; otherwise every enabled category
/// gets one. Nothing is probed when the argument does not resolve.
fn build_requests(cli: &Cli, registry: &Registry, cfg: &Config) -> Result<Vec<Request>, WorldError> {
    let requests = match &cli.world {
        Some(raw) => {
            let world = registry.resolve(raw)?;
            vec![Request {
                title: format!("World {}", world.display_id()),
                worlds: vec![world],
            }]
        }
        None => registry
            .categories()
            .iter()
            .filter(|c| c.enabled(cfg))
            .map(|c| Request {
                title: c.name.clone(),
                worlds: c.worlds.clone(),
            })
            .collect(),
    };
    Ok(requests)
}

async fn run<P: Prober>(
    cfg: &Config,
    prober: Arc<P>,
    requests: &[Request],
    json: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let scheduler = Scheduler::new(prober, cfg);
    let reporter = Reporter::new(cfg);

    let cancel = scheduler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, abandoning outstanding probes");
            cancel.cancel();
        }
    });

    let mut out = io::stdout();

    for request in requests {
        if scheduler.cancel_token().is_cancelled() {
            break;
        }

        if !json {
            report::write_progress(&mut out, &request.worlds, cfg.display_chunk_size)?;
            out.flush()?;
        }

        let batch = scheduler.measure(&request.worlds).await;
        let result = reporter.summarize(&batch);

        if json {
            let line = serde_json::to_string(&CategoryReport::new(&request.title, &result))?;
            writeln!(out, "{}", line)?;
        } else {
            report::write_summary(&mut out, &request.title, &result)?;
        }
        out.flush()?;
    }

    Ok(())
}
