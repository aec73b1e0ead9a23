//! specter console — CLI host for the verification sequencer and the
//! backend client.

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use config::AppConfig;
use rand::Rng;
use specter_client::ApiClient;
use specter_sequencer::{presets, CanvasLoop, SequenceConfig, Sequencer};
use specter_storage::{JsonFileStore, SessionCache};
use specter_types::MotionParams;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "specter-console", about = "specter console host")]
struct Cli {
    /// Base URL of the backend API.
    #[arg(long, env = "SPECTER_API_URL")]
    api_url: Option<String>,

    /// Path of the JSON session store.
    #[arg(long, env = "SPECTER_STORAGE")]
    storage: Option<PathBuf>,

    /// Suppress decorative animation (sequences still run full length).
    #[arg(long, env = "SPECTER_REDUCED_MOTION")]
    reduced_motion: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SPECTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a preset verification sequence against the real clock.
    Demo {
        sequence: DemoSequence,

        /// Resolve the sequence to a denied outcome.
        #[arg(long)]
        deny: bool,
    },

    /// Query the backend search endpoint.
    Search {
        query: String,

        /// Restrict the search to one dataset kind.
        #[arg(long = "type")]
        kind: Option<String>,
    },

    /// Fetch backend dataset statistics.
    Stats,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemoSequence {
    Checkpoint,
    Connection,
    Fingerprint,
    Slots,
    Circuit,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config_warning = None;
    let file_config = match cli.config.as_deref() {
        Some(path) => match AppConfig::from_toml_file(path) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                config_warning = Some(format!("{e}, using defaults"));
                None
            }
        },
        None => None,
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(path) = cli.storage {
        config.storage_path = path;
    }
    if cli.reduced_motion {
        config.motion.reduced_motion = true;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    init_logging(&config);
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }

    let store = JsonFileStore::open(&config.storage_path)
        .with_context(|| format!("opening session store {}", config.storage_path.display()))?;
    let session = SessionCache::new(Arc::new(store));
    let client = ApiClient::new(&config.api_url, session.clone());

    match cli.command {
        Command::Demo { sequence, deny } => run_demo(sequence, !deny, config.motion).await,
        Command::Search { query, kind } => {
            let resp = client
                .search(&query, kind.as_deref())
                .await
                .context("search request failed")?;
            tracing::info!(
                query = %resp.query,
                total = resp.result_count(),
                "search complete"
            );
            for (kind, rows) in &resp.results_by_type {
                println!("{kind}: {} result(s)", rows.len());
            }
            println!("recent: {:?}", session.recent_queries()?);
            Ok(())
        }
        Command::Stats => {
            let stats = client.stats().await.context("stats request failed")?;
            println!(
                "{} records across {} sources (updated {})",
                stats.total_records,
                stats.total_sources,
                stats.last_updated.as_deref().unwrap_or("unknown")
            );
            Ok(())
        }
    }
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn demo_config(
    sequence: DemoSequence,
    granted: bool,
    motion: &MotionParams,
) -> anyhow::Result<SequenceConfig> {
    Ok(match sequence {
        // Only the checkpoint reveals on the library-default delays; the
        // other presets carry their own settle/notify timings.
        DemoSequence::Checkpoint => presets::security_checkpoint(granted).with_motion(motion),
        DemoSequence::Connection => presets::connection_sequence(),
        DemoSequence::Fingerprint => {
            presets::fingerprint_scan(3).context("fingerprint scan needs a selection")?
        }
        DemoSequence::Slots => {
            let mut rng = rand::thread_rng();
            let target: String = (0..6)
                .map(|_| {
                    presets::SLOT_SYMBOLS[rng.gen_range(0..presets::SLOT_SYMBOLS.len())] as char
                })
                .collect();
            presets::password_slots(6, &target, &mut rng)
        }
        DemoSequence::Circuit => presets::circuit_puzzle(4),
    }
    .outcome(granted))
}

/// Run one sequence to completion, logging each phase, with Ctrl-C wired to
/// explicit cancellation. The background canvas runs alongside unless the
/// reduced-motion preference is set.
async fn run_demo(
    sequence: DemoSequence,
    granted: bool,
    motion: MotionParams,
) -> anyhow::Result<()> {
    let config = demo_config(sequence, granted, &motion)?;
    let labels = config.phases.clone();

    let frames = Arc::new(AtomicU64::new(0));
    let canvas = {
        let frames = Arc::clone(&frames);
        CanvasLoop::start(motion, move |_| {
            frames.fetch_add(1, Ordering::Relaxed);
        })
    };
    if canvas.is_none() {
        tracing::debug!("reduced motion preferred, background canvas disabled");
    }

    let seq = Sequencer::new();
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    seq.start(
        config
            .on_phase_change(move |index| {
                let label = labels.get(index).map(String::as_str).unwrap_or("");
                tracing::info!(index, "{label}");
            })
            .on_complete(move |granted| {
                let _ = done_tx.send(granted);
            }),
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            seq.cancel();
            tracing::info!("sequence cancelled");
        }
        result = done_rx => {
            if let Ok(granted) = result {
                tracing::info!(granted, outcome = %seq.outcome(), "sequence complete");
            }
        }
    }
    if let Some(canvas) = canvas {
        canvas.stop();
        tracing::debug!(
            frames = frames.load(Ordering::Relaxed),
            "background canvas stopped"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn checkpoint_demo_honors_motion_overrides() {
        let motion = MotionParams {
            settle_ms: 300,
            notify_ms: 50,
            ..MotionParams::default()
        };
        let config = demo_config(DemoSequence::Checkpoint, true, &motion).unwrap();
        assert_eq!(config.settle_delay, Duration::from_millis(300));
        assert_eq!(config.notify_delay, Duration::from_millis(50));
    }

    #[test]
    fn other_demos_keep_their_preset_delays() {
        let motion = MotionParams {
            settle_ms: 300,
            notify_ms: 50,
            ..MotionParams::default()
        };
        let config = demo_config(DemoSequence::Connection, true, &motion).unwrap();
        assert_eq!(config.settle_delay, Duration::from_millis(400));
        assert_eq!(config.notify_delay, Duration::ZERO);
    }
}
