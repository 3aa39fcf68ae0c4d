//! mediagated - Media Gateway Daemon
//!
//! Loads the configured media servers, reports their connectivity and keeps
//! them connected with a periodic reconnect sweep until interrupted.
//!
//! Usage:
//!   mediagated [OPTIONS] [config.toml]
//!
//! If no config file is provided, two mock servers are started for demo purposes.

use std::sync::Arc;

use mediagate_core::{BackendFactory, MediaInfo};
use mediagate_gateway::{spawn_reconnect_sweep, GatewayConfig, MediaGateway};
use mediagate_mock::MockBackendFactory;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_CONFIG: &str = r#"
[gateway]
fallback = "concurrent"
sweep_interval_secs = 60

[[servers]]
name = "living-room"
type = "mock"

[servers.config]
libraries = [{ id = "1", name = "Films", kind = "movies" }]
movies = [{ id = "101", title = "Nightfall", year = 2021, tmdb_id = 555, library = "1" }]

[[servers]]
name = "basement"
type = "mock"

[servers.config]
latency_ms = 50
libraries = [{ id = "1", name = "Shows", kind = "shows" }]
shows = [{ id = "201", title = "Harbor", year = 2019, library = "1", episodes = [[1, 1], [1, 2], [2, 1]] }]
"#;

/// Parsed command-line arguments
struct Args {
    /// Gateway config file (TOML)
    config_path: Option<String>,
    /// Emit logs as JSON lines
    log_json: bool,
}

fn parse_args() -> Args {
    let mut result = Args {
        config_path: None,
        log_json: false,
    };

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--log-json" => result.log_json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                // Positional argument = config file
                result.config_path = Some(arg.to_string());
            }
            _ => eprintln!("Unknown argument: {arg}"),
        }
    }

    result
}

fn print_help() {
    eprintln!(
        r#"mediagated - Media Gateway Daemon

Usage: mediagated [OPTIONS] [config.toml]

Options:
      --log-json  Emit logs as JSON lines
  -h, --help      Print this help message

Examples:
  # Run with two demo mock servers
  mediagated

  # Run with config file
  mediagated mediagate.toml

  # Verbose gateway logs
  RUST_LOG=mediagate_gateway=debug mediagated mediagate.toml
"#
    );
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "mediagated=info,mediagate_gateway=info,mediagate_mock=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging(args.log_json);

    tracing::info!("Starting mediagated (Media Gateway Daemon)");

    let config = match args.config_path {
        Some(ref path) => {
            tracing::info!("Loading config from: {}", path);
            GatewayConfig::load(path)?
        }
        None => {
            tracing::info!("No config file provided, using demo mock servers");
            GatewayConfig::from_toml_str(DEMO_CONFIG)?
        }
    };

    let factories: Vec<Arc<dyn BackendFactory>> = vec![Arc::new(MockBackendFactory::new())];
    let gateway = Arc::new(MediaGateway::from_config(&config, &factories).await);
    if gateway.registry().is_empty() {
        anyhow::bail!("No usable media server in configuration");
    }

    match gateway.test_connectivity().await {
        Some(report) if report.ok => tracing::info!("All media servers reachable"),
        Some(report) => tracing::warn!("{}", report.message),
        None => {}
    }

    for stat in gateway.statistics(None).await {
        tracing::info!(
            server = %stat.server,
            movies = stat.counts.movie_count,
            shows = stat.counts.tv_count,
            episodes = stat.counts.episode_count,
            "Library statistics"
        );
    }

    if args.config_path.is_none() {
        let probe = MediaInfo::movie("Nightfall").with_year(2021);
        match gateway.resolve_existence(&probe, None).await {
            Some(exist) => tracing::info!(server = %exist.server, "Demo lookup: {} found", probe.title_year()),
            None => tracing::info!("Demo lookup: {} not found", probe.title_year()),
        }
    }

    let sweep = spawn_reconnect_sweep(gateway.clone(), config.gateway.sweep_interval());
    tracing::info!(
        servers = gateway.registry().len(),
        sweep_interval_secs = config.gateway.sweep_interval_secs,
        "Gateway running, press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    sweep.stop();
    gateway.shutdown().await;

    Ok(())
}
