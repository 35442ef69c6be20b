use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use busrace_core::{
    load_config, parse_time_of_day, validate_config, BusApi, Clock, HttpBusApi,
    RaceOrchestrator, RaceError, SanitizedConfig, SystemClock,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Book a bus ticket the moment booking opens.
#[derive(Debug, Parser)]
#[command(name = "busrace", version)]
struct Cli {
    /// Target time, 24-hour HH:MM or HH:MM:SS
    #[arg(value_parser = parse_target)]
    time: String,

    /// Config file (defaults to $BUSRACE_CONFIG, then ./busrace.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_target(input: &str) -> Result<String, String> {
    parse_time_of_day(input)
        .map(|_| input.to_string())
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<RaceError>()
            .map(RaceError::exit_code)
            .unwrap_or(1);
        match e.downcast_ref::<RaceError>().and_then(RaceError::failure_kind) {
            Some(kind) => error!(kind = %kind, "Fatal error: {:#}", e),
            None => error!("Fatal error: {:#}", e),
        }
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("busrace {}", VERSION);

    // Determine config path
    let config_path = cli
        .config
        .or_else(|| std::env::var("BUSRACE_CONFIG").ok().map(PathBuf::from));

    // Load configuration
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {:?}", path),
        None => "Failed to load config".to_string(),
    })?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let sanitized = SanitizedConfig::from(&config);
    info!(
        config = %serde_json::to_string(&sanitized).unwrap_or_default(),
        "Configuration loaded"
    );

    let api: Arc<dyn BusApi> =
        Arc::new(HttpBusApi::new(config.api.clone()).context("Failed to create API client")?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let orchestrator = RaceOrchestrator::new(config.race.clone(), api, clock)?;
    let report = orchestrator.run(&cli.time).await?;

    info!(
        departure_id = report.selection.departure_id,
        direction = %report.selection.direction,
        attempts = report.attempts,
        "Bus booked successfully"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_time_and_config() {
        let cli = Cli::try_parse_from(["busrace", "07:45", "--config", "race.toml"]).unwrap();
        assert_eq!(cli.time, "07:45");
        assert_eq!(cli.config, Some(PathBuf::from("race.toml")));
    }

    #[test]
    fn test_cli_accepts_seconds() {
        let cli = Cli::try_parse_from(["busrace", "07:45:30"]).unwrap();
        assert_eq!(cli.time, "07:45:30");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_rejects_malformed_time() {
        assert!(Cli::try_parse_from(["busrace", "7h45"]).is_err());
        assert!(Cli::try_parse_from(["busrace", "24:00"]).is_err());
    }

    #[test]
    fn test_cli_requires_time() {
        assert!(Cli::try_parse_from(["busrace"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
