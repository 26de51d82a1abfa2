use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the scopa binary.
#[derive(Debug, Parser)]
#[command(name = "scopa", version, about = "Dispatcher cache invalidation engine")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SCOPA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Process a single notification file and exit.
    Run(RunArgs),
    /// Watch the spool directory for notification files.
    Watch(WatchArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub overrides: EngineOverrides,

    /// Path to the change notification JSON file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub notification: PathBuf,
}

#[derive(Debug, Args, Default, Clone)]
pub struct WatchArgs {
    #[command(flatten)]
    pub overrides: EngineOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct EngineOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the dispatcher purge endpoint.
    #[arg(long = "dispatcher-endpoint", value_name = "URL")]
    pub dispatcher_endpoint: Option<String>,

    /// Override the catalog backend endpoint.
    #[arg(long = "catalog-endpoint", value_name = "URL")]
    pub catalog_endpoint: Option<String>,

    /// Override the repository query endpoint.
    #[arg(long = "repository-endpoint", value_name = "URL")]
    pub repository_endpoint: Option<String>,

    /// Override the notification spool directory.
    #[arg(long = "spool-dir", value_name = "PATH")]
    pub spool_dir: Option<PathBuf>,

    /// Override the spool poll interval in milliseconds.
    #[arg(long = "spool-poll-interval-ms", value_name = "MILLIS")]
    pub spool_poll_interval_ms: Option<u64>,
}
