//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
#[cfg(test)]
mod tests;

pub use cli::{CliArgs, Command, EngineOverrides, RunArgs, WatchArgs};

use std::{path::PathBuf, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::{StoreContext, StoreRegistry};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "scopa";
const DEFAULT_SPOOL_DIR: &str = "spool";
const DEFAULT_SPOOL_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 10_000;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub dispatcher: DispatcherSettings,
    pub catalog: CatalogSettings,
    pub repository: RepositorySettings,
    pub engine: EngineSettings,
    pub storefronts: Vec<StorefrontSettings>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RepositorySettings {
    pub endpoint: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub spool_dir: PathBuf,
    pub poll_interval: Duration,
}

/// One storefront's commerce binding, as configured.
#[derive(Debug, Clone, Deserialize)]
pub struct StorefrontSettings {
    pub store_path: String,
    pub client_id: String,
    pub store_view: String,
    pub product_page: String,
    pub category_page: String,
}

impl Settings {
    /// Build the runtime store registry from the configured bindings.
    pub fn store_registry(&self) -> StoreRegistry {
        StoreRegistry::new(self.storefronts.iter().map(|storefront| StoreContext {
            store_path: storefront.store_path.clone(),
            client_id: storefront.client_id.clone(),
            store_view: storefront.store_view.clone(),
            product_page: storefront.product_page.clone(),
            category_page: storefront.category_page.clone(),
        }))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("SCOPA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Run(args)) => raw.apply_overrides(&args.overrides),
        Some(Command::Watch(args)) => raw.apply_overrides(&args.overrides),
        None => raw.apply_overrides(&EngineOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    dispatcher: RawEndpointSettings,
    catalog: RawBackendSettings,
    repository: RawBackendSettings,
    engine: RawEngineSettings,
    storefronts: Vec<StorefrontSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEndpointSettings {
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBackendSettings {
    endpoint: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawEngineSettings {
    spool_dir: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &EngineOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(endpoint) = overrides.dispatcher_endpoint.as_ref() {
            self.dispatcher.endpoint = Some(endpoint.clone());
        }
        if let Some(endpoint) = overrides.catalog_endpoint.as_ref() {
            self.catalog.endpoint = Some(endpoint.clone());
        }
        if let Some(endpoint) = overrides.repository_endpoint.as_ref() {
            self.repository.endpoint = Some(endpoint.clone());
        }
        if let Some(dir) = overrides.spool_dir.as_ref() {
            self.engine.spool_dir = Some(dir.clone());
        }
        if let Some(interval) = overrides.spool_poll_interval_ms {
            self.engine.poll_interval_ms = Some(interval);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            dispatcher,
            catalog,
            repository,
            engine,
            storefronts,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let dispatcher = DispatcherSettings {
            endpoint: parse_endpoint(dispatcher.endpoint, "dispatcher.endpoint")?,
        };
        let catalog = CatalogSettings {
            endpoint: parse_endpoint(catalog.endpoint, "catalog.endpoint")?,
            timeout: Duration::from_millis(
                catalog.timeout_ms.unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS),
            ),
        };
        let repository = RepositorySettings {
            endpoint: parse_endpoint(repository.endpoint, "repository.endpoint")?,
            timeout: Duration::from_millis(
                repository.timeout_ms.unwrap_or(DEFAULT_BACKEND_TIMEOUT_MS),
            ),
        };
        let engine = EngineSettings {
            spool_dir: engine
                .spool_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SPOOL_DIR)),
            poll_interval: Duration::from_millis(
                engine
                    .poll_interval_ms
                    .unwrap_or(DEFAULT_SPOOL_POLL_INTERVAL_MS)
                    .max(1),
            ),
        };

        for storefront in &storefronts {
            validate_storefront(storefront)?;
        }

        Ok(Self {
            logging,
            dispatcher,
            catalog,
            repository,
            engine,
            storefronts,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(raw) => LevelFilter::from_str(&raw)
            .map_err(|_| LoadError::invalid("logging.level", format!("unknown level `{raw}`")))?,
        None => LevelFilter::INFO,
    };
    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    Ok(LoggingSettings { level, format })
}

fn parse_endpoint(raw: Option<String>, key: &'static str) -> Result<Url, LoadError> {
    let raw = raw.ok_or_else(|| LoadError::invalid(key, "endpoint is required"))?;
    Url::parse(&raw).map_err(|err| LoadError::invalid(key, err.to_string()))
}

fn validate_storefront(storefront: &StorefrontSettings) -> Result<(), LoadError> {
    if storefront.store_path.trim().is_empty() {
        return Err(LoadError::invalid(
            "storefronts.store_path",
            "store path must not be empty",
        ));
    }
    if !storefront.store_path.starts_with('/') {
        return Err(LoadError::invalid(
            "storefronts.store_path",
            "store path must be absolute",
        ));
    }
    if storefront.client_id.trim().is_empty() {
        return Err(LoadError::invalid(
            "storefronts.client_id",
            "client id must not be empty",
        ));
    }
    if storefront.store_view.trim().is_empty() {
        return Err(LoadError::invalid(
            "storefronts.store_view",
            "store view must not be empty",
        ));
    }
    Ok(())
}
