use accelade_event_bus::EventBusConfig;
use accelade_logger::LoggerSettings;
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix for environment overrides, e.g. `ACCELADE__EVENTS__MAX_LISTENERS`.
pub const ENV_PREFIX: &str = "ACCELADE";
const ENV_SEPARATOR: &str = "__";

#[accelade_derive::accelade_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Settings for a [`Runtime`](crate::Runtime). Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub logging: LoggerSettings,
    pub events: EventBusConfig,
}

/// Loads `T` from a configuration file, overlaid with `ACCELADE__*` environment variables.
///
/// The file format follows its extension (`.toml`, `.json`, `.yaml`, ...). Nested
/// keys are addressed with double underscores, so `ACCELADE__LOGGING__LEVEL=debug`
/// maps to `logging.level`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or unreadable, or if
/// the merged sources do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use accelade::{RuntimeConfig, load_config};
///
/// let config: RuntimeConfig = load_config("accelade.toml").unwrap_or_default();
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let builder = Config::builder().add_source(File::from(path).required(true)).add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .convert_case(config::Case::Snake),
    );

    info!("Loading config from {}", path.display());

    builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
