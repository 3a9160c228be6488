use crate::domain::constants::ENV_PREFIX;
use crate::domain::error::format_context;
use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Keys that accept comma-separated lists from environment variables.
const LIST_KEYS: &[&str] = &["server.cors_origins"];

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

trait ConfigResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, ConfigError>;
}

impl<T> ConfigResultExt<T> for Result<T, config::ConfigError> {
    fn context(self, context: &'static str) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a file (e.g., `config/server.toml`). If no path is
///    provided, it defaults to `"server"`. A missing file is not an error: every section
///    has defaults.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `MORINGA__`.
///    Nested structures are accessed using double underscores (e.g., `MORINGA__MAIL__PASSWORD`
///    maps to `mail.password`). `MORINGA__SERVER__CORS_ORIGINS` takes a comma-separated list.
///
/// # Errors
/// This function will return an error if:
/// * The file exists but cannot be parsed.
/// * The merged content does not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use moringa_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load(path, None)
}

/// Same as [`load_config`], but reads overrides from `vars` instead of the process environment.
///
/// Keys must carry the full `MORINGA__` prefix, exactly as they would in the environment.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_vars<T, I>(path: Option<impl AsRef<Path>>, vars: I) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    load(path, Some(vars.into_iter().collect()))
}

fn load<T>(path: Option<impl AsRef<Path>>, vars: Option<Map<String, String>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let environment = LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .source(vars),
        |env, key| env.with_list_parse_key(key),
    );

    info!("Loading config from {}", effective_path.display());

    Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
