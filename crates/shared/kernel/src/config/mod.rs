use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of structured environment overrides (`PHONEBOOK__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "PHONEBOOK";
/// Conventional listener port variable.
pub const PORT_VAR: &str = "PORT";
/// Conventional connection-string variable for the storage backend.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

const DEFAULT_CONFIG_FILE: &str = "phonebook";

/// Custom error type for config loading.
#[phonebook_derive::phonebook_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// Sources, from lowest to highest priority:
/// 1. **Defaults**: whatever `T`'s serde defaults provide.
/// 2. **Base File**: an optional file (e.g. `phonebook.toml`); the extension may be omitted.
///    If no path is provided, it defaults to `"phonebook"` in the working directory.
/// 3. **Environment**: variables prefixed with `PHONEBOOK__`, nested with double underscores
///    (e.g. `PHONEBOOK__DATABASE__NAMESPACE` maps to `database.namespace`).
/// 4. **Conventional variables**: `PORT` (`server.port`) and `DATABASE_URL` (`database.url`).
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed, or if the merged
/// values do not match the structure of `T`.
///
/// # Example
/// ```rust,no_run
/// use phonebook_kernel::config::load_config;
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
    let overrides = [
        ("server.port", std::env::var(PORT_VAR).ok()),
        ("database.url", std::env::var(DATABASE_URL_VAR).ok()),
    ];
    load_config_with(path, overrides)
}

/// Same as [`load_config`], with the conventional variables supplied by the caller.
///
/// Each `(key, value)` pair is applied as a top-priority override when `value` is `Some`.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with<T, I>(path: Option<impl AsRef<Path>>, overrides: I) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (&'static str, Option<String>)>,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let mut builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    for (key, value) in overrides {
        builder = builder.set_override_option(key, value).context("Invalid override")?;
    }

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
