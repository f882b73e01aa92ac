//! Process-level plumbing shared by the server binary: layered configuration,
//! logging setup and filesystem path helpers.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
pub use paths::{absolutize_sqlite_dsn, resolve_home_dir};

/// Load `KEY=VALUE` pairs from a dotenv file into the process environment.
///
/// Variables that are already set win over the file. A missing file is not an
/// error; `Ok(false)` is returned instead.
pub fn load_dotenv(path: impl AsRef<std::path::Path>) -> anyhow::Result<bool> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path(path)
        .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()))?;
    Ok(true)
}
