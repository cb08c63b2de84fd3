//! Layered configuration, lowest priority first: built-in defaults,
//! `fintrack.toml` in the platform config directory, `./fintrack.toml`,
//! then `FINTRACK_*` environment variables (e.g. `FINTRACK_BACKEND=memory`).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "fintrack.toml";
const DATABASE_FILE: &str = "fintrack.db";
const ENV_PREFIX: &str = "FINTRACK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub backend: Backend,
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub seed_defaults: bool,
}

impl Settings {
    pub fn load() -> Result<Self> {
        let mut files = Vec::new();
        if let Some(dirs) = project_dirs() {
            files.push(dirs.config_dir().join(CONFIG_FILE));
        }
        files.push(PathBuf::from(CONFIG_FILE));
        Self::build(&files, Some(ENV_PREFIX))
    }

    /// Defaults overlaid with a single file, without reading the environment.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(&[path.to_path_buf()], None)
    }

    fn build(files: &[PathBuf], env_prefix: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("backend", "sqlite")?
            .set_default("log_level", "warn")?
            .set_default("seed_defaults", true)?;
        for path in files {
            builder = builder.add_source(File::from(path.as_path()).required(false));
        }
        if let Some(prefix) = env_prefix {
            builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true));
        }
        let settings: Self = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// The SQLite file to open: the configured path, else `fintrack.db` in the
    /// platform data directory (created if missing).
    pub fn resolve_database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            let expanded = crate::run::shellexpand(&path.to_string_lossy());
            return Ok(PathBuf::from(expanded));
        }
        let dirs =
            project_dirs().ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(data_dir.join(DATABASE_FILE))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "fintrack", "fintrack")
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
