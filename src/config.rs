use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

const ENV_PREFIX: &str = "TASKWHEEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine data directory")]
    DataDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// sqlite file holding the task list and the session/break lengths
    pub database: PathBuf,
    pub log_dir: PathBuf,
    /// how often the event loop wakes up to animate and tick
    pub frame_ms: u64,
}

impl Config {
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("org", "taskwheel", "taskwheel").ok_or(ConfigError::DataDirNotFound)
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Defaults, then `config.toml`, then `TASKWHEEL_*` environment variables.
pub fn load_config() -> Result<Config, ConfigError> {
    let dirs = project_dirs()?;
    let data_dir = dirs.data_dir();

    let s = config::Config::builder()
        .set_default(
            "database",
            data_dir.join("taskwheel.db").to_string_lossy().into_owned(),
        )?
        .set_default("log_dir", data_dir.join("logs").to_string_lossy().into_owned())?
        .set_default("frame_ms", 33)?
        .add_source(config::File::from(dirs.config_dir().join("config.toml")).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()?;

    Ok(s.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() -> anyhow::Result<()> {
        let s = config::Config::builder()
            .set_default("database", "/tmp/default.db")?
            .set_default("log_dir", "/tmp/logs")?
            .set_default("frame_ms", 33)?
            .add_source(config::File::from_str(
                "database = \"/tmp/mine.db\"\nframe_ms = 50",
                config::FileFormat::Toml,
            ))
            .build()?;
        let config: Config = s.try_deserialize()?;
        assert_eq!(config.database, PathBuf::from("/tmp/mine.db"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert_eq!(config.frame(), Duration::from_millis(50));
        Ok(())
    }

    #[test]
    fn frame_is_never_zero() {
        let config = Config {
            database: PathBuf::from("x.db"),
            log_dir: PathBuf::from("logs"),
            frame_ms: 0,
        };
        assert_eq!(config.frame(), Duration::from_millis(1));
    }
}
