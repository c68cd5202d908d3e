use std::path::PathBuf;

use crate::logging::default_log_level;

pub struct Config {
    /// Directory holding the planner store and the logs
    pub data_dir: PathBuf,
    /// Level passed to the logger
    pub log_level: String,
}

impl Config {
    /// Fills in defaults for anything not given on the command line.
    pub fn resolve(data_dir: Option<PathBuf>, log_level: Option<String>) -> Config {
        Config {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            log_level: log_level.unwrap_or_else(|| default_log_level().to_string()),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minty")
}
