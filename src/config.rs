use std::path::PathBuf;

use crate::engine::DEFAULT_CHECKPOINT_EVERY;

pub const DATA_DIR_ENV: &str = "STEADYHINT_DATA_DIR";
pub const DEBUG_ENV: &str = "STEADYHINT_DEBUG";
const DEFAULT_DATA_DIR: &str = ".steadyhint";

/// Process-level configuration read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub debug: bool,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let debug = lookup(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self { data_dir, debug }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.json")
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("steadyhint.sqlite3")
    }

    /// Debug runs checkpoint weights after every feedback event.
    pub fn checkpoint_every(&self) -> u64 {
        if self.debug {
            1
        } else {
            DEFAULT_CHECKPOINT_EVERY
        }
    }
}
