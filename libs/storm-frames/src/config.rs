use std::path::{Path, PathBuf};

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Error;
use crate::request::Options;

pub const CONFIG_ENV: &str = "STORM_FRAMES_CONFIG";
pub const CONFIG_FILE: &str = "storm-frames.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub ref_id: String,
    pub format: OutputFormat,
    /// Window used when no start time is given, e.g. `"1h"` or `"PT30M"`.
    pub lookback: String,
    /// Defaults merged under every request's options.
    pub opts: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ref_id: "A".to_string(),
            format: OutputFormat::Table,
            lookback: "1h".to_string(),
            opts: Options::default(),
        }
    }
}

impl Config {
    /// Loads the first config found: `path`, then `$STORM_FRAMES_CONFIG`,
    /// then `./storm-frames.toml`, then the user config dir.
    ///
    /// An explicit `path` must exist. Otherwise a missing file just means
    /// defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self, Error> {
        if let Some(path) = path {
            return Self::read(&path);
        }
        let env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let user = directories::ProjectDirs::from("", "", "storm-frames")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE));
        let candidates = env
            .into_iter()
            .chain([PathBuf::from(".").join(CONFIG_FILE)])
            .chain(user);
        Self::load_first(candidates)
    }

    fn load_first(candidates: impl IntoIterator<Item = PathBuf>) -> Result<Self, Error> {
        for path in candidates {
            if path.is_file() {
                return Self::read(&path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self, Error> {
        let config = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config)?;
        config.lookback()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn lookback(&self) -> Result<SignedDuration, Error> {
        Ok(self.lookback.parse::<SignedDuration>()?)
    }
}
