use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::timer::ProgressMode;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub strip: bool,
    pub json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub mode: ProgressMode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub progress: ProgressConfig,
}

impl Config {
    /// `~/.config/simpler-timer.toml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("simpler-timer.toml"))
    }

    /// Load the file at `path`, or the default location. A missing default
    /// file is not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Config::try_from(expand_tilde(path).as_path()),
            None => Config::load_default(Config::default_path()),
        }
    }

    fn load_default(path: Option<PathBuf>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) if path.is_file() => Config::try_from(path.as_path()),
            _ => Ok(Config::default()),
        }
    }
}

impl TryFrom<&Path> for Config {
    type Error = Box<dyn std::error::Error>;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config)?;
        Ok(config)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
