use {
    crate::{clock, mpd::MpdConfig, net::Interfaces},
    serde::Deserialize,
    std::{
        fs, io,
        path::{Path, PathBuf},
        time::Duration,
    },
};

/// everything the status line needs to know, fixed at startup.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// how long to sleep between cycles, in milliseconds.
    pub interval_ms: u64,
    /// strftime-style format of the clock fragment.
    pub clock_format: String,
    /// the aggregate cpu statistics, usually `/proc/stat`.
    pub proc_stat: PathBuf,
    /// memory statistics, usually `/proc/meminfo`.
    pub proc_meminfo: PathBuf,
    /// a file holding the user-set volume, usually `$HOME/.volume`.
    pub volume_file: Option<PathBuf>,
    /// the x display to connect to. `$DISPLAY` is used if this is unset.
    pub display: Option<String>,
    /// stop after this many cycles. runs forever if unset.
    pub cycles: Option<u64>,
    pub net: Interfaces,
    pub mpd: MpdConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// === impl Config ===

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_ms: 2_000,
            clock_format: clock::DEFAULT_FORMAT.to_owned(),
            proc_stat: PathBuf::from("/proc/stat"),
            proc_meminfo: PathBuf::from("/proc/meminfo"),
            volume_file: dirs::home_dir().map(|home| home.join(".volume")),
            display: None,
            cycles: None,
            net: Interfaces::default(),
            mpd: MpdConfig::default(),
        }
    }
}

impl Config {
    /// the default location of the config file, `$XDG_CONFIG_HOME/dwmstatus/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dwmstatus").join("config.toml"))
    }

    /// loads the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// loads the config at the default location, falling back to defaults if there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// the sleep between cycles. never zero, so the loop cannot spin.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}
