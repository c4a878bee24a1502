//! Layered configuration shared by the Warden binaries.
//!
//! Values are merged from built-in defaults, an optional configuration file,
//! `WARDEN_*` environment variables, and command-line flags, in that order.
//! The allow-list of directories is read once at startup; nothing in this
//! crate mutates it afterwards.
//!
//! ```no_run
//! use warden_config::Config;
//!
//! let config = Config::load().expect("configuration loads");
//! for directory in config.allowed_directories() {
//!     println!("{directory}");
//! }
//! ```

mod defaults;
mod logging;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, default_log_filter, default_log_filter_string, default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for a Warden process.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "WARDEN")]
pub struct Config {
    /// Directories the process may touch. Every path is confined to these.
    #[serde(default)]
    #[ortho_config(merge_strategy = "append")]
    pub allowed_directories: Vec<Utf8PathBuf>,
    /// `tracing` filter expression, e.g. `info` or `warden_fs=debug`.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Format of emitted log events.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Config {
    /// Directories configured as allowed roots, before canonicalisation.
    #[must_use]
    pub fn allowed_directories(&self) -> &[Utf8PathBuf] {
        &self.allowed_directories
    }

    /// Appends further allowed directories, typically from `--root` flags.
    pub fn extend_allowed_directories<I>(&mut self, directories: I)
    where
        I: IntoIterator<Item = Utf8PathBuf>,
    {
        self.allowed_directories.extend(directories);
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_directories: Vec::new(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_directories() {
        let config = Config::default();
        assert!(config.allowed_directories().is_empty());
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn extends_directories_in_order() {
        let mut config = Config::default();
        config.allowed_directories = vec![Utf8PathBuf::from("/srv/a")];
        config.extend_allowed_directories([Utf8PathBuf::from("/srv/b")]);
        assert_eq!(
            config.allowed_directories(),
            &[Utf8PathBuf::from("/srv/a"), Utf8PathBuf::from("/srv/b")]
        );
    }
}
