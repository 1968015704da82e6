use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_SETTINGS_FILE: &str = "loader_demo.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub log_destination: LogDestination,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    /// Simulated network latency of every fetch.
    pub fetch_delay_ms: u64,
    /// Tab titles whose first fetch fails; a retry succeeds.
    pub flaky_tabs: Vec<String>,
    /// Fail the first fetch of the tab list itself.
    pub flaky_tab_list: bool,
    /// Compose the screen as an inert skeleton: nothing is fetched.
    pub placeholder: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            log_destination: LogDestination::File,
            log_level: "info".to_string(),
            fetch_delay_ms: 1000,
            flaky_tabs: vec!["Boat".to_string()],
            flaky_tab_list: false,
            placeholder: false,
        }
    }
}

impl DemoSettings {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("invalid log level {:?}", self.log_level))
    }
}

/// Reads settings from a RON file. A missing file yields the defaults; a file that
/// exists but does not parse is an error.
pub fn load_settings(path: &Path) -> anyhow::Result<DemoSettings> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(DemoSettings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read settings from {:?}", path));
        }
    };

    ron::from_str(&content).with_context(|| format!("failed to parse settings from {:?}", path))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let settings = load_settings(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(settings, DemoSettings::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "(fetch_delay_ms: 10, flaky_tabs: [\"Car\"], log_destination: Off)"
        )
        .unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.fetch_delay(), Duration::from_millis(10));
        assert_eq!(settings.flaky_tabs, vec!["Car".to_string()]);
        assert_eq!(settings.log_destination, LogDestination::Off);
        assert_eq!(settings.log_level, "info");
        assert!(!settings.placeholder);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(fetch_delay_ms: \"soon\")").unwrap();

        assert!(load_settings(file.path()).is_err());
    }

    #[test]
    fn log_level_is_validated() {
        let settings = DemoSettings {
            log_level: "chatty".to_string(),
            ..DemoSettings::default()
        };
        assert!(settings.level_filter().is_err());
        assert_eq!(
            DemoSettings::default().level_filter().unwrap(),
            LevelFilter::Info
        );
    }
}
