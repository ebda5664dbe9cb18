use std::env;
use std::path::PathBuf;

const DEFAULT_LOG_FILTER: &str = "warn";

/// Settings read from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// env_logger filter, e.g. `debug` or `myshell=trace`.
    pub log_filter: String,
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            history_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(filter) = lookup("MYSHELL_LOG").filter(|f| !f.is_empty()) {
            config.log_filter = filter;
        }

        if let Some(history) = lookup("MYSHELL_HISTORY").filter(|h| !h.is_empty()) {
            config.history_file = Some(PathBuf::from(history));
        }

        config
    }
}
