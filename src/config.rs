use std::path::PathBuf;

pub const LOG_ENV: &str = "COLLEGEGUIDE_LOG";
pub const WORKSPACE_ENV: &str = "COLLEGEGUIDE_WORKSPACE";
pub const DEFAULT_LOG_FILTER: &str = "collegeguided=info";

/// Startup settings. The sidecar takes no arguments; everything else
/// arrives over IPC.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_filter: String,
    pub workspace: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            log_filter: non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            workspace: non_empty(WORKSPACE_ENV).map(PathBuf::from),
        }
    }
}
