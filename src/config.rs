use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

pub const ENV_LOG: &str = "SCHOOLD_LOG";
pub const ENV_WORKSPACE: &str = "SCHOOLD_WORKSPACE";

/// Process-level settings read once at startup. Per-workspace settings live in
/// the store under `setup.*`.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub log_level: Level,
    pub workspace: Option<PathBuf>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            workspace: None,
        }
    }
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(level) = lookup(ENV_LOG).and_then(|v| Level::from_str(v.trim()).ok()) {
            cfg.log_level = level;
        }
        cfg.workspace = lookup(ENV_WORKSPACE)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        cfg
    }
}
