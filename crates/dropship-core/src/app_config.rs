use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-level configuration read from `DROPSHIP_*` environment variables.
///
/// The simulation's own knobs live in [`crate::AutomationSettings`]; this struct
/// only carries the runtime surface around it (bind address, loop cadence,
/// optional settings file).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Optional YAML file with initial automation settings.
    pub settings_path: Option<PathBuf>,
    pub cycle_interval_secs: u64,
    pub cycle_cooldown_secs: u64,
    pub monitor_interval_secs: u64,
    pub trend_retry_secs: u64,
    pub posting_flush_secs: u64,
    pub max_publish_attempts: u32,
    /// Start the automation loops as soon as the server is up.
    pub autostart: bool,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.env == Environment::Development
    }
}
