//! Shared data model and configuration for the dropship automation simulator.

pub mod activity;
pub mod affiliates;
pub mod app_config;
pub mod campaigns;
pub mod config;
pub mod content;
pub mod products;
pub mod settings;
pub mod trends;

use thiserror::Error;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, ACTIVITY_LOG_CAPACITY};
pub use affiliates::AffiliateProgram;
pub use app_config::{AppConfig, Environment};
pub use campaigns::{Campaign, CampaignStatus, DEFAULT_CAMPAIGN_BUDGET};
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{ContentKind, ContentPiece, ContentStatus, Engagement, Platform};
pub use products::{compute_margin, Product, ProductStatus, ProductVariant};
pub use settings::{load_settings, AutomationSettings, SettingsPatch};
pub use trends::{profit_potential, Competition, Competitor, Niche, TrendSignal};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid platform: {0}")]
    InvalidPlatform(String),

    #[error("invalid content status transition: {from} -> {to}")]
    InvalidTransition {
        from: ContentStatus,
        to: ContentStatus,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),

    #[error("settings validation failed: {0}")]
    Validation(String),
}
