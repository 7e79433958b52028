use dropship_core::Platform;
use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The trend/niche source could not produce data for this cycle.
    #[error("trend source unavailable: {0}")]
    TrendSource(String),

    #[error("publishing to {platform} failed: {reason}")]
    Publish { platform: Platform, reason: String },

    /// The background posting flush job could not be registered or started.
    #[error("job scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    #[error("posting flush interval must be greater than zero")]
    ZeroFlushInterval,

    #[error("campaign not found: {0}")]
    CampaignNotFound(Uuid),
}
