//! Simulated dropshipping automation: trend-driven campaign creation, content
//! posting queues, campaign performance monitoring, and reporting.

pub mod affiliates;
pub mod catalog;
pub mod content;
pub mod controller;
pub mod error;
mod loops;
pub mod metrics;
pub mod monitor;
pub mod posting;
pub mod products;
pub mod reporter;

pub use affiliates::{
    affiliate_copy, affiliate_report, find_profitable_programs, profitability_score,
    programs_for_niche, rank_programs, recommend_strategy, sample_programs, track_performance,
    AffiliatePerformance, AffiliateReport, AffiliateStats, RankedProgram,
};
pub use catalog::{StaticCatalog, TrendSource};
pub use content::print_on_demand_designs;
pub use controller::{AutomationEngine, CycleSummary, EngineBuilder, EngineConfig, PriceSuggestion};
pub use error::EngineError;
pub use metrics::{shared_metrics, MetricsSource, RandomMetrics, ScriptedMetrics, SharedMetrics};
pub use monitor::MonitorReport;
pub use posting::{
    optimal_posting_times, FlushReport, LogPublisher, Outcome, PlatformQueues, PostingConfig,
    PostingScheduler, Publisher,
};
pub use products::optimize_price;
pub use reporter::{Analytics, EarningsProjection};
