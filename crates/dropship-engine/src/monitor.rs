use dropship_core::{AutomationSettings, Campaign, CampaignStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::metrics::MetricsSource;

/// Outcome of one performance-monitor tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonitorReport {
    /// Active campaigns that received new revenue and spend.
    pub updated: usize,
    /// Campaigns whose profit now exceeds the profit threshold.
    pub over_threshold: Vec<Uuid>,
    /// Aggregate spend exceeded the budget limit on this tick.
    pub breaker_tripped: bool,
    /// Campaigns moved to `paused` by the breaker on this tick.
    pub newly_paused: usize,
    pub total_spent: Decimal,
}

/// Simulate one tick of campaign performance.
///
/// Every active campaign gets a revenue and a spend increment. If the total
/// spend across all campaigns then exceeds `settings.budget_limit`, every
/// campaign is paused.
pub fn apply_tick(
    campaigns: &mut [Campaign],
    settings: &AutomationSettings,
    metrics: &mut dyn MetricsSource,
) -> MonitorReport {
    let mut report = MonitorReport::default();

    for campaign in campaigns.iter_mut().filter(|c| c.is_active()) {
        let revenue = metrics.revenue_increment();
        let spend = metrics.spend_increment();
        campaign.record_performance(revenue, spend);
        report.updated += 1;

        if campaign.profit > settings.profit_threshold {
            tracing::info!(
                campaign_id = %campaign.id,
                campaign = %campaign.name,
                profit = %campaign.profit,
                threshold = %settings.profit_threshold,
                "monitor: campaign exceeded profit threshold"
            );
            report.over_threshold.push(campaign.id);
        }
    }

    report.total_spent = campaigns.iter().map(|c| c.spent).sum();

    if report.total_spent > settings.budget_limit {
        report.breaker_tripped = true;
        for campaign in campaigns.iter_mut() {
            if campaign.status != CampaignStatus::Paused {
                campaign.pause();
                report.newly_paused += 1;
            }
        }
        tracing::warn!(
            total_spent = %report.total_spent,
            budget_limit = %settings.budget_limit,
            paused = report.newly_paused,
            "monitor: budget limit exceeded, pausing all campaigns"
        );
    }

    report
}
