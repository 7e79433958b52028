use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::ContentPiece;
use crate::products::Product;

/// Budget assigned to every campaign created by the automation cycle.
pub const DEFAULT_CAMPAIGN_BUDGET: i64 = 1_000;

const CAMPAIGN_NAME_PREFIX: &str = "Auto Campaign - ";
const CAMPAIGN_NAME_TITLE_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Completed,
}

/// One processed trend: the products synthesized for it, their content, and
/// running performance totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub niche: String,
    pub products: Vec<Product>,
    pub content: Vec<ContentPiece>,
    pub budget: Decimal,
    pub spent: Decimal,
    pub revenue: Decimal,
    pub profit: Decimal,
    pub status: CampaignStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Content is held on the campaign until approved when auto-approval is off.
    pub awaiting_approval: bool,
}

impl Campaign {
    /// Create an active campaign for a trend with zero spend, revenue and profit.
    #[must_use]
    pub fn from_trend(
        trend_title: &str,
        niche: &str,
        products: Vec<Product>,
        content: Vec<ContentPiece>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: campaign_name(trend_title),
            niche: niche.to_string(),
            products,
            content,
            budget: Decimal::from(DEFAULT_CAMPAIGN_BUDGET),
            spent: Decimal::ZERO,
            revenue: Decimal::ZERO,
            profit: Decimal::ZERO,
            status: CampaignStatus::Active,
            start_date,
            end_date: None,
            awaiting_approval: false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }

    /// Add one monitoring period's revenue and spend and recompute profit.
    pub fn record_performance(&mut self, revenue: Decimal, spend: Decimal) {
        self.revenue += revenue;
        self.spent += spend;
        self.profit = self.revenue - self.spent;
    }

    pub fn pause(&mut self) {
        self.status = CampaignStatus::Paused;
    }
}

fn campaign_name(trend_title: &str) -> String {
    let title: String = trend_title.chars().take(CAMPAIGN_NAME_TITLE_CHARS).collect();
    format!("{CAMPAIGN_NAME_PREFIX}{title}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_campaign_starts_active_with_zero_totals() {
        let c = Campaign::from_trend("Short title", "Tech", vec![], vec![], Utc::now());
        assert_eq!(c.status, CampaignStatus::Active);
        assert_eq!(c.budget, Decimal::from(1_000));
        assert_eq!(c.spent, Decimal::ZERO);
        assert_eq!(c.revenue, Decimal::ZERO);
        assert_eq!(c.profit, Decimal::ZERO);
        assert_eq!(c.name, "Auto Campaign - Short title");
    }

    #[test]
    fn campaign_name_truncates_title_to_thirty_chars() {
        let c = Campaign::from_trend(
            "Korean Skincare Routine That Changed My Life",
            "Beauty",
            vec![],
            vec![],
            Utc::now(),
        );
        assert_eq!(c.name, "Auto Campaign - Korean Skincare Routine That C");
    }

    #[test]
    fn campaign_name_truncates_on_char_boundary() {
        let title = "é".repeat(40);
        let c = Campaign::from_trend(&title, "n", vec![], vec![], Utc::now());
        assert_eq!(c.name.chars().count(), CAMPAIGN_NAME_PREFIX.len() + 30);
    }

    #[test]
    fn record_performance_accumulates_and_recomputes_profit() {
        let mut c = Campaign::from_trend("t", "n", vec![], vec![], Utc::now());
        c.record_performance(Decimal::from(600), Decimal::from(50));
        assert_eq!(c.profit, Decimal::from(550));
        c.record_performance(Decimal::from(100), Decimal::from(120));
        assert_eq!(c.revenue, Decimal::from(700));
        assert_eq!(c.spent, Decimal::from(170));
        assert_eq!(c.profit, Decimal::from(530));
    }
}
