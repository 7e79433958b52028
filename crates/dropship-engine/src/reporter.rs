//! Pull-based analytics and earnings projection over the campaign set.

use dropship_core::{ActivityEntry, ActivityLog, Campaign, CampaignStatus, Niche};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Assumed revenue per order when deriving an order count.
pub const AVERAGE_ORDER_PRICE: i64 = 35;
pub const RECENT_ACTIVITY: usize = 10;
/// Assumed daily growth of current profit.
const DAILY_GROWTH_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);
const PROJECTED_REVENUE_CAP: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub total_orders: u64,
    /// Percent.
    pub conversion_rate: f64,
    pub average_order_value: Decimal,
    pub active_campaigns: usize,
    pub paused_campaigns: usize,
    pub top_niches: Vec<Niche>,
    pub recent_activity: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EarningsProjection {
    pub daily: Decimal,
    pub weekly: Decimal,
    pub monthly: Decimal,
    pub yearly: Decimal,
    pub projected_monthly_revenue: Decimal,
}

fn total_revenue(campaigns: &[Campaign]) -> Decimal {
    campaigns.iter().map(|c| c.revenue).sum()
}

fn total_profit(campaigns: &[Campaign]) -> Decimal {
    campaigns.iter().map(|c| c.profit).sum()
}

#[must_use]
pub fn analytics(
    campaigns: &[Campaign],
    activity: &ActivityLog,
    top_niches: Vec<Niche>,
    conversion_rate: f64,
) -> Analytics {
    let total_revenue = total_revenue(campaigns);
    let total_orders = (total_revenue / Decimal::from(AVERAGE_ORDER_PRICE))
        .floor()
        .to_u64()
        .unwrap_or(0);
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        (total_revenue / Decimal::from(total_orders)).round_dp(2)
    };

    let count = |status: CampaignStatus| campaigns.iter().filter(|c| c.status == status).count();

    Analytics {
        total_revenue,
        total_profit: total_profit(campaigns),
        total_orders,
        conversion_rate,
        average_order_value,
        active_campaigns: count(CampaignStatus::Active),
        paused_campaigns: count(CampaignStatus::Paused),
        top_niches,
        recent_activity: activity.recent(RECENT_ACTIVITY),
    }
}

#[must_use]
pub fn earnings_projection(campaigns: &[Campaign]) -> EarningsProjection {
    let daily = total_profit(campaigns) * DAILY_GROWTH_RATE;
    let monthly = daily * Decimal::from(30);

    EarningsProjection {
        daily,
        weekly: daily * Decimal::from(7),
        monthly,
        yearly: daily * Decimal::from(365),
        projected_monthly_revenue: (monthly * Decimal::from(3))
            .min(Decimal::from(PROJECTED_REVENUE_CAP)),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use dropship_core::ActivityKind;

    use super::*;

    fn campaign(revenue: i64, spent: i64) -> Campaign {
        let mut c = Campaign::from_trend("t", "n", vec![], vec![], Utc::now());
        c.record_performance(Decimal::from(revenue), Decimal::from(spent));
        c
    }

    #[test]
    fn empty_engine_reports_zeroes() {
        let a = analytics(&[], &ActivityLog::new(), vec![], 3.0);
        assert_eq!(a.total_revenue, Decimal::ZERO);
        assert_eq!(a.total_orders, 0);
        assert_eq!(a.average_order_value, Decimal::ZERO);
        assert!(a.recent_activity.is_empty());
    }

    #[test]
    fn orders_derived_from_revenue() {
        let campaigns = vec![campaign(600, 50), campaign(100, 20)];
        let a = analytics(&campaigns, &ActivityLog::new(), vec![], 3.0);
        assert_eq!(a.total_revenue, Decimal::from(700));
        assert_eq!(a.total_profit, Decimal::from(630));
        assert_eq!(a.total_orders, 20);
        assert_eq!(a.average_order_value, Decimal::from(35));
        assert_eq!(a.active_campaigns, 2);
    }

    #[test]
    fn average_order_value_is_rounded() {
        let campaigns = vec![campaign(100, 0)];
        let a = analytics(&campaigns, &ActivityLog::new(), vec![], 3.0);
        assert_eq!(a.total_orders, 2);
        assert_eq!(a.average_order_value, Decimal::from(50));

        let campaigns = vec![campaign(106, 0)];
        let a = analytics(&campaigns, &ActivityLog::new(), vec![], 3.0);
        assert_eq!(a.total_orders, 3);
        assert_eq!(a.average_order_value, Decimal::new(3533, 2));
    }

    #[test]
    fn recent_activity_limited_to_ten() {
        let mut log = ActivityLog::new();
        for i in 0..25 {
            log.push(ActivityKind::TrendDetected, format!("{i}"));
        }
        let a = analytics(&[], &log, vec![], 3.0);
        assert_eq!(a.recent_activity.len(), RECENT_ACTIVITY);
        assert_eq!(a.recent_activity[9].message, "24");
    }

    #[test]
    fn projection_scales_daily_profit() {
        let p = earnings_projection(&[campaign(1_100, 100)]);
        assert_eq!(p.daily, Decimal::from(150));
        assert_eq!(p.weekly, Decimal::from(1_050));
        assert_eq!(p.monthly, Decimal::from(4_500));
        assert_eq!(p.yearly, Decimal::from(54_750));
        assert_eq!(p.projected_monthly_revenue, Decimal::from(13_500));
    }

    #[test]
    fn projected_revenue_is_capped() {
        let p = earnings_projection(&[campaign(1_000_000, 0)]);
        assert_eq!(p.projected_monthly_revenue, Decimal::from(100_000));
    }
}
