use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A trending short-form video, scored for how promising it is as a product
/// source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub id: String,
    pub title: String,
    pub views: u64,
    pub likes: u64,
    pub shares: u64,
    pub url: String,
    pub description: String,
    /// Hashtags as posted, including the leading `#`.
    pub hashtags: Vec<String>,
    pub niche: String,
    /// Derived score in `[0, 100]`; see [`profit_potential`].
    pub profit_potential: f64,
}

/// Score a video's profit potential from its reach and engagement.
///
/// Reach contributes up to 50 points (50 per million views, capped); each
/// percentage point of likes-per-view adds 30. The total is capped at 100.
#[must_use]
pub fn profit_potential(views: u64, likes: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (views, likes) = (views as f64, likes as f64);
    let reach = (views / 1_000_000.0 * 50.0).min(50.0);
    let engagement_bonus = likes / views * 100.0 * 30.0;
    (reach + engagement_bonus).min(100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    Low,
    Medium,
    High,
}

/// A product niche with its market indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Niche {
    pub id: String,
    pub name: String,
    pub category: String,
    pub competition: Competition,
    pub profitability: u8,
    pub trend_score: u8,
    pub sub_niches: Vec<String>,
    pub keywords: Vec<String>,
    pub average_price: u32,
    pub demand_level: u8,
}

/// A storefront already selling into a niche.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub products: u32,
    pub average_price: Decimal,
    /// Engagement rate in percent.
    pub engagement: f64,
    pub followers: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profit_potential_caps_at_one_hundred() {
        // 2.5M views and 18% engagement blow well past the cap.
        assert!((profit_potential(2_500_000, 450_000) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profit_potential_reach_component_caps_at_fifty() {
        // No likes: only reach counts, capped at 50 regardless of views.
        assert!((profit_potential(10_000_000, 0) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn profit_potential_combines_reach_and_engagement() {
        // 500k views -> 25 reach; 0.1% engagement -> 3 points.
        let score = profit_potential(500_000, 500);
        assert!((score - 28.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn profit_potential_zero_views_is_zero() {
        assert!(profit_potential(0, 10).abs() < f64::EPSILON);
    }

    #[test]
    fn competition_serializes_lowercase() {
        let json = serde_json::to_string(&Competition::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
