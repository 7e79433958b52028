use serde::{Deserialize, Serialize};

/// A candidate affiliate program. Scores are always derived on demand; the
/// record itself has no lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateProgram {
    pub id: String,
    pub name: String,
    /// Commission as a percentage, e.g. `25.0` for 25%.
    pub commission: f64,
    pub category: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub payout_threshold: u32,
    pub cookie_duration_days: u32,
    /// Marketplace rating on a 0–5 scale.
    pub rating: f64,
    /// Estimated monthly earnings in dollars.
    pub estimated_earnings: u32,
}
