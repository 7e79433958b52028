//! Trend and niche discovery.
//!
//! [`TrendSource`] is the seam a real scraper would plug into; the engine
//! ships with [`StaticCatalog`], a fixed sample of viral videos and niches.

use dropship_core::{profit_potential, Competition, Competitor, Niche, TrendSignal};
use rust_decimal::Decimal;

use crate::error::EngineError;

/// Signals below this view count are not worth building a campaign around.
pub const MIN_VIEWS: u64 = 500_000;

/// Where the engine gets its trending signals and niche rankings.
pub trait TrendSource: Send + Sync {
    /// Currently trending videos at or above [`MIN_VIEWS`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrendSource`] when the source is unavailable.
    fn trending(&self) -> Result<Vec<TrendSignal>, EngineError>;

    /// Niches ordered by profitability, best first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrendSource`] when the source is unavailable.
    fn niches(&self) -> Result<Vec<Niche>, EngineError>;

    /// Storefronts competing in `niche`. Sources without competitor data
    /// return nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrendSource`] when the source is unavailable.
    fn competitors(&self, _niche: &str) -> Result<Vec<Competitor>, EngineError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCatalog;

impl TrendSource for StaticCatalog {
    fn trending(&self) -> Result<Vec<TrendSignal>, EngineError> {
        Ok(sample_signals()
            .into_iter()
            .filter(|s| s.views >= MIN_VIEWS)
            .collect())
    }

    fn niches(&self) -> Result<Vec<Niche>, EngineError> {
        let mut niches = sample_niches();
        niches.sort_by(|a, b| b.profitability.cmp(&a.profitability));
        Ok(niches)
    }

    // The sample shops are the same for every niche.
    fn competitors(&self, _niche: &str) -> Result<Vec<Competitor>, EngineError> {
        Ok(vec![
            competitor("BeautyBrand123", 45, 35, 4.2, 250_000),
            competitor("KitchenHacks", 32, 28, 3.8, 180_000),
        ])
    }
}

fn competitor(
    name: &str,
    products: u32,
    average_price: i64,
    engagement: f64,
    followers: u64,
) -> Competitor {
    Competitor {
        name: name.to_string(),
        products,
        average_price: Decimal::from(average_price),
        engagement,
        followers,
    }
}

fn signal(
    id: &str,
    title: &str,
    (views, likes, shares): (u64, u64, u64),
    description: &str,
    hashtags: &[&str],
    niche: &str,
) -> TrendSignal {
    TrendSignal {
        id: id.to_string(),
        title: title.to_string(),
        views,
        likes,
        shares,
        url: format!("https://tiktok.com/@user/video/{id}"),
        description: description.to_string(),
        hashtags: hashtags.iter().map(|h| (*h).to_string()).collect(),
        niche: niche.to_string(),
        profit_potential: profit_potential(views, likes),
    }
}

fn sample_signals() -> Vec<TrendSignal> {
    vec![
        signal(
            "1",
            "Korean Skincare Routine That Changed My Life",
            (2_500_000, 450_000, 89_000),
            "Amazing Korean skincare products that transformed my skin",
            &["#koreanskincare", "#skincare", "#beauty", "#glowup"],
            "Beauty & Skincare",
        ),
        signal(
            "2",
            "Kitchen Gadget That Saves 30 Minutes Daily",
            (1_800_000, 320_000, 65_000),
            "This kitchen tool is a game changer for meal prep",
            &["#kitchen", "#cooking", "#mealprep", "#gadgets"],
            "Kitchen & Home",
        ),
        signal(
            "3",
            "Phone Accessory Everyone Needs in 2025",
            (3_200_000, 580_000, 125_000),
            "Revolutionary phone accessory that went viral",
            &["#phone", "#tech", "#accessories", "#viral"],
            "Tech & Electronics",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn niche(
    id: &str,
    name: &str,
    category: &str,
    competition: Competition,
    (profitability, trend_score, demand_level): (u8, u8, u8),
    sub_niches: &[&str],
    keywords: &[&str],
    average_price: u32,
) -> Niche {
    Niche {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        competition,
        profitability,
        trend_score,
        sub_niches: sub_niches.iter().map(|s| (*s).to_string()).collect(),
        keywords: keywords.iter().map(|s| (*s).to_string()).collect(),
        average_price,
        demand_level,
    }
}

fn sample_niches() -> Vec<Niche> {
    vec![
        niche(
            "1",
            "Korean Beauty & Skincare",
            "Beauty",
            Competition::Medium,
            (85, 92, 88),
            &["Face Masks", "Serums", "Jade Rollers", "Sheet Masks"],
            &["korean skincare", "k-beauty", "glass skin", "skincare routine"],
            35,
        ),
        niche(
            "2",
            "Kitchen Problem Solvers",
            "Home & Kitchen",
            Competition::Low,
            (78, 85, 82),
            &["Garlic Peelers", "Vegetable Choppers", "Storage Solutions"],
            &["kitchen gadgets", "cooking tools", "meal prep", "kitchen hacks"],
            25,
        ),
        niche(
            "3",
            "Phone & Tech Accessories",
            "Electronics",
            Competition::High,
            (72, 89, 90),
            &["Wireless Chargers", "Phone Cases", "Camera Attachments"],
            &["phone accessories", "tech gadgets", "wireless charging"],
            28,
        ),
        niche(
            "4",
            "Home Organization",
            "Home & Garden",
            Competition::Medium,
            (80, 87, 85),
            &["Storage Cubes", "Drawer Dividers", "Closet Systems"],
            &["home organization", "storage solutions", "declutter"],
            32,
        ),
    ]
}

/// Order signals by profit potential, best first. Equal scores keep their
/// input order.
pub fn rank_signals(signals: &mut [TrendSignal]) {
    signals.sort_by(|a, b| b.profit_potential.total_cmp(&a.profit_potential));
}
