//! Product synthesis from a trending signal.
//!
//! A signal is mapped to a category by keyword, the category's fixed idea
//! table yields the products, and every product gets the same three variants.

use chrono::{DateTime, Utc};
use dropship_core::{
    compute_margin, Competitor, Product, ProductStatus, ProductVariant, TrendSignal,
};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::metrics::MetricsSource;

pub const TRENDING_CATEGORIES: [&str; 8] = [
    "Korean Beauty & Skincare",
    "Kitchen Problem Solvers",
    "Phone & Tech Accessories",
    "Home Organization",
    "Wellness Tools",
    "Pet Accessories",
    "Fitness Equipment",
    "Travel Accessories",
];

const BASE_TAGS: [&str; 4] = ["viral", "trending", "tiktok", "popular"];

/// Variant name and its markup over the base price.
const VARIANTS: [(&str, i64); 3] = [("Standard", 0), ("Premium", 10), ("Bundle Pack", 25)];

/// Images generated per product.
pub const IMAGES_PER_PRODUCT: usize = 5;

/// Lowest price accepted, as a multiple of unit cost.
pub const MIN_COST_MULTIPLE: Decimal = Decimal::from_parts(35, 0, 0, false, 1);
/// Premium charged over the competitors' average price.
pub const COMPETITOR_PREMIUM: Decimal = Decimal::from_parts(115, 0, 0, false, 2);

/// Keyword groups checked in order; the first group with a hit wins.
const CATEGORY_KEYWORDS: [(&[&str], &str); 4] = [
    (&["skin", "beauty", "korean"], "Korean Beauty & Skincare"),
    (&["kitchen", "cooking", "food"], "Kitchen Problem Solvers"),
    (&["phone", "tech", "gadget"], "Phone & Tech Accessories"),
    (&["home", "organization", "storage"], "Home Organization"),
];

/// A product idea: name, unit cost, suggested retail price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductIdea {
    pub name: &'static str,
    pub cost: u32,
    pub price: u32,
}

const fn idea(name: &'static str, cost: u32, price: u32) -> ProductIdea {
    ProductIdea { name, cost, price }
}

#[must_use]
pub fn ideas_for(category: &str) -> Vec<ProductIdea> {
    match category {
        "Korean Beauty & Skincare" => vec![
            idea("K-Beauty Glow Serum", 8, 35),
            idea("Jade Facial Roller Set", 5, 25),
            idea("Korean Sheet Mask Bundle", 12, 45),
            idea("Glass Skin Essence", 10, 40),
        ],
        "Kitchen Problem Solvers" => vec![
            idea("Multi-Function Garlic Press", 6, 28),
            idea("Vegetable Chopper Pro", 8, 35),
            idea("Smart Storage Container Set", 10, 42),
            idea("Kitchen Organizer Rack", 7, 30),
        ],
        "Phone & Tech Accessories" => vec![
            idea("Wireless Charging Stand", 9, 38),
            idea("Phone Camera Lens Kit", 12, 48),
            idea("Magnetic Car Mount", 6, 25),
            idea("Portable Phone Tripod", 8, 32),
        ],
        _ => vec![idea("Trending Product", 8, 35)],
    }
}

/// Pick a product category for `signal` by keyword, falling back to a
/// random entry of [`TRENDING_CATEGORIES`].
pub fn categorize(signal: &TrendSignal, metrics: &mut dyn MetricsSource) -> &'static str {
    let haystack = format!(
        "{} {} {}",
        signal.title,
        signal.description,
        signal.hashtags.join(" ")
    )
    .to_lowercase();

    for (keywords, category) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| haystack.contains(k)) {
            return category;
        }
    }

    TRENDING_CATEGORIES[metrics.choose(TRENDING_CATEGORIES.len())]
}

fn category_benefits(category: &str) -> [&'static str; 4] {
    match category {
        "Korean Beauty & Skincare" => [
            "Achieve glass skin in just 7 days",
            "Korean beauty secrets revealed",
            "Dermatologist recommended formula",
            "Suitable for all skin types",
        ],
        "Kitchen Problem Solvers" => [
            "Save 30+ minutes on meal prep",
            "Professional chef quality",
            "Easy to clean and store",
            "Durable stainless steel construction",
        ],
        "Phone & Tech Accessories" => [
            "Universal compatibility",
            "Premium materials and build quality",
            "Enhance your mobile experience",
            "Sleek and modern design",
        ],
        _ => [
            "High quality materials",
            "Easy to use",
            "Great value for money",
            "Customer satisfaction guaranteed",
        ],
    }
}

#[allow(clippy::cast_precision_loss)]
fn describe(name: &str, category: &str, signal: &TrendSignal) -> String {
    let benefits: Vec<String> = category_benefits(category)
        .iter()
        .map(|b| format!("- {b}"))
        .collect();
    let millions = signal.views as f64 / 1_000_000.0;

    format!(
        "VIRAL {}\n\nAs seen in trending videos with {millions:.1}M+ views!\n\n{}\n\n\
         Limited time offer. Fast shipping worldwide. 30-day money-back guarantee.\n\n\
         #Trending #Viral #{}",
        name.to_uppercase(),
        benefits.join("\n"),
        category_hashtag(category),
    )
}

/// `category` lowercased with everything but letters and digits removed.
#[must_use]
pub fn category_hashtag(category: &str) -> String {
    category
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_lowercase()
}

/// Base tags, then category words, then product-name words longer than two
/// characters. Duplicates and punctuation-only tokens are dropped.
#[must_use]
pub fn product_tags(name: &str, category: &str) -> Vec<String> {
    let category_lower = category.to_lowercase();
    let name_lower = name.to_lowercase();

    let candidates = BASE_TAGS
        .iter()
        .copied()
        .chain(category_lower.split_whitespace())
        .chain(
            name_lower
                .split_whitespace()
                .filter(|w| w.chars().count() > 2),
        );

    let mut tags: Vec<String> = Vec::new();
    for tag in candidates {
        if !tag.chars().any(char::is_alphanumeric) {
            continue;
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

fn variants(product_id: Uuid, price: Decimal, metrics: &mut dyn MetricsSource) -> Vec<ProductVariant> {
    let short_id = product_id.simple().to_string();
    let short_id = &short_id[..8];

    VARIANTS
        .iter()
        .enumerate()
        .map(|(index, (name, markup))| ProductVariant {
            id: Uuid::new_v4(),
            name: (*name).to_string(),
            price: price + Decimal::from(*markup),
            sku: format!("SKU-{}-{index}", short_id.to_uppercase()),
            inventory: metrics.inventory(),
        })
        .collect()
}

fn image_urls(name: &str, metrics: &mut dyn MetricsSource) -> Vec<String> {
    let slug = name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    (0..IMAGES_PER_PRODUCT)
        .map(|slot| {
            format!(
                "https://images.pexels.com/photos/{}/product-{slug}-{slot}.jpg",
                metrics.image_id()
            )
        })
        .collect()
}

/// Suggested retail price for `product` given what competitors charge.
///
/// Aims 15% above the competitors' average, but never below 3.5x the unit
/// cost. Without competitor data the current price stands.
#[must_use]
pub fn optimize_price(product: &Product, competitors: &[Competitor]) -> Decimal {
    if competitors.is_empty() {
        return product.price;
    }
    let total: Decimal = competitors.iter().map(|c| c.average_price).sum();
    let average = total / Decimal::from(competitors.len());
    let target = average * COMPETITOR_PREMIUM;
    target
        .max(product.cost * MIN_COST_MULTIPLE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Build the product line for one trending signal.
pub fn synthesize_products(
    signal: &TrendSignal,
    metrics: &mut dyn MetricsSource,
    now: DateTime<Utc>,
) -> Vec<Product> {
    let category = categorize(signal, metrics);

    ideas_for(category)
        .into_iter()
        .map(|idea| {
            let id = Uuid::new_v4();
            let price = Decimal::from(idea.price);
            let cost = Decimal::from(idea.cost);
            Product {
                id,
                name: idea.name.to_string(),
                description: describe(idea.name, category, signal),
                price,
                cost,
                margin: compute_margin(price, cost),
                category: category.to_string(),
                tags: product_tags(idea.name, category),
                variants: variants(id, price, metrics),
                images: image_urls(idea.name, metrics),
                status: ProductStatus::Active,
                created_at: now,
            }
        })
        .collect()
}
