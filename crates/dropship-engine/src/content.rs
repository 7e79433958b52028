//! Promotional content synthesis.

use chrono::{DateTime, Duration, Utc};
use dropship_core::{
    ContentKind, ContentPiece, ContentStatus, Engagement, Platform, Product, TrendSignal,
};
use uuid::Uuid;

use crate::metrics::MetricsSource;
use crate::products::category_hashtag;

const MAX_HASHTAGS: usize = 10;
const TREND_HASHTAGS: usize = 3;
const BASE_HASHTAGS: [&str; 4] = ["#viral", "#trending", "#fyp", "#foryou"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    ProductDemo,
    Unboxing,
    Transformation,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::ProductDemo,
        TemplateKind::Unboxing,
        TemplateKind::Transformation,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::ProductDemo => "product_demo",
            TemplateKind::Unboxing => "unboxing",
            TemplateKind::Transformation => "transformation",
        }
    }

    #[must_use]
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            TemplateKind::ProductDemo => &[
                "This {product} will change your {category} game forever!",
                "POV: You discover the {product} that everyone's talking about",
                "I wasn't expecting this {product} to be THIS good...",
                "Why didn't anyone tell me about this {product} sooner?",
                "This {product} just solved my biggest {category} problem",
            ],
            TemplateKind::Unboxing => &[
                "Unboxing the viral {product} everyone's obsessed with",
                "First impressions of this trending {product}",
                "Is this {product} worth the hype? Let's find out...",
                "Unboxing haul: {product} edition",
                "Testing viral {product} so you don't have to",
            ],
            TemplateKind::Transformation => &[
                "Before vs After using this {product}",
                "30 days of using this {product} - results shocked me",
                "This {product} transformation is insane",
                "Watch this {product} work its magic",
                "The {product} glow up is real",
            ],
        }
    }
}

fn fill(template: &str, product: &Product) -> String {
    template
        .replace("{product}", &product.name)
        .replace("{category}", &product.category)
}

/// `#viral #trending #fyp #foryou`, the category tag, product tags and the
/// first three trend hashtags, deduplicated and capped at ten.
#[must_use]
pub fn content_hashtags(product: &Product, signal: &TrendSignal) -> Vec<String> {
    let candidates = BASE_HASHTAGS
        .iter()
        .map(|h| (*h).to_string())
        .chain(std::iter::once(format!(
            "#{}",
            category_hashtag(&product.category)
        )))
        .chain(product.tags.iter().map(|t| format!("#{t}")))
        .chain(signal.hashtags.iter().take(TREND_HASHTAGS).cloned());

    let mut hashtags: Vec<String> = Vec::with_capacity(MAX_HASHTAGS);
    for tag in candidates {
        if hashtags.len() == MAX_HASHTAGS {
            break;
        }
        if !hashtags.contains(&tag) {
            hashtags.push(tag);
        }
    }
    hashtags
}

/// Platform for the `index`-th generated piece: round-robin over the allowed
/// platforms, TikTok when none are configured.
#[must_use]
pub fn platform_for(index: usize, platforms: &[Platform]) -> Platform {
    if platforms.is_empty() {
        return Platform::TikTok;
    }
    platforms[index % platforms.len()]
}

/// One video per template kind per product, each due 1 to 8 hours after `now`.
pub fn synthesize_content(
    signal: &TrendSignal,
    products: &[Product],
    platforms: &[Platform],
    metrics: &mut dyn MetricsSource,
    now: DateTime<Utc>,
) -> Vec<ContentPiece> {
    let mut pieces = Vec::with_capacity(products.len() * TemplateKind::ALL.len());

    for product in products {
        for kind in TemplateKind::ALL {
            let templates = kind.templates();
            let title = fill(templates[metrics.choose(templates.len())], product);
            let description = format!(
                "{title}\n\nGet yours now! Link in bio\n\n#{} #viral #trending",
                category_hashtag(&product.category)
            );
            let offset = Duration::hours(i64::from(metrics.schedule_offset_hours()));

            pieces.push(ContentPiece {
                id: Uuid::new_v4(),
                kind: ContentKind::Video,
                title,
                description,
                media_url: format!(
                    "https://example.com/generated-video/{}_{}.mp4",
                    product.id,
                    kind.as_str()
                ),
                hashtags: content_hashtags(product, signal),
                platform: platform_for(pieces.len(), platforms),
                scheduled_for: now + offset,
                status: ContentStatus::Scheduled,
                engagement: Engagement::default(),
            });
        }
    }

    pieces
}

/// Characters of the trend description quoted on a print-on-demand design.
const DESIGN_QUOTE_CHARS: usize = 50;

/// Print-on-demand design concepts riffing on a trend.
#[must_use]
pub fn print_on_demand_designs(signal: &TrendSignal) -> Vec<String> {
    let quote: String = signal.description.chars().take(DESIGN_QUOTE_CHARS).collect();
    let hashtag = signal.hashtags.first().map_or("", String::as_str);
    vec![
        format!("Design inspired by: {}", signal.title),
        format!("Trending quote: \"{quote}...\""),
        format!("Hashtag design: {hashtag}"),
        "Minimalist version of trending concept".to_string(),
        "Vintage style interpretation".to_string(),
    ]
}
