//! Affiliate program ranking and promotional copy.

use dropship_core::AffiliateProgram;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::metrics::MetricsSource;

/// Minimum commission, in percent, for a program to be worth promoting.
pub const MIN_COMMISSION: f64 = 15.0;
pub const MIN_RATING: f64 = 4.0;
/// Programs converting below this rate, in percent, are flagged for pausing.
pub const LOW_CONVERSION_RATE: f64 = 2.0;

const GENERAL_ADVICE: [&str; 3] = [
    "Increase content frequency for high-converting niches",
    "Test different call-to-action strategies",
    "Optimize posting times based on audience analytics",
];

const COMMISSION_CEILING: f64 = 30.0;
const EARNINGS_CEILING: f64 = 5_000.0;
const RATING_CEILING: f64 = 5.0;
const COOKIE_CEILING_DAYS: f64 = 90.0;

const COPY_TEMPLATES: [&str; 5] = [
    "EXCLUSIVE: Get {discount}% OFF {product} through my link!",
    "I've been using {product} for 30 days - here's my honest review",
    "Why {product} is trending on TikTok (and why you need it)",
    "{product} vs competitors - which one actually works?",
    "This {product} changed my {category} routine forever",
];

/// A program together with its profitability score (0-100).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProgram {
    #[serde(flatten)]
    pub program: AffiliateProgram,
    pub score: f64,
}

/// Click-through and sales figures for one program over the tracking window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliateStats {
    pub clicks: u32,
    pub conversions: u32,
    pub revenue: Decimal,
    pub commission: Decimal,
    /// Percent of clicks that converted.
    pub conversion_rate: f64,
    pub average_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliatePerformance {
    pub program_id: String,
    #[serde(flatten)]
    pub stats: AffiliateStats,
}

/// Performance of every program plus what to do about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliateReport {
    pub performance: Vec<AffiliatePerformance>,
    pub recommendations: Vec<String>,
}

/// Weighted score: 40% commission, 30% estimated earnings, 20% rating and
/// 10% cookie duration, each normalized against its ceiling.
#[must_use]
pub fn profitability_score(program: &AffiliateProgram) -> f64 {
    let commission = program.commission / COMMISSION_CEILING * 100.0;
    let earnings = f64::from(program.estimated_earnings) / EARNINGS_CEILING * 100.0;
    let rating = program.rating / RATING_CEILING * 100.0;
    let cookie = f64::from(program.cookie_duration_days) / COOKIE_CEILING_DAYS * 100.0;

    commission * 0.4 + earnings * 0.3 + rating * 0.2 + cookie * 0.1
}

#[must_use]
pub fn is_profitable(program: &AffiliateProgram) -> bool {
    program.commission >= MIN_COMMISSION && program.rating >= MIN_RATING
}

/// Drop unprofitable programs and sort the rest by score, best first.
/// Equal scores keep their input order.
#[must_use]
pub fn rank_programs(programs: Vec<AffiliateProgram>) -> Vec<RankedProgram> {
    let mut ranked: Vec<RankedProgram> = programs
        .into_iter()
        .filter(is_profitable)
        .map(|program| RankedProgram {
            score: profitability_score(&program),
            program,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// The sample programs, ranked.
#[must_use]
pub fn find_profitable_programs() -> Vec<RankedProgram> {
    rank_programs(sample_programs())
}

fn niche_keywords(niche: &str) -> Vec<String> {
    let niche = niche.trim().to_lowercase();
    let known: &[&str] = match niche.as_str() {
        "beauty" => &["beauty", "skincare", "cosmetics", "fashion"],
        "tech" => &["technology", "software", "gadgets", "electronics"],
        "health" => &["health", "wellness", "fitness", "nutrition"],
        "home" => &["home", "kitchen", "garden", "lifestyle"],
        "travel" => &["travel", "hotels", "booking", "lifestyle"],
        _ => return vec![niche],
    };
    known.iter().map(|k| (*k).to_string()).collect()
}

/// Ranked programs whose category or description mentions the niche.
#[must_use]
pub fn programs_for_niche(niche: &str) -> Vec<RankedProgram> {
    let keywords = niche_keywords(niche);
    find_profitable_programs()
        .into_iter()
        .filter(|ranked| {
            let category = ranked.program.category.to_lowercase();
            let description = ranked.program.description.to_lowercase();
            keywords
                .iter()
                .any(|k| category.contains(k.as_str()) || description.contains(k.as_str()))
        })
        .collect()
}

/// Five promotional lines per product for `program`.
pub fn affiliate_copy(
    program: &AffiliateProgram,
    products: &[String],
    metrics: &mut dyn MetricsSource,
) -> Vec<String> {
    let category = program.category.to_lowercase();
    let mut lines = Vec::with_capacity(products.len() * COPY_TEMPLATES.len());

    for product in products {
        for template in COPY_TEMPLATES {
            let line = template
                .replace("{product}", product)
                .replace("{category}", &category)
                .replace("{discount}", &metrics.discount_percent().to_string());
            lines.push(line);
        }
    }

    lines
}

pub fn track_performance(
    programs: &[RankedProgram],
    metrics: &mut dyn MetricsSource,
) -> Vec<AffiliatePerformance> {
    programs
        .iter()
        .map(|ranked| AffiliatePerformance {
            program_id: ranked.program.id.clone(),
            stats: metrics.affiliate_stats(),
        })
        .collect()
}

/// Advice for the tracked programs.
///
/// Programs converting above the average are named as focus candidates,
/// those under [`LOW_CONVERSION_RATE`] as pause candidates. The general
/// advice lines always follow.
#[must_use]
pub fn recommend_strategy(performance: &[AffiliatePerformance]) -> Vec<String> {
    let mut lines = Vec::new();

    if !performance.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let average = performance
            .iter()
            .map(|p| p.stats.conversion_rate)
            .sum::<f64>()
            / performance.len() as f64;

        let top = program_ids(performance, |rate| rate > average);
        if !top.is_empty() {
            lines.push(format!("Focus on top-performing programs: {}", top.join(", ")));
        }
        let low = program_ids(performance, |rate| rate < LOW_CONVERSION_RATE);
        if !low.is_empty() {
            lines.push(format!(
                "Consider pausing low-performing programs: {}",
                low.join(", ")
            ));
        }
    }

    lines.extend(GENERAL_ADVICE.iter().map(|line| (*line).to_string()));
    lines
}

fn program_ids(performance: &[AffiliatePerformance], keep: impl Fn(f64) -> bool) -> Vec<&str> {
    performance
        .iter()
        .filter(|p| keep(p.stats.conversion_rate))
        .map(|p| p.program_id.as_str())
        .collect()
}

/// Track every profitable program and derive the advice.
pub fn affiliate_report(metrics: &mut dyn MetricsSource) -> AffiliateReport {
    let performance = track_performance(&find_profitable_programs(), metrics);
    let recommendations = recommend_strategy(&performance);
    AffiliateReport {
        performance,
        recommendations,
    }
}

#[allow(clippy::too_many_arguments)]
fn program(
    id: &str,
    name: &str,
    commission: f64,
    category: &str,
    description: &str,
    requirements: &[&str],
    (payout_threshold, cookie_duration_days): (u32, u32),
    (rating, estimated_earnings): (f64, u32),
) -> AffiliateProgram {
    AffiliateProgram {
        id: id.to_string(),
        name: name.to_string(),
        commission,
        category: category.to_string(),
        description: description.to_string(),
        requirements: requirements.iter().map(|r| (*r).to_string()).collect(),
        payout_threshold,
        cookie_duration_days,
        rating,
        estimated_earnings,
    }
}

#[must_use]
pub fn sample_programs() -> Vec<AffiliateProgram> {
    vec![
        program(
            "1",
            "Amazon Associates",
            8.0,
            "General Retail",
            "World's largest affiliate program with millions of products",
            &["Website/Blog", "Quality Content", "Compliance with Terms"],
            (10, 24),
            (4.5, 2_500),
        ),
        program(
            "2",
            "ClickBank",
            25.0,
            "Digital Products",
            "High-commission digital products and courses",
            &["Active Promotion", "Quality Traffic"],
            (10, 60),
            (4.2, 4_200),
        ),
        program(
            "3",
            "ShareASale",
            12.0,
            "Fashion & Beauty",
            "Premium fashion and beauty brands",
            &["Website", "Social Media Presence"],
            (50, 30),
            (4.3, 1_800),
        ),
        program(
            "4",
            "CJ Affiliate",
            18.0,
            "Technology",
            "Leading tech brands and software companies",
            &["Established Audience", "Tech Content"],
            (50, 45),
            (4.4, 3_200),
        ),
        program(
            "5",
            "Impact Radius",
            22.0,
            "Health & Wellness",
            "Premium health and wellness products",
            &["Health Content", "Compliance"],
            (25, 30),
            (4.6, 3_800),
        ),
        program(
            "6",
            "Rakuten Advertising",
            15.0,
            "Travel & Lifestyle",
            "Travel, hotels, and lifestyle brands",
            &["Travel Content", "Active Promotion"],
            (50, 30),
            (4.1, 2_200),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ScriptedMetrics;

    fn names(ranked: &[RankedProgram]) -> Vec<&str> {
        ranked.iter().map(|r| r.program.name.as_str()).collect()
    }

    #[test]
    fn ranking_puts_clickbank_first_and_drops_low_commission() {
        let ranked = find_profitable_programs();
        assert_eq!(
            names(&ranked),
            vec!["ClickBank", "Impact Radius", "CJ Affiliate", "Rakuten Advertising"]
        );
        assert!((ranked[0].score - 82.0).abs() < 1e-9);
    }

    #[test]
    fn commission_below_threshold_is_excluded_even_with_top_rating() {
        let mut programs = sample_programs();
        programs[0].rating = 5.0;
        let ranked = rank_programs(programs);
        assert!(!names(&ranked).contains(&"Amazon Associates"));
        assert!(!names(&ranked).contains(&"ShareASale"));
    }

    #[test]
    fn rating_below_threshold_is_excluded() {
        let mut programs = sample_programs();
        programs[1].rating = 3.9;
        let ranked = rank_programs(programs);
        assert!(!names(&ranked).contains(&"ClickBank"));
    }

    #[test]
    fn boundary_values_are_kept() {
        let mut programs = sample_programs();
        programs[5].rating = 4.0;
        let ranked = rank_programs(programs);
        assert!(names(&ranked).contains(&"Rakuten Advertising"));
    }

    #[test]
    fn ties_keep_input_order() {
        let base = sample_programs().remove(3);
        let mut twin = base.clone();
        twin.id = "twin".to_string();
        let ranked = rank_programs(vec![base, twin]);
        assert_eq!(ranked[0].program.id, "4");
        assert_eq!(ranked[1].program.id, "twin");
    }

    #[test]
    fn niche_filter_uses_keyword_sets() {
        assert_eq!(names(&programs_for_niche("health")), vec!["Impact Radius"]);
        assert_eq!(names(&programs_for_niche("Tech")), vec!["CJ Affiliate"]);
        assert_eq!(names(&programs_for_niche("travel")), vec!["Rakuten Advertising"]);
    }

    #[test]
    fn unknown_niche_matches_itself() {
        assert_eq!(names(&programs_for_niche("courses")), vec!["ClickBank"]);
        assert!(programs_for_niche("gardening gnomes").is_empty());
    }

    #[test]
    fn copy_is_five_lines_per_product() {
        let ranked = find_profitable_programs();
        let products = vec!["Glow Serum".to_string(), "Jade Roller".to_string()];
        let lines = affiliate_copy(&ranked[0].program, &products, &mut ScriptedMetrics::new());
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "EXCLUSIVE: Get 10% OFF Glow Serum through my link!");
        assert_eq!(
            lines[4],
            "This Glow Serum changed my digital products routine forever"
        );
        assert!(lines[5].contains("Jade Roller"));
    }

    #[test]
    fn report_tracks_each_profitable_program() {
        let report = affiliate_report(&mut ScriptedMetrics::new());
        let ids: Vec<&str> = report
            .performance
            .iter()
            .map(|p| p.program_id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "5", "4", "6"]);
        assert_eq!(report.performance[0].stats.clicks, 500);
        // Equal rates: nobody beats the average and nobody is low.
        assert_eq!(report.recommendations, GENERAL_ADVICE.map(String::from).to_vec());
    }

    #[test]
    fn strategy_names_top_and_low_performers() {
        let mut metrics = ScriptedMetrics::new().with_affiliate_rates([6.0, 1.5, 3.0, 1.0]);
        let performance = track_performance(&find_profitable_programs(), &mut metrics);
        let lines = recommend_strategy(&performance);

        assert_eq!(lines[0], "Focus on top-performing programs: 2, 4");
        assert_eq!(lines[1], "Consider pausing low-performing programs: 5, 6");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn strategy_without_data_is_general_advice() {
        assert_eq!(recommend_strategy(&[]).len(), GENERAL_ADVICE.len());
    }

    #[test]
    fn ranked_program_serializes_flat() {
        let ranked = find_profitable_programs();
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["name"], "ClickBank");
        assert!(json["score"].as_f64().is_some());
    }
}
