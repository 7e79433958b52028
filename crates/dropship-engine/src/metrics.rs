//! Pluggable source for every randomized number in the simulation.
//!
//! Production code uses [`RandomMetrics`]; tests and reproducible CLI runs
//! inject [`ScriptedMetrics`] or a seeded [`RandomMetrics`].

use std::collections::VecDeque;
use std::sync::Arc;

use dropship_core::Engagement;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::affiliates::AffiliateStats;

/// One metrics source shared by the engine and the posting scheduler.
pub type SharedMetrics = Arc<Mutex<Box<dyn MetricsSource>>>;

#[must_use]
pub fn shared_metrics(metrics: impl MetricsSource + 'static) -> SharedMetrics {
    Arc::new(Mutex::new(Box::new(metrics)))
}

/// Supplier of the simulated numbers the engine would otherwise roll itself.
pub trait MetricsSource: Send {
    /// Revenue earned by one active campaign in one monitor tick.
    fn revenue_increment(&mut self) -> Decimal;
    /// Ad spend of one active campaign in one monitor tick.
    fn spend_increment(&mut self) -> Decimal;
    /// Hours from now until a freshly generated content piece is due.
    fn schedule_offset_hours(&mut self) -> u32;
    /// Index into a list of `len` alternatives. Must be `< len` when `len > 0`.
    fn choose(&mut self, len: usize) -> usize;
    /// Starting inventory of a product variant.
    fn inventory(&mut self) -> u32;
    /// Discount percentage advertised in affiliate copy.
    fn discount_percent(&mut self) -> u32;
    /// Storefront conversion rate, in percent.
    fn conversion_rate(&mut self) -> f64;
    /// Engagement a piece has collected once it is published.
    fn engagement(&mut self) -> Engagement;
    /// Stock photo id used to build a product's image URLs.
    fn image_id(&mut self) -> u32;
    /// Click and conversion figures for one affiliate program.
    fn affiliate_stats(&mut self) -> AffiliateStats;
}

/// Uniformly random metrics in the ranges the dashboard has always shown.
pub struct RandomMetrics {
    rng: StdRng,
}

impl RandomMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible generator; the same seed yields the same simulation.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for RandomMetrics {
    fn revenue_increment(&mut self) -> Decimal {
        Decimal::from(self.rng.random_range(100_i64..600))
    }

    fn spend_increment(&mut self) -> Decimal {
        Decimal::from(self.rng.random_range(20_i64..120))
    }

    fn schedule_offset_hours(&mut self) -> u32 {
        self.rng.random_range(1..=8)
    }

    fn choose(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn inventory(&mut self) -> u32 {
        self.rng.random_range(100..600)
    }

    fn discount_percent(&mut self) -> u32 {
        self.rng.random_range(10..40)
    }

    fn conversion_rate(&mut self) -> f64 {
        self.rng.random_range(2.0..5.0)
    }

    fn engagement(&mut self) -> Engagement {
        Engagement {
            views: self.rng.random_range(10_000..110_000),
            likes: self.rng.random_range(1_000..11_000),
            shares: self.rng.random_range(100..1_100),
            comments: self.rng.random_range(50..550),
        }
    }

    fn image_id(&mut self) -> u32 {
        self.rng.random_range(0..1_000_000)
    }

    fn affiliate_stats(&mut self) -> AffiliateStats {
        AffiliateStats {
            clicks: self.rng.random_range(500..1_500),
            conversions: self.rng.random_range(25..75),
            revenue: Decimal::from(self.rng.random_range(1_000_i64..3_000)),
            commission: Decimal::from(self.rng.random_range(200_i64..600)),
            conversion_rate: self.rng.random_range(2.0..7.0),
            average_order_value: Decimal::from(self.rng.random_range(50_i64..150)),
        }
    }
}

/// Deterministic metrics fed from queues.
///
/// Each queue is consumed front to back; once empty, the fixed fallback value
/// for that metric is returned.
#[derive(Debug, Clone)]
pub struct ScriptedMetrics {
    revenue: VecDeque<Decimal>,
    spend: VecDeque<Decimal>,
    schedule_offsets: VecDeque<u32>,
    choices: VecDeque<usize>,
    fallback_revenue: Decimal,
    fallback_spend: Decimal,
    conversion_rate: f64,
    engagement: Engagement,
    affiliate_rates: VecDeque<f64>,
    next_image_id: u32,
}

impl Default for ScriptedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            revenue: VecDeque::new(),
            spend: VecDeque::new(),
            schedule_offsets: VecDeque::new(),
            choices: VecDeque::new(),
            fallback_revenue: Decimal::from(100),
            fallback_spend: Decimal::from(20),
            conversion_rate: 2.0,
            engagement: Engagement {
                views: 10_000,
                likes: 1_000,
                shares: 100,
                comments: 50,
            },
            affiliate_rates: VecDeque::new(),
            next_image_id: 1,
        }
    }

    #[must_use]
    pub fn with_revenue(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.revenue.extend(values.into_iter().map(Decimal::from));
        self
    }

    #[must_use]
    pub fn with_spend(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        self.spend.extend(values.into_iter().map(Decimal::from));
        self
    }

    #[must_use]
    pub fn with_schedule_offsets(mut self, values: impl IntoIterator<Item = u32>) -> Self {
        self.schedule_offsets.extend(values);
        self
    }

    #[must_use]
    pub fn with_choices(mut self, values: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(values);
        self
    }

    /// Revenue and spend returned once the queues run dry.
    #[must_use]
    pub fn with_steady_state(mut self, revenue: i64, spend: i64) -> Self {
        self.fallback_revenue = Decimal::from(revenue);
        self.fallback_spend = Decimal::from(spend);
        self
    }

    #[must_use]
    pub fn with_conversion_rate(mut self, rate: f64) -> Self {
        self.conversion_rate = rate;
        self
    }

    /// Engagement given to every published piece.
    #[must_use]
    pub fn with_engagement(mut self, engagement: Engagement) -> Self {
        self.engagement = engagement;
        self
    }

    /// Conversion rates for successive affiliate programs; 3.0 once drained.
    #[must_use]
    pub fn with_affiliate_rates(mut self, rates: impl IntoIterator<Item = f64>) -> Self {
        self.affiliate_rates.extend(rates);
        self
    }
}

impl MetricsSource for ScriptedMetrics {
    fn revenue_increment(&mut self) -> Decimal {
        self.revenue.pop_front().unwrap_or(self.fallback_revenue)
    }

    fn spend_increment(&mut self) -> Decimal {
        self.spend.pop_front().unwrap_or(self.fallback_spend)
    }

    fn schedule_offset_hours(&mut self) -> u32 {
        self.schedule_offsets.pop_front().unwrap_or(1)
    }

    fn choose(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.choices.pop_front().unwrap_or(0) % len
    }

    fn inventory(&mut self) -> u32 {
        100
    }

    fn discount_percent(&mut self) -> u32 {
        10
    }

    fn conversion_rate(&mut self) -> f64 {
        self.conversion_rate
    }

    fn engagement(&mut self) -> Engagement {
        self.engagement
    }

    fn image_id(&mut self) -> u32 {
        let id = self.next_image_id;
        self.next_image_id = self.next_image_id.wrapping_add(1);
        id
    }

    fn affiliate_stats(&mut self) -> AffiliateStats {
        AffiliateStats {
            clicks: 500,
            conversions: 25,
            revenue: Decimal::from(1_000),
            commission: Decimal::from(200),
            conversion_rate: self.affiliate_rates.pop_front().unwrap_or(3.0),
            average_order_value: Decimal::from(50),
        }
    }
}
