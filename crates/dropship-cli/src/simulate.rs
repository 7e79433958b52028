//! Offline simulation runs: drive the engine step by step without timers and
//! report where the money ended up.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Duration, Utc};
use dropship_core::{AutomationSettings, Platform};
use dropship_engine::{
    Analytics, AutomationEngine, CycleSummary, EarningsProjection, EngineConfig, PostingConfig,
    RandomMetrics,
};
use serde::Serialize;

/// How far past the last cycle the final flush looks, so every scheduled
/// piece is due.
const FLUSH_HORIZON_HOURS: i64 = 8;

#[derive(Debug, Clone)]
pub(crate) struct SimulationOptions {
    pub cycles: u32,
    pub ticks: u32,
    pub seed: Option<u64>,
    pub max_attempts: u32,
}

#[derive(Debug, Default, Serialize)]
pub(crate) struct PostingTotals {
    pub posted: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct SimulationReport {
    pub cycles: Vec<CycleSummary>,
    pub failed_cycles: u32,
    pub posting: PostingTotals,
    pub breaker_tripped: bool,
    pub analytics: Analytics,
    pub projection: EarningsProjection,
    pub queue: BTreeMap<Platform, usize>,
}

pub(crate) fn load_settings_or_default(path: Option<&Path>) -> anyhow::Result<AutomationSettings> {
    match path {
        Some(path) => Ok(dropship_core::load_settings(path)?),
        None => Ok(AutomationSettings::default()),
    }
}

/// Run `cycles` automation cycles, then `ticks` monitor ticks, then one
/// flush of every posting queue.
///
/// Cycle failures are counted and skipped, the same way the background loop
/// treats them.
pub(crate) async fn run_simulation(
    settings: AutomationSettings,
    options: &SimulationOptions,
) -> SimulationReport {
    let metrics = options
        .seed
        .map_or_else(RandomMetrics::new, RandomMetrics::seeded);
    let engine = AutomationEngine::builder()
        .config(EngineConfig {
            posting: PostingConfig {
                flush_interval: None,
                max_attempts: options.max_attempts,
            },
            ..EngineConfig::default()
        })
        .settings(settings)
        .metrics(metrics)
        .build();

    let mut cycles = Vec::new();
    let mut failed_cycles = 0;
    for cycle in 1..=options.cycles {
        match engine.execute_cycle().await {
            Ok(summary) => {
                tracing::info!(cycle, campaigns = summary.campaigns_created, "simulate: cycle done");
                cycles.push(summary);
            }
            Err(e) => {
                tracing::warn!(cycle, error = %e, "simulate: cycle failed");
                failed_cycles += 1;
            }
        }
    }

    let mut breaker_tripped = false;
    for _ in 0..options.ticks {
        let report = engine.monitor_tick().await;
        breaker_tripped |= report.breaker_tripped;
    }

    let horizon = Utc::now() + Duration::hours(FLUSH_HORIZON_HOURS);
    let mut posting = PostingTotals::default();
    // Retries are immediate here, so loop until nothing is left in flight.
    loop {
        let flush = engine.posting().flush(horizon).await;
        posting.posted += flush.posted.len();
        posting.failed += flush.failed.len();
        if flush.retrying == 0 {
            break;
        }
    }

    let report = SimulationReport {
        cycles,
        failed_cycles,
        posting,
        breaker_tripped,
        analytics: engine.analytics().await,
        projection: engine.earnings_projection().await,
        queue: engine.queue_status().await,
    };
    engine.shutdown().await;
    report
}
