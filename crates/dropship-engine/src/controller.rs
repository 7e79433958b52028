//! The automation engine: owns settings, campaigns and the activity log, runs
//! the cycle/trend/monitor loops, and answers the read-side queries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dropship_core::{
    ActivityEntry, ActivityKind, ActivityLog, AppConfig, AutomationSettings, Campaign,
    ContentPiece, Platform, SettingsPatch,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::affiliates::{self, affiliate_copy, find_profitable_programs, AffiliateReport};
use crate::catalog::{rank_signals, StaticCatalog, TrendSource};
use crate::content::synthesize_content;
use crate::error::EngineError;
use crate::loops;
use crate::metrics::{MetricsSource, RandomMetrics, SharedMetrics};
use crate::monitor::{apply_tick, MonitorReport};
use crate::posting::{LogPublisher, PostingConfig, PostingScheduler, Publisher};
use crate::products::{optimize_price, synthesize_products};
use crate::reporter::{self, Analytics, EarningsProjection};

/// Trends turned into campaigns per cycle.
pub const TRENDS_PER_CYCLE: usize = 3;
/// Affiliate programs promoted per cycle.
pub const PROGRAMS_PER_CYCLE: usize = 2;
/// Niches kept in the settings after a trend refresh.
pub const NICHES_KEPT: usize = 5;

const AFFILIATE_PRODUCTS: [&str; 3] = ["trending product", "viral item", "must-have gadget"];

/// Loop cadence and posting behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub cycle_interval: Duration,
    /// Wait after a failed cycle before retrying.
    pub cycle_cooldown: Duration,
    pub monitor_interval: Duration,
    /// Wait after a failed trend refresh before retrying.
    pub trend_retry: Duration,
    pub posting: PostingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_interval: Duration::from_secs(30 * 60),
            cycle_cooldown: Duration::from_secs(60),
            monitor_interval: Duration::from_secs(15 * 60),
            trend_retry: Duration::from_secs(60 * 60),
            posting: PostingConfig::default(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cycle_interval: Duration::from_secs(config.cycle_interval_secs),
            cycle_cooldown: Duration::from_secs(config.cycle_cooldown_secs),
            monitor_interval: Duration::from_secs(config.monitor_interval_secs),
            trend_retry: Duration::from_secs(config.trend_retry_secs),
            posting: PostingConfig {
                flush_interval: Some(Duration::from_secs(config.posting_flush_secs)),
                max_attempts: config.max_publish_attempts,
            },
        }
    }
}

/// What one automation cycle produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub trends_seen: usize,
    pub campaigns_created: usize,
    pub products_created: usize,
    pub content_pieces: usize,
    /// Pieces handed to the posting scheduler (the rest await approval).
    pub content_queued: usize,
    pub affiliate_lines: usize,
}

/// Competitor-based price advice for one product. The listing itself keeps
/// its price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceSuggestion {
    pub product_id: Uuid,
    pub name: String,
    pub cost: Decimal,
    pub current_price: Decimal,
    pub suggested_price: Decimal,
}

#[derive(Debug, Default)]
struct EngineState {
    settings: AutomationSettings,
    campaigns: Vec<Campaign>,
    activity: ActivityLog,
}

#[derive(Default)]
struct RunState {
    /// Present while a run is active; dropping or flipping it stops the loops.
    running: Option<watch::Sender<bool>>,
    tasks: Vec<JoinHandle<()>>,
}

struct EngineInner {
    state: Mutex<EngineState>,
    metrics: SharedMetrics,
    trends: Arc<dyn TrendSource>,
    posting: PostingScheduler,
    config: EngineConfig,
    run: Mutex<RunState>,
}

/// Cheap-to-clone handle to the automation engine.
///
/// Lock order is state, then metrics. The posting scheduler's locks are never
/// taken while the state lock is held, and a flush takes the posting queues
/// before metrics.
#[derive(Clone)]
pub struct AutomationEngine {
    inner: Arc<EngineInner>,
}

pub struct EngineBuilder {
    config: EngineConfig,
    settings: AutomationSettings,
    metrics: Option<Box<dyn MetricsSource>>,
    trends: Option<Arc<dyn TrendSource>>,
    publisher: Option<Arc<dyn Publisher>>,
}

impl EngineBuilder {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: AutomationSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn metrics(mut self, metrics: impl MetricsSource + 'static) -> Self {
        self.metrics = Some(Box::new(metrics));
        self
    }

    #[must_use]
    pub fn trend_source(mut self, source: impl TrendSource + 'static) -> Self {
        self.trends = Some(Arc::new(source));
        self
    }

    #[must_use]
    pub fn publisher(mut self, publisher: impl Publisher + 'static) -> Self {
        self.publisher = Some(Arc::new(publisher));
        self
    }

    #[must_use]
    pub fn build(self) -> AutomationEngine {
        let metrics: SharedMetrics = Arc::new(Mutex::new(
            self.metrics
                .unwrap_or_else(|| Box::new(RandomMetrics::new())),
        ));
        let trends = self.trends.unwrap_or_else(|| Arc::new(StaticCatalog));
        let publisher = self.publisher.unwrap_or_else(|| Arc::new(LogPublisher));

        AutomationEngine {
            inner: Arc::new(EngineInner {
                state: Mutex::new(EngineState {
                    settings: self.settings,
                    campaigns: Vec::new(),
                    activity: ActivityLog::new(),
                }),
                posting: PostingScheduler::new(
                    self.config.posting,
                    publisher,
                    Arc::clone(&metrics),
                ),
                metrics,
                trends,
                config: self.config,
                run: Mutex::new(RunState::default()),
            }),
        }
    }
}

impl AutomationEngine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder {
            config: EngineConfig::default(),
            settings: AutomationSettings::default(),
            metrics: None,
            trends: None,
            publisher: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> EngineConfig {
        self.inner.config
    }

    #[must_use]
    pub fn posting(&self) -> &PostingScheduler {
        &self.inner.posting
    }

    /// Launch the cycle, trend-refresh and monitor loops.
    ///
    /// Returns `false` without doing anything if a run is already active.
    /// Loops left over from a previous, stopped run keep winding down on
    /// their own and are awaited by [`AutomationEngine::shutdown`].
    pub async fn start(&self) -> bool {
        let mut run = self.inner.run.lock().await;
        if run.running.as_ref().is_some_and(|tx| *tx.borrow()) {
            return false;
        }

        let (tx, rx) = watch::channel(true);
        run.tasks.retain(|task| !task.is_finished());
        run.tasks.push(tokio::spawn(loops::cycle_loop(self.clone(), rx.clone())));
        run.tasks.push(tokio::spawn(loops::trend_loop(self.clone(), rx.clone())));
        run.tasks.push(tokio::spawn(loops::monitor_loop(self.clone(), rx)));
        run.running = Some(tx);

        tracing::info!("engine: automation started");
        true
    }

    /// Ask the loops to stop at their next iteration boundary.
    ///
    /// Returns `false` if nothing was running.
    pub async fn stop(&self) -> bool {
        let mut run = self.inner.run.lock().await;
        let Some(tx) = run.running.take() else {
            return false;
        };
        tx.send_replace(false);
        tracing::info!("engine: automation stopped");
        true
    }

    /// Stop the loops, wait for them to finish, and stop the posting job.
    pub async fn shutdown(&self) {
        self.stop().await;
        let tasks = std::mem::take(&mut self.inner.run.lock().await.tasks);
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "engine: loop task ended abnormally");
            }
        }
        self.inner.posting.shutdown().await;
    }

    pub async fn is_running(&self) -> bool {
        self.inner
            .run
            .lock()
            .await
            .running
            .as_ref()
            .is_some_and(|tx| *tx.borrow())
    }

    /// Run one automation cycle: turn the top trends into campaigns, queue
    /// their content, and generate affiliate copy.
    ///
    /// With `auto_create_products` off no campaigns are created; only the
    /// affiliate copy is produced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrendSource`] if trends cannot be fetched, or a
    /// posting error if the flush job cannot be started. A failed cycle
    /// stores no campaigns and queues nothing.
    pub async fn execute_cycle(&self) -> Result<CycleSummary, EngineError> {
        let now = Utc::now();
        let mut signals = self.inner.trends.trending()?;
        rank_signals(&mut signals);

        let settings = self.settings().await;
        let mut summary = CycleSummary {
            trends_seen: signals.len(),
            ..CycleSummary::default()
        };

        let mut campaigns = Vec::new();
        let mut to_queue: Vec<ContentPiece> = Vec::new();
        {
            let mut metrics = self.inner.metrics.lock().await;
            let trends_used = if settings.auto_create_products {
                TRENDS_PER_CYCLE
            } else {
                0
            };
            for signal in signals.iter().take(trends_used) {
                let products = synthesize_products(signal, &mut **metrics, now);
                let content =
                    synthesize_content(signal, &products, &settings.platforms, &mut **metrics, now);

                summary.products_created += products.len();
                summary.content_pieces += content.len();

                let mut campaign =
                    Campaign::from_trend(&signal.title, &signal.niche, products, content, now);
                if settings.auto_approve_content {
                    to_queue.extend(campaign.content.iter().cloned());
                } else {
                    campaign.awaiting_approval = !campaign.content.is_empty();
                }
                tracing::info!(
                    campaign = %campaign.name,
                    products = campaign.products.len(),
                    content = campaign.content.len(),
                    "engine: created campaign from trend"
                );
                campaigns.push(campaign);
            }

            for ranked in find_profitable_programs().iter().take(PROGRAMS_PER_CYCLE) {
                let products: Vec<String> =
                    AFFILIATE_PRODUCTS.iter().map(|p| (*p).to_string()).collect();
                let lines = affiliate_copy(&ranked.program, &products, &mut **metrics);
                for line in &lines {
                    tracing::debug!(program = %ranked.program.name, copy = %line, "engine: affiliate copy");
                }
                summary.affiliate_lines += lines.len();
            }
        }

        summary.campaigns_created = campaigns.len();
        summary.content_queued = to_queue.len();

        if !to_queue.is_empty() {
            self.inner.posting.schedule_content(to_queue).await?;
        }

        {
            let mut state = self.inner.state.lock().await;
            for campaign in campaigns {
                state.activity.push(
                    ActivityKind::ProductCreated,
                    format!("Created campaign: {}", campaign.name),
                );
                if settings.auto_approve_content && !campaign.content.is_empty() {
                    state.activity.push(
                        ActivityKind::ContentScheduled,
                        format!(
                            "Scheduled {} content pieces for {}",
                            campaign.content.len(),
                            campaign.name
                        ),
                    );
                }
                state.campaigns.push(campaign);
            }
        }

        tracing::info!(
            trends = summary.trends_seen,
            campaigns = summary.campaigns_created,
            products = summary.products_created,
            content = summary.content_pieces,
            queued = summary.content_queued,
            affiliate_lines = summary.affiliate_lines,
            "engine: cycle complete"
        );
        Ok(summary)
    }

    /// Re-rank niches, keep the top five in the settings, and log how many
    /// trends were seen. Returns that trend count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TrendSource`] if trends or niches cannot be
    /// fetched; the settings are left untouched in that case.
    pub async fn refresh_trends(&self) -> Result<usize, EngineError> {
        let trends = self.inner.trends.trending()?;
        let niches = self.inner.trends.niches()?;

        let mut state = self.inner.state.lock().await;
        state.settings.niches = niches
            .into_iter()
            .take(NICHES_KEPT)
            .map(|n| n.name)
            .collect();
        state.activity.push(
            ActivityKind::TrendDetected,
            format!("Detected {} new trending opportunities", trends.len()),
        );

        tracing::info!(
            trends = trends.len(),
            niches = state.settings.niches.len(),
            "engine: trend analysis refreshed"
        );
        Ok(trends.len())
    }

    /// One performance-monitor tick over all campaigns.
    pub async fn monitor_tick(&self) -> MonitorReport {
        let mut guard = self.inner.state.lock().await;
        let state = &mut *guard;
        let report = {
            let mut metrics = self.inner.metrics.lock().await;
            apply_tick(&mut state.campaigns, &state.settings, &mut **metrics)
        };

        if report.newly_paused > 0 {
            state.activity.push(
                ActivityKind::CampaignsPaused,
                format!(
                    "Budget limit reached, paused {} campaigns (spent {})",
                    report.newly_paused, report.total_spent
                ),
            );
        }

        report
    }

    /// Hand held content of `campaign_id` to the posting scheduler.
    /// Returns the number of pieces queued (0 if nothing was waiting).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CampaignNotFound`] for an unknown id, or a
    /// posting error if the flush job cannot be started. On a posting error
    /// nothing is queued and the campaign keeps waiting for approval.
    pub async fn approve_content(&self, campaign_id: Uuid) -> Result<usize, EngineError> {
        // Claim the approval first so a concurrent call cannot queue twice.
        let (pieces, name) = {
            let mut state = self.inner.state.lock().await;
            let campaign = state
                .campaigns
                .iter_mut()
                .find(|c| c.id == campaign_id)
                .ok_or(EngineError::CampaignNotFound(campaign_id))?;

            if !campaign.awaiting_approval {
                return Ok(0);
            }
            campaign.awaiting_approval = false;
            (campaign.content.clone(), campaign.name.clone())
        };

        let count = pieces.len();
        if let Err(e) = self.inner.posting.schedule_content(pieces).await {
            let mut state = self.inner.state.lock().await;
            if let Some(campaign) = state.campaigns.iter_mut().find(|c| c.id == campaign_id) {
                campaign.awaiting_approval = true;
            }
            tracing::warn!(%campaign_id, error = %e, "engine: approval rolled back");
            return Err(e);
        }

        self.inner.state.lock().await.activity.push(
            ActivityKind::ContentScheduled,
            format!("Scheduled {count} content pieces for {name}"),
        );
        tracing::info!(%campaign_id, count, "engine: content approved");
        Ok(count)
    }

    /// Competitor-based price suggestions for every product of `campaign_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CampaignNotFound`] for an unknown id, or
    /// [`EngineError::TrendSource`] if competitor data cannot be fetched.
    pub async fn price_suggestions(
        &self,
        campaign_id: Uuid,
    ) -> Result<Vec<PriceSuggestion>, EngineError> {
        let (niche, products) = {
            let state = self.inner.state.lock().await;
            let campaign = state
                .campaigns
                .iter()
                .find(|c| c.id == campaign_id)
                .ok_or(EngineError::CampaignNotFound(campaign_id))?;
            (campaign.niche.clone(), campaign.products.clone())
        };

        let competitors = self.inner.trends.competitors(&niche)?;
        Ok(products
            .iter()
            .map(|product| PriceSuggestion {
                product_id: product.id,
                name: product.name.clone(),
                cost: product.cost,
                current_price: product.price,
                suggested_price: optimize_price(product, &competitors),
            })
            .collect())
    }

    /// Track every profitable affiliate program and advise on strategy.
    pub async fn affiliate_report(&self) -> AffiliateReport {
        let mut metrics = self.inner.metrics.lock().await;
        affiliates::affiliate_report(&mut **metrics)
    }

    pub async fn settings(&self) -> AutomationSettings {
        self.inner.state.lock().await.settings.clone()
    }

    /// Shallow-merge `patch` into the settings and return the result.
    /// No validation happens here.
    pub async fn update_settings(&self, patch: SettingsPatch) -> AutomationSettings {
        let mut state = self.inner.state.lock().await;
        state.settings.apply(patch);
        tracing::info!("engine: automation settings updated");
        state.settings.clone()
    }

    /// Campaigns with the status and engagement of already-published content
    /// filled in.
    pub async fn campaigns(&self) -> Vec<Campaign> {
        let mut campaigns = self.inner.state.lock().await.campaigns.clone();
        let outcomes = self.inner.posting.outcomes().await;
        if outcomes.is_empty() {
            return campaigns;
        }

        for piece in campaigns.iter_mut().flat_map(|c| c.content.iter_mut()) {
            if let Some(outcome) = outcomes.get(&piece.id) {
                piece.status = outcome.status;
                piece.engagement = outcome.engagement;
            }
        }
        campaigns
    }

    pub async fn analytics(&self) -> Analytics {
        let niches = match self.inner.trends.niches() {
            Ok(niches) => niches,
            Err(e) => {
                tracing::warn!(error = %e, "engine: niches unavailable for analytics");
                Vec::new()
            }
        };

        let state = self.inner.state.lock().await;
        let conversion_rate = self.inner.metrics.lock().await.conversion_rate();
        reporter::analytics(&state.campaigns, &state.activity, niches, conversion_rate)
    }

    pub async fn earnings_projection(&self) -> EarningsProjection {
        let state = self.inner.state.lock().await;
        reporter::earnings_projection(&state.campaigns)
    }

    pub async fn queue_status(&self) -> std::collections::BTreeMap<Platform, usize> {
        self.inner.posting.queue_status().await
    }

    /// The last `n` activity entries, oldest first.
    pub async fn activity(&self, n: usize) -> Vec<ActivityEntry> {
        self.inner.state.lock().await.activity.recent(n)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
