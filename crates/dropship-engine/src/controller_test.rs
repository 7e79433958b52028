use dropship_core::{ContentStatus, Engagement, Niche, SettingsPatch, TrendSignal};
use rust_decimal::Decimal;

use super::*;
use crate::metrics::ScriptedMetrics;

fn manual_config() -> EngineConfig {
    EngineConfig {
        posting: PostingConfig {
            flush_interval: None,
            max_attempts: 3,
        },
        ..EngineConfig::default()
    }
}

fn engine_with(settings: AutomationSettings) -> AutomationEngine {
    AutomationEngine::builder()
        .config(manual_config())
        .settings(settings)
        .metrics(ScriptedMetrics::new())
        .build()
}

struct UnavailableSource;

impl TrendSource for UnavailableSource {
    fn trending(&self) -> Result<Vec<TrendSignal>, EngineError> {
        Err(EngineError::TrendSource("upstream timeout".to_string()))
    }

    fn niches(&self) -> Result<Vec<Niche>, EngineError> {
        Err(EngineError::TrendSource("upstream timeout".to_string()))
    }
}

#[tokio::test]
async fn cycle_creates_one_campaign_per_top_trend() {
    let engine = engine_with(AutomationSettings::default());

    let summary = engine.execute_cycle().await.unwrap();

    assert_eq!(summary.trends_seen, 3);
    assert_eq!(summary.campaigns_created, 3);
    assert_eq!(summary.products_created, 12);
    assert_eq!(summary.content_pieces, 36);
    assert_eq!(summary.content_queued, 36);
    assert_eq!(summary.affiliate_lines, 2 * 3 * 5);

    let campaigns = engine.campaigns().await;
    assert_eq!(campaigns.len(), 3);
    for c in &campaigns {
        assert!(c.is_active());
        assert_eq!(c.spent, Decimal::ZERO);
        assert_eq!(c.revenue, Decimal::ZERO);
        assert_eq!(c.budget, Decimal::from(1_000));
        assert!(!c.awaiting_approval);
    }

    let queued: usize = engine.queue_status().await.values().sum();
    assert_eq!(queued, 36);
}

#[tokio::test]
async fn cycle_logs_campaign_and_scheduling_activity() {
    let engine = engine_with(AutomationSettings::default());
    engine.execute_cycle().await.unwrap();

    let kinds: Vec<ActivityKind> = engine.activity(100).await.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds.iter().filter(|k| **k == ActivityKind::ProductCreated).count(),
        3
    );
    assert_eq!(
        kinds.iter().filter(|k| **k == ActivityKind::ContentScheduled).count(),
        3
    );
}

#[tokio::test]
async fn auto_create_off_creates_no_campaigns() {
    let engine = engine_with(AutomationSettings {
        auto_create_products: false,
        ..AutomationSettings::default()
    });

    let summary = engine.execute_cycle().await.unwrap();

    assert_eq!(summary.trends_seen, 3);
    assert_eq!(summary.campaigns_created, 0);
    assert_eq!(summary.products_created, 0);
    assert_eq!(summary.content_pieces, 0);
    assert_eq!(summary.affiliate_lines, 2 * 3 * 5);
    assert!(engine.campaigns().await.is_empty());
    assert!(engine.activity(100).await.is_empty());
    assert!(engine.queue_status().await.is_empty());
}

#[tokio::test]
async fn held_content_is_queued_on_approval() {
    let engine = engine_with(AutomationSettings {
        auto_approve_content: false,
        ..AutomationSettings::default()
    });

    let summary = engine.execute_cycle().await.unwrap();
    assert_eq!(summary.content_queued, 0);
    assert!(engine.queue_status().await.is_empty());

    let campaign = engine.campaigns().await.remove(0);
    assert!(campaign.awaiting_approval);

    let queued = engine.approve_content(campaign.id).await.unwrap();
    assert_eq!(queued, campaign.content.len());
    let total: usize = engine.queue_status().await.values().sum();
    assert_eq!(total, queued);

    // A second approval has nothing left to queue.
    assert_eq!(engine.approve_content(campaign.id).await.unwrap(), 0);
}

fn zero_flush_engine(settings: AutomationSettings) -> AutomationEngine {
    AutomationEngine::builder()
        .config(EngineConfig {
            posting: PostingConfig {
                flush_interval: Some(Duration::ZERO),
                max_attempts: 3,
            },
            ..EngineConfig::default()
        })
        .settings(settings)
        .metrics(ScriptedMetrics::new())
        .build()
}

#[tokio::test]
async fn failed_approval_leaves_campaign_waiting() {
    let engine = zero_flush_engine(AutomationSettings {
        auto_approve_content: false,
        ..AutomationSettings::default()
    });
    engine.execute_cycle().await.unwrap();
    let campaign = engine.campaigns().await.remove(0);
    let logged_before = engine.activity(100).await.len();

    let err = engine.approve_content(campaign.id).await.unwrap_err();
    assert!(matches!(err, EngineError::ZeroFlushInterval));

    let after = engine.campaigns().await.remove(0);
    assert!(after.awaiting_approval);
    assert!(engine.queue_status().await.is_empty());
    assert_eq!(engine.activity(100).await.len(), logged_before);

    // Retrying hits the same error instead of silently returning 0.
    assert!(engine.approve_content(campaign.id).await.is_err());
}

#[tokio::test]
async fn failed_scheduling_stores_no_campaigns() {
    let engine = zero_flush_engine(AutomationSettings::default());

    let err = engine.execute_cycle().await.unwrap_err();
    assert!(matches!(err, EngineError::ZeroFlushInterval));
    assert!(engine.campaigns().await.is_empty());
    assert!(engine.activity(100).await.is_empty());
    assert!(engine.queue_status().await.is_empty());
}

#[tokio::test]
async fn approving_unknown_campaign_is_not_found() {
    let engine = engine_with(AutomationSettings::default());
    let id = Uuid::new_v4();
    let err = engine.approve_content(id).await.unwrap_err();
    assert!(matches!(err, EngineError::CampaignNotFound(found) if found == id));
}

#[tokio::test]
async fn unavailable_trend_source_fails_cycle_without_side_effects() {
    let engine = AutomationEngine::builder()
        .config(manual_config())
        .trend_source(UnavailableSource)
        .build();

    let err = engine.execute_cycle().await.unwrap_err();
    assert!(matches!(err, EngineError::TrendSource(_)));
    assert!(engine.campaigns().await.is_empty());
    assert!(engine.activity(10).await.is_empty());
}

#[tokio::test]
async fn refresh_replaces_niche_allow_list() {
    let engine = engine_with(AutomationSettings {
        niches: vec!["Pet Accessories".to_string()],
        ..AutomationSettings::default()
    });

    let trends = engine.refresh_trends().await.unwrap();

    assert_eq!(trends, 3);
    assert_eq!(
        engine.settings().await.niches,
        vec![
            "Korean Beauty & Skincare",
            "Home Organization",
            "Kitchen Problem Solvers",
            "Phone & Tech Accessories",
        ]
    );
    let log = engine.activity(1).await;
    assert_eq!(log[0].kind, ActivityKind::TrendDetected);
    assert_eq!(log[0].message, "Detected 3 new trending opportunities");
}

#[tokio::test]
async fn failed_refresh_keeps_settings() {
    let engine = AutomationEngine::builder()
        .config(manual_config())
        .trend_source(UnavailableSource)
        .build();
    let before = engine.settings().await;
    assert!(engine.refresh_trends().await.is_err());
    assert_eq!(engine.settings().await, before);
}

#[tokio::test]
async fn update_settings_merges_partial_patch() {
    let engine = engine_with(AutomationSettings::default());
    let updated = engine
        .update_settings(SettingsPatch {
            profit_threshold: Some(Decimal::from(2_000)),
            ..SettingsPatch::default()
        })
        .await;

    assert_eq!(updated.profit_threshold, Decimal::from(2_000));
    assert_eq!(updated.budget_limit, Decimal::from(10_000));
    assert_eq!(engine.settings().await, updated);
}

#[tokio::test]
async fn campaigns_reflect_published_content() {
    let engagement = Engagement {
        views: 64_000,
        likes: 5_000,
        shares: 400,
        comments: 120,
    };
    let engine = AutomationEngine::builder()
        .config(manual_config())
        .metrics(ScriptedMetrics::new().with_engagement(engagement))
        .build();
    engine.execute_cycle().await.unwrap();

    let report = engine
        .posting()
        .flush(Utc::now() + chrono::Duration::hours(9))
        .await;
    assert_eq!(report.posted.len(), 36);

    let campaigns = engine.campaigns().await;
    assert!(campaigns
        .iter()
        .flat_map(|c| c.content.iter())
        .all(|p| p.status == ContentStatus::Posted && p.engagement == engagement));
    assert!(engine.queue_status().await.values().all(|n| *n == 0));
}

#[tokio::test]
async fn price_suggestions_follow_competitors() {
    let engine = engine_with(AutomationSettings::default());
    engine.execute_cycle().await.unwrap();
    let campaign = engine.campaigns().await.remove(0);

    let suggestions = engine.price_suggestions(campaign.id).await.unwrap();
    assert_eq!(suggestions.len(), campaign.products.len());

    // K-Beauty Glow Serum: cost 8, competitors average 31.5.
    let serum = &suggestions[0];
    assert_eq!(serum.current_price, Decimal::from(35));
    assert_eq!(serum.suggested_price, Decimal::new(3623, 2));

    // Listings keep their price.
    assert_eq!(engine.campaigns().await[0].products[0].price, Decimal::from(35));
}

#[tokio::test]
async fn price_suggestions_for_unknown_campaign_is_not_found() {
    let engine = engine_with(AutomationSettings::default());
    let err = engine.price_suggestions(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::CampaignNotFound(_)));
}

#[tokio::test]
async fn affiliate_report_uses_engine_metrics() {
    let engine = AutomationEngine::builder()
        .config(manual_config())
        .metrics(ScriptedMetrics::new().with_affiliate_rates([1.0, 5.0]))
        .build();

    let report = engine.affiliate_report().await;
    assert_eq!(report.performance.len(), 4);
    assert!(report
        .recommendations
        .contains(&"Consider pausing low-performing programs: 2".to_string()));
}

#[tokio::test]
async fn analytics_and_projection_follow_monitor_ticks() {
    let engine = AutomationEngine::builder()
        .config(manual_config())
        .metrics(
            ScriptedMetrics::new()
                .with_steady_state(350, 50)
                .with_conversion_rate(3.5),
        )
        .build();
    engine.execute_cycle().await.unwrap();
    engine.monitor_tick().await;

    let analytics = engine.analytics().await;
    assert_eq!(analytics.total_revenue, Decimal::from(1_050));
    assert_eq!(analytics.total_profit, Decimal::from(900));
    assert_eq!(analytics.total_orders, 30);
    assert_eq!(analytics.average_order_value, Decimal::from(35));
    assert!((analytics.conversion_rate - 3.5).abs() < f64::EPSILON);
    assert_eq!(analytics.top_niches.len(), 4);
    assert_eq!(analytics.active_campaigns, 3);

    let projection = engine.earnings_projection().await;
    assert_eq!(projection.daily, Decimal::from(135));
}

#[test]
fn engine_config_from_app_config() {
    let app = AppConfig {
        env: dropship_core::Environment::Test,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "info".to_string(),
        settings_path: None,
        cycle_interval_secs: 10,
        cycle_cooldown_secs: 2,
        monitor_interval_secs: 5,
        trend_retry_secs: 7,
        posting_flush_secs: 30,
        max_publish_attempts: 1,
        autostart: false,
    };
    let config = EngineConfig::from_app_config(&app);
    assert_eq!(config.cycle_interval, Duration::from_secs(10));
    assert_eq!(config.cycle_cooldown, Duration::from_secs(2));
    assert_eq!(config.monitor_interval, Duration::from_secs(5));
    assert_eq!(config.trend_retry, Duration::from_secs(7));
    assert_eq!(config.posting.flush_interval, Some(Duration::from_secs(30)));
    assert_eq!(config.posting.max_attempts, 1);
}
