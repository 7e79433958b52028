//! The three periodic loops spawned by [`AutomationEngine::start`].
//!
//! Each loop checks the run's `watch` flag before every iteration and while
//! waiting between iterations. An iteration that has begun always runs to
//! completion.

use std::time::Duration;

use tokio::sync::watch;

use crate::controller::AutomationEngine;

const SECS_PER_HOUR: u64 = 60 * 60;

fn is_running(running: &watch::Receiver<bool>) -> bool {
    *running.borrow()
}

/// Resolves once the run flag is cleared or its sender is gone.
async fn stopped(running: &mut watch::Receiver<bool>) {
    loop {
        if !*running.borrow_and_update() {
            return;
        }
        if running.changed().await.is_err() {
            return;
        }
    }
}

/// Sleep for `delay`. Returns `false` if the run was stopped first.
async fn wait(delay: Duration, running: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = tokio::time::sleep(delay) => true,
        () = stopped(running) => false,
    }
}

pub(crate) async fn cycle_loop(engine: AutomationEngine, mut running: watch::Receiver<bool>) {
    let config = engine.config();
    while is_running(&running) {
        let delay = match engine.execute_cycle().await {
            Ok(_) => config.cycle_interval,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    retry_in_secs = config.cycle_cooldown.as_secs(),
                    "engine: automation cycle failed"
                );
                config.cycle_cooldown
            }
        };
        if !wait(delay, &mut running).await {
            break;
        }
    }
    tracing::debug!("engine: cycle loop exited");
}

pub(crate) async fn trend_loop(engine: AutomationEngine, mut running: watch::Receiver<bool>) {
    let config = engine.config();
    while is_running(&running) {
        let delay = match engine.refresh_trends().await {
            Ok(_) => {
                // Re-read every time so settings updates take effect.
                let hours = engine.settings().await.trend_analysis_interval_hours.max(1);
                Duration::from_secs(u64::from(hours) * SECS_PER_HOUR)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    retry_in_secs = config.trend_retry.as_secs(),
                    "engine: trend analysis failed"
                );
                config.trend_retry
            }
        };
        if !wait(delay, &mut running).await {
            break;
        }
    }
    tracing::debug!("engine: trend loop exited");
}

pub(crate) async fn monitor_loop(engine: AutomationEngine, mut running: watch::Receiver<bool>) {
    let interval = engine.config().monitor_interval;
    while is_running(&running) {
        let report = engine.monitor_tick().await;
        tracing::debug!(
            updated = report.updated,
            over_threshold = report.over_threshold.len(),
            breaker_tripped = report.breaker_tripped,
            "engine: monitor tick"
        );
        if !wait(interval, &mut running).await {
            break;
        }
    }
    tracing::debug!("engine: monitor loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn wait_completes_when_still_running() {
        let (_tx, mut rx) = watch::channel(true);
        assert!(wait(Duration::from_secs(60), &mut rx).await);
    }

    #[tokio::test(start_paused = true)]
    async fn wait_returns_early_when_stopped() {
        let (tx, mut rx) = watch::channel(true);
        let waiter = tokio::spawn(async move { wait(Duration::from_secs(3600), &mut rx).await });
        tokio::task::yield_now().await;
        tx.send_replace(false);
        assert!(!waiter.await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_sender_counts_as_stopped() {
        let (tx, mut rx) = watch::channel(true);
        drop(tx);
        assert!(!wait(Duration::from_secs(3600), &mut rx).await);
    }
}
