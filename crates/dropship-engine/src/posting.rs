//! Per-platform posting queues and the periodic flush that publishes due
//! content.
//!
//! [`PlatformQueues`] is the timer-free core: it owns the queued pieces and
//! decides their fate on each [`PlatformQueues::drain_ready`]. The
//! [`PostingScheduler`] wraps it behind a mutex, keeps the ledger of terminal
//! outcomes, and registers a `tokio-cron-scheduler` job that flushes on an
//! interval.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Days, Utc};
use dropship_core::{ContentPiece, ContentStatus, Engagement, Platform};
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use uuid::Uuid;

use crate::error::EngineError;
use crate::metrics::{MetricsSource, SharedMetrics};

/// Hands a content piece to a social platform.
pub trait Publisher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EngineError::Publish`] when the platform rejects the piece.
    fn publish(&self, piece: &ContentPiece) -> Result<(), EngineError>;
}

/// Stand-in publisher that only logs what it would post.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

impl Publisher for LogPublisher {
    fn publish(&self, piece: &ContentPiece) -> Result<(), EngineError> {
        tracing::info!(
            platform = %piece.platform,
            content_id = %piece.id,
            title = %piece.title,
            media_url = %piece.media_url,
            hashtags = piece.hashtags.len(),
            "posting: published content"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedPiece {
    pub piece: ContentPiece,
    /// Failed publish attempts so far.
    pub attempts: u32,
}

/// What one flush did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    pub posted: Vec<ContentPiece>,
    pub failed: Vec<ContentPiece>,
    /// Pieces that failed this round but have attempts left.
    pub retrying: usize,
}

impl FlushReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posted.is_empty() && self.failed.is_empty() && self.retrying == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlatformQueues {
    queues: BTreeMap<Platform, VecDeque<QueuedPiece>>,
}

impl PlatformQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `piece` to the queue of its own platform.
    pub fn enqueue(&mut self, piece: ContentPiece) {
        self.queues
            .entry(piece.platform)
            .or_default()
            .push_back(QueuedPiece { piece, attempts: 0 });
    }

    /// Publish every piece that is due at `now` and still `scheduled`.
    ///
    /// Published pieces become `posted`, pick up their engagement from
    /// `metrics`, and leave the queue. A failed attempt
    /// bumps the piece's counter; once it reaches `max_attempts` (at least 1)
    /// the piece becomes `failed` and leaves the queue too. Queue order is
    /// preserved for everything that stays.
    pub fn drain_ready(
        &mut self,
        now: DateTime<Utc>,
        publisher: &dyn Publisher,
        metrics: &mut dyn MetricsSource,
        max_attempts: u32,
    ) -> FlushReport {
        let max_attempts = max_attempts.max(1);
        let mut report = FlushReport::default();

        for (platform, queue) in &mut self.queues {
            let mut kept = VecDeque::with_capacity(queue.len());

            for mut entry in queue.drain(..) {
                if !entry.piece.is_due(now) {
                    kept.push_back(entry);
                    continue;
                }

                match publisher.publish(&entry.piece) {
                    Ok(()) => {
                        mark(&mut entry.piece, ContentStatus::Posted);
                        entry.piece.engagement = metrics.engagement();
                        report.posted.push(entry.piece);
                    }
                    Err(e) => {
                        entry.attempts += 1;
                        tracing::warn!(
                            platform = %platform,
                            content_id = %entry.piece.id,
                            attempt = entry.attempts,
                            max_attempts,
                            error = %e,
                            "posting: publish attempt failed"
                        );
                        if entry.attempts >= max_attempts {
                            mark(&mut entry.piece, ContentStatus::Failed);
                            report.failed.push(entry.piece);
                        } else {
                            report.retrying += 1;
                            kept.push_back(entry);
                        }
                    }
                }
            }

            *queue = kept;
        }

        report
    }

    /// Number of pieces still waiting per platform.
    #[must_use]
    pub fn status(&self) -> BTreeMap<Platform, usize> {
        self.queues
            .iter()
            .map(|(platform, queue)| {
                let waiting = queue
                    .iter()
                    .filter(|q| !q.piece.status.is_terminal())
                    .count();
                (*platform, waiting)
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedPiece> {
        self.queues.values().flatten()
    }
}

fn mark(piece: &mut ContentPiece, next: ContentStatus) {
    // Only scheduled pieces are ever drained, so the move is always legal.
    if let Err(e) = piece.transition(next) {
        tracing::error!(content_id = %piece.id, error = %e, "posting: rejected status change");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingConfig {
    /// Period of the background flush job. `None` disables the job; callers
    /// then drive [`PostingScheduler::flush`] themselves.
    pub flush_interval: Option<Duration>,
    pub max_attempts: u32,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            flush_interval: Some(Duration::from_secs(3600)),
            max_attempts: 3,
        }
    }
}

/// What became of a piece after it left the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: ContentStatus,
    pub engagement: Engagement,
}

struct PostingInner {
    queues: Mutex<PlatformQueues>,
    outcomes: Mutex<HashMap<Uuid, Outcome>>,
    publisher: Arc<dyn Publisher>,
    metrics: SharedMetrics,
    config: PostingConfig,
    flush_job: Mutex<Option<JobScheduler>>,
}

/// Shared handle to the posting queues.
///
/// A flush locks the queues before the shared metrics.
#[derive(Clone)]
pub struct PostingScheduler {
    inner: Arc<PostingInner>,
}

impl PostingScheduler {
    #[must_use]
    pub fn new(
        config: PostingConfig,
        publisher: Arc<dyn Publisher>,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            inner: Arc::new(PostingInner {
                queues: Mutex::new(PlatformQueues::new()),
                outcomes: Mutex::new(HashMap::new()),
                publisher,
                metrics,
                config,
                flush_job: Mutex::new(None),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> PostingConfig {
        self.inner.config
    }

    /// Make sure the flush job is running, then queue `pieces` by platform.
    ///
    /// The job is created on the first call only; later calls reuse it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ZeroFlushInterval`] or [`EngineError::Scheduler`]
    /// if the flush job cannot be started. Nothing is queued in that case.
    pub async fn schedule_content(&self, pieces: Vec<ContentPiece>) -> Result<(), EngineError> {
        self.ensure_flush_job().await?;

        let count = pieces.len();
        let mut queues = self.inner.queues.lock().await;
        for piece in pieces {
            queues.enqueue(piece);
        }
        tracing::debug!(count, "posting: queued content");
        Ok(())
    }

    async fn ensure_flush_job(&self) -> Result<(), EngineError> {
        let Some(interval) = self.inner.config.flush_interval else {
            return Ok(());
        };
        if interval.is_zero() {
            return Err(EngineError::ZeroFlushInterval);
        }

        let mut slot = self.inner.flush_job.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;
        let weak: Weak<PostingInner> = Arc::downgrade(&self.inner);

        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let weak = weak.clone();
            Box::pin(async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let report = PostingScheduler { inner }.flush(Utc::now()).await;
                tracing::info!(
                    posted = report.posted.len(),
                    failed = report.failed.len(),
                    retrying = report.retrying,
                    "posting: scheduled flush complete"
                );
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        tracing::info!(interval_secs = interval.as_secs(), "posting: flush job started");

        *slot = Some(scheduler);
        Ok(())
    }

    pub async fn has_flush_job(&self) -> bool {
        self.inner.flush_job.lock().await.is_some()
    }

    /// Publish everything due at `now` and record terminal outcomes.
    pub async fn flush(&self, now: DateTime<Utc>) -> FlushReport {
        let report = {
            let mut queues = self.inner.queues.lock().await;
            let mut metrics = self.inner.metrics.lock().await;
            queues.drain_ready(
                now,
                self.inner.publisher.as_ref(),
                &mut **metrics,
                self.inner.config.max_attempts,
            )
        };

        if !report.posted.is_empty() || !report.failed.is_empty() {
            let mut outcomes = self.inner.outcomes.lock().await;
            for piece in report.posted.iter().chain(&report.failed) {
                outcomes.insert(
                    piece.id,
                    Outcome {
                        status: piece.status,
                        engagement: piece.engagement,
                    },
                );
            }
        }

        report
    }

    pub async fn queue_status(&self) -> BTreeMap<Platform, usize> {
        self.inner.queues.lock().await.status()
    }

    /// Terminal status recorded for `id`, if it has left the queue.
    pub async fn outcome(&self, id: Uuid) -> Option<Outcome> {
        self.inner.outcomes.lock().await.get(&id).copied()
    }

    pub async fn outcomes(&self) -> HashMap<Uuid, Outcome> {
        self.inner.outcomes.lock().await.clone()
    }

    /// Stop the flush job, if one was started.
    pub async fn shutdown(&self) {
        let job = self.inner.flush_job.lock().await.take();
        if let Some(mut scheduler) = job {
            if let Err(e) = scheduler.shutdown().await {
                tracing::warn!(error = %e, "posting: flush job shutdown failed");
            }
        }
    }
}

fn peak_hours(platform: Platform) -> &'static [u32] {
    match platform {
        Platform::TikTok => &[9, 12, 15, 18, 21],
        Platform::Instagram => &[11, 14, 17, 20],
        Platform::YouTube => &[14, 16, 20],
    }
}

/// Peak-engagement slots (UTC, on the hour) for the seven days starting at
/// `now`'s date. Slots earlier today are included.
#[must_use]
pub fn optimal_posting_times(platform: Platform, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let today = now.date_naive();
    (0..7_u64)
        .filter_map(|day| today.checked_add_days(Days::new(day)))
        .flat_map(|date| {
            peak_hours(platform)
                .iter()
                .filter_map(move |hour| date.and_hms_opt(*hour, 0, 0))
        })
        .map(|naive| naive.and_utc())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{Duration as ChronoDuration, TimeZone, Timelike};
    use dropship_core::{ContentKind, Engagement};

    use super::*;
    use crate::metrics::{shared_metrics, ScriptedMetrics};

    fn piece(platform: Platform, scheduled_for: DateTime<Utc>) -> ContentPiece {
        ContentPiece {
            id: Uuid::new_v4(),
            kind: ContentKind::Video,
            title: "clip".to_string(),
            description: String::new(),
            media_url: String::new(),
            hashtags: vec![],
            platform,
            scheduled_for,
            status: ContentStatus::Scheduled,
            engagement: Engagement::default(),
        }
    }

    struct FailingPublisher {
        calls: AtomicUsize,
    }

    impl Publisher for FailingPublisher {
        fn publish(&self, piece: &ContentPiece) -> Result<(), EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(EngineError::Publish {
                platform: piece.platform,
                reason: "rate limited".to_string(),
            })
        }
    }

    fn failing() -> FailingPublisher {
        FailingPublisher {
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn enqueue_routes_by_piece_platform() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, now));
        queues.enqueue(piece(Platform::YouTube, now));
        queues.enqueue(piece(Platform::TikTok, now));

        let status = queues.status();
        assert_eq!(status.get(&Platform::TikTok), Some(&2));
        assert_eq!(status.get(&Platform::YouTube), Some(&1));
        assert_eq!(status.get(&Platform::Instagram), None);
    }

    #[test]
    fn pieces_are_never_posted_early() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, now + ChronoDuration::hours(2)));

        let report = queues.drain_ready(now, &LogPublisher, &mut ScriptedMetrics::new(), 3);
        assert!(report.is_empty());
        assert_eq!(queues.len(), 1);
        assert!(queues.iter().all(|q| q.piece.status == ContentStatus::Scheduled));
    }

    #[test]
    fn failing_publisher_is_not_called_before_schedule() {
        let now = Utc::now();
        let scheduled_for = now + ChronoDuration::hours(3);
        let publisher = failing();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, scheduled_for));

        let early = queues.drain_ready(now, &publisher, &mut ScriptedMetrics::new(), 1);
        assert!(early.is_empty());
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 0);
        let waiting = queues.iter().next().expect("piece still queued");
        assert_eq!(waiting.attempts, 0);
        assert_eq!(waiting.piece.status, ContentStatus::Scheduled);

        let due = queues.drain_ready(scheduled_for, &publisher, &mut ScriptedMetrics::new(), 1);
        assert_eq!(due.failed.len(), 1);
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn posted_pieces_pick_up_engagement() {
        let now = Utc::now();
        let engagement = Engagement {
            views: 42_000,
            likes: 3_000,
            shares: 250,
            comments: 90,
        };
        let mut metrics = ScriptedMetrics::new().with_engagement(engagement);
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::YouTube, now));

        let report = queues.drain_ready(now, &LogPublisher, &mut metrics, 3);
        assert_eq!(report.posted[0].engagement, engagement);
    }

    #[test]
    fn failed_pieces_keep_zero_engagement() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::YouTube, now));
        let report = queues.drain_ready(now, &failing(), &mut ScriptedMetrics::new(), 1);
        assert_eq!(report.failed[0].engagement, Engagement::default());
    }

    #[test]
    fn due_pieces_are_posted_and_removed() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::Instagram, now - ChronoDuration::minutes(1)));
        queues.enqueue(piece(Platform::Instagram, now + ChronoDuration::hours(1)));

        let report = queues.drain_ready(now, &LogPublisher, &mut ScriptedMetrics::new(), 3);
        assert_eq!(report.posted.len(), 1);
        assert_eq!(report.posted[0].status, ContentStatus::Posted);
        assert_eq!(queues.status().get(&Platform::Instagram), Some(&1));
    }

    #[test]
    fn failed_publish_retries_until_attempts_exhausted() {
        let now = Utc::now();
        let publisher = failing();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, now));

        let first = queues.drain_ready(now, &publisher, &mut ScriptedMetrics::new(), 3);
        assert_eq!(first.retrying, 1);
        assert!(first.failed.is_empty());
        assert_eq!(queues.iter().next().map(|q| q.attempts), Some(1));

        let second = queues.drain_ready(now, &publisher, &mut ScriptedMetrics::new(), 3);
        assert_eq!(second.retrying, 1);

        let third = queues.drain_ready(now, &publisher, &mut ScriptedMetrics::new(), 3);
        assert_eq!(third.failed.len(), 1);
        assert_eq!(third.failed[0].status, ContentStatus::Failed);
        assert!(queues.is_empty());
        assert_eq!(publisher.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn single_attempt_fails_immediately() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, now));
        let report = queues.drain_ready(now, &failing(), &mut ScriptedMetrics::new(), 1);
        assert_eq!(report.failed.len(), 1);
        assert!(queues.is_empty());
    }

    #[test]
    fn zero_max_attempts_behaves_as_one() {
        let now = Utc::now();
        let mut queues = PlatformQueues::new();
        queues.enqueue(piece(Platform::TikTok, now));
        let report = queues.drain_ready(now, &failing(), &mut ScriptedMetrics::new(), 0);
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn remaining_pieces_keep_queue_order() {
        let now = Utc::now();
        let later = now + ChronoDuration::hours(1);
        let mut queues = PlatformQueues::new();
        let a = piece(Platform::TikTok, later);
        let b = piece(Platform::TikTok, now);
        let c = piece(Platform::TikTok, later);
        let (a_id, c_id) = (a.id, c.id);
        queues.enqueue(a);
        queues.enqueue(b);
        queues.enqueue(c);

        queues.drain_ready(now, &LogPublisher, &mut ScriptedMetrics::new(), 3);
        let ids: Vec<Uuid> = queues.iter().map(|q| q.piece.id).collect();
        assert_eq!(ids, vec![a_id, c_id]);
    }

    #[tokio::test]
    async fn flush_records_outcomes() {
        let scheduler = PostingScheduler::new(
            PostingConfig {
                flush_interval: None,
                max_attempts: 3,
            },
            Arc::new(LogPublisher),
            shared_metrics(ScriptedMetrics::new()),
        );
        let now = Utc::now();
        let due = piece(Platform::YouTube, now);
        let id = due.id;
        scheduler.schedule_content(vec![due]).await.unwrap();

        assert_eq!(scheduler.outcome(id).await, None);
        let report = scheduler.flush(now).await;
        assert_eq!(report.posted.len(), 1);
        let outcome = scheduler.outcome(id).await.expect("outcome recorded");
        assert_eq!(outcome.status, ContentStatus::Posted);
        assert_eq!(outcome.engagement.views, 10_000);
        assert_eq!(scheduler.queue_status().await.get(&Platform::YouTube), Some(&0));
    }

    #[tokio::test]
    async fn disabled_flush_interval_never_starts_job() {
        let scheduler = PostingScheduler::new(
            PostingConfig {
                flush_interval: None,
                max_attempts: 3,
            },
            Arc::new(LogPublisher),
            shared_metrics(ScriptedMetrics::new()),
        );
        scheduler
            .schedule_content(vec![piece(Platform::TikTok, Utc::now())])
            .await
            .unwrap();
        assert!(!scheduler.has_flush_job().await);
    }

    #[tokio::test]
    async fn zero_flush_interval_queues_nothing() {
        let scheduler = PostingScheduler::new(
            PostingConfig {
                flush_interval: Some(Duration::ZERO),
                max_attempts: 3,
            },
            Arc::new(LogPublisher),
            shared_metrics(ScriptedMetrics::new()),
        );
        let result = scheduler
            .schedule_content(vec![piece(Platform::TikTok, Utc::now())])
            .await;
        assert!(matches!(result, Err(EngineError::ZeroFlushInterval)));
        assert!(scheduler.queue_status().await.is_empty());
        assert!(!scheduler.has_flush_job().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn flush_job_started_once_and_reused() {
        let scheduler = PostingScheduler::new(
            PostingConfig {
                flush_interval: Some(Duration::from_secs(3600)),
                max_attempts: 3,
            },
            Arc::new(LogPublisher),
            shared_metrics(ScriptedMetrics::new()),
        );
        let later = Utc::now() + ChronoDuration::hours(4);

        scheduler
            .schedule_content(vec![piece(Platform::TikTok, later)])
            .await
            .unwrap();
        assert!(scheduler.has_flush_job().await);
        scheduler
            .schedule_content(vec![piece(Platform::TikTok, later)])
            .await
            .unwrap();
        assert!(scheduler.has_flush_job().await);
        assert_eq!(scheduler.queue_status().await.get(&Platform::TikTok), Some(&2));

        scheduler.shutdown().await;
        assert!(!scheduler.has_flush_job().await);
    }

    #[test]
    fn optimal_times_cover_a_week_of_peak_hours() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 13, 45, 0).unwrap();
        let times = optimal_posting_times(Platform::TikTok, now);
        assert_eq!(times.len(), 7 * 5);
        assert_eq!(times[0], Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
        assert_eq!(
            times.last().copied(),
            Some(Utc.with_ymd_and_hms(2025, 3, 16, 21, 0, 0).unwrap())
        );

        let youtube = optimal_posting_times(Platform::YouTube, now);
        assert_eq!(youtube.len(), 7 * 3);
        assert!(youtube.iter().all(|t| [14, 16, 20].contains(&t.hour())));
    }
}
