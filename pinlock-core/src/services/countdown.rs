//! Lockout countdown: a once-per-second tick from the persisted lock record
//! down to the clear-and-reset side effect.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{
    Error,
    error::ConfigError,
    hooks::PinHooks,
    repositories::AttemptLedgerRepository,
    status::PinResultStatus,
};

/// Remaining time of a lockout window, clamped to zero.
pub fn remaining_between(unlock_at: DateTime<Utc>, now: DateTime<Utc>) -> chrono::Duration {
    (unlock_at - now).max(chrono::Duration::zero())
}

/// Clock the tick task reads time through. Injectable so tests can drive the
/// countdown from tokio's paused time instead of the wall clock.
type NowFn = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Zero-padded `MM:SS` rendering of a remaining duration.
pub fn format_remaining(remaining: chrono::Duration) -> String {
    let total = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Drives the countdown shown while entry is locked.
///
/// On [`start`](LockoutCountdown::start) the unlock instant is computed once
/// from the persisted lock record plus the configured duration, never from
/// anything else. A spawned task then ticks once per second, delivering the
/// remaining time through the `on_remaining` hook. When less than one tick
/// remains the task clears both ledger records, reports `initial`, and stops;
/// the clear happens exactly once.
///
/// [`shutdown`](LockoutCountdown::shutdown) (and `Drop`) stop the tick task
/// immediately and irrevocably; no side effect fires after teardown.
pub struct LockoutCountdown<L: AttemptLedgerRepository> {
    ledger: Arc<L>,
    duration: chrono::Duration,
    hooks: Arc<PinHooks>,
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    now_fn: NowFn,
}

impl<L: AttemptLedgerRepository> LockoutCountdown<L> {
    pub fn new(ledger: Arc<L>, duration: chrono::Duration, hooks: Arc<PinHooks>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            ledger,
            duration,
            hooks,
            shutdown_tx,
            task: Mutex::new(None),
            now_fn: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock. Every `remaining` computation goes through
    /// this, so a caller can substitute a deterministic clock.
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.now_fn = Arc::new(now);
        self
    }

    /// The unlock instant for the current lock record, if one is persisted.
    pub async fn unlock_at(&self) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(self.ledger.locked_at().await?.map(|since| since + self.duration))
    }

    /// Remaining lockout time as of `now`, or `None` when nothing is locked.
    pub async fn remaining_at(&self, now: DateTime<Utc>) -> Result<Option<chrono::Duration>, Error> {
        Ok(self
            .unlock_at()
            .await?
            .map(|unlock_at| remaining_between(unlock_at, now)))
    }

    /// Start ticking against the persisted lock record.
    ///
    /// When no lock record exists the window is already over: the ledger is
    /// cleared and `initial` reported without spawning anything.
    pub async fn start(&self) -> Result<(), Error> {
        let Some(since) = self.ledger.locked_at().await? else {
            self.ledger.clear().await?;
            self.hooks.notify_status(PinResultStatus::Initial);
            return Ok(());
        };
        let unlock_at = since + self.duration;

        let ledger = Arc::clone(&self.ledger);
        let hooks = Arc::clone(&self.hooks);
        let now_fn = Arc::clone(&self.now_fn);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let remaining = remaining_between(unlock_at, now_fn());
                        if let Some(f) = &hooks.on_remaining {
                            f(remaining);
                        }
                        // Trigger one tick short of exact zero.
                        if remaining < chrono::Duration::seconds(1) {
                            if let Err(e) = ledger.clear().await {
                                tracing::warn!(
                                    error = %e,
                                    "failed to clear attempt ledger on lockout expiry"
                                );
                            }
                            hooks.notify_status(PinResultStatus::Initial);
                            tracing::info!("lockout expired, attempt ledger cleared");
                            break;
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        let mut task = self.task.lock().await;
        if let Some(old) = task.take() {
            old.abort();
        }
        *task = Some(handle);
        Ok(())
    }

    /// Forced quit action on the lockout screen.
    ///
    /// Delegates to the `on_quit` hook; without one there is no safe default,
    /// so the call fails loudly instead of silently doing nothing.
    pub fn request_quit(&self) -> Result<(), Error> {
        match &self.hooks.on_quit {
            Some(f) => {
                f();
                Ok(())
            }
            None => Err(ConfigError::MissingHandler("on_quit").into()),
        }
    }

    /// Stop ticking immediately and irrevocably.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.task.lock().await.take() {
            handle.abort();
        }
    }
}

impl<L: AttemptLedgerRepository> Drop for LockoutCountdown<L> {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Ok(mut task) = self.task.try_lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerKeys;
    use crate::repositories::StoreLedger;
    use crate::storage::SecureStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration as StdDuration;

    /// Mock store for testing
    #[derive(Default)]
    struct MockStore {
        entries: StdMutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SecureStore for MockStore {
        async fn get(&self, key: &str) -> Result<Option<String>, Error> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), Error> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    async fn ledger_locked_since(
        store: Arc<MockStore>,
        since: DateTime<Utc>,
    ) -> Arc<StoreLedger<MockStore>> {
        let ledger = Arc::new(StoreLedger::new(store, LedgerKeys::default()));
        ledger.set_attempt_count(2).await.unwrap();
        ledger.set_locked_at(since).await.unwrap();
        ledger
    }

    /// Clock anchored at `base` that follows tokio's (paused) test time.
    fn test_clock(base: DateTime<Utc>) -> impl Fn() -> DateTime<Utc> + Send + Sync {
        let start = tokio::time::Instant::now();
        move || base + chrono::Duration::from_std(start.elapsed()).unwrap()
    }

    /// Let spawned tick tasks run after an `advance`.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_format_remaining_zero_pads() {
        assert_eq!(format_remaining(chrono::Duration::seconds(0)), "00:00");
        assert_eq!(format_remaining(chrono::Duration::seconds(9)), "00:09");
        assert_eq!(format_remaining(chrono::Duration::seconds(61)), "01:01");
        assert_eq!(format_remaining(chrono::Duration::seconds(600)), "10:00");
    }

    #[test]
    fn test_remaining_never_negative() {
        let now = Utc::now();
        assert_eq!(
            remaining_between(now - chrono::Duration::seconds(5), now),
            chrono::Duration::zero()
        );
    }

    #[tokio::test]
    async fn test_unlock_at_derives_from_lock_record_only() {
        let since = Utc::now();
        let ledger = ledger_locked_since(Arc::new(MockStore::default()), since).await;
        let countdown = LockoutCountdown::new(
            ledger,
            chrono::Duration::seconds(60),
            Arc::new(PinHooks::new()),
        );

        assert_eq!(
            countdown.unlock_at().await.unwrap(),
            Some(since + chrono::Duration::seconds(60))
        );
        let remaining = countdown
            .remaining_at(since + chrono::Duration::seconds(59))
            .await
            .unwrap()
            .unwrap();
        assert!(remaining > chrono::Duration::zero());
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_minute_boundary_clears_exactly_once() {
        // 60s window: the tick at T+59 delivers remaining = 1s without
        // clearing; the tick at T+60 clears, once.
        let remaining_seen = Arc::new(StdMutex::new(Vec::new()));
        let remaining_sink = remaining_seen.clone();
        let resets = Arc::new(AtomicU32::new(0));
        let reset_sink = resets.clone();
        let hooks = PinHooks::new()
            .on_remaining(move |remaining| remaining_sink.lock().unwrap().push(remaining))
            .on_status(move |status| {
                if status == PinResultStatus::Initial {
                    reset_sink.fetch_add(1, Ordering::SeqCst);
                }
            });

        let base = Utc::now();
        let store = Arc::new(MockStore::default());
        let ledger = ledger_locked_since(store.clone(), base).await;
        let countdown =
            LockoutCountdown::new(ledger.clone(), chrono::Duration::seconds(60), Arc::new(hooks))
                .with_clock(test_clock(base));

        countdown.start().await.unwrap();
        settle().await;
        assert_eq!(
            remaining_seen.lock().unwrap().first().copied(),
            Some(chrono::Duration::seconds(60)),
            "first tick is immediate"
        );

        tokio::time::advance(StdDuration::from_secs(59)).await;
        settle().await;
        assert_eq!(
            remaining_seen.lock().unwrap().last().copied(),
            Some(chrono::Duration::seconds(1))
        );
        assert_eq!(resets.load(Ordering::SeqCst), 0);
        assert!(ledger.locked_at().await.unwrap().is_some());

        tokio::time::advance(StdDuration::from_secs(1)).await;
        settle().await;
        assert_eq!(
            remaining_seen.lock().unwrap().last().copied(),
            Some(chrono::Duration::zero())
        );
        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert!(store.entries.lock().unwrap().is_empty());

        // The task stopped after the clear; nothing fires again.
        tokio::time::advance(StdDuration::from_secs(5)).await;
        settle().await;
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_lock_clears_exactly_once() {
        let resets = Arc::new(AtomicU32::new(0));
        let sink = resets.clone();
        let hooks = PinHooks::new().on_status(move |status| {
            if status == PinResultStatus::Initial {
                sink.fetch_add(1, Ordering::SeqCst);
            }
        });

        let base = Utc::now();
        let store = Arc::new(MockStore::default());
        // Lock began a minute ago with a 60s window: expired.
        let ledger =
            ledger_locked_since(store.clone(), base - chrono::Duration::seconds(60)).await;
        let countdown =
            LockoutCountdown::new(ledger.clone(), chrono::Duration::seconds(60), Arc::new(hooks))
                .with_clock(test_clock(base));

        countdown.start().await.unwrap();
        settle().await;

        assert_eq!(resets.load(Ordering::SeqCst), 1);
        assert_eq!(ledger.attempt_count().await.unwrap(), 0);
        assert_eq!(ledger.locked_at().await.unwrap(), None);
        assert!(store.entries.lock().unwrap().is_empty());

        // The task stopped after the clear; nothing fires again.
        tokio::time::advance(StdDuration::from_secs(3)).await;
        settle().await;
        assert_eq!(resets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_lock_ticks_without_clearing() {
        let remaining_seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = remaining_seen.clone();
        let hooks = PinHooks::new().on_remaining(move |remaining| {
            sink.lock().unwrap().push(remaining);
        });

        let base = Utc::now();
        let ledger = ledger_locked_since(Arc::new(MockStore::default()), base).await;
        let countdown =
            LockoutCountdown::new(ledger.clone(), chrono::Duration::seconds(60), Arc::new(hooks))
                .with_clock(test_clock(base));

        countdown.start().await.unwrap();
        settle().await;

        let seen = remaining_seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1, "first tick is immediate");
        assert_eq!(seen[0], chrono::Duration::seconds(60));
        assert!(ledger.locked_at().await.unwrap().is_some());

        countdown.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_side_effects() {
        let resets = Arc::new(AtomicU32::new(0));
        let sink = resets.clone();
        let hooks = PinHooks::new().on_status(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        let base = Utc::now();
        let ledger = ledger_locked_since(Arc::new(MockStore::default()), base).await;
        let countdown =
            LockoutCountdown::new(ledger.clone(), chrono::Duration::seconds(60), Arc::new(hooks))
                .with_clock(test_clock(base));

        countdown.start().await.unwrap();
        settle().await;
        countdown.shutdown().await;

        // The window expires well after teardown; nothing may fire.
        tokio::time::advance(StdDuration::from_secs(120)).await;
        settle().await;
        assert_eq!(resets.load(Ordering::SeqCst), 0);
        assert!(ledger.locked_at().await.unwrap().is_some(), "no clear after teardown");
    }

    #[tokio::test]
    async fn test_start_without_lock_record_resets_immediately() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let sink = seen.clone();
        let hooks = PinHooks::new().on_status(move |status| sink.lock().unwrap().push(status));

        let ledger = Arc::new(StoreLedger::new(
            Arc::new(MockStore::default()),
            LedgerKeys::default(),
        ));
        let countdown =
            LockoutCountdown::new(ledger, chrono::Duration::seconds(60), Arc::new(hooks));

        countdown.start().await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![PinResultStatus::Initial]);
    }

    #[tokio::test]
    async fn test_request_quit_without_handler_fails() {
        let ledger = Arc::new(StoreLedger::new(
            Arc::new(MockStore::default()),
            LedgerKeys::default(),
        ));
        let countdown = LockoutCountdown::new(
            ledger,
            chrono::Duration::seconds(60),
            Arc::new(PinHooks::new()),
        );

        let err = countdown.request_quit().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingHandler("on_quit"))
        ));
    }

    #[tokio::test]
    async fn test_request_quit_delegates_to_handler() {
        let quits = Arc::new(AtomicU32::new(0));
        let sink = quits.clone();
        let hooks = PinHooks::new().on_quit(move || {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        let ledger = Arc::new(StoreLedger::new(
            Arc::new(MockStore::default()),
            LedgerKeys::default(),
        ));
        let countdown =
            LockoutCountdown::new(ledger, chrono::Duration::seconds(60), Arc::new(hooks));

        countdown.request_quit().unwrap();
        assert_eq!(quits.load(Ordering::SeqCst), 1);
    }
}
