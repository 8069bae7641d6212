use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::session::store::SessionStore;

/// Eviction policy for abandoned sessions.
#[derive(Debug, Clone, Copy)]
pub struct SweepPolicy {
    /// How often the sweep runs.
    pub interval: Duration,
    /// Sessions older than this are evicted regardless of participants.
    pub hard_ttl: Duration,
    /// Sessions with no participants are evicted once older than this.
    pub empty_ttl: Duration,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10 * 60),
            hard_ttl: Duration::from_secs(60 * 60),
            empty_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Periodic background task that evicts expired sessions from the store.
///
/// `start` is idempotent; `stop` guarantees no further sweep fires. The
/// sweeper only reads and deletes through the store and never touches the
/// connection layer, so an eviction can race a live handler on the same
/// session id. That race resolves through the store's boolean mutation
/// contract on the handler side.
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    policy: SweepPolicy,
    shutdown: Mutex<Option<watch::Sender<()>>>,
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>, policy: SweepPolicy) -> Self {
        Self {
            store,
            policy,
            shutdown: Mutex::new(None),
        }
    }

    /// Spawn the periodic sweep task. Calling `start` while already
    /// running is a no-op.
    pub fn start(&self) {
        let mut guard = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            warn!("session sweeper already running");
            return;
        }

        let (tx, mut rx) = watch::channel(());
        let store = Arc::clone(&self.store);
        let policy = self.policy;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(policy.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // the first tick completes immediately; skip it so a fresh
            // session is not swept at startup
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = sweep_once(&store, &policy, Utc::now());
                        if evicted > 0 {
                            info!(evicted, "session sweep removed expired sessions");
                        }
                    }
                    res = rx.changed() => {
                        if res.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("session sweeper task exited");
        });

        *guard = Some(tx);
        info!(
            interval_secs = policy.interval.as_secs(),
            hard_ttl_secs = policy.hard_ttl.as_secs(),
            empty_ttl_secs = policy.empty_ttl.as_secs(),
            "session sweeper started"
        );
    }

    /// Stop the sweep task. Dropping the shutdown handle wakes the task
    /// immediately, so no further run can fire after this returns.
    pub fn stop(&self) {
        let mut guard = self.shutdown.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            info!("session sweeper stopped");
        }
    }
}

/// Run a single sweep pass against `now`, returning how many sessions were
/// evicted. A session is evicted once it outlives the hard TTL, or the
/// empty TTL while holding no participants; age is measured from creation.
pub fn sweep_once(store: &SessionStore, policy: &SweepPolicy, now: DateTime<Utc>) -> usize {
    let mut evicted = 0;
    for session in store.list_all() {
        let age = (now - session.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        let expired = age > policy.hard_ttl;
        let empty_and_old = session.participants.is_empty() && age > policy.empty_ttl;

        if (expired || empty_and_old) && store.delete(&session.id) {
            evicted += 1;
            info!(
                session_id = %session.id,
                reason = if expired { "expired" } else { "empty" },
                "evicted session"
            );
        }
    }
    evicted
}
