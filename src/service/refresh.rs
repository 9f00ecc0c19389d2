use arc_swap::ArcSwap;
use chrono::Utc;
use crossbeam::channel::{Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::ServiceState;
use crate::error::{DocsiftError, Result};
use crate::freshness::next_stamp;
use crate::index::{BuildStamp, IndexBuilder, IndexSnapshot};
use crate::metrics::SearchMetrics;
use crate::sources::SourceLoader;

/// What happened to a refresh request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// A rebuild was queued
    Scheduled,
    /// A rebuild was already queued; this request rides along with it
    Coalesced,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Scheduled => "scheduled",
            RefreshOutcome::Coalesced => "coalesced",
        }
    }
}

pub(crate) struct RefreshSignal;

/// Everything the refresh worker needs to load, build and publish
pub(crate) struct Publisher {
    pub(crate) state: ArcSwap<ServiceState>,
    loader: Arc<dyn SourceLoader>,
    builder: IndexBuilder,
    metrics: Arc<SearchMetrics>,
    /// Rebuilds queued or running
    pending: AtomicUsize,
    progress: (Mutex<()>, Condvar),
}

impl Publisher {
    pub(crate) fn new(
        loader: Arc<dyn SourceLoader>,
        builder: IndexBuilder,
        metrics: Arc<SearchMetrics>,
    ) -> Self {
        let empty = IndexSnapshot::empty(builder.tokenizer());
        Self {
            state: ArcSwap::from_pointee(ServiceState::new(Arc::new(empty), Default::default())),
            loader,
            builder,
            metrics,
            pending: AtomicUsize::new(0),
            progress: (Mutex::new(()), Condvar::new()),
        }
    }

    /// Load sources, build and publish a new snapshot
    ///
    /// Must only be called from one thread at a time. On failure the active
    /// snapshot and `finished` are left untouched.
    pub(crate) fn rebuild(&self) -> Result<Arc<IndexSnapshot>> {
        let current = self.state.load_full();
        self.state.store(Arc::new(ServiceState::new(
            Arc::clone(&current.snapshot),
            current.sync.begin(Utc::now()),
        )));

        let timer = Instant::now();
        let result = self.loader.load().and_then(|sources| {
            let stamp = BuildStamp {
                generation: current.snapshot.generation + 1,
                built_at: next_stamp(current.snapshot.built_at, Utc::now()),
            };
            self.builder.build(&sources, stamp)
        });
        let elapsed = timer.elapsed().as_secs_f64();

        let outcome = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let sync = self.state.load().sync.complete(snapshot.built_at);
                self.state
                    .store(Arc::new(ServiceState::new(Arc::clone(&snapshot), sync)));

                self.metrics.record_rebuild(
                    elapsed,
                    snapshot.generation,
                    snapshot.collections.len(),
                    snapshot.document_count(),
                );
                info!(
                    generation = snapshot.generation,
                    built_at = %snapshot.built_at,
                    source = %self.loader.describe(),
                    "Published index snapshot"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.metrics.record_rebuild_failure(elapsed);
                error!(
                    error = %e,
                    retriable = e.is_retriable(),
                    source = %self.loader.describe(),
                    active_generation = current.snapshot.generation,
                    "Refresh failed; keeping active snapshot"
                );
                Err(e)
            }
        };

        self.notify();
        outcome
    }

    fn notify(&self) {
        let (lock, cv) = &self.progress;
        let _g = lock.lock();
        cv.notify_all();
    }

    fn begin_request(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn finish_request(&self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.notify();
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    /// Block until `ready` holds or `timeout` elapses; returns the final check
    pub(crate) fn wait_until(&self, timeout: Duration, ready: impl Fn(&Self) -> bool) -> bool {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(Instant::now);
        let (lock, cv) = &self.progress;
        let mut guard = lock.lock();
        loop {
            if ready(self) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let _ = cv.wait_for(&mut guard, deadline - now);
        }
    }
}

/// Sending half of the worker's capacity-one queue
pub(crate) struct RefreshTrigger {
    tx: Sender<RefreshSignal>,
}

impl RefreshTrigger {
    /// Queue a rebuild unless one is already waiting
    pub(crate) fn trigger(&self, publisher: &Publisher) -> Result<RefreshOutcome> {
        publisher.begin_request();
        match self.tx.try_send(RefreshSignal) {
            Ok(()) => Ok(RefreshOutcome::Scheduled),
            Err(TrySendError::Full(_)) => {
                publisher.finish_request();
                Ok(RefreshOutcome::Coalesced)
            }
            Err(TrySendError::Disconnected(_)) => {
                publisher.finish_request();
                Err(DocsiftError::WorkerUnavailable)
            }
        }
    }
}

/// Spawn the refresh worker thread
pub(crate) fn spawn_worker(
    publisher: Arc<Publisher>,
) -> Result<(RefreshTrigger, thread::JoinHandle<()>)> {
    let (tx, rx): (Sender<RefreshSignal>, Receiver<RefreshSignal>) =
        crossbeam::channel::bounded(1);

    let handle = thread::Builder::new()
        .name("docsift-refresh".to_string())
        .spawn(move || {
            while let Ok(RefreshSignal) = rx.recv() {
                // Failures are logged and counted inside rebuild
                let _ = publisher.rebuild();
                publisher.finish_request();
            }
            debug!("Refresh worker stopped");
        })?;

    Ok((RefreshTrigger { tx }, handle))
}
