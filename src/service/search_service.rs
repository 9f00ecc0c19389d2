use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::refresh::{spawn_worker, Publisher, RefreshOutcome, RefreshTrigger};
use super::ServiceState;
use crate::config::SearchSettings;
use crate::error::{DocsiftError, Result};
use crate::index::IndexBuilder;
use crate::metrics::SearchMetrics;
use crate::models::SearchResults;
use crate::query::QueryEngine;
use crate::sources::SourceLoader;

/// Handle shared by every request handler
///
/// Construction performs the initial build synchronously and fails if it
/// cannot produce a snapshot; afterwards rebuilds only happen on the
/// background worker.
pub struct SearchService {
    publisher: Arc<Publisher>,
    settings: SearchSettings,
    metrics: Arc<SearchMetrics>,
    trigger: Mutex<Option<RefreshTrigger>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SearchService {
    pub fn start(
        loader: Arc<dyn SourceLoader>,
        settings: SearchSettings,
        metrics: Arc<SearchMetrics>,
    ) -> Result<Self> {
        let builder = IndexBuilder::new(&settings);
        let publisher = Arc::new(Publisher::new(loader, builder, Arc::clone(&metrics)));

        let initial = publisher.rebuild()?;
        info!(
            collections = initial.collections.len(),
            documents = initial.document_count(),
            "Initial index ready"
        );

        let (trigger, worker) = spawn_worker(Arc::clone(&publisher))?;

        Ok(Self {
            publisher,
            settings,
            metrics,
            trigger: Mutex::new(Some(trigger)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Current snapshot and sync record
    pub fn current(&self) -> Arc<ServiceState> {
        self.publisher.state.load_full()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn metrics(&self) -> &Arc<SearchMetrics> {
        &self.metrics
    }

    /// Search the currently active snapshot
    pub fn search(&self, query: &str, scope: Option<&str>) -> Result<SearchResults> {
        let state = self.current();
        self.search_in(&state, query, scope)
    }

    /// Search a specific state, so callers can pair results with its build stamp
    pub fn search_in(
        &self,
        state: &ServiceState,
        query: &str,
        scope: Option<&str>,
    ) -> Result<SearchResults> {
        let start = Instant::now();
        let result = QueryEngine::new(&state.snapshot, &self.settings).search(query, scope);

        match &result {
            Ok(_) => {
                let scoped = scope.map(|s| !s.trim().is_empty()).unwrap_or(false);
                self.metrics
                    .record_search(scoped, start.elapsed().as_secs_f64());
            }
            Err(e) => {
                self.metrics.record_search_error();
                warn!(error = %e, "Search rejected");
            }
        }
        result
    }

    /// Ask the worker for a rebuild; never waits for it
    pub fn trigger_refresh(&self) -> Result<RefreshOutcome> {
        let guard = self.trigger.lock();
        let trigger = guard.as_ref().ok_or(DocsiftError::WorkerUnavailable)?;
        let outcome = trigger.trigger(&self.publisher)?;

        self.metrics.record_trigger(outcome.as_str());
        match outcome {
            RefreshOutcome::Scheduled => info!("Refresh scheduled"),
            RefreshOutcome::Coalesced => warn!("Refresh already queued; coalescing trigger"),
        }
        Ok(outcome)
    }

    /// Wait until a snapshot of at least `generation` is active
    pub fn wait_for_generation(&self, generation: u64, timeout: Duration) -> bool {
        self.publisher.wait_until(timeout, |p| {
            p.state.load().snapshot.generation >= generation
        })
    }

    /// Wait until no rebuild is queued or running
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.publisher.wait_until(timeout, Publisher::is_idle)
    }

    /// Stop accepting triggers and let any queued rebuild finish
    ///
    /// Returns `false` if the worker was still busy when `timeout` elapsed; the
    /// thread is then left to finish on its own.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.trigger.lock().take();

        if !self.wait_idle(timeout) {
            warn!(timeout_ms = timeout.as_millis() as u64, "Refresh still running at shutdown");
            return false;
        }

        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                warn!("Refresh worker panicked");
            }
        }
        true
    }
}

impl Drop for SearchService {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.trigger.get_mut().take();
    }
}
