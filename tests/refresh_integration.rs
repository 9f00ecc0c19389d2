use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use docsift::config::SearchSettings;
use docsift::models::{CollectionSource, RawDocument};
use docsift::{
    RefreshOutcome, Result, SearchMetrics, SearchService, SourceLoader, StaticSourceLoader,
};

const TIMEOUT: Duration = Duration::from_secs(10);

fn corpus(version: &str, docs: usize) -> Vec<CollectionSource> {
    let mut alpha = CollectionSource::new("alpha", "https://docs.example.com/alpha");
    for i in 0..docs {
        alpha = alpha.with_document(RawDocument::new(
            format!("{}-{}", version, i),
            format!("Shared page {}", i),
            format!("shared {} content", version),
        ));
    }
    vec![alpha]
}

fn start(loader: Arc<dyn SourceLoader>) -> SearchService {
    SearchService::start(
        loader,
        SearchSettings::default(),
        Arc::new(SearchMetrics::new().unwrap()),
    )
    .unwrap()
}

/// Loader whose `load` blocks while the gate is closed
struct GatedLoader {
    inner: StaticSourceLoader,
    open: Mutex<bool>,
    cv: Condvar,
    loads: AtomicUsize,
}

impl GatedLoader {
    fn new(sources: Vec<CollectionSource>) -> Self {
        Self {
            inner: StaticSourceLoader::new(sources),
            open: Mutex::new(true),
            cv: Condvar::new(),
            loads: AtomicUsize::new(0),
        }
    }

    fn set_open(&self, open: bool) {
        *self.open.lock() = open;
        self.cv.notify_all();
    }

    fn wait_for_loads(&self, count: usize) {
        let deadline = Instant::now() + TIMEOUT;
        while self.loads.load(Ordering::SeqCst) < count {
            assert!(Instant::now() < deadline, "loader was not called");
            thread::sleep(Duration::from_millis(5));
        }
    }
}

impl SourceLoader for GatedLoader {
    fn load(&self) -> Result<Vec<CollectionSource>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock();
        while !*open {
            self.cv.wait(&mut open);
        }
        drop(open);
        self.inner.load()
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

#[test]
fn successful_refresh_advances_finished() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 2)));
    let service = start(loader.clone());
    let before = service.current();

    loader.replace(corpus("v2", 3));
    assert_eq!(service.trigger_refresh().unwrap(), RefreshOutcome::Scheduled);
    assert!(service.wait_for_generation(before.snapshot.generation + 1, TIMEOUT));

    let after = service.current();
    assert!(after.sync.finished.unwrap() > before.sync.finished.unwrap());
    assert_eq!(after.sync.finished, Some(after.snapshot.built_at));
    assert_eq!(after.snapshot.document_count(), 3);
}

#[test]
fn failed_refresh_keeps_snapshot_and_finished() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 2)));
    let service = start(loader.clone());
    let before = service.current();

    loader.fail_with("manifest store unreachable");
    service.trigger_refresh().unwrap();
    assert!(service.wait_idle(TIMEOUT));

    let after = service.current();
    assert_eq!(after.snapshot.generation, before.snapshot.generation);
    assert_eq!(after.snapshot.built_at, before.snapshot.built_at);
    assert_eq!(after.sync.finished, before.sync.finished);
    assert!(after.sync.started >= before.sync.started);
    assert_eq!(service.search("shared", None).unwrap().results.len(), 2);

    // the next good refresh recovers
    loader.clear_failure();
    service.trigger_refresh().unwrap();
    assert!(service.wait_for_generation(before.snapshot.generation + 1, TIMEOUT));
    assert!(service.current().sync.finished > before.sync.finished);
}

#[test]
fn malformed_sources_are_not_published() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 2)));
    let service = start(loader.clone());
    let before = service.current();

    let mut duplicate = corpus("v2", 1);
    duplicate.extend(corpus("v3", 1));
    loader.replace(duplicate);
    service.trigger_refresh().unwrap();
    assert!(service.wait_idle(TIMEOUT));

    assert_eq!(service.current().snapshot.generation, before.snapshot.generation);
    assert_eq!(service.current().sync.finished, before.sync.finished);
}

#[test]
fn triggers_coalesce_while_rebuilding() {
    let loader = Arc::new(GatedLoader::new(corpus("v1", 1)));
    let service = start(loader.clone());
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

    loader.set_open(false);
    assert_eq!(service.trigger_refresh().unwrap(), RefreshOutcome::Scheduled);
    // worker has taken the first trigger and is blocked inside load
    loader.wait_for_loads(2);

    assert_eq!(service.trigger_refresh().unwrap(), RefreshOutcome::Scheduled);
    for _ in 0..5 {
        assert_eq!(service.trigger_refresh().unwrap(), RefreshOutcome::Coalesced);
    }

    loader.set_open(true);
    assert!(service.wait_idle(TIMEOUT));

    // initial build plus one running and one queued rebuild
    assert_eq!(loader.loads.load(Ordering::SeqCst), 3);
    assert_eq!(service.current().snapshot.generation, 3);
}

#[test]
fn refresh_then_poll_status() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 1)));
    let service = start(loader.clone());
    let finished_before = service.current().sync.finished;

    service.trigger_refresh().unwrap();

    let deadline = Instant::now() + TIMEOUT;
    loop {
        if service.current().sync.finished > finished_before {
            break;
        }
        assert!(Instant::now() < deadline, "refresh did not finish in time");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn readers_never_see_a_mixed_snapshot() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 5)));
    let service = Arc::new(start(loader.clone()));
    let stop = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let results = service.search("shared", None).unwrap();
                    let v1 = results.results.iter().filter(|h| h.url.contains("/v1-")).count();
                    let v2 = results.results.iter().filter(|h| h.url.contains("/v2-")).count();
                    assert!(
                        (v1 == 5 && v2 == 0) || (v1 == 0 && v2 == 7),
                        "mixed results: {} v1, {} v2",
                        v1,
                        v2
                    );
                }
            })
        })
        .collect();

    for round in 0..6 {
        let (version, docs) = if round % 2 == 0 { ("v2", 7) } else { ("v1", 5) };
        loader.replace(corpus(version, docs));
        service.trigger_refresh().unwrap();
        assert!(service.wait_idle(TIMEOUT));
    }

    stop.store(true, Ordering::SeqCst);
    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn shutdown_drains_queued_rebuild() {
    let loader = Arc::new(StaticSourceLoader::new(corpus("v1", 1)));
    let service = start(loader.clone());

    loader.replace(corpus("v2", 2));
    service.trigger_refresh().unwrap();
    assert!(service.shutdown(TIMEOUT));

    assert_eq!(service.current().snapshot.generation, 2);
    assert!(service.trigger_refresh().is_err());
}
