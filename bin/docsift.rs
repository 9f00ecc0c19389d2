use anyhow::{Context, Result};
use clap::Parser;
use docsift::{
    parse_source_spec, AppState, RefreshSettings, ScopePolicy, SearchMetrics, SearchService,
    SearchSettings, ServiceConfig, TokenizerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "docsift")]
#[command(about = "Multi-collection documentation search service", long_about = None)]
struct Args {
    /// Address the HTTP API binds to
    #[arg(long, env = "DOCSIFT_BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind_addr: String,

    /// Manifest source, e.g. dir:./manifests
    #[arg(long, env = "DOCSIFT_SOURCE", default_value = "dir:./manifests")]
    source: String,

    /// Seconds between automatic refreshes (0 disables)
    #[arg(long, env = "DOCSIFT_REFRESH_INTERVAL", default_value = "0")]
    refresh_interval: u64,

    /// How unknown searchProperty names are handled (lenient, strict)
    #[arg(long, env = "DOCSIFT_SCOPE_POLICY", default_value = "lenient")]
    scope_policy: String,

    /// Maximum number of results per search
    #[arg(long, env = "DOCSIFT_MAX_RESULTS", default_value = "150")]
    max_results: usize,

    /// Enable English stemming for documents and queries
    #[arg(long, env = "DOCSIFT_STEM")]
    stem: bool,

    /// Drop English stopwords from documents and queries
    #[arg(long, env = "DOCSIFT_STOPWORDS")]
    stopwords: bool,

    /// Milliseconds to wait for a running rebuild at shutdown
    #[arg(long, env = "DOCSIFT_DRAIN_TIMEOUT_MS", default_value = "30000")]
    drain_timeout_ms: u64,
}

impl Args {
    fn into_config(self) -> ServiceConfig {
        let scope_policy = ScopePolicy::parse(&self.scope_policy).unwrap_or_else(|| {
            warn!("Unknown scope policy '{}', using 'lenient'", self.scope_policy);
            ScopePolicy::Lenient
        });

        let tokenizer = TokenizerConfig {
            stem: self.stem,
            remove_stopwords: self.stopwords,
            ..TokenizerConfig::default()
        };

        let search = SearchSettings::default()
            .with_scope_policy(scope_policy)
            .with_max_results(self.max_results)
            .with_tokenizer(tokenizer);

        let mut config = ServiceConfig::new(self.bind_addr, self.source)
            .with_search(search)
            .with_refresh_interval(Some(self.refresh_interval));
        config.refresh = RefreshSettings {
            drain_timeout_ms: self.drain_timeout_ms,
            ..config.refresh
        };
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Args::parse().into_config();

    info!("Starting docsift v{}", docsift::VERSION);
    info!("  Bind address: {}", config.bind_addr);
    info!("  Source: {}", config.source);
    info!("  Scope policy: {:?}", config.search.scope_policy);
    info!("  Refresh interval: {:?}", config.refresh.interval());

    let loader = parse_source_spec(&config.source)
        .with_context(|| format!("Invalid source '{}'", config.source))?;
    let metrics = Arc::new(SearchMetrics::new()?);

    // The initial build must succeed; there is nothing to serve otherwise
    let search_settings = config.search.clone();
    let service = tokio::task::spawn_blocking(move || {
        SearchService::start(Arc::from(loader), search_settings, metrics)
    })
    .await?
    .context("Initial index build failed")?;
    let service = Arc::new(service);

    if let Some(interval) = config.refresh.interval() {
        spawn_periodic_refresh(Arc::clone(&service), interval);
    }

    let app = docsift::create_router(AppState::new(Arc::clone(&service)));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("HTTP API server listening on {}", config.bind_addr);

    // Serve HTTP API
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Received shutdown signal, gracefully shutting down");
        })
        .await?;

    let drain_timeout = config.refresh.drain_timeout();
    let drained = tokio::task::spawn_blocking(move || service.shutdown(drain_timeout)).await?;
    if !drained {
        warn!("Exiting with a rebuild still in progress");
    }

    Ok(())
}

fn spawn_periodic_refresh(service: Arc<SearchService>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately and the initial build already ran
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = service.trigger_refresh() {
                warn!("Periodic refresh stopped: {}", e);
                break;
            }
        }
    });
}
