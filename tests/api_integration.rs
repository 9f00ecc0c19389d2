use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeDelta};
use serde_json::{json, Value};
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

use docsift::config::{ScopePolicy, SearchSettings};
use docsift::freshness::{format_http_date, parse_http_date};
use docsift::models::{CollectionSource, RawDocument};
use docsift::{create_router, AppState, SearchMetrics, SearchService, StaticSourceLoader};

fn sources() -> Vec<CollectionSource> {
    vec![
        CollectionSource::new("alpha", "https://docs.example.com/alpha")
            .with_alias("a")
            .with_document(
                RawDocument::new("connect", "Connect", "connect with a driver")
                    .with_preview("Connecting"),
            ),
        CollectionSource::new("beta", "https://docs.example.com/beta")
            .with_document(
                RawDocument::new("agg", "Aggregation", "connect pipeline stages")
                    .with_preview("Pipelines"),
            ),
    ]
}

fn setup_app(settings: SearchSettings) -> (Arc<StaticSourceLoader>, Arc<SearchService>, Router) {
    let loader = Arc::new(StaticSourceLoader::new(sources()));
    let service = Arc::new(
        SearchService::start(
            loader.clone(),
            settings,
            Arc::new(SearchMetrics::new().unwrap()),
        )
        .unwrap(),
    );
    let app = create_router(AppState::new(Arc::clone(&service)));
    (loader, service, app)
}

async fn get(app: &Router, uri: &str, if_modified_since: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(value) = if_modified_since {
        request = request.header(header::IF_MODIFIED_SINCE, value);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn last_modified(response: &Response) -> String {
    response
        .headers()
        .get(header::LAST_MODIFIED)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn status_reports_sync_and_manifests() {
    let (_loader, service, app) = setup_app(SearchSettings::default());

    let response = get(&app, "/status", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=120, must-revalidate"
    );
    assert_eq!(
        last_modified(&response),
        format_http_date(service.current().snapshot.built_at)
    );

    let body = body_json(response).await;
    assert_eq!(body["manifests"], json!(["alpha", "beta"]));
    let finished = body["lastSync"]["finished"].as_str().unwrap();
    assert_eq!(
        DateTime::parse_from_rfc3339(finished).unwrap(),
        service.current().snapshot.built_at
    );
    assert!(body["lastSync"]["started"].is_string());
}

#[tokio::test]
async fn conditional_requests_return_not_modified() {
    let (_loader, _service, app) = setup_app(SearchSettings::default());

    for uri in ["/status", "/search?q=connect"] {
        let fresh = get(&app, uri, None).await;
        assert_eq!(fresh.status(), StatusCode::OK);
        let stamp = last_modified(&fresh);
        let full_body = body_bytes(fresh).await;

        let cached = get(&app, uri, Some(&stamp)).await;
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
        assert!(body_bytes(cached).await.is_empty());

        let later = parse_http_date(&stamp).unwrap() + TimeDelta::hours(1);
        let cached = get(&app, uri, Some(&format_http_date(later))).await;
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);

        let earlier = parse_http_date(&stamp).unwrap() - TimeDelta::seconds(1);
        let stale = get(&app, uri, Some(&format_http_date(earlier))).await;
        assert_eq!(stale.status(), StatusCode::OK);
        assert_eq!(body_bytes(stale).await, full_body);

        let garbage = get(&app, uri, Some("not a date")).await;
        assert_eq!(garbage.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn search_scopes_and_aliases() {
    let (_loader, _service, app) = setup_app(SearchSettings::default());

    let body = body_json(get(&app, "/search?q=aggregation&searchProperty=alpha", None).await).await;
    assert_eq!(body["results"], json!([]));

    let beta = body_json(get(&app, "/search?q=aggregation&searchProperty=beta", None).await).await;
    assert_eq!(
        beta["results"],
        json!([{
            "title": "Aggregation",
            "preview": "Pipelines",
            "url": "https://docs.example.com/beta/agg"
        }])
    );
    assert_eq!(beta["spellingCorrections"], json!({}));

    let unscoped = body_json(get(&app, "/search?q=aggregation", None).await).await;
    assert_eq!(unscoped, beta);

    let by_alias = body_json(get(&app, "/search?q=connect&searchProperty=a", None).await).await;
    let by_id = body_json(get(&app, "/search?q=connect&searchProperty=alpha", None).await).await;
    assert_eq!(by_alias, by_id);
    assert_eq!(by_id["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn search_degrades_gracefully() {
    let (_loader, _service, app) = setup_app(SearchSettings::default());

    let missing_q = get(&app, "/search", None).await;
    assert_eq!(missing_q.status(), StatusCode::OK);
    assert_eq!(
        body_json(missing_q).await,
        json!({ "results": [], "spellingCorrections": {} })
    );

    let unterminated = get(&app, "/search?q=%22connect%20driver", None).await;
    assert_eq!(unterminated.status(), StatusCode::OK);
    let body = body_json(unterminated).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let misspelled = body_json(get(&app, "/search?q=conect", None).await).await;
    assert_eq!(misspelled["results"], json!([]));
    assert_eq!(misspelled["spellingCorrections"], json!({ "conect": "connect" }));

    let unknown = get(&app, "/search?q=connect&searchProperty=gamma", None).await;
    assert_eq!(unknown.status(), StatusCode::OK);
    assert_eq!(body_json(unknown).await["results"], json!([]));

    // repeated parameters: the last q wins, scopes accumulate
    let repeated_q = get(&app, "/search?q=zzqqxx&q=aggregation", None).await;
    assert_eq!(repeated_q.status(), StatusCode::OK);
    let body = body_json(repeated_q).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["spellingCorrections"], json!({}));

    let repeated_scope =
        get(&app, "/search?q=connect&searchProperty=alpha&searchProperty=beta", None).await;
    assert_eq!(repeated_scope.status(), StatusCode::OK);
    let joined =
        body_json(get(&app, "/search?q=connect&searchProperty=alpha,beta", None).await).await;
    assert_eq!(body_json(repeated_scope).await, joined);
    assert_eq!(joined["results"].as_array().unwrap().len(), 2);

    for uri in ["/search?q=%FF%FE", "/search?q=conn%ZZ", "/search?q&q=&page=2"] {
        assert_eq!(get(&app, uri, None).await.status(), StatusCode::OK, "{}", uri);
    }
}

fn vary_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::VARY)
        .iter()
        .flat_map(|value| value.to_str().unwrap().split(','))
        .map(|value| value.trim().to_ascii_lowercase())
        .collect()
}

#[tokio::test]
async fn responses_are_compressed_with_cors_and_vary() {
    let (_loader, _service, app) = setup_app(SearchSettings::default());
    let uri = "/search?q=connect";

    let plain = get(&app, uri, None).await;
    assert_eq!(plain.status(), StatusCode::OK);
    assert!(plain.headers().get(header::CONTENT_ENCODING).is_none());
    let plain_vary = vary_values(&plain);
    assert_eq!(
        plain_vary.iter().filter(|v| *v == "accept-encoding").count(),
        1
    );
    let plain_body = body_bytes(plain).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::ACCEPT_ENCODING, "br")
                .header(header::ORIGIN, "https://docs.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get(header::CONTENT_ENCODING).unwrap(), "br");
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    let vary = vary_values(&response);
    assert_eq!(vary.iter().filter(|v| *v == "accept-encoding").count(), 1);

    let compressed = body_bytes(response).await;
    let mut decoded = Vec::new();
    brotli::Decompressor::new(compressed.as_slice(), 4096)
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, plain_body);
}

#[tokio::test]
async fn strict_scope_rejects_unknown_collection() {
    let (_loader, _service, app) =
        setup_app(SearchSettings::default().with_scope_policy(ScopePolicy::Strict));

    let response = get(&app, "/search?q=connect&searchProperty=alpha,gamma", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unknown_collection");
}

#[tokio::test]
async fn refresh_then_poll_status() {
    let (loader, service, app) = setup_app(SearchSettings::default());

    let before = get(&app, "/status", None).await;
    let stamp = last_modified(&before);
    let finished_before = body_json(before).await["lastSync"]["finished"].clone();

    loader.replace(vec![CollectionSource::new("gamma", "https://docs.example.com/gamma")
        .with_document(RawDocument::new("intro", "Gamma", "replica sets"))]);

    let response = post(&app, "/refresh").await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert!(
        outcome == json!({ "refresh": "scheduled" }) || outcome == json!({ "refresh": "coalesced" })
    );

    let deadline = Instant::now() + Duration::from_secs(10);
    let body = loop {
        let body = body_json(get(&app, "/status", None).await).await;
        if body["lastSync"]["finished"] != finished_before {
            break body;
        }
        assert!(Instant::now() < deadline, "refresh did not finish in time");
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    assert_eq!(body["manifests"], json!(["gamma"]));
    assert!(service.wait_idle(Duration::from_secs(10)));

    // the previous Last-Modified is now stale
    let response = get(&app, "/status", Some(&stamp)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(&app, "/search?q=replica", Some(&stamp)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_and_metrics() {
    let (_loader, _service, app) = setup_app(SearchSettings::default());

    let health = body_json(get(&app, "/health", None).await).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], docsift::VERSION);

    get(&app, "/search?q=connect", None).await;
    let response = get(&app, "/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.contains("docsift_searches_total"));
    assert!(text.contains("docsift_snapshot_generation 1"));
}
