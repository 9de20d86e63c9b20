//! # Integration Tests for the Remote Schema Source
//!
//! Runs [`RemoteSchemaSource`] against wiremock servers to check URL
//! construction, status handling and degradation, and the two places the
//! validator uses it: remote fallback for records without a local schema,
//! and pre-fetching the targets of synthetic wrappers.
//!
//! ## Note on `spawn_blocking`
//!
//! The source uses reqwest's blocking client, which owns an internal
//! runtime and must be neither built, used nor dropped on a Tokio worker
//! thread. Each test creates the source inside
//! `tokio::task::spawn_blocking` and lets it go out of scope there; only
//! plain data (`NamespaceUris`, results) crosses the closure boundary.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tdv_core::{
    DataCoordinates, DataRecord, NamespaceUris, SchemaIdentity, SchemaOrigin, SyntheticConfig,
    Version,
};
use tdv_fetch::RemoteSchemaSource;
use tdv_schema::{
    CatalogBuilder, FallbackChain, MismatchKind, SchemaSource, SyntheticSource, ValidationRun,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn uris_for(server: &MockServer) -> NamespaceUris {
    NamespaceUris::from_pairs([
        ("omh", format!("{}/schemas/omh/", server.uri())),
        ("ieee", format!("{}/ieee/", server.uri())),
    ])
    .expect("valid namespace table")
}

fn remote(uris: NamespaceUris, timeout: Duration) -> RemoteSchemaSource {
    RemoteSchemaSource::new(uris, timeout).expect("client build")
}

fn heart_rate() -> SchemaIdentity {
    SchemaIdentity::new("omh", "heart-rate", Version::new(1, 0)).expect("valid identity")
}

fn record(rel: &str, content: serde_json::Value) -> DataRecord {
    let coords = DataCoordinates::from_relative(Path::new(rel)).expect("valid coordinates");
    DataRecord::new(coords, content, rel)
}

// ── Fetch by identity ────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn fetch_schema_gets_canonical_uri() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/omh/heart-rate-1.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "object"})))
        .expect(1)
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let doc = tokio::task::spawn_blocking(move || {
        remote(uris, Duration::from_secs(5)).fetch_schema(&heart_rate())
    })
    .await
    .expect("join")
    .expect("fetch ok")
    .expect("document present");

    assert_eq!(doc.identity(), &heart_rate());
    assert_eq!(doc.content(), &json!({"type": "object"}));
    assert_eq!(
        doc.origin(),
        &SchemaOrigin::Remote(format!("{}/schemas/omh/heart-rate-1.0.json", server.uri()))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn not_found_is_no_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let result = tokio::task::spawn_blocking(move || {
        remote(uris, Duration::from_secs(5)).fetch_schema(&heart_rate())
    })
    .await
    .expect("join");
    assert!(result.expect("404 is not an error").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_is_degradable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        remote(uris, Duration::from_secs(5)).fetch_schema(&heart_rate())
    })
    .await
    .expect("join")
    .expect_err("503 must fail");
    assert!(err.is_degradable());
    assert!(err.to_string().contains("503"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn non_json_body_is_degradable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>moved</html>"))
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        remote(uris, Duration::from_secs(5)).fetch_schema(&heart_rate())
    })
    .await
    .expect("join")
    .expect_err("HTML body must fail");
    assert!(err.is_degradable());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let err = tokio::task::spawn_blocking(move || {
        remote(uris, Duration::from_millis(200)).fetch_schema(&heart_rate())
    })
    .await
    .expect("join")
    .expect_err("request must time out");
    assert!(err.is_degradable());
}

// ── Remote fallback during a run ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_falls_back_to_remote_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/omh/heart-rate-1.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "object",
            "required": ["heart_rate"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let report = tokio::task::spawn_blocking(move || {
        let fallback = FallbackChain::new().with(remote(uris.clone(), Duration::from_secs(5)));
        let catalog = CatalogBuilder::new(uris).finish().expect("empty catalog");
        ValidationRun::new(&catalog, &fallback).execute(&[record(
            "omh/heart-rate/1.0/shouldPass/resting.json",
            json!({}),
        )])
    })
    .await
    .expect("join")
    .expect("run completes");

    assert!(report.missing.is_empty());
    assert_eq!(report.validations, 1);
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(report.mismatches[0].kind, MismatchKind::ExpectedPassGotFail);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_remote_degrades_to_missing_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let report = tokio::task::spawn_blocking(move || {
        let fallback = FallbackChain::new().with(remote(uris.clone(), Duration::from_secs(5)));
        let catalog = CatalogBuilder::new(uris).finish().expect("empty catalog");
        ValidationRun::new(&catalog, &fallback).execute(&[record(
            "omh/heart-rate/1.0/shouldPass/resting.json",
            json!({}),
        )])
    })
    .await
    .expect("join")
    .expect("run completes");

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_namespace_is_missing_and_run_continues() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/omh/heart-rate-1.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "object"})))
        .expect(1)
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let report = tokio::task::spawn_blocking(move || {
        let fallback = FallbackChain::new().with(remote(uris.clone(), Duration::from_secs(5)));
        let catalog = CatalogBuilder::new(uris).finish().expect("empty catalog");
        ValidationRun::new(&catalog, &fallback).execute(&[
            record("acme/widget/1.0/shouldPass/a.json", json!({})),
            record("omh/heart-rate/1.0/shouldPass/b.json", json!({})),
        ])
    })
    .await
    .expect("join")
    .expect("run completes");

    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].target.to_string(), "acme:widget:1.0");
    assert_eq!(report.validations, 1, "the second record is still validated");
    assert!(report.mismatches.is_empty());
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unpublished_schema_is_requested_once_per_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/schemas/omh/heart-rate-1.0.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let report = tokio::task::spawn_blocking(move || {
        let fallback = FallbackChain::new().with(remote(uris.clone(), Duration::from_secs(5)));
        let catalog = CatalogBuilder::new(uris).finish().expect("empty catalog");
        ValidationRun::new(&catalog, &fallback).execute(&[
            record("omh/heart-rate/1.0/shouldPass/a.json", json!({})),
            record("omh/heart-rate/1.0/shouldFail/b.json", json!({})),
            record("omh/heart-rate/1.0/shouldPass/c.json", json!({})),
        ])
    })
    .await
    .expect("join")
    .expect("run completes");

    assert_eq!(report.missing.len(), 3);
    assert_eq!(report.validations, 0);
}

// ── Synthetic wrapper pre-fetch ──────────────────────────────────────────

fn synthetic_config(server: &MockServer) -> SyntheticConfig {
    SyntheticConfig {
        raw_base_url: format!("{}/raw/", server.uri()),
        directories: BTreeMap::from([
            ("time-interval".to_string(), "utility".to_string()),
            ("date-time".to_string(), "utility".to_string()),
        ]),
        ..SyntheticConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn synthetic_wrappers_validate_through_prefetched_targets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw/utility/time-interval-1.0.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "object",
            "required": ["start_date_time"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/utility/date-time-1.0.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let uris = uris_for(&server);
    let synthetic = SyntheticSource::new(synthetic_config(&server), uris.clone());

    let (registered, report) = tokio::task::spawn_blocking(move || {
        let source = remote(uris.clone(), Duration::from_secs(5));
        let mut builder = CatalogBuilder::new(uris);
        let registered = builder
            .load_synthetic(&synthetic, &source)
            .expect("synthetic load");
        let catalog = builder.finish().expect("freeze");
        let fallback = FallbackChain::new();
        let report = ValidationRun::new(&catalog, &fallback)
            .execute(&[
                record(
                    "ieee/time-interval/1.0/shouldPass/a.json",
                    json!({"start_date_time": "2021-01-01T00:00:00Z"}),
                ),
                record("ieee/time-interval/1.0/shouldFail/b.json", json!({})),
                record("ieee/date-time/1.0/shouldPass/c.json", json!("2021-01-01T00:00:00Z")),
            ])
            .expect("run completes");
        (registered, report)
    })
    .await
    .expect("join");

    assert_eq!(registered, 1, "date-time target is unpublished and skipped");
    assert_eq!(report.validations, 2);
    assert!(report.mismatches.is_empty(), "{:?}", report.mismatches);
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.missing[0].target.to_string(), "ieee:date-time:1.0");
}
