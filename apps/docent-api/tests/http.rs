use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use docent_api::{routes, state::AppState};
use docent_config::RewriteProviderConfig;
use docent_domain::Passage;
use docent_service::{
	BoxFuture, DocentService, Error, Providers, Result, Retrieval, RewriteProvider, SearchIndex,
};
use docent_storage::db::Db;
use docent_testkit::TestDatabase;

struct FixedIndex(Vec<Passage>);
impl SearchIndex for FixedIndex {
	fn search<'a>(&'a self, _query: &'a str, _top_k: u32) -> BoxFuture<'a, Result<Retrieval>> {
		Box::pin(async move { Ok(Retrieval::Candidates(self.0.clone())) })
	}
}

struct DownRewrite;
impl RewriteProvider for DownRewrite {
	fn rewrite<'a>(
		&'a self,
		_cfg: &'a RewriteProviderConfig,
		_question: &'a str,
		_passages: &'a [Passage],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async { Err(Error::Provider { message: "offline".to_string() }) })
	}
}

async fn stub_app(test_db: &TestDatabase) -> Router {
	let cfg = test_db.config();
	let db = Db::connect(&cfg.storage.sqlite).await.expect("Failed to connect to SQLite.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let index = FixedIndex(vec![
		Passage::new("A", 0.55),
		Passage::new("B", 0.85),
		Passage::new("C", 0.10),
	]);
	let providers = Providers { rewrite: Arc::new(DownRewrite), ..Providers::default() };
	let service = DocentService::with_providers(cfg, db, Arc::new(index), providers);

	routes::router(AppState::from_service(service))
}

async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(uri)
				.header("content-type", "application/json")
				.body(Body::from(body.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call endpoint.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

	(status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
	let response = app
		.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("Failed to build request."))
		.await
		.expect("Failed to call endpoint.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

	(status, json)
}

#[tokio::test]
async fn ping_and_health_ok() {
	let test_db = TestDatabase::new().await.expect("Failed to create test database.");
	let app = stub_app(&test_db).await;
	let (status, json) = get(app.clone(), "/ping").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json, serde_json::json!({ "status": "ok" }));

	let (status, _) = get(app, "/health").await;

	assert_eq!(status, StatusCode::OK);

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn ask_returns_direct_answer_with_passages() {
	let test_db = TestDatabase::new().await.expect("Failed to create test database.");
	let app = stub_app(&test_db).await;
	let (status, json) = post_json(app, "/ask", r#"{"question":"pool hours?"}"#).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["question"], "pool hours?");
	assert_eq!(json["response_type"], "direct");
	assert_eq!(json["final_response"], "B");
	assert_eq!(json["score"].as_f64().map(|score| (score * 100.0).round()), Some(85.0));
	assert_eq!(json["raw_passages"][0]["text"], "B");
	assert_eq!(json["raw_passages"][1]["text"], "A");
	assert_eq!(json["filtered_out"][0]["text"], "C");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn debug_ask_exposes_settings_and_latest_log() {
	let test_db = TestDatabase::new().await.expect("Failed to create test database.");
	let app = stub_app(&test_db).await;
	let (status, json) = post_json(app.clone(), "/debug/ask", r#"{"question":"pool hours?"}"#).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["top_k"], 3);
	assert_eq!(json["response_type"], "direct");
	assert!(json["record_id"].as_i64().is_some());

	let (status, log) = get(app.clone(), "/debug/logs/latest?question=pool%20hours%3F").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(log["id"], json["record_id"]);
	assert_eq!(log["final_response"], "B");
	assert_eq!(log["response_type"], "direct");

	let (status, err) = get(app, "/debug/logs/latest?question=never").await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(err["error_code"], "not_found");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn bad_requests_are_rejected() {
	let test_db = TestDatabase::new().await.expect("Failed to create test database.");
	let app = stub_app(&test_db).await;
	let (status, json) = post_json(app.clone(), "/ask", r#"{"question":"  "}"#).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_request");

	let (status, _) = post_json(app.clone(), "/ask", r#"{"prompt":"hi"}"#).await;

	assert!(status.is_client_error());

	let (status, _) = post_json(app, "/ask", "not json").await;

	assert!(status.is_client_error());

	test_db.cleanup().await.expect("Failed to clean up test database.");
}

#[tokio::test]
async fn unindexed_service_still_answers_ok() {
	let test_db = TestDatabase::new().await.expect("Failed to create test database.");
	let state = AppState::new(test_db.config()).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let (status, json) = post_json(app, "/ask", r#"{"question":"anything"}"#).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["response_type"], "error");
	assert_eq!(json["final_response"], "No documents indexed yet.");

	test_db.cleanup().await.expect("Failed to clean up test database.");
}
