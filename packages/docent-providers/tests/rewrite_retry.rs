use std::{
	net::SocketAddr,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::post,
};
use serde_json::Map;
use tokio::net::TcpListener;

use docent_config::RewriteProviderConfig;
use docent_domain::Passage;
use docent_providers::{Error, rewrite};

#[derive(Clone, Copy)]
enum Reply {
	Unavailable,
	Blank,
	Slow,
	Answer(&'static str),
}

#[derive(Clone)]
struct Upstream {
	hits: Arc<AtomicUsize>,
	script: Arc<Vec<Reply>>,
}

async fn complete(State(upstream): State<Upstream>) -> Response {
	let hit = upstream.hits.fetch_add(1, Ordering::SeqCst);
	let reply = upstream
		.script
		.get(hit)
		.or_else(|| upstream.script.last())
		.copied()
		.unwrap_or(Reply::Unavailable);

	match reply {
		Reply::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "loading").into_response(),
		Reply::Blank => chat_completion("   "),
		Reply::Slow => {
			tokio::time::sleep(Duration::from_secs(5)).await;

			chat_completion("too late")
		},
		Reply::Answer(text) => chat_completion(text),
	}
}

fn chat_completion(content: &str) -> Response {
	Json(serde_json::json!({
		"choices": [{ "message": { "role": "assistant", "content": content } }]
	}))
	.into_response()
}

async fn serve(script: Vec<Reply>) -> (SocketAddr, Arc<AtomicUsize>) {
	let hits = Arc::new(AtomicUsize::new(0));
	let upstream = Upstream { hits: hits.clone(), script: Arc::new(script) };
	let app = Router::new().route("/chat/completions", post(complete)).with_state(upstream);
	let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind upstream.");
	let addr = listener.local_addr().expect("Failed to read upstream address.");

	tokio::spawn(async move {
		let _ = axum::serve(listener, app).await;
	});

	(addr, hits)
}

fn rewrite_config(addr: SocketAddr, api_key: &str) -> RewriteProviderConfig {
	RewriteProviderConfig {
		provider_id: "test".to_string(),
		api_base: format!("http://{addr}"),
		api_key: api_key.to_string(),
		path: "/chat/completions".to_string(),
		model: "test-rewrite".to_string(),
		temperature: 0.0,
		max_tokens: 300,
		timeout_ms: 2_000,
		max_attempts: 2,
		system_prompt: None,
		default_headers: Map::new(),
	}
}

fn passages() -> Vec<Passage> {
	vec![Passage::new("The pool opens at 6am.", 0.85)]
}

#[tokio::test]
async fn retries_after_a_failed_attempt() {
	let (addr, hits) =
		serve(vec![Reply::Unavailable, Reply::Answer("Answer: The pool opens at 6am daily.")])
			.await;
	let answer = rewrite::rewrite(&rewrite_config(addr, "key"), "Pool hours?", &passages())
		.await
		.expect("Failed to rewrite.");

	assert_eq!(answer, "The pool opens at 6am daily.");
	assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn blank_output_fails_every_attempt() {
	let (addr, hits) = serve(vec![Reply::Blank]).await;
	let result = rewrite::rewrite(&rewrite_config(addr, "key"), "Pool hours?", &passages()).await;

	assert!(matches!(result, Err(Error::InvalidResponse { .. })));
	assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn each_attempt_is_bounded_by_the_timeout() {
	let (addr, hits) = serve(vec![Reply::Slow]).await;
	let mut cfg = rewrite_config(addr, "key");

	cfg.timeout_ms = 100;

	let result = rewrite::rewrite(&cfg, "Pool hours?", &passages()).await;

	assert!(matches!(result, Err(Error::Reqwest(_))));
	assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
	let (addr, hits) = serve(vec![Reply::Answer("unused")]).await;
	let result = rewrite::rewrite(&rewrite_config(addr, ""), "Pool hours?", &passages()).await;

	assert!(matches!(result, Err(Error::InvalidConfig { .. })));
	assert_eq!(hits.load(Ordering::SeqCst), 0);
}
