use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use docent_service::{AskRequest, AskResponse, DebugAskResponse, Error, StoredInteraction};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/ping", get(ping))
		.route("/health", get(health))
		.route("/ask", post(ask))
		.route("/debug/ask", post(debug_ask))
		.route("/debug/logs/latest", get(latest_log))
		.with_state(state)
}

async fn ping() -> Json<Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
	let response = state.service.ask(payload).await?;

	Ok(Json(response))
}

async fn debug_ask(
	State(state): State<AppState>,
	Json(payload): Json<AskRequest>,
) -> Result<Json<DebugAskResponse>, ApiError> {
	let response = state.service.debug_ask(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct LatestLogQuery {
	question: String,
}

async fn latest_log(
	State(state): State<AppState>,
	Query(query): Query<LatestLogQuery>,
) -> Result<Json<StoredInteraction>, ApiError> {
	match state.service.latest_interaction(&query.question).await? {
		Some(interaction) => Ok(Json(interaction)),
		None => Err(json_error(
			StatusCode::NOT_FOUND,
			"not_found",
			"No interaction has been logged for this question.",
			None,
		)),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } => json_error(
				StatusCode::BAD_REQUEST,
				"invalid_request",
				message,
				Some(vec!["$.question".to_string()]),
			),
			Error::Provider { message } =>
				json_error(StatusCode::BAD_GATEWAY, "provider_error", message, None),
			Error::Storage { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message, None),
			Error::Index { message } =>
				json_error(StatusCode::INTERNAL_SERVER_ERROR, "index_error", message, None),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
