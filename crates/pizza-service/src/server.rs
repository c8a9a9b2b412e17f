//! HTTP server for the local order API.
//!
//! Serves `POST /api/order` with permissive CORS so the form can post to it
//! from any origin during development.

use crate::apis::order::{handle_order, OrderError};
use axum::{
	extract::{rejection::JsonRejection, State},
	http::StatusCode,
	response::Json,
	routing::post,
	Router,
};
use pizza_config::ApiConfig;
use pizza_types::{OrderResponse, OrderSchema};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared state of the API server.
#[derive(Clone)]
pub struct AppState {
	/// Schema orders are validated against.
	pub schema: Arc<OrderSchema>,
}

/// Builds the router with every endpoint under `/api`.
pub fn router() -> Router {
	let state = AppState {
		schema: Arc::new(OrderSchema::new()),
	};

	Router::new()
		.nest("/api", Router::new().route("/order", post(order)))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Serves the API on an already bound listener.
pub async fn serve(listener: TcpListener) -> std::io::Result<()> {
	axum::serve(listener, router()).await
}

/// Binds to the configured address and serves until the process ends.
pub async fn start_server(api_config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order API starting on {}", bind_address);

	serve(listener).await?;
	Ok(())
}

/// Handles POST /api/order requests.
///
/// Bodies that are not JSON get the same 422 error document as invalid orders.
async fn order(
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
	let Json(body) = payload.map_err(|rejection| {
		tracing::warn!(status = %rejection.status(), error = %rejection.body_text(), "Unreadable order body");
		OrderError::from(rejection)
	})?;
	handle_order(&state.schema, body).await
}
