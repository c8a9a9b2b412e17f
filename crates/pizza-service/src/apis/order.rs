//! Order endpoint of the local order API.
//!
//! Accepts the form values as JSON, validates them with the same schema the
//! form uses and answers with a confirmation message.

use axum::{
	extract::rejection::JsonRejection,
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use pizza_types::{ErrorResponse, OrderRequest, OrderResponse, OrderSchema, ValidationError};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while processing an order.
#[derive(Debug, Error)]
pub enum OrderError {
	#[error("{0}")]
	Invalid(#[from] ValidationError),
	#[error("Malformed order: {0}")]
	Malformed(String),
}

impl From<JsonRejection> for OrderError {
	fn from(rejection: JsonRejection) -> Self {
		OrderError::Malformed(rejection.body_text())
	}
}

impl IntoResponse for OrderError {
	fn into_response(self) -> Response {
		let field = match &self {
			OrderError::Invalid(err) => err.field().map(str::to_string),
			OrderError::Malformed(_) => None,
		};
		let body = ErrorResponse {
			message: self.to_string(),
			field,
		};
		(StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
	}
}

/// Validates an order body and builds the confirmation for it.
pub fn process_order(schema: &OrderSchema, body: &Value) -> Result<OrderResponse, OrderError> {
	schema.validate_json(body)?;

	let order: OrderRequest = serde_json::from_value(body.clone())
		.map_err(|e| OrderError::Malformed(e.to_string()))?;

	let response = OrderResponse::confirmation(&order);
	info!(
		full_name = %order.full_name,
		size = %order.size,
		toppings = order.toppings.len(),
		"Order received"
	);
	Ok(response)
}

/// Handles `POST /api/order`.
pub async fn handle_order(
	schema: &OrderSchema,
	body: Value,
) -> Result<(StatusCode, Json<OrderResponse>), OrderError> {
	match process_order(schema, &body) {
		Ok(response) => Ok((StatusCode::CREATED, Json(response))),
		Err(e) => {
			warn!(error = %e, "Order rejected");
			Err(e)
		},
	}
}
