//! Payloads exchanged with the order endpoint.

use crate::order::{FormValues, PizzaSize};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/order`.
pub type OrderRequest = FormValues;

/// Successful response from the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
	/// Confirmation text shown to the customer verbatim.
	pub message: String,
}

impl OrderResponse {
	/// Builds the confirmation the order API sends for an accepted order.
	///
	/// `order` is expected to have passed validation; an unknown size code is
	/// echoed as-is.
	pub fn confirmation(order: &OrderRequest) -> Self {
		let size = order
			.size
			.parse::<PizzaSize>()
			.map(|size| size.label().to_lowercase())
			.unwrap_or_else(|_| order.size.clone());
		let toppings = match order.toppings.len() {
			0 => "no toppings".to_string(),
			1 => "1 topping".to_string(),
			n => format!("{} toppings", n),
		};

		Self {
			message: format!(
				"Thank you for your order, {}! Your {} pizza with {} is on the way.",
				order.full_name, size, toppings
			),
		}
	}
}

/// Error body returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub message: String,
	/// Wire name of the offending field, when the error is a validation failure.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<String>,
}
