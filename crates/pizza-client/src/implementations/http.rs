//! HTTP order client.
//!
//! Posts the order as JSON to a fixed URL and reads `{ "message": ... }` back.

use crate::{ClientError, OrderClientFactory, OrderClientInterface, OrderClientRegistry};
use async_trait::async_trait;
use pizza_types::{ImplementationRegistry, OrderRequest, OrderResponse};
use std::time::Duration;

/// Order endpoint used when none is configured.
pub const DEFAULT_ORDER_URL: &str = "http://localhost:9009/api/order";

/// reqwest-based order client.
pub struct HttpOrderClient {
	client: reqwest::Client,
	order_url: String,
}

impl HttpOrderClient {
	/// Creates a client for `order_url`.
	///
	/// Without a timeout a request waits as long as the connection stays open.
	pub fn new(order_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
		let order_url = order_url.into();
		if !(order_url.starts_with("http://") || order_url.starts_with("https://")) {
			return Err(ClientError::Configuration(format!(
				"order_url must start with http:// or https://, got '{}'",
				order_url
			)));
		}

		let mut builder = reqwest::Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| ClientError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self { client, order_url })
	}
}

#[async_trait]
impl OrderClientInterface for HttpOrderClient {
	async fn submit(&self, order: &OrderRequest) -> Result<OrderResponse, ClientError> {
		tracing::debug!(url = %self.order_url, "Posting order");

		let response = self
			.client
			.post(&self.order_url)
			.json(order)
			.send()
			.await
			.map_err(|e| ClientError::Network(e.to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(ClientError::Status(status.as_u16()));
		}

		response
			.json::<OrderResponse>()
			.await
			.map_err(|e| ClientError::InvalidResponse(e.to_string()))
	}

	fn endpoint(&self) -> String {
		self.order_url.clone()
	}
}

/// Factory function to create an HTTP order client from configuration.
///
/// Configuration parameters:
/// - `order_url` (optional): defaults to [`DEFAULT_ORDER_URL`]
/// - `timeout_seconds` (optional): request timeout, none by default
pub fn create_http_client(
	config: &toml::Value,
) -> Result<Box<dyn OrderClientInterface>, ClientError> {
	let order_url = match config.get("order_url") {
		Some(value) => value
			.as_str()
			.ok_or_else(|| ClientError::Configuration("order_url must be a string".into()))?,
		None => DEFAULT_ORDER_URL,
	};

	let timeout = match config.get("timeout_seconds") {
		Some(value) => {
			let seconds = value
				.as_integer()
				.filter(|s| *s > 0)
				.ok_or_else(|| {
					ClientError::Configuration("timeout_seconds must be a positive integer".into())
				})?;
			Some(Duration::from_secs(seconds as u64))
		},
		None => None,
	};

	Ok(Box::new(HttpOrderClient::new(order_url, timeout)?))
}

/// Registry for the HTTP client implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = OrderClientFactory;

	fn factory() -> Self::Factory {
		create_http_client
	}
}

impl OrderClientRegistry for Registry {}
