//! Mock order client for development and testing.
//!
//! Answers every order from configuration without touching the network and
//! remembers what it was sent.

use crate::{ClientError, OrderClientFactory, OrderClientInterface, OrderClientRegistry};
use async_trait::async_trait;
use pizza_types::{ImplementationRegistry, OrderRequest, OrderResponse};
use std::time::Duration;
use tokio::sync::Mutex;

/// How the mock answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
	/// Accept with a fixed message, or the standard confirmation when `None`.
	Accept(Option<String>),
	/// Fail every request with a network error carrying this text.
	Fail(String),
}

/// Order client with a canned answer.
pub struct MockOrderClient {
	behavior: MockBehavior,
	/// Artificial latency before answering.
	delay: Option<Duration>,
	received: Mutex<Vec<OrderRequest>>,
}

impl MockOrderClient {
	pub fn new(behavior: MockBehavior) -> Self {
		Self {
			behavior,
			delay: None,
			received: Mutex::new(Vec::new()),
		}
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);
		self
	}

	/// Orders received so far, oldest first.
	pub async fn received(&self) -> Vec<OrderRequest> {
		self.received.lock().await.clone()
	}
}

#[async_trait]
impl OrderClientInterface for MockOrderClient {
	async fn submit(&self, order: &OrderRequest) -> Result<OrderResponse, ClientError> {
		self.received.lock().await.push(order.clone());

		if let Some(delay) = self.delay {
			tokio::time::sleep(delay).await;
		}

		match &self.behavior {
			MockBehavior::Accept(Some(message)) => Ok(OrderResponse {
				message: message.clone(),
			}),
			MockBehavior::Accept(None) => Ok(OrderResponse::confirmation(order)),
			MockBehavior::Fail(error) => Err(ClientError::Network(error.clone())),
		}
	}

	fn endpoint(&self) -> String {
		"mock".to_string()
	}
}

/// Factory function to create a mock client from configuration.
///
/// Configuration parameters:
/// - `message` (optional): fixed success message
/// - `fail_with` (optional): fail every order with this text; wins over `message`
/// - `delay_ms` (optional): latency before answering
pub fn create_mock_client(
	config: &toml::Value,
) -> Result<Box<dyn OrderClientInterface>, ClientError> {
	let string_option = |key: &str| -> Result<Option<String>, ClientError> {
		match config.get(key) {
			Some(value) => value
				.as_str()
				.map(|s| Some(s.to_string()))
				.ok_or_else(|| ClientError::Configuration(format!("{} must be a string", key))),
			None => Ok(None),
		}
	};

	let behavior = match string_option("fail_with")? {
		Some(error) => MockBehavior::Fail(error),
		None => MockBehavior::Accept(string_option("message")?),
	};

	let mut client = MockOrderClient::new(behavior);
	if let Some(value) = config.get("delay_ms") {
		let millis = value
			.as_integer()
			.filter(|ms| *ms >= 0)
			.ok_or_else(|| {
				ClientError::Configuration("delay_ms must be a non-negative integer".into())
			})?;
		client = client.with_delay(Duration::from_millis(millis as u64));
	}

	Ok(Box::new(client))
}

/// Registry for the mock client implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = OrderClientFactory;

	fn factory() -> Self::Factory {
		create_mock_client
	}
}

impl OrderClientRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn order() -> OrderRequest {
		OrderRequest {
			full_name: "Bob".into(),
			size: "S".into(),
			toppings: vec![],
		}
	}

	#[tokio::test]
	async fn test_accept_records_orders() {
		let client = MockOrderClient::new(MockBehavior::Accept(Some("Order placed".into())));

		let response = client.submit(&order()).await.unwrap();

		assert_eq!(response.message, "Order placed");
		assert_eq!(client.received().await, vec![order()]);
	}

	#[tokio::test]
	async fn test_default_message_is_confirmation() {
		let client = MockOrderClient::new(MockBehavior::Accept(None));
		let response = client.submit(&order()).await.unwrap();
		assert_eq!(response, OrderResponse::confirmation(&order()));
	}

	#[tokio::test]
	async fn test_factory_fail_wins() {
		let config: toml::Value =
			toml::from_str("message = \"ok\"\nfail_with = \"Network Error\"").unwrap();
		let client = create_mock_client(&config).unwrap();

		let err = client.submit(&order()).await.unwrap_err();

		assert_eq!(err.to_string(), "Network Error");
	}

	#[test]
	fn test_factory_rejects_bad_types() {
		let config: toml::Value = toml::from_str("delay_ms = -5").unwrap();
		assert!(create_mock_client(&config).is_err());
		let config: toml::Value = toml::from_str("message = 3").unwrap();
		assert!(create_mock_client(&config).is_err());
	}
}
