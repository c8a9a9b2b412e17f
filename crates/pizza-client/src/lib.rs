//! Order submission module for the pizza order application.
//!
//! Defines the interface the order form uses to place an order, plus the
//! implementations selectable from configuration: an HTTP client for the real
//! endpoint and a canned mock for tests and offline runs.

use async_trait::async_trait;
use pizza_types::{ImplementationRegistry, OrderRequest, OrderResponse};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod mock;
}

/// Errors that can occur while placing an order.
///
/// The display form of each variant is what the order form shows in its
/// failure banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
	/// The request never produced a response.
	#[error("{0}")]
	Network(String),
	/// The server answered with a non-2xx status.
	#[error("Request failed with status code {0}")]
	Status(u16),
	/// The server answered 2xx but the body was not an order response.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The implementation could not be built from its configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for order clients.
///
/// One request per call; no retries, no cancellation.
#[async_trait]
pub trait OrderClientInterface: Send + Sync {
	/// Sends an order and returns the server's confirmation.
	async fn submit(&self, order: &OrderRequest) -> Result<OrderResponse, ClientError>;

	/// Describes where orders go, for logging.
	fn endpoint(&self) -> String;
}

/// Type alias for client factory functions.
pub type OrderClientFactory =
	fn(&toml::Value) -> Result<Box<dyn OrderClientInterface>, ClientError>;

/// Registry trait for order client implementations.
pub trait OrderClientRegistry: ImplementationRegistry<Factory = OrderClientFactory> {}

/// Returns every available client implementation with its config name.
pub fn get_all_implementations() -> Vec<(&'static str, OrderClientFactory)> {
	use implementations::{http, mock};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// Builds the named client from its raw configuration.
pub fn create_client(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn OrderClientInterface>, ClientError> {
	let factory = get_all_implementations()
		.into_iter()
		.find(|(implementation, _)| *implementation == name)
		.map(|(_, factory)| factory)
		.ok_or_else(|| {
			ClientError::Configuration(format!("Unknown client implementation: {}", name))
		})?;

	let client = factory(config)?;
	tracing::info!(component = "client", implementation = %name, endpoint = %client.endpoint(), "Loaded");
	Ok(client)
}
