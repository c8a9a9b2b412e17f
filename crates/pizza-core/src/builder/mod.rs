//! Builder for constructing the application from configuration.
//!
//! Picks the primary order client from the registered implementations, builds
//! the landing view from the UI section and shares one schema between the form
//! and its validation tasks.

use crate::engine::{event_bus::EventBus, App, AppHandle};
use crate::landing::LandingView;
use pizza_client::{create_client, OrderClientInterface};
use pizza_config::Config;
use pizza_types::OrderSchema;
use std::sync::Arc;
use thiserror::Error;

/// Capacity of the application event bus.
const EVENT_BUS_CAPACITY: usize = 1000;

/// Errors that can occur while building the application.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for an [`App`] and its handle.
pub struct AppBuilder {
	config: Config,
	client: Option<Arc<dyn OrderClientInterface>>,
}

impl AppBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			client: None,
		}
	}

	/// Uses `client` instead of the one named in configuration.
	pub fn with_client(mut self, client: Arc<dyn OrderClientInterface>) -> Self {
		self.client = Some(client);
		self
	}

	pub fn build(self) -> Result<(App, AppHandle), BuilderError> {
		let client = match self.client {
			Some(client) => client,
			None => {
				let primary = &self.config.client.primary;
				let raw = self.config.client.implementation(primary).ok_or_else(|| {
					BuilderError::MissingComponent(format!("client implementation '{}'", primary))
				})?;
				let client = create_client(primary, &raw).map_err(|e| {
					tracing::error!(
						component = "client",
						implementation = %primary,
						error = %e,
						"Failed to create order client"
					);
					BuilderError::Config(format!(
						"Failed to create client implementation '{}': {}",
						primary, e
					))
				})?;
				Arc::from(client)
			},
		};

		let landing = LandingView::new(&self.config.ui);
		let schema = Arc::new(OrderSchema::new());

		Ok(App::new(
			landing,
			schema,
			client,
			EventBus::new(EVENT_BUS_CAPACITY),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pizza_types::{Route, SubmissionOutcome, UiEvent};

	#[tokio::test]
	async fn test_builds_configured_mock_client() {
		let config: Config = r#"
[ui]
landing_heading = "Pizza!"
[client]
primary = "mock"
[client.implementations.mock]
message = "Order placed"
"#
		.parse()
		.unwrap();

		let (app, mut handle) = AppBuilder::new(config).build().unwrap();
		app.spawn();

		assert!(handle.snapshot().html.contains("Pizza!"));

		for event in [
			UiEvent::ImageClicked,
			UiEvent::NameChanged("Alice Smith".into()),
			UiEvent::SizeChanged("M".into()),
		] {
			handle.send(event).unwrap();
		}
		handle.settle().await.unwrap();
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = handle.settle().await.unwrap();

		assert_eq!(snapshot.route, Route::Order);
		assert_eq!(
			snapshot.outcome,
			Some(SubmissionOutcome::Success("Order placed".into()))
		);
	}

	#[test]
	fn test_default_config_uses_http_client() {
		assert!(AppBuilder::new(Config::default()).build().is_ok());
	}

	#[test]
	fn test_missing_primary_is_reported() {
		let mut config = Config::default();
		config.client.primary = "mock".into();

		let err = AppBuilder::new(config).build().err().unwrap();

		assert!(matches!(err, BuilderError::MissingComponent(_)));
	}

	#[test]
	fn test_bad_client_settings_are_config_errors() {
		let mut config = Config::default();
		config.client.implementations.insert(
			"http".into(),
			toml::from_str("timeout_seconds = -1").unwrap(),
		);

		let err = AppBuilder::new(config).build().err().unwrap();

		assert!(matches!(err, BuilderError::Config(_)));
	}
}
