//! Configuration module for the pizza order application.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are resolved from the environment before parsing, and the result is
//! validated. Every section has defaults, so an empty file is a valid
//! configuration.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files:
//! - Use `include = ["client.toml", "api.toml"]` to include other config files
//! - Each top-level section must be unique across all files (no duplicates allowed)

mod loader;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// Name of the HTTP order client implementation.
pub const HTTP_CLIENT: &str = "http";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Text and assets of the views.
	#[serde(default)]
	pub ui: UiConfig,
	/// Which order client to use and how to reach the order endpoint.
	#[serde(default)]
	pub client: ClientConfig,
	/// Bind address of the local order API stub.
	pub api: Option<ApiConfig>,
}

/// Text and assets shown by the views.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
	/// Heading of the landing page.
	#[serde(default = "default_landing_heading")]
	pub landing_heading: String,
	/// Source of the landing image.
	#[serde(default = "default_image_src")]
	pub image_src: String,
}

impl Default for UiConfig {
	fn default() -> Self {
		Self {
			landing_heading: default_landing_heading(),
			image_src: default_image_src(),
		}
	}
}

fn default_landing_heading() -> String {
	"Welcome to Bloom Pizza!".to_string()
}

fn default_image_src() -> String {
	"images/pizza.jpg".to_string()
}

/// Order client selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
	/// Which implementation to use.
	#[serde(default = "default_client_primary")]
	pub primary: String,
	/// Map of client implementation names to their raw configurations.
	#[serde(default)]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			primary: default_client_primary(),
			implementations: HashMap::new(),
		}
	}
}

fn default_client_primary() -> String {
	HTTP_CLIENT.to_string()
}

impl ClientConfig {
	/// Returns the raw configuration of an implementation.
	///
	/// The `http` implementation works with no settings at all, so it resolves
	/// to an empty table when it is not listed.
	pub fn implementation(&self, name: &str) -> Option<toml::Value> {
		match self.implementations.get(name) {
			Some(value) => Some(value.clone()),
			None if name == HTTP_CLIENT => Some(toml::Value::Table(toml::map::Map::new())),
			None => None,
		}
	}
}

/// Configuration of the local order API stub.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Matches the port of the default order URL.
fn default_api_port() -> u16 {
	9009
}

/// Largest configuration text accepted, includes excluded.
const MAX_CONFIG_BYTES: usize = 1024 * 1024;

/// `${NAME}` or `${NAME:-default}`.
static ENV_REFERENCE: LazyLock<Result<Regex, regex::Error>> =
	LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}"));

/// Substitutes `${NAME}` and `${NAME:-default}` references from the
/// environment.
///
/// Fails on the first reference to an unset variable without a default.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	if input.len() > MAX_CONFIG_BYTES {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_CONFIG_BYTES
		)));
	}
	let pattern = ENV_REFERENCE
		.as_ref()
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = pattern.replace_all(input, |caps: &Captures| {
		let name = &caps[1];
		match (std::env::var(name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => {
				tracing::debug!(var = name, "Using default for unset variable");
				default.as_str().to_string()
			},
			(Err(_), None) => {
				missing.get_or_insert_with(|| name.to_string());
				String::new()
			},
		}
	});

	match missing {
		Some(name) => Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			name
		))),
		None => Ok(resolved.into_owned()),
	}
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Loads configuration from a file, or returns defaults if it does not exist.
	pub async fn from_file_or_default(path: &str) -> Result<Self, ConfigError> {
		if Path::new(path).exists() {
			Self::from_file(path).await
		} else {
			tracing::info!(path, "Config file not found, using defaults");
			Ok(Self::default())
		}
	}

	/// Returns the API stub settings, falling back to defaults.
	pub fn api_or_default(&self) -> ApiConfig {
		self.api.clone().unwrap_or_default()
	}

	/// Validates cross-field constraints that serde cannot express.
	///
	/// - The primary client must be configured (or be the implicit `http`)
	/// - An `http` client's `order_url` must be an http(s) URL
	/// - The API port must be non-zero
	fn validate(&self) -> Result<(), ConfigError> {
		if self.client.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Client primary implementation cannot be empty".into(),
			));
		}
		if self.client.implementation(&self.client.primary).is_none() {
			return Err(ConfigError::Validation(format!(
				"Primary client '{}' not found in implementations",
				self.client.primary
			)));
		}

		if let Some(http) = self.client.implementations.get(HTTP_CLIENT) {
			if let Some(url) = http.get("order_url") {
				match url.as_str() {
					Some(url) if url.starts_with("http://") || url.starts_with("https://") => {},
					Some(url) => {
						return Err(ConfigError::Validation(format!(
							"order_url must start with http:// or https://, got '{}'",
							url
						)));
					},
					None => {
						return Err(ConfigError::Validation(
							"order_url must be a string".into(),
						));
					},
				}
			}
		}

		if let Some(api) = &self.api {
			if api.port == 0 {
				return Err(ConfigError::Validation(
					"API port must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved first and the result is validated.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("PIZZA_TEST_HOST", "localhost");
		std::env::set_var("PIZZA_TEST_PORT", "9009");

		let input = "url = \"http://${PIZZA_TEST_HOST}:${PIZZA_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"http://localhost:9009\"");

		std::env::remove_var("PIZZA_TEST_HOST");
		std::env::remove_var("PIZZA_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${PIZZA_MISSING_VAR:-fallback}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"fallback\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let result = resolve_env_vars("value = \"${PIZZA_MISSING_VAR}\"");
		assert!(result.unwrap_err().to_string().contains("PIZZA_MISSING_VAR"));
	}

	#[test]
	fn test_first_missing_env_var_is_reported() {
		std::env::set_var("PIZZA_TEST_SET", "yes");

		let input = "a = \"${PIZZA_TEST_SET}\"\nb = \"${PIZZA_UNSET_B}\"\nc = \"${PIZZA_UNSET_C}\"";
		let err = resolve_env_vars(input).unwrap_err().to_string();
		assert!(err.contains("PIZZA_UNSET_B"));
		assert!(!err.contains("PIZZA_UNSET_C"));

		std::env::remove_var("PIZZA_TEST_SET");
	}

	#[test]
	fn test_non_references_left_alone() {
		let input = "a = \"${lower_case}\"\nb = \"$PLAIN\"\nc = \"${PIZZA_UNSET_D:-}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "a = \"${lower_case}\"\nb = \"$PLAIN\"\nc = \"\"");
	}

	#[test]
	fn test_oversized_config_rejected() {
		let input = "#".repeat(MAX_CONFIG_BYTES + 1);
		assert!(matches!(
			resolve_env_vars(&input),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_empty_config_uses_defaults() {
		let config: Config = "".parse().unwrap();
		assert_eq!(config.ui.landing_heading, "Welcome to Bloom Pizza!");
		assert_eq!(config.client.primary, HTTP_CLIENT);
		assert!(config.client.implementation(HTTP_CLIENT).is_some());
		assert!(config.api.is_none());
		assert_eq!(config.api_or_default().port, 9009);
	}

	#[test]
	fn test_full_config() {
		std::env::set_var("PIZZA_TEST_ORDER_URL", "http://orders.test/api/order");

		let config: Config = r#"
[ui]
landing_heading = "Hello"

[client]
primary = "mock"
[client.implementations.http]
order_url = "${PIZZA_TEST_ORDER_URL}"
timeout_seconds = 5
[client.implementations.mock]
message = "Order placed"

[api]
port = 9100
"#
		.parse()
		.unwrap();

		assert_eq!(config.ui.landing_heading, "Hello");
		assert_eq!(config.ui.image_src, "images/pizza.jpg");
		assert_eq!(config.client.primary, "mock");
		let http = config.client.implementation(HTTP_CLIENT).unwrap();
		assert_eq!(
			http.get("order_url").and_then(|v| v.as_str()),
			Some("http://orders.test/api/order")
		);
		let api = config.api.unwrap();
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 9100);

		std::env::remove_var("PIZZA_TEST_ORDER_URL");
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let result: Result<Config, _> = "[client]\nprimary = \"grpc\"".parse();
		let err = result.unwrap_err();
		assert!(matches!(err, ConfigError::Validation(_)));
		assert!(err.to_string().contains("grpc"));
	}

	#[test]
	fn test_bad_order_url_rejected() {
		let result: Result<Config, _> = r#"
[client.implementations.http]
order_url = "localhost:9009/api/order"
"#
		.parse();
		assert!(result.unwrap_err().to_string().contains("order_url"));
	}

	#[test]
	fn test_zero_port_rejected() {
		let result: Result<Config, _> = "[api]\nport = 0".parse();
		assert!(result.is_err());
	}

	#[test]
	fn test_parse_error_is_reported() {
		let result: Result<Config, _> = "[ui\nlanding_heading = 1".parse();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}
}
