//! Runs the order API on an ephemeral port and talks to it over HTTP.

use pizza_client::implementations::http::HttpOrderClient;
use pizza_client::{ClientError, OrderClientInterface};
use pizza_config::Config;
use pizza_core::AppBuilder;
use pizza_service::server;
use pizza_types::{ErrorResponse, FormValues, SubmissionOutcome, UiEvent, SIZE_INCORRECT};
use std::time::Duration;
use tokio::net::TcpListener;

/// Starts the API and returns the order URL.
async fn start_api() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(server::serve(listener));
	format!("http://{}/api/order", addr)
}

fn order(name: &str, size: &str, toppings: &[&str]) -> FormValues {
	FormValues {
		full_name: name.into(),
		size: size.into(),
		toppings: toppings.iter().map(|t| t.to_string()).collect(),
	}
}

#[tokio::test]
async fn test_accepts_valid_order() {
	let url = start_api().await;
	let client = HttpOrderClient::new(url, Some(Duration::from_secs(5))).unwrap();

	let response = client
		.submit(&order("Alice Smith", "M", &["1", "3"]))
		.await
		.unwrap();

	assert_eq!(
		response.message,
		"Thank you for your order, Alice Smith! Your medium pizza with 2 toppings is on the way."
	);
}

#[tokio::test]
async fn test_rejects_invalid_order() {
	let url = start_api().await;

	let response = reqwest::Client::new()
		.post(&url)
		.json(&order("Alice Smith", "XL", &[]))
		.send()
		.await
		.unwrap();

	assert_eq!(response.status().as_u16(), 422);
	let body: ErrorResponse = response.json().await.unwrap();
	assert_eq!(body.message, SIZE_INCORRECT);
	assert_eq!(body.field.as_deref(), Some("size"));

	let client = HttpOrderClient::new(url, None).unwrap();
	let err = client.submit(&order("Al", "S", &[])).await.unwrap_err();
	assert_eq!(err, ClientError::Status(422));
	assert_eq!(err.to_string(), "Request failed with status code 422");
}

#[tokio::test]
async fn test_unreadable_body_gets_error_document() {
	let url = start_api().await;
	let http = reqwest::Client::new();

	let broken = http
		.post(&url)
		.header("Content-Type", "application/json")
		.body("{not json")
		.send()
		.await
		.unwrap();
	assert_eq!(broken.status().as_u16(), 422);
	let body: ErrorResponse = broken.json().await.unwrap();
	assert!(body.message.starts_with("Malformed order: "));
	assert_eq!(body.field, None);

	let untyped = http
		.post(&url)
		.body(r#"{"fullName":"Alice Smith","size":"M","toppings":[]}"#)
		.send()
		.await
		.unwrap();
	assert_eq!(untyped.status().as_u16(), 422);
	let body: ErrorResponse = untyped.json().await.unwrap();
	assert!(body.message.contains("Content-Type"));
	assert_eq!(body.field, None);
}

#[tokio::test]
async fn test_cors_preflight_allowed() {
	let url = start_api().await;

	let response = reqwest::Client::new()
		.request(reqwest::Method::OPTIONS, &url)
		.header("Origin", "http://localhost:3000")
		.header("Access-Control-Request-Method", "POST")
		.send()
		.await
		.unwrap();

	assert!(response.status().is_success());
	assert!(response
		.headers()
		.contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_form_submits_to_api() {
	let url = start_api().await;
	let config: Config = format!(
		"[client.implementations.http]\norder_url = \"{}\"\ntimeout_seconds = 5\n",
		url
	)
	.parse()
	.unwrap();

	let (app, mut handle) = AppBuilder::new(config).build().unwrap();
	app.spawn();

	for event in [
		UiEvent::ImageClicked,
		UiEvent::NameChanged("Bob Stone".into()),
		UiEvent::SizeChanged("L".into()),
		UiEvent::ToppingToggled {
			id: "5".into(),
			checked: true,
		},
	] {
		handle.send(event).unwrap();
	}
	assert!(handle.settle().await.unwrap().valid);

	handle.send(UiEvent::SubmitClicked).unwrap();
	let snapshot = tokio::time::timeout(Duration::from_secs(10), handle.settle())
		.await
		.unwrap()
		.unwrap();

	assert_eq!(
		snapshot.outcome,
		Some(SubmissionOutcome::Success(
			"Thank you for your order, Bob Stone! Your large pizza with 1 topping is on the way."
				.into()
		))
	);
	assert_eq!(snapshot.values, FormValues::default());
}
