//! Application event loop.
//!
//! The [`App`] owns the router, both views and the form state, and runs on a
//! single tokio task. Hosts talk to it through an [`AppHandle`]: UI events go
//! in over an unbounded channel, an [`AppSnapshot`] comes back on a watch
//! channel after every processed message, and [`AppEvent`]s are broadcast on
//! the [`EventBus`].
//!
//! Validations and order requests run as spawned tasks that post their
//! results back into the same channel, so the loop applies everything in
//! arrival order without locks.

pub mod event_bus;

use crate::form::{Effect, OrderForm, Resolution};
use crate::landing::LandingView;
use crate::router::Router;
use crate::view::Element;
use event_bus::EventBus;
use pizza_client::{ClientError, OrderClientInterface};
use pizza_types::{
	AppEvent, FieldErrors, FormField, FormValues, OrderResponse, OrderSchema, Route,
	SubmissionOutcome, UiEvent, ValidationError,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Errors returned to hosts driving the application.
#[derive(Debug, Error)]
pub enum AppError {
	#[error("Application loop has stopped")]
	Stopped,
}

/// Everything a host needs to draw the current screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
	pub route: Route,
	pub values: FormValues,
	pub errors: FieldErrors,
	pub outcome: Option<SubmissionOutcome>,
	/// Whole-form validity; the submit control is disabled while false.
	pub valid: bool,
	pub submitting: bool,
	/// Terminal tree of the view at `route`.
	pub view: Element,
	/// Browser markup of the view at `route`.
	pub html: String,
	/// Number of UI events processed so far.
	pub processed: u64,
	/// Spawned validations and requests not yet applied.
	pub pending: usize,
}

/// Messages consumed by the loop.
#[derive(Debug)]
enum Message {
	Ui(UiEvent),
	Completed(Completion),
	Shutdown,
}

/// Results of spawned work.
#[derive(Debug)]
enum Completion {
	FieldValidated {
		field: FormField,
		tag: u64,
		result: Result<(), ValidationError>,
	},
	ValidityChecked {
		tag: u64,
		valid: bool,
	},
	SubmissionSettled {
		tag: u64,
		result: Result<OrderResponse, ClientError>,
	},
}

/// The application state and its event loop.
pub struct App {
	router: Router,
	landing: LandingView,
	form: OrderForm,
	schema: Arc<OrderSchema>,
	client: Arc<dyn OrderClientInterface>,
	event_bus: EventBus,
	inbox: mpsc::UnboundedReceiver<Message>,
	/// Weak so the loop ends once every handle and task is gone.
	outbox: mpsc::WeakUnboundedSender<Message>,
	snapshots: watch::Sender<AppSnapshot>,
	processed: u64,
	pending: usize,
}

impl App {
	/// Creates the application at the landing page and a handle to drive it.
	pub fn new(
		landing: LandingView,
		schema: Arc<OrderSchema>,
		client: Arc<dyn OrderClientInterface>,
		event_bus: EventBus,
	) -> (Self, AppHandle) {
		let (tx, inbox) = mpsc::unbounded_channel();
		let form = OrderForm::new(Arc::clone(&schema));
		let router = Router::default();

		let initial = AppSnapshot {
			route: router.current(),
			values: form.values().clone(),
			errors: form.errors().clone(),
			outcome: None,
			valid: form.is_valid(),
			submitting: false,
			view: landing.render(),
			html: landing.to_html(),
			processed: 0,
			pending: 0,
		};
		let (snapshots, snapshot_rx) = watch::channel(initial);

		let app = Self {
			router,
			landing,
			form,
			schema,
			client,
			event_bus: event_bus.clone(),
			inbox,
			outbox: tx.downgrade(),
			snapshots,
			processed: 0,
			pending: 0,
		};
		let handle = AppHandle {
			inbox: tx,
			snapshots: snapshot_rx,
			event_bus,
			sent: Arc::new(AtomicU64::new(0)),
		};
		(app, handle)
	}

	/// Runs the loop on a new task.
	pub fn spawn(self) -> JoinHandle<()> {
		tokio::spawn(self.run())
	}

	/// Processes messages until shutdown or until every handle is dropped.
	pub async fn run(mut self) {
		tracing::info!(route = %self.router.current(), "Application started");

		while let Some(message) = self.inbox.recv().await {
			match message {
				Message::Ui(event) => {
					self.processed += 1;
					self.handle_ui(event);
				},
				Message::Completed(completion) => {
					self.pending = self.pending.saturating_sub(1);
					self.handle_completion(completion);
				},
				Message::Shutdown => break,
			}
			self.publish_snapshot();
		}

		tracing::info!("Application stopped");
	}

	fn handle_ui(&mut self, event: UiEvent) {
		match event {
			UiEvent::ImageClicked => {
				if self.router.current() != Route::Home {
					tracing::debug!(route = %self.router.current(), "No image to click here");
					return;
				}
				let to = self.landing.on_image_click();
				self.navigate(to);
			},
			UiEvent::Navigate(to) => self.navigate(to),
			UiEvent::NameChanged(full_name) => {
				if self.on_form("name change") {
					let effects = self.form.change_name(full_name);
					self.spawn_effects(effects);
				}
			},
			UiEvent::SizeChanged(size) => {
				if self.on_form("size change") {
					let effects = self.form.change_size(size);
					self.spawn_effects(effects);
				}
			},
			UiEvent::ToppingToggled { id, checked } => {
				if self.on_form("topping toggle") {
					let effects = self.form.toggle_topping(&id, checked);
					self.spawn_effects(effects);
				}
			},
			UiEvent::SubmitClicked => {
				if !self.on_form("submit") {
					return;
				}
				match self.form.submit() {
					Ok(effect) => self.spawn_effects(vec![effect]),
					Err(err) => {
						tracing::warn!(reason = %err, "Submit rejected, form is invalid");
						self.event_bus
							.publish(AppEvent::SubmitRejected {
								reason: err.to_string(),
							})
							.ok();
					},
				}
			},
		}
	}

	fn on_form(&self, action: &str) -> bool {
		let on_form = self.router.current() == Route::Order;
		if !on_form {
			tracing::debug!(action, route = %self.router.current(), "Ignoring form input off the order page");
		}
		on_form
	}

	fn navigate(&mut self, to: Route) {
		if let Some(from) = self.router.navigate(to) {
			tracing::info!(%from, %to, "Navigated");
			self.event_bus
				.publish(AppEvent::Navigated { from, to })
				.ok();
		}
	}

	fn handle_completion(&mut self, completion: Completion) {
		match completion {
			Completion::FieldValidated { field, tag, result } => {
				let message = result.as_ref().err().map(ToString::to_string);
				match self.form.apply_field_validation(field, tag, result) {
					Resolution::Applied => {
						tracing::debug!(%field, tag, error = ?message, "Field validated");
						self.event_bus
							.publish(AppEvent::FieldValidated { field, message })
							.ok();
					},
					Resolution::Stale => self.discard(Some(field), tag),
				}
			},
			Completion::ValidityChecked { tag, valid } => {
				let was_valid = self.form.is_valid();
				match self.form.apply_validity(tag, valid) {
					Resolution::Applied if was_valid != valid => {
						tracing::debug!(tag, valid, "Form validity changed");
						self.event_bus
							.publish(AppEvent::ValidityChanged { valid })
							.ok();
					},
					Resolution::Applied => {},
					Resolution::Stale => self.discard(None, tag),
				}
			},
			Completion::SubmissionSettled { tag, result } => {
				let event = match &result {
					Ok(response) => {
						tracing::info!(tag, message = %response.message, "Order accepted");
						AppEvent::SubmissionSucceeded {
							tag,
							message: response.message.clone(),
						}
					},
					Err(err) => {
						tracing::warn!(tag, error = %err, "Order failed");
						AppEvent::SubmissionFailed {
							tag,
							message: err.to_string(),
						}
					},
				};
				let effects = self.form.apply_submission(result);
				self.event_bus.publish(event).ok();
				self.spawn_effects(effects);
			},
		}
	}

	fn discard(&self, field: Option<FormField>, tag: u64) {
		tracing::debug!(field = ?field, tag, "Discarding stale validation result");
		self.event_bus
			.publish(AppEvent::StaleResultDiscarded { field, tag })
			.ok();
	}

	fn spawn_effects(&mut self, effects: Vec<Effect>) {
		for effect in effects {
			self.spawn_effect(effect);
		}
	}

	fn spawn_effect(&mut self, effect: Effect) {
		let Some(outbox) = self.outbox.upgrade() else {
			return;
		};
		self.pending += 1;

		match effect {
			Effect::ValidateField { field, value, tag } => {
				let schema = Arc::clone(&self.schema);
				tokio::spawn(async move {
					let result = schema.validate_value(field, &value);
					outbox
						.send(Message::Completed(Completion::FieldValidated {
							field,
							tag,
							result,
						}))
						.ok();
				});
			},
			Effect::CheckValidity { values, tag } => {
				let schema = Arc::clone(&self.schema);
				tokio::spawn(async move {
					let valid = schema.is_valid(&values);
					outbox
						.send(Message::Completed(Completion::ValidityChecked { tag, valid }))
						.ok();
				});
			},
			Effect::Submit { order, tag } => {
				tracing::info!(
					tag,
					full_name = %order.full_name,
					size = %order.size,
					toppings = order.toppings.len(),
					"Submitting order"
				);
				self.event_bus
					.publish(AppEvent::SubmissionStarted {
						tag,
						order: order.clone(),
					})
					.ok();

				let client = Arc::clone(&self.client);
				tokio::spawn(async move {
					let result = client.submit(&order).await;
					outbox
						.send(Message::Completed(Completion::SubmissionSettled { tag, result }))
						.ok();
				});
			},
		}
	}

	fn publish_snapshot(&self) {
		let route = self.router.current();
		let (view, html) = match route {
			Route::Home => (self.landing.render(), self.landing.to_html()),
			Route::Order => (self.form.render(), self.form.to_html()),
		};
		self.snapshots.send_replace(AppSnapshot {
			route,
			values: self.form.values().clone(),
			errors: self.form.errors().clone(),
			outcome: self.form.outcome().cloned(),
			valid: self.form.is_valid(),
			submitting: self.form.is_submitting(),
			view,
			html,
			processed: self.processed,
			pending: self.pending,
		});
	}
}

/// Cloneable handle for feeding events to a running [`App`].
#[derive(Clone)]
pub struct AppHandle {
	inbox: mpsc::UnboundedSender<Message>,
	snapshots: watch::Receiver<AppSnapshot>,
	event_bus: EventBus,
	/// UI events sent through any clone of this handle.
	sent: Arc<AtomicU64>,
}

impl AppHandle {
	pub fn send(&self, event: UiEvent) -> Result<(), AppError> {
		self.sent.fetch_add(1, Ordering::SeqCst);
		self.inbox
			.send(Message::Ui(event))
			.map_err(|_| AppError::Stopped)
	}

	/// The latest published snapshot.
	pub fn snapshot(&self) -> AppSnapshot {
		self.snapshots.borrow().clone()
	}

	pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
		self.event_bus.subscribe()
	}

	/// Waits until a snapshot satisfies `predicate`.
	pub async fn wait_for(
		&mut self,
		mut predicate: impl FnMut(&AppSnapshot) -> bool,
	) -> Result<AppSnapshot, AppError> {
		let snapshot = self
			.snapshots
			.wait_for(|snapshot| predicate(snapshot))
			.await
			.map_err(|_| AppError::Stopped)?;
		Ok((*snapshot).clone())
	}

	/// Waits until every event sent so far is processed and all spawned work
	/// has been applied.
	pub async fn settle(&mut self) -> Result<AppSnapshot, AppError> {
		let sent = self.sent.load(Ordering::SeqCst);
		self.wait_for(|snapshot| snapshot.processed >= sent && snapshot.pending == 0)
			.await
	}

	/// Asks the loop to stop after the messages already queued.
	pub fn shutdown(&self) -> Result<(), AppError> {
		self.inbox
			.send(Message::Shutdown)
			.map_err(|_| AppError::Stopped)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use mockall::mock;
	use pizza_client::implementations::mock::{MockBehavior, MockOrderClient};
	use pizza_config::UiConfig;
	use pizza_types::{OrderRequest, FULL_NAME_TOO_SHORT};
	use std::time::Duration;

	mock! {
		pub Client {}

		#[async_trait]
		impl OrderClientInterface for Client {
			async fn submit(&self, order: &OrderRequest) -> Result<OrderResponse, ClientError>;
			fn endpoint(&self) -> String;
		}
	}

	fn start(client: Arc<dyn OrderClientInterface>) -> AppHandle {
		let (app, handle) = App::new(
			LandingView::new(&UiConfig::default()),
			Arc::new(OrderSchema::new()),
			client,
			EventBus::new(64),
		);
		app.spawn();
		handle
	}

	async fn settle(handle: &mut AppHandle) -> AppSnapshot {
		tokio::time::timeout(Duration::from_secs(5), handle.settle())
			.await
			.expect("loop did not settle")
			.unwrap()
	}

	fn fill(handle: &AppHandle, name: &str, size: &str, toppings: &[&str]) {
		handle.send(UiEvent::Navigate(Route::Order)).unwrap();
		handle.send(UiEvent::NameChanged(name.into())).unwrap();
		handle.send(UiEvent::SizeChanged(size.into())).unwrap();
		for id in toppings {
			handle
				.send(UiEvent::ToppingToggled {
					id: id.to_string(),
					checked: true,
				})
				.unwrap();
		}
	}

	fn submit_disabled(snapshot: &AppSnapshot) -> bool {
		snapshot
			.view
			.find(&|el| el.get_attr("type") == Some("submit"))
			.map(|el| el.has_attr("disabled"))
			.unwrap()
	}

	#[tokio::test]
	async fn test_image_click_opens_order_form() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));
		let mut events = handle.subscribe();
		assert_eq!(handle.snapshot().route, Route::Home);
		assert!(handle.snapshot().view.find_by_id("fullName").is_none());

		handle.send(UiEvent::ImageClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(snapshot.route, Route::Order);
		assert!(snapshot.view.find_by_id("fullName").is_some());
		assert_eq!(
			events.recv().await.unwrap(),
			AppEvent::Navigated {
				from: Route::Home,
				to: Route::Order
			}
		);
	}

	#[tokio::test]
	async fn test_form_input_ignored_on_landing() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));

		handle.send(UiEvent::NameChanged("Alice".into())).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(snapshot.values, FormValues::default());
		assert_eq!(snapshot.processed, 1);
	}

	#[tokio::test]
	async fn test_short_name_keeps_form_invalid() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));

		fill(&handle, "Al", "M", &[]);
		let snapshot = settle(&mut handle).await;

		assert!(!snapshot.valid);
		assert_eq!(snapshot.errors.full_name, FULL_NAME_TOO_SHORT);
		assert_eq!(snapshot.errors.size, "");
		assert!(submit_disabled(&snapshot));
	}

	#[tokio::test]
	async fn test_valid_form_enables_submit() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));

		fill(&handle, "Alice Smith", "M", &["1", "3"]);
		let snapshot = settle(&mut handle).await;

		assert!(snapshot.valid);
		assert!(snapshot.errors.is_empty());
		assert_eq!(snapshot.values.toppings, vec!["1", "3"]);
		assert!(!submit_disabled(&snapshot));
	}

	#[tokio::test]
	async fn test_successful_order_resets_form() {
		let client = Arc::new(MockOrderClient::new(MockBehavior::Accept(Some(
			"Order placed".into(),
		))));
		let mut handle = start(client.clone());

		fill(&handle, "Alice Smith", "M", &["1", "3"]);
		settle(&mut handle).await;
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(
			snapshot.outcome,
			Some(SubmissionOutcome::Success("Order placed".into()))
		);
		assert_eq!(snapshot.values, FormValues::default());
		assert!(snapshot.errors.is_empty());
		assert!(!snapshot.valid);
		assert_eq!(
			snapshot.view.find_by_class("success").map(|el| el.text_content()),
			Some("Order placed".into())
		);

		let received = client.received().await;
		assert_eq!(received.len(), 1);
		assert_eq!(received[0].full_name, "Alice Smith");
		assert_eq!(received[0].toppings, vec!["1", "3"]);
	}

	#[tokio::test]
	async fn test_failed_order_keeps_values() {
		let client = Arc::new(MockOrderClient::new(MockBehavior::Fail("Network Error".into())));
		let mut handle = start(client);
		let mut events = handle.subscribe();

		fill(&handle, "Alice Smith", "L", &["2"]);
		settle(&mut handle).await;
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(
			snapshot.outcome,
			Some(SubmissionOutcome::Failure("Network Error".into()))
		);
		assert_eq!(snapshot.values.full_name, "Alice Smith");
		assert_eq!(snapshot.values.size, "L");
		assert_eq!(snapshot.values.toppings, vec!["2"]);
		assert!(snapshot.valid);
		assert_eq!(
			snapshot.view.find_by_class("failure").map(|el| el.text_content()),
			Some("Network Error".into())
		);

		let mut failed = None;
		while let Ok(event) = events.try_recv() {
			if let AppEvent::SubmissionFailed { message, .. } = event {
				failed = Some(message);
			}
		}
		assert_eq!(failed.as_deref(), Some("Network Error"));
	}

	#[tokio::test]
	async fn test_invalid_submit_never_reaches_client() {
		let mut client = MockClient::new();
		client.expect_submit().never();
		let mut handle = start(Arc::new(client));
		let mut events = handle.subscribe();

		fill(&handle, "Al", "", &[]);
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert!(snapshot.outcome.is_none());
		assert!(!snapshot.submitting);

		let mut rejected = None;
		while let Ok(event) = events.try_recv() {
			if let AppEvent::SubmitRejected { reason } = event {
				rejected = Some(reason);
			}
		}
		assert_eq!(rejected.as_deref(), Some(FULL_NAME_TOO_SHORT));
	}

	#[tokio::test]
	async fn test_submit_sends_current_values_once() {
		let mut client = MockClient::new();
		client
			.expect_submit()
			.withf(|order| order.full_name == "Bob Stone" && order.size == "S")
			.times(1)
			.returning(|order| Ok(OrderResponse::confirmation(order)));
		let mut handle = start(Arc::new(client));

		fill(&handle, "Bob Stone", "S", &[]);
		settle(&mut handle).await;
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		let message = snapshot.outcome.map(|o| o.message().to_string()).unwrap();
		assert!(message.contains("Bob Stone"));
	}

	#[tokio::test]
	async fn test_status_error_text_is_shown() {
		let mut client = MockClient::new();
		client
			.expect_submit()
			.returning(|_| Err(ClientError::Status(500)));
		let mut handle = start(Arc::new(client));

		fill(&handle, "Alice Smith", "M", &[]);
		settle(&mut handle).await;
		handle.send(UiEvent::SubmitClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(
			snapshot.outcome,
			Some(SubmissionOutcome::Failure(
				"Request failed with status code 500".into()
			))
		);
	}

	#[tokio::test]
	async fn test_last_edit_wins() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));

		handle.send(UiEvent::Navigate(Route::Order)).unwrap();
		for name in ["A", "Al", "Alice", "Alice Smith Jones Johnson", "Alice"] {
			handle.send(UiEvent::NameChanged(name.into())).unwrap();
		}
		handle.send(UiEvent::SizeChanged("S".into())).unwrap();
		let snapshot = settle(&mut handle).await;

		assert_eq!(snapshot.values.full_name, "Alice");
		assert_eq!(snapshot.errors.full_name, "");
		assert!(snapshot.valid);
	}

	#[tokio::test]
	async fn test_superseded_validation_is_discarded() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));
		let mut events = handle.subscribe();

		// both edits land before either validation task gets to run
		handle.send(UiEvent::Navigate(Route::Order)).unwrap();
		handle.send(UiEvent::NameChanged("A".into())).unwrap();
		handle.send(UiEvent::NameChanged("Alice Smith".into())).unwrap();
		let snapshot = settle(&mut handle).await;

		let mut discarded = Vec::new();
		let mut name_results = Vec::new();
		while let Ok(event) = events.try_recv() {
			match event {
				AppEvent::StaleResultDiscarded { field, tag } => discarded.push((field, tag)),
				AppEvent::FieldValidated {
					field: FormField::FullName,
					message,
				} => name_results.push(message),
				_ => {},
			}
		}

		// tags 1 and 2 belong to the first edit, 3 and 4 to the second
		assert_eq!(discarded.len(), 2);
		assert!(discarded.contains(&(Some(FormField::FullName), 1)));
		assert!(discarded.contains(&(None, 2)));
		assert_eq!(name_results, vec![None]);
		assert_eq!(snapshot.errors.full_name, "");
		assert_eq!(snapshot.values.full_name, "Alice Smith");
	}

	#[tokio::test]
	async fn test_snapshot_html_follows_route() {
		let mut handle = start(Arc::new(MockOrderClient::new(MockBehavior::Accept(None))));
		assert!(handle.snapshot().html.contains("alt=\"order-pizza\""));

		handle.send(UiEvent::ImageClicked).unwrap();
		let snapshot = settle(&mut handle).await;

		assert!(snapshot.html.contains("<h2>Order Your Pizza</h2>"));
		assert!(!snapshot.html.contains("order-pizza"));
	}

	#[tokio::test]
	async fn test_shutdown_stops_loop() {
		let (app, handle) = App::new(
			LandingView::new(&UiConfig::default()),
			Arc::new(OrderSchema::new()),
			Arc::new(MockOrderClient::new(MockBehavior::Accept(None))),
			EventBus::new(8),
		);
		let task = app.spawn();

		handle.shutdown().unwrap();
		tokio::time::timeout(Duration::from_secs(5), task)
			.await
			.unwrap()
			.unwrap();

		assert!(matches!(
			handle.send(UiEvent::ImageClicked),
			Err(AppError::Stopped)
		));
	}
}
