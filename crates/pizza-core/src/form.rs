//! Order form view.
//!
//! [`OrderForm`] is a synchronous state machine. Every input returns the
//! [`Effect`]s it needs carried out (validations, the order request), and the
//! results come back through the `apply_*` methods together with the tag the
//! effect was issued with. A result whose tag is no longer the latest one for
//! its target is stale and changes nothing.

use crate::pages::{self, OrderPageState};
use crate::view::Element;
use pizza_client::ClientError;
use pizza_types::{
	topping, FieldErrors, FormField, FormValues, OrderResponse, OrderSchema, PizzaSize,
	SubmissionOutcome, ValidationError, TOPPINGS,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Fields validated on their own as the user edits them.
const VALIDATED_FIELDS: [FormField; 2] = [FormField::FullName, FormField::Size];

/// Work requested by the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
	/// Validate one field value against its rule.
	ValidateField {
		field: FormField,
		value: Value,
		tag: u64,
	},
	/// Validate the complete form to refresh the validity flag.
	CheckValidity { values: FormValues, tag: u64 },
	/// Send the order.
	Submit { order: FormValues, tag: u64 },
}

/// What happened to an async result handed back to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
	Applied,
	Stale,
}

/// State of the order form.
#[derive(Debug)]
pub struct OrderForm {
	schema: Arc<OrderSchema>,
	values: FormValues,
	errors: FieldErrors,
	outcome: Option<SubmissionOutcome>,
	valid: bool,
	last_tag: u64,
	field_tags: HashMap<FormField, u64>,
	validity_tag: u64,
	submissions_in_flight: usize,
}

impl OrderForm {
	pub fn new(schema: Arc<OrderSchema>) -> Self {
		Self {
			schema,
			values: FormValues::default(),
			errors: FieldErrors::default(),
			outcome: None,
			valid: false,
			last_tag: 0,
			field_tags: HashMap::new(),
			validity_tag: 0,
			submissions_in_flight: 0,
		}
	}

	pub fn values(&self) -> &FormValues {
		&self.values
	}

	pub fn errors(&self) -> &FieldErrors {
		&self.errors
	}

	pub fn outcome(&self) -> Option<&SubmissionOutcome> {
		self.outcome.as_ref()
	}

	/// Whether the last applied whole-form validation passed.
	pub fn is_valid(&self) -> bool {
		self.valid
	}

	pub fn is_submitting(&self) -> bool {
		self.submissions_in_flight > 0
	}

	pub fn change_name(&mut self, full_name: impl Into<String>) -> Vec<Effect> {
		self.values.full_name = full_name.into();
		self.field_changed(FormField::FullName)
	}

	/// Sets the size code; an empty string selects the placeholder.
	pub fn change_size(&mut self, size: impl Into<String>) -> Vec<Effect> {
		self.values.size = size.into();
		self.field_changed(FormField::Size)
	}

	/// Checks or unchecks a topping from the catalog.
	///
	/// Unknown ids and toggles that leave the selection unchanged produce no
	/// effects.
	pub fn toggle_topping(&mut self, id: &str, checked: bool) -> Vec<Effect> {
		if topping(id).is_none() {
			tracing::warn!(topping = %id, "Ignoring unknown topping");
			return Vec::new();
		}
		if !self.values.toggle_topping(id, checked) {
			return Vec::new();
		}
		vec![self.check_validity()]
	}

	/// Starts a submission if the current values pass the schema.
	///
	/// Clears the previous outcome. Nothing changes when validation fails.
	pub fn submit(&mut self) -> Result<Effect, ValidationError> {
		self.schema.validate(&self.values)?;

		self.outcome = None;
		self.submissions_in_flight += 1;
		let tag = self.issue_tag();
		Ok(Effect::Submit {
			order: self.values.clone(),
			tag,
		})
	}

	pub fn apply_field_validation(
		&mut self,
		field: FormField,
		tag: u64,
		result: Result<(), ValidationError>,
	) -> Resolution {
		if self.field_tags.get(&field) != Some(&tag) {
			return Resolution::Stale;
		}
		match result {
			Ok(()) => self.errors.clear(field),
			Err(err) => self.errors.set(field, err.to_string()),
		}
		Resolution::Applied
	}

	pub fn apply_validity(&mut self, tag: u64, valid: bool) -> Resolution {
		if tag != self.validity_tag {
			return Resolution::Stale;
		}
		self.valid = valid;
		Resolution::Applied
	}

	/// Records a settled submission.
	///
	/// Success resets values and errors, which supersedes any validation still
	/// in flight, and asks for a fresh validity check. Failure keeps the values.
	pub fn apply_submission(&mut self, result: Result<OrderResponse, ClientError>) -> Vec<Effect> {
		self.submissions_in_flight = self.submissions_in_flight.saturating_sub(1);

		match result {
			Ok(response) => {
				self.values = FormValues::default();
				self.errors = FieldErrors::default();
				self.outcome = Some(SubmissionOutcome::Success(response.message));
				for field in VALIDATED_FIELDS {
					let tag = self.issue_tag();
					self.field_tags.insert(field, tag);
				}
				vec![self.check_validity()]
			},
			Err(err) => {
				self.outcome = Some(SubmissionOutcome::Failure(err.to_string()));
				Vec::new()
			},
		}
	}

	fn issue_tag(&mut self) -> u64 {
		self.last_tag += 1;
		self.last_tag
	}

	fn field_changed(&mut self, field: FormField) -> Vec<Effect> {
		let tag = self.issue_tag();
		self.field_tags.insert(field, tag);
		vec![
			Effect::ValidateField {
				field,
				value: self.values.field_value(field),
				tag,
			},
			self.check_validity(),
		]
	}

	fn check_validity(&mut self) -> Effect {
		let tag = self.issue_tag();
		self.validity_tag = tag;
		Effect::CheckValidity {
			values: self.values.clone(),
			tag,
		}
	}

	pub fn page_state(&self) -> OrderPageState {
		OrderPageState {
			values: self.values.clone(),
			errors: self.errors.clone(),
			outcome: self.outcome.clone(),
			valid: self.valid,
		}
	}

	/// Browser markup of the form.
	pub fn to_html(&self) -> String {
		pages::render_order(self.page_state())
	}

	/// Terminal view of the form.
	pub fn render(&self) -> Element {
		let banner = self.outcome.as_ref().map(|outcome| {
			let class = if outcome.is_success() {
				"success"
			} else {
				"failure"
			};
			Element::new("div").attr("class", class).text(outcome.message())
		});

		let name_group = Element::new("div")
			.attr("class", "input-group")
			.child(
				Element::new("div")
					.child(
						Element::new("label")
							.attr("for", FormField::FullName.as_str())
							.text("FullName"),
					)
					.child(Element::new("br"))
					.child(
						Element::new("input")
							.attr("placeholder", "Type full name")
							.attr("id", FormField::FullName.as_str())
							.attr("name", FormField::FullName.as_str())
							.attr("type", "text")
							.attr("value", &self.values.full_name),
					),
			)
			.child_opt(self.error_for(FormField::FullName));

		let size_options = std::iter::once(
			Element::new("option")
				.attr("value", "")
				.flag("selected", self.values.size.is_empty())
				.text("----Choose Size----"),
		)
		.chain(PizzaSize::ALL.iter().map(|size| {
			Element::new("option")
				.attr("value", size.code())
				.flag("selected", self.values.size == size.code())
				.text(size.label())
		}));

		let size_group = Element::new("div")
			.attr("class", "input-group")
			.child(
				Element::new("div")
					.child(
						Element::new("label")
							.attr("for", FormField::Size.as_str())
							.text("Size"),
					)
					.child(Element::new("br"))
					.child(
						Element::new("select")
							.attr("id", FormField::Size.as_str())
							.attr("name", FormField::Size.as_str())
							.children(size_options),
					),
			)
			.child_opt(self.error_for(FormField::Size));

		let toppings_group = Element::new("div")
			.attr("class", "input-group")
			.children(TOPPINGS.iter().map(|option| {
				Element::new("label")
					.child(
						Element::new("input")
							.attr("name", option.id)
							.attr("type", "checkbox")
							.attr("value", option.id)
							.flag("checked", self.values.has_topping(option.id)),
					)
					.text(option.label)
					.child(Element::new("br"))
			}));

		Element::new("form")
			.child(Element::new("h2").text("Order Your Pizza"))
			.child_opt(banner)
			.child(name_group)
			.child(size_group)
			.child(toppings_group)
			.child(
				Element::new("input")
					.attr("type", "submit")
					.flag("disabled", !self.valid),
			)
	}

	fn error_for(&self, field: FormField) -> Option<Element> {
		let message = self.errors.get(field);
		(!message.is_empty()).then(|| Element::new("div").attr("class", "error").text(message))
	}
}
