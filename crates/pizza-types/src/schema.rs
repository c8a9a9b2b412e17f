//! The order form schema.
//!
//! One [`OrderSchema`] is built at startup and shared by reference; it holds
//! no mutable state, so field checks and whole-form checks can run from any
//! task.

use crate::order::{FormField, FormValues, PizzaSize};
use crate::validation::{Field, FieldType, Schema, ValidationError};
use serde_json::Value;

pub const FULL_NAME_TOO_SHORT: &str = "full name must be at least 3 characters";
pub const FULL_NAME_TOO_LONG: &str = "full name must be at most 20 characters";
pub const SIZE_INCORRECT: &str = "size must be S or M or L";

pub const FULL_NAME_MIN_CHARS: usize = 3;
pub const FULL_NAME_MAX_CHARS: usize = 20;

/// Validation rules for [`FormValues`].
#[derive(Debug)]
pub struct OrderSchema {
	schema: Schema,
}

impl OrderSchema {
	pub fn new() -> Self {
		let sizes: Vec<&str> = PizzaSize::ALL.iter().map(PizzaSize::code).collect();

		// An empty name reads as "too short" rather than a separate required message.
		let schema = Schema::new(vec![
			Field::new(FormField::FullName.as_str(), FieldType::String)
				.required(FULL_NAME_TOO_SHORT)
				.min_length(FULL_NAME_MIN_CHARS, FULL_NAME_TOO_SHORT)
				.max_length(FULL_NAME_MAX_CHARS, FULL_NAME_TOO_LONG),
			Field::new(FormField::Size.as_str(), FieldType::String)
				.required(SIZE_INCORRECT)
				.one_of(&sizes, SIZE_INCORRECT),
			Field::new(
				FormField::Toppings.as_str(),
				FieldType::Array(Box::new(FieldType::String)),
			),
		]);

		Self { schema }
	}

	/// Validates a single raw value against one field's rules.
	pub fn validate_value(&self, field: FormField, value: &Value) -> Result<(), ValidationError> {
		self.schema.validate_at(field.as_str(), value)
	}

	/// Validates one field of the form in isolation.
	pub fn validate_field(
		&self,
		field: FormField,
		values: &FormValues,
	) -> Result<(), ValidationError> {
		self.validate_value(field, &values.field_value(field))
	}

	/// Validates the whole form, returning the first violation.
	pub fn validate(&self, values: &FormValues) -> Result<(), ValidationError> {
		self.schema.validate(&values.to_value())
	}

	/// Validates an arbitrary JSON body, as received by the order API.
	pub fn validate_json(&self, body: &Value) -> Result<(), ValidationError> {
		self.schema.validate(body)
	}

	/// Returns the first violation of every failing field.
	pub fn violations(&self, values: &FormValues) -> Vec<ValidationError> {
		self.schema.validate_all(&values.to_value())
	}

	pub fn is_valid(&self, values: &FormValues) -> bool {
		self.validate(values).is_ok()
	}
}

impl Default for OrderSchema {
	fn default() -> Self {
		Self::new()
	}
}
