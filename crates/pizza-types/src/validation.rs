//! Declarative validation for order input.
//!
//! A [`Schema`] is an ordered list of named fields. Each field has an expected
//! type and a chain of rules, and every rule carries the human-readable message
//! reported when it fails. Fields can be checked one value at a time with
//! [`Schema::validate_at`] or as a whole object with [`Schema::validate`].

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// A rule attached to the field rejected the value.
	///
	/// The display form is the rule's message alone, so it can be shown to the
	/// user verbatim.
	#[error("{message}")]
	Rule { field: String, message: String },
	/// The value does not have the type the field expects.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	/// The schema has no field with this name.
	#[error("Unknown field: {0}")]
	UnknownField(String),
	/// Whole-object validation was given something other than an object.
	#[error("Expected an object, got {0}")]
	NotAnObject(String),
}

impl ValidationError {
	/// Returns the name of the field this error belongs to, if any.
	pub fn field(&self) -> Option<&str> {
		match self {
			ValidationError::Rule { field, .. } | ValidationError::TypeMismatch { field, .. } => {
				Some(field)
			},
			ValidationError::UnknownField(field) => Some(field),
			ValidationError::NotAnObject(_) => None,
		}
	}
}

/// Represents the type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
	/// A string value.
	String,
	/// An array of values, all of the same type.
	Array(Box<FieldType>),
}

impl FieldType {
	fn name(&self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Array(_) => "array",
		}
	}
}

/// Predicate run against a field value by a [`Rule`].
pub type RuleCheck = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A single constraint on a field together with its failure message.
pub struct Rule {
	pub message: String,
	check: RuleCheck,
}

impl Rule {
	pub fn new<F>(message: impl Into<String>, check: F) -> Self
	where
		F: Fn(&Value) -> bool + Send + Sync + 'static,
	{
		Self {
			message: message.into(),
			check: Box::new(check),
		}
	}

	fn passes(&self, value: &Value) -> bool {
		(self.check)(value)
	}
}

impl std::fmt::Debug for Rule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rule")
			.field("message", &self.message)
			.finish_non_exhaustive()
	}
}

/// A named field in a schema.
///
/// Built with the chaining helpers below, for example
/// `Field::new("fullName", FieldType::String).min_length(3, "too short")`.
/// Rules run in the order they were added and the first failing one wins.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	/// Message reported when the value is missing or empty.
	pub required: Option<String>,
	pub rules: Vec<Rule>,
}

impl Field {
	/// Creates an optional field with no rules.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			required: None,
			rules: Vec::new(),
		}
	}

	/// Marks the field as required.
	///
	/// `null`, a missing value, and the empty string all fail this check.
	pub fn required(mut self, message: impl Into<String>) -> Self {
		self.required = Some(message.into());
		self
	}

	/// Requires at least `min` characters (strings) or items (arrays).
	pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
		self.with_rule(message, move |value| {
			length_of(value).is_some_and(|len| len >= min)
		})
	}

	/// Allows at most `max` characters (strings) or items (arrays).
	pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
		self.with_rule(message, move |value| {
			length_of(value).is_some_and(|len| len <= max)
		})
	}

	/// Restricts a string field to a fixed set of values.
	pub fn one_of(self, allowed: &[&str], message: impl Into<String>) -> Self {
		let allowed: Vec<String> = allowed.iter().map(|s| s.to_string()).collect();
		self.with_rule(message, move |value| {
			value
				.as_str()
				.is_some_and(|s| allowed.iter().any(|a| a == s))
		})
	}

	/// Adds a custom rule.
	pub fn with_rule<F>(mut self, message: impl Into<String>, check: F) -> Self
	where
		F: Fn(&Value) -> bool + Send + Sync + 'static,
	{
		self.rules.push(Rule::new(message, check));
		self
	}

	/// Validates a single value against this field.
	///
	/// Order of checks: presence, type, then each rule in insertion order.
	/// An absent optional field passes without running its rules.
	pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
		if value.is_null() {
			return match &self.required {
				Some(message) => Err(self.rule_error(message)),
				None => Ok(()),
			};
		}

		validate_field_type(&self.name, value, &self.field_type)?;

		if let Some(message) = &self.required {
			if value.as_str().is_some_and(str::is_empty) {
				return Err(self.rule_error(message));
			}
		}

		for rule in &self.rules {
			if !rule.passes(value) {
				return Err(self.rule_error(&rule.message));
			}
		}

		Ok(())
	}

	fn rule_error(&self, message: &str) -> ValidationError {
		ValidationError::Rule {
			field: self.name.clone(),
			message: message.to_string(),
		}
	}
}

/// An ordered set of fields validated together.
#[derive(Debug)]
pub struct Schema {
	pub fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Self { fields }
	}

	/// Looks up the sub-schema for one field.
	pub fn reach(&self, name: &str) -> Result<&Field, ValidationError> {
		self.fields
			.iter()
			.find(|field| field.name == name)
			.ok_or_else(|| ValidationError::UnknownField(name.to_string()))
	}

	/// Validates one value in isolation against the named field.
	pub fn validate_at(&self, name: &str, value: &Value) -> Result<(), ValidationError> {
		self.reach(name)?.validate(value)
	}

	/// Validates a whole object, stopping at the first failing field.
	///
	/// Fields are checked in declaration order. Keys the schema does not
	/// declare are ignored.
	pub fn validate(&self, object: &Value) -> Result<(), ValidationError> {
		let table = as_object(object)?;
		for field in &self.fields {
			field.validate(table.get(&field.name).unwrap_or(&Value::Null))?;
		}
		Ok(())
	}

	/// Validates a whole object and collects the first error of every field.
	pub fn validate_all(&self, object: &Value) -> Vec<ValidationError> {
		let table = match as_object(object) {
			Ok(table) => table,
			Err(e) => return vec![e],
		};
		self.fields
			.iter()
			.filter_map(|field| {
				field
					.validate(table.get(&field.name).unwrap_or(&Value::Null))
					.err()
			})
			.collect()
	}

	/// Returns whether the whole object passes.
	pub fn is_valid(&self, object: &Value) -> bool {
		self.validate(object).is_ok()
	}
}

fn as_object(value: &Value) -> Result<&serde_json::Map<String, Value>, ValidationError> {
	value
		.as_object()
		.ok_or_else(|| ValidationError::NotAnObject(json_type(value).to_string()))
}

/// Character count for strings, item count for arrays.
fn length_of(value: &Value) -> Option<usize> {
	match value {
		Value::String(s) => Some(s.chars().count()),
		Value::Array(items) => Some(items.len()),
		_ => None,
	}
}

fn json_type(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

/// Checks that a value matches the expected type, recursing into arrays.
fn validate_field_type(
	field_name: &str,
	value: &Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	let mismatch = || ValidationError::TypeMismatch {
		field: field_name.to_string(),
		expected: expected_type.name().to_string(),
		actual: json_type(value).to_string(),
	};

	match expected_type {
		FieldType::String => {
			if !value.is_string() {
				return Err(mismatch());
			}
		},
		FieldType::Array(inner_type) => {
			let array = value.as_array().ok_or_else(mismatch)?;
			for (i, item) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
		},
	}

	Ok(())
}
