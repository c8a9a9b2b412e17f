//! Order form data model.
//!
//! Defines the values a customer edits, the per-field error messages shown
//! next to them, the static topping catalog and the outcome of a submission.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// The fields of the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
	FullName,
	Size,
	Toppings,
}

impl FormField {
	/// All fields in display order.
	pub const ALL: [FormField; 3] = [FormField::FullName, FormField::Size, FormField::Toppings];

	/// Returns the wire name of the field.
	pub fn as_str(&self) -> &'static str {
		match self {
			FormField::FullName => "fullName",
			FormField::Size => "size",
			FormField::Toppings => "toppings",
		}
	}
}

impl fmt::Display for FormField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Current values of the order form.
///
/// This is also the JSON body posted to the order endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
	pub full_name: String,
	/// Size code, `S`, `M`, `L`, or empty when nothing is selected.
	pub size: String,
	/// Selected topping ids in the order they were checked.
	#[serde(default)]
	pub toppings: Vec<String>,
}

impl FormValues {
	/// Returns whether the topping is currently selected.
	pub fn has_topping(&self, id: &str) -> bool {
		self.toppings.iter().any(|t| t == id)
	}

	/// Adds or removes a topping id.
	///
	/// Checking an id that is already present, or unchecking one that is not,
	/// leaves the list alone. Returns whether the list changed.
	pub fn toggle_topping(&mut self, id: &str, checked: bool) -> bool {
		let present = self.has_topping(id);
		match (checked, present) {
			(true, false) => {
				self.toppings.push(id.to_string());
				true
			},
			(false, true) => {
				self.toppings.retain(|t| t != id);
				true
			},
			_ => false,
		}
	}

	/// Returns one field as a JSON value, the shape the schema validates.
	pub fn field_value(&self, field: FormField) -> Value {
		match field {
			FormField::FullName => Value::String(self.full_name.clone()),
			FormField::Size => Value::String(self.size.clone()),
			FormField::Toppings => json!(self.toppings),
		}
	}

	/// Returns the whole form as a JSON object keyed by wire names.
	pub fn to_value(&self) -> Value {
		json!({
			"fullName": self.full_name,
			"size": self.size,
			"toppings": self.toppings,
		})
	}
}

/// Latest validation message per field. An empty string means no error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
	pub full_name: String,
	pub size: String,
	pub toppings: String,
}

impl FieldErrors {
	pub fn get(&self, field: FormField) -> &str {
		match field {
			FormField::FullName => &self.full_name,
			FormField::Size => &self.size,
			FormField::Toppings => &self.toppings,
		}
	}

	pub fn set(&mut self, field: FormField, message: impl Into<String>) {
		let slot = match field {
			FormField::FullName => &mut self.full_name,
			FormField::Size => &mut self.size,
			FormField::Toppings => &mut self.toppings,
		};
		*slot = message.into();
	}

	pub fn clear(&mut self, field: FormField) {
		self.set(field, String::new());
	}

	/// Returns true when no field carries a message.
	pub fn is_empty(&self) -> bool {
		FormField::ALL.iter().all(|f| self.get(*f).is_empty())
	}
}

/// Pizza sizes offered by the size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PizzaSize {
	S,
	M,
	L,
}

impl PizzaSize {
	pub const ALL: [PizzaSize; 3] = [PizzaSize::S, PizzaSize::M, PizzaSize::L];

	/// The value submitted for this size.
	pub fn code(&self) -> &'static str {
		match self {
			PizzaSize::S => "S",
			PizzaSize::M => "M",
			PizzaSize::L => "L",
		}
	}

	/// The option text shown in the selector.
	pub fn label(&self) -> &'static str {
		match self {
			PizzaSize::S => "Small",
			PizzaSize::M => "Medium",
			PizzaSize::L => "Large",
		}
	}
}

impl FromStr for PizzaSize {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"S" => Ok(PizzaSize::S),
			"M" => Ok(PizzaSize::M),
			"L" => Ok(PizzaSize::L),
			other => Err(format!("Unknown pizza size: {}", other)),
		}
	}
}

/// Entry of the static topping catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToppingOption {
	pub id: &'static str,
	pub label: &'static str,
}

/// Toppings offered by the order form, in display order.
pub const TOPPINGS: [ToppingOption; 5] = [
	ToppingOption {
		id: "1",
		label: "Pepperoni",
	},
	ToppingOption {
		id: "2",
		label: "Green Peppers",
	},
	ToppingOption {
		id: "3",
		label: "Pineapple",
	},
	ToppingOption {
		id: "4",
		label: "Mushrooms",
	},
	ToppingOption {
		id: "5",
		label: "Ham",
	},
];

/// Looks up a catalog entry by id.
pub fn topping(id: &str) -> Option<&'static ToppingOption> {
	TOPPINGS.iter().find(|t| t.id == id)
}

/// Result of the most recent settled submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "camelCase")]
pub enum SubmissionOutcome {
	/// The server accepted the order; holds its message.
	Success(String),
	/// The request failed; holds the error text.
	Failure(String),
}

impl SubmissionOutcome {
	pub fn message(&self) -> &str {
		match self {
			SubmissionOutcome::Success(message) | SubmissionOutcome::Failure(message) => message,
		}
	}

	pub fn is_success(&self) -> bool {
		matches!(self, SubmissionOutcome::Success(_))
	}
}
