//! Event types flowing into and out of the application loop.
//!
//! [`UiEvent`]s are what a host feeds in: clicks, keystrokes, selections.
//! [`AppEvent`]s are broadcast back out once the loop has acted on them, so
//! hosts and tests can follow navigation, validation and submission without
//! reaching into view state.

use crate::navigation::Route;
use crate::order::{FormField, FormValues};
use serde::{Deserialize, Serialize};

/// User input delivered to the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
	/// The landing image was clicked.
	ImageClicked,
	/// Direct navigation, e.g. a typed URL or the browser back button.
	Navigate(Route),
	/// The full name input changed.
	NameChanged(String),
	/// The size selector changed; empty means the placeholder option.
	SizeChanged(String),
	/// A topping checkbox changed state.
	ToppingToggled { id: String, checked: bool },
	/// The submit control was activated.
	SubmitClicked,
}

/// Notifications published by the application loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
	/// The current route changed.
	Navigated { from: Route, to: Route },
	/// A field validation result was applied. `message` is `None` when valid.
	FieldValidated {
		field: FormField,
		message: Option<String>,
	},
	/// An async result arrived after a newer request for the same target.
	StaleResultDiscarded { field: Option<FormField>, tag: u64 },
	/// The whole-form validity flag flipped.
	ValidityChanged { valid: bool },
	/// An order request was sent.
	SubmissionStarted { tag: u64, order: FormValues },
	/// The server accepted the order.
	SubmissionSucceeded { tag: u64, message: String },
	/// The order request failed.
	SubmissionFailed { tag: u64, message: String },
	/// Submit was activated while the form was invalid; nothing was sent.
	SubmitRejected { reason: String },
}
