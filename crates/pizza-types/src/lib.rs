//! Common types for the pizza order application.
//!
//! Shared by every crate in the workspace: the form data model and topping
//! catalog, routes, events, API payloads and the declarative validation
//! schema.

/// API payloads for the order endpoint.
pub mod api;
/// Events into and out of the application loop.
pub mod events;
/// Client-side routes.
pub mod navigation;
/// Form values, errors, sizes, toppings and submission outcomes.
pub mod order;
/// Name-to-factory registration for pluggable implementations.
pub mod registry;
/// The order form's validation rules.
pub mod schema;
/// Generic declarative validation.
pub mod validation;

pub use api::*;
pub use events::*;
pub use navigation::Route;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use schema::{OrderSchema, FULL_NAME_TOO_LONG, FULL_NAME_TOO_SHORT, SIZE_INCORRECT};
pub use validation::*;
