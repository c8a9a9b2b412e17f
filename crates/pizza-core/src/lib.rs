//! Core of the pizza order application.
//!
//! Contains the landing and order form views, their dioxus pages and the
//! element tree behind the terminal screen, the router, and the event loop
//! that ties them to validation tasks and the order client.

pub mod builder;
pub mod engine;
pub mod form;
pub mod landing;
pub mod pages;
pub mod router;
pub mod view;

pub use builder::{AppBuilder, BuilderError};
pub use engine::{event_bus::EventBus, App, AppError, AppHandle, AppSnapshot};
pub use form::{Effect, OrderForm, Resolution};
pub use landing::LandingView;
pub use pages::{OrderPageState, Page};
pub use router::Router;
pub use view::{Element, Node};
