//! Browser markup of both pages.
//!
//! The pages are dioxus components rendered to HTML on a throwaway
//! [`VirtualDom`]. Each page reads its state from the root context, so the
//! route table can map paths straight to components.

#![allow(non_snake_case)]

use crate::landing::{LandingView, LANDING_IMAGE_ALT};
use dioxus::prelude::*;
use pizza_types::{
	FieldErrors, FormField, FormValues, PizzaSize, SubmissionOutcome, TOPPINGS,
};

/// Paths served by the application.
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Page {
	#[route("/")]
	Home {},
	#[route("/order")]
	Order {},
}

impl From<pizza_types::Route> for Page {
	fn from(route: pizza_types::Route) -> Self {
		match route {
			pizza_types::Route::Home => Page::Home {},
			pizza_types::Route::Order => Page::Order {},
		}
	}
}

/// What the order page shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPageState {
	pub values: FormValues,
	pub errors: FieldErrors,
	pub outcome: Option<SubmissionOutcome>,
	pub valid: bool,
}

pub fn render_landing(landing: &LandingView) -> String {
	render_page(Page::Home {}, landing.clone())
}

pub fn render_order(state: OrderPageState) -> String {
	render_page(Page::Order {}, state)
}

fn render_page<T: Clone + 'static>(page: Page, state: T) -> String {
	let mut dom = VirtualDom::new_with_props(PageRoot, PageRootProps { page });
	dom.provide_root_context(state);
	dom.rebuild_in_place();
	dioxus_ssr::render(&dom)
}

#[derive(Props, Clone, PartialEq)]
struct PageRootProps {
	page: Page,
}

fn PageRoot(props: PageRootProps) -> Element {
	match props.page {
		Page::Home {} => rsx! { Home {} },
		Page::Order {} => rsx! { Order {} },
	}
}

#[component]
fn Home() -> Element {
	let landing = use_context::<LandingView>();
	let heading = landing.heading().to_string();
	let image_src = landing.image_src().to_string();

	rsx! {
		div { class: "landing",
			h2 { "{heading}" }
			img { alt: LANDING_IMAGE_ALT, style: "cursor: pointer", src: "{image_src}" }
		}
	}
}

#[component]
fn Order() -> Element {
	let state = use_context::<OrderPageState>();
	let full_name = state.values.full_name.clone();
	let size = state.values.size.clone();
	let no_size = size.is_empty();
	let disabled = !state.valid;

	let banner = state.outcome.as_ref().map(|outcome| {
		let class = if outcome.is_success() {
			"success"
		} else {
			"failure"
		};
		let message = outcome.message().to_string();
		rsx! {
			div { class: "{class}", "{message}" }
		}
	});
	let name_error = error_line(state.errors.get(FormField::FullName));
	let size_error = error_line(state.errors.get(FormField::Size));

	let sizes = PizzaSize::ALL.iter().map(|choice| {
		let code = choice.code();
		let label = choice.label();
		let selected = size == code;
		rsx! {
			option { key: "{code}", value: "{code}", selected: selected, "{label}" }
		}
	});
	let toppings = TOPPINGS.iter().map(|topping| {
		let id = topping.id;
		let label = topping.label;
		let checked = state.values.has_topping(id);
		rsx! {
			label { key: "{id}",
				input { name: "{id}", r#type: "checkbox", value: "{id}", checked: checked }
				"{label}"
				br {}
			}
		}
	});

	rsx! {
		form {
			h2 { "Order Your Pizza" }
			{banner}
			div { class: "input-group",
				div {
					label { r#for: "fullName", "FullName" }
					br {}
					input {
						placeholder: "Type full name",
						id: "fullName",
						name: "fullName",
						r#type: "text",
						value: "{full_name}",
					}
				}
				{name_error}
			}
			div { class: "input-group",
				div {
					label { r#for: "size", "Size" }
					br {}
					select { id: "size", name: "size",
						option { value: "", selected: no_size, "----Choose Size----" }
						{sizes}
					}
				}
				{size_error}
			}
			div { class: "input-group", {toppings} }
			input { r#type: "submit", disabled: disabled }
		}
	}
}

fn error_line(message: &str) -> Option<Element> {
	(!message.is_empty()).then(|| {
		let message = message.to_string();
		rsx! {
			div { class: "error", "{message}" }
		}
	})
}
