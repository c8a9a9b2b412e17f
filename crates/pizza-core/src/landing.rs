//! Landing view.

use crate::pages;
use crate::view::Element;
use pizza_config::UiConfig;
use pizza_types::Route;

/// Alt text of the landing image, which hosts use to find it.
pub const LANDING_IMAGE_ALT: &str = "order-pizza";

/// Welcome page with a clickable image leading to the order form.
#[derive(Debug, Clone, PartialEq)]
pub struct LandingView {
	heading: String,
	image_src: String,
}

impl LandingView {
	pub fn new(config: &UiConfig) -> Self {
		Self {
			heading: config.landing_heading.clone(),
			image_src: config.image_src.clone(),
		}
	}

	pub fn heading(&self) -> &str {
		&self.heading
	}

	pub fn image_src(&self) -> &str {
		&self.image_src
	}

	/// Where a click on the image leads.
	pub fn on_image_click(&self) -> Route {
		Route::Order
	}

	/// Browser markup of the page.
	pub fn to_html(&self) -> String {
		pages::render_landing(self)
	}

	/// Terminal view of the page.
	pub fn render(&self) -> Element {
		Element::new("div")
			.attr("class", "landing")
			.child(Element::new("h2").text(&self.heading))
			.child(
				Element::new("img")
					.attr("alt", LANDING_IMAGE_ALT)
					.attr("style", "cursor: pointer")
					.attr("src", &self.image_src),
			)
	}
}
