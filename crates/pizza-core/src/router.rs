//! Client-side router.

use pizza_types::Route;

/// Holds the current route and records transitions.
#[derive(Debug, Default)]
pub struct Router {
	current: Route,
	history: Vec<Route>,
}

impl Router {
	pub fn new(start: Route) -> Self {
		Self {
			current: start,
			history: Vec::new(),
		}
	}

	pub fn current(&self) -> Route {
		self.current
	}

	/// Moves to `to`. Returns the route left behind, or `None` when already there.
	pub fn navigate(&mut self, to: Route) -> Option<Route> {
		if self.current == to {
			return None;
		}
		let from = std::mem::replace(&mut self.current, to);
		self.history.push(from);
		Some(from)
	}

	/// Routes visited before the current one, oldest first.
	pub fn history(&self) -> &[Route] {
		&self.history
	}
}
