//! Client-side routes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A screen of the application, addressed by path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
	/// Landing page at `/`.
	#[default]
	Home,
	/// Order form at `/order`.
	Order,
}

impl Route {
	pub fn path(&self) -> &'static str {
		match self {
			Route::Home => "/",
			Route::Order => "/order",
		}
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path())
	}
}

impl FromStr for Route {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim_end_matches('/') {
			"" => Ok(Route::Home),
			"/order" => Ok(Route::Order),
			other => Err(format!("No route matches path: {}", other)),
		}
	}
}
