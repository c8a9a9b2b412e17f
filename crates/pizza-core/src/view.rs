//! Element tree behind the terminal views.
//!
//! Views describe their screen as a small tree of [`Element`]s shaped like
//! the browser markup. The tree is flattened to plain text for the terminal
//! host and queried by tests. Browser HTML comes from [`crate::pages`].

use std::fmt::Write;

/// A node of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	Text(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub tag: String,
	pub attrs: Vec<(String, String)>,
	pub children: Vec<Node>,
}

impl Element {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			attrs: Vec::new(),
			children: Vec::new(),
		}
	}

	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds a boolean attribute such as `disabled` when `on` is true.
	pub fn flag(self, name: &str, on: bool) -> Self {
		if on {
			self.attr(name, "")
		} else {
			self
		}
	}

	pub fn child(mut self, child: Element) -> Self {
		self.children.push(Node::Element(child));
		self
	}

	/// Adds a child only when one is given.
	pub fn child_opt(self, child: Option<Element>) -> Self {
		match child {
			Some(child) => self.child(child),
			None => self,
		}
	}

	pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
		self.children
			.extend(children.into_iter().map(Node::Element));
		self
	}

	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.children.push(Node::Text(text.into()));
		self
	}

	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	pub fn has_attr(&self, name: &str) -> bool {
		self.get_attr(name).is_some()
	}

	pub fn has_class(&self, class: &str) -> bool {
		self.get_attr("class")
			.is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
	}

	/// Depth-first search, including `self`.
	pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
		if predicate(self) {
			return Some(self);
		}
		self.child_elements().find_map(|child| child.find(predicate))
	}

	/// All matching elements in document order, including `self`.
	pub fn find_all(&self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
		let mut found = Vec::new();
		self.collect(predicate, &mut found);
		found
	}

	pub fn find_by_id(&self, id: &str) -> Option<&Element> {
		self.find(&|el| el.get_attr("id") == Some(id))
	}

	pub fn find_by_class(&self, class: &str) -> Option<&Element> {
		self.find(&|el| el.has_class(class))
	}

	/// Concatenated text of all descendants.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		for child in &self.children {
			match child {
				Node::Text(text) => out.push_str(text),
				Node::Element(el) => out.push_str(&el.text_content()),
			}
		}
		out
	}

	fn child_elements(&self) -> impl Iterator<Item = &Element> {
		self.children.iter().filter_map(|child| match child {
			Node::Element(el) => Some(el),
			Node::Text(_) => None,
		})
	}

	fn collect<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
		if predicate(self) {
			found.push(self);
		}
		for child in self.child_elements() {
			child.collect(predicate, found);
		}
	}

	/// Flattens the tree into terminal-friendly text, one block per line.
	pub fn to_text(&self) -> String {
		let mut out = String::new();
		self.write_text(&mut out);

		let mut lines: Vec<&str> = Vec::new();
		for line in out.lines().map(str::trim_end) {
			if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
				continue;
			}
			lines.push(line);
		}
		while lines.last().is_some_and(|last| last.is_empty()) {
			lines.pop();
		}
		lines.join("\n")
	}

	fn write_text(&self, out: &mut String) {
		match self.tag.as_str() {
			"br" => out.push('\n'),
			"h2" => {
				let _ = writeln!(out, "\n== {} ==", self.text_content());
			},
			"img" => {
				let _ = writeln!(out, "[image: {}]", self.get_attr("alt").unwrap_or_default());
			},
			"input" => match self.get_attr("type") {
				Some("checkbox") => {
					let mark = if self.has_attr("checked") { 'x' } else { ' ' };
					match self.get_attr("value") {
						Some(value) => {
							let _ = write!(out, "[{}] {} ", mark, value);
						},
						None => {
							let _ = write!(out, "[{}] ", mark);
						},
					}
				},
				Some("submit") => {
					out.push_str(if self.has_attr("disabled") {
						"\n<Submit> (disabled)\n"
					} else {
						"\n<Submit>\n"
					});
				},
				_ => {
					let _ = write!(out, "[{}]", self.get_attr("value").unwrap_or_default());
				},
			},
			"select" => {
				let selected = self
					.find(&|el| el.tag == "option" && el.has_attr("selected"))
					.or_else(|| self.find(&|el| el.tag == "option"))
					.map(|option| option.text_content())
					.unwrap_or_default();
				let _ = write!(out, "[{}]", selected);
			},
			"label" if self.has_attr("for") => {
				let _ = write!(out, "{}: ", self.text_content());
			},
			tag => {
				let block = tag == "div";
				if block {
					out.push('\n');
				}
				if self.has_class("error") {
					out.push_str("  ! ");
				} else if self.has_class("success") {
					out.push_str("[success] ");
				} else if self.has_class("failure") {
					out.push_str("[failure] ");
				}
				let mut after_label = false;
				for child in &self.children {
					match child {
						Node::Text(text) => out.push_str(text),
						// a field label shares the line of its control
						Node::Element(el) if after_label && el.tag == "br" => {},
						Node::Element(el) => el.write_text(out),
					}
					after_label = matches!(child, Node::Element(el) if el.tag == "label" && el.has_attr("for"));
				}
				if block {
					out.push('\n');
				}
			},
		}
	}
}
