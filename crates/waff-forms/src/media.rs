//! Static assets (scripts and stylesheets) declared by widgets

use crate::field::escape_attribute;
use std::collections::BTreeMap;
use std::ops::Add;

/// Path, relative to the static URL, of the choice-with-other script.
pub const CHOICE_WITH_OTHER_JS_PATH: &str = "waff/choice_with_other.js";

/// Contents of the choice-with-other script, for servers that embed it.
pub const CHOICE_WITH_OTHER_JS: &str = include_str!("../static/waff/choice_with_other.js");

/// Scripts and stylesheets a widget needs on the page
///
/// Paths are kept in declaration order without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Media {
	css: BTreeMap<String, Vec<String>>,
	js: Vec<String>,
}

impl Media {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a script
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Media;
	///
	/// let media = Media::new().with_js("a.js").with_js("a.js").with_js("b.js");
	/// assert_eq!(media.js(), ["a.js", "b.js"]);
	/// ```
	pub fn with_js(mut self, path: impl Into<String>) -> Self {
		self.add_js([path]);
		self
	}

	pub fn with_css(mut self, medium: impl Into<String>, path: impl Into<String>) -> Self {
		self.add_css(medium, [path]);
		self
	}

	pub fn add_js<I, P>(&mut self, paths: I)
	where
		I: IntoIterator<Item = P>,
		P: Into<String>,
	{
		for path in paths {
			let path = path.into();
			if !self.js.contains(&path) {
				self.js.push(path);
			}
		}
	}

	pub fn add_css<I, P>(&mut self, medium: impl Into<String>, paths: I)
	where
		I: IntoIterator<Item = P>,
		P: Into<String>,
	{
		let entry = self.css.entry(medium.into()).or_default();
		for path in paths {
			let path = path.into();
			if !entry.contains(&path) {
				entry.push(path);
			}
		}
	}

	pub fn js(&self) -> &[String] {
		&self.js
	}

	pub fn css(&self) -> &BTreeMap<String, Vec<String>> {
		&self.css
	}

	pub fn is_empty(&self) -> bool {
		self.js.is_empty() && self.css.values().all(Vec::is_empty)
	}

	/// Merge another declaration into this one
	pub fn merge(&mut self, other: &Media) {
		for (medium, paths) in &other.css {
			self.add_css(medium.clone(), paths.iter().cloned());
		}
		self.add_js(other.js.iter().cloned());
	}

	/// Resolve `path` against `static_url` unless it is already absolute
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Media;
	///
	/// assert_eq!(Media::absolute_path("waff/x.js", "/static/"), "/static/waff/x.js");
	/// assert_eq!(Media::absolute_path("/own/x.js", "/static/"), "/own/x.js");
	/// assert_eq!(
	///     Media::absolute_path("https://cdn.example.com/x.js", "/static/"),
	///     "https://cdn.example.com/x.js"
	/// );
	/// ```
	pub fn absolute_path(path: &str, static_url: &str) -> String {
		if path.starts_with("http://") || path.starts_with("https://") || path.starts_with('/') {
			return path.to_string();
		}
		format!(
			"{}/{}",
			static_url.trim_end_matches('/'),
			path.trim_start_matches('/')
		)
	}

	pub fn render_js(&self, static_url: &str) -> Vec<String> {
		self.js
			.iter()
			.map(|path| {
				format!(
					"<script type=\"text/javascript\" src=\"{}\"></script>",
					escape_attribute(&Self::absolute_path(path, static_url))
				)
			})
			.collect()
	}

	pub fn render_css(&self, static_url: &str) -> Vec<String> {
		self.css
			.iter()
			.flat_map(|(medium, paths)| {
				paths.iter().map(move |path| {
					format!(
						"<link href=\"{}\" type=\"text/css\" media=\"{}\" rel=\"stylesheet\" />",
						escape_attribute(&Self::absolute_path(path, static_url)),
						escape_attribute(medium)
					)
				})
			})
			.collect()
	}

	/// Render stylesheet links followed by script tags
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Media;
	///
	/// let media = Media::new().with_css("all", "site.css").with_js("site.js");
	/// assert_eq!(
	///     media.render("/static/"),
	///     "<link href=\"/static/site.css\" type=\"text/css\" media=\"all\" rel=\"stylesheet\" />\n\
	///      <script type=\"text/javascript\" src=\"/static/site.js\"></script>"
	/// );
	/// ```
	pub fn render(&self, static_url: &str) -> String {
		let mut tags = self.render_css(static_url);
		tags.extend(self.render_js(static_url));
		tags.join("\n")
	}
}

impl Add for Media {
	type Output = Media;

	fn add(mut self, other: Media) -> Media {
		self.merge(&other);
		self
	}
}

/// Widgets that declare static assets
pub trait MediaDefiningWidget {
	fn media(&self) -> Media;
}
