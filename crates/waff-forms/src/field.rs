//! Field trait, widget kinds and the HTML helpers shared by every field

use crate::choices::Choice;
use crate::media::Media;
use crate::widgets::{ChoiceRenderer, RenderError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// HTML attributes of a widget, rendered in key order
pub type Attrs = BTreeMap<String, String>;

/// Message used by every "required" failure.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
	#[error("{0}")]
	Required(String),
	#[error("{0}")]
	Validation(String),
	#[error("{0}")]
	Invalid(String),
	#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))]
	Multiple(Vec<FieldError>),
}

impl FieldError {
	/// Build the standard "required" error
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::FieldError;
	///
	/// let error = FieldError::required();
	/// assert_eq!(error.to_string(), "This field is required.");
	/// ```
	pub fn required() -> Self {
		FieldError::Required(REQUIRED_MESSAGE.to_string())
	}

	/// Flatten this error into the individual messages shown to the user
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::FieldError;
	///
	/// let error = FieldError::Multiple(vec![
	///     FieldError::required(),
	///     FieldError::Invalid("Enter a whole number.".to_string()),
	/// ]);
	/// assert_eq!(error.messages(), vec!["This field is required.", "Enter a whole number."]);
	/// ```
	pub fn messages(&self) -> Vec<String> {
		match self {
			FieldError::Multiple(errors) => errors.iter().flat_map(FieldError::messages).collect(),
			other => vec![other.to_string()],
		}
	}

	pub fn is_required(&self) -> bool {
		matches!(self, FieldError::Required(_))
	}
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Widget kinds a field can be rendered with
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
	TextInput,
	HiddenInput,
	TextArea,
	Select { choices: Vec<(String, String)> },
	RadioSelect { choices: Vec<(String, String)> },
	/// A `<select>` whose options are fetched by a client-side script from `url`
	Autocomplete { url: String },
	/// Several widgets rendered side by side under `<name>_<index>`
	MultiWidget { widgets: Vec<Widget> },
}

impl Widget {
	fn input_type(&self) -> Option<&'static str> {
		match self {
			Widget::TextInput => Some("text"),
			Widget::HiddenInput => Some("hidden"),
			_ => None,
		}
	}

	pub fn is_hidden(&self) -> bool {
		matches!(self, Widget::HiddenInput)
	}

	/// The id a `<label>` should point at, given the field's id
	///
	/// Widgets made of several elements point at the first one.
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Widget;
	///
	/// assert_eq!(Widget::TextInput.id_for_label("id_name"), "id_name");
	/// let radio = Widget::RadioSelect { choices: vec![] };
	/// assert_eq!(radio.id_for_label("id_kind"), "id_kind_0");
	/// ```
	pub fn id_for_label(&self, id: &str) -> String {
		match self {
			Widget::RadioSelect { .. } | Widget::MultiWidget { .. } if !id.is_empty() => {
				format!("{}_0", id)
			}
			_ => id.to_string(),
		}
	}

	/// Render this widget as HTML
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Attrs, Widget};
	/// use serde_json::json;
	///
	/// let html = Widget::TextInput.render("title", Some(&json!("Hi")), &Attrs::new());
	/// assert_eq!(html, r#"<input name="title" type="text" value="Hi" />"#);
	/// ```
	pub fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> String {
		let value = value.map(value_to_string).unwrap_or_default();
		if let Some(input_type) = self.input_type() {
			let mut final_attrs = attrs.clone();
			final_attrs.insert("type".to_string(), input_type.to_string());
			final_attrs.insert("name".to_string(), name.to_string());
			if !value.is_empty() {
				final_attrs.insert("value".to_string(), value);
			}
			return format!("<input{} />", flatatt(&final_attrs));
		}

		match self {
			Widget::TextArea => {
				let mut final_attrs = attrs.clone();
				final_attrs
					.entry("cols".to_string())
					.or_insert_with(|| "40".to_string());
				final_attrs
					.entry("rows".to_string())
					.or_insert_with(|| "10".to_string());
				final_attrs.insert("name".to_string(), name.to_string());
				format!(
					"<textarea{}>\n{}</textarea>",
					flatatt(&final_attrs),
					escape_html(&value)
				)
			}
			Widget::Select { choices } => {
				let mut final_attrs = attrs.clone();
				final_attrs.insert("name".to_string(), name.to_string());
				render_select(&final_attrs, choices, &value)
			}
			Widget::RadioSelect { choices } => {
				let choices: Vec<Choice> = choices
					.iter()
					.map(|(value, label)| Choice::new(value.as_str(), label.as_str()))
					.collect();
				ChoiceRenderer::radio()
					.render(name, &value, attrs, &choices)
					.to_string()
			}
			Widget::Autocomplete { url } => {
				let mut final_attrs = attrs.clone();
				final_attrs.insert("name".to_string(), name.to_string());
				final_attrs.insert("data-autocomplete-url".to_string(), url.clone());
				let options = if value.is_empty() {
					vec![]
				} else {
					vec![(value.clone(), value.clone())]
				};
				render_select(&final_attrs, &options, &value)
			}
			Widget::MultiWidget { widgets } => widgets
				.iter()
				.enumerate()
				.map(|(index, widget)| {
					let mut sub_attrs = attrs.clone();
					if let Some(id) = attrs.get("id") {
						sub_attrs.insert("id".to_string(), format!("{}_{}", id, index));
					}
					widget.render(&format!("{}_{}", name, index), None, &sub_attrs)
				})
				.collect::<Vec<_>>()
				.join(""),
			_ => String::new(),
		}
	}
}

/// Common interface of every form field
///
/// A field turns raw submitted data into a cleaned value (`clean`) and knows
/// how to render itself through its widget.
pub trait FormField: Send + Sync {
	fn name(&self) -> &str;
	fn label(&self) -> Option<&str>;
	fn required(&self) -> bool;
	fn help_text(&self) -> Option<&str>;
	fn widget(&self) -> &Widget;
	fn initial(&self) -> Option<&Value>;
	fn clean(&self, value: Option<&Value>) -> FieldResult<Value>;

	fn has_changed(&self, initial: Option<&Value>, data: Option<&Value>) -> bool {
		let initial = initial.map(value_to_string).unwrap_or_default();
		let data = data.map(value_to_string).unwrap_or_default();
		initial != data
	}

	/// Extract this field's raw value from submitted data
	fn value_from_data(&self, data: &HashMap<String, Value>, name: &str) -> Option<Value> {
		data.get(name).cloned()
	}

	fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> Result<String, RenderError> {
		Ok(self.widget().render(name, value, attrs))
	}

	/// Static assets this field needs on the page
	fn media(&self) -> Media {
		Media::new()
	}
}

/// Whether a submitted value counts as "not provided"
///
/// # Examples
///
/// ```
/// use waff_forms::field::is_empty_value;
/// use serde_json::json;
///
/// assert!(is_empty_value(&json!(null)));
/// assert!(is_empty_value(&json!("")));
/// assert!(is_empty_value(&json!([])));
/// assert!(!is_empty_value(&json!(0)));
/// ```
pub fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		_ => false,
	}
}

/// Text form of a value as it appears in HTML attributes
pub fn value_to_string(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Escape HTML special characters in text content
pub fn escape_html(input: &str) -> String {
	input
		.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#x27;")
}

/// Escape a value placed inside a double-quoted attribute
///
/// # Examples
///
/// ```
/// use waff_forms::field::escape_attribute;
///
/// assert_eq!(escape_attribute(r#"a"b<c>"#), "a&quot;b&lt;c&gt;");
/// ```
pub fn escape_attribute(input: &str) -> String {
	escape_html(input)
		.replace('\n', "&#10;")
		.replace('\r', "&#13;")
}

/// Flatten attributes into ` key="value"` pairs
///
/// # Examples
///
/// ```
/// use waff_forms::{Attrs, field::flatatt};
///
/// let mut attrs = Attrs::new();
/// attrs.insert("id".to_string(), "id_name".to_string());
/// attrs.insert("class".to_string(), "wide".to_string());
/// assert_eq!(flatatt(&attrs), r#" class="wide" id="id_name""#);
/// ```
pub fn flatatt(attrs: &Attrs) -> String {
	attrs
		.iter()
		.map(|(key, value)| format!(" {}=\"{}\"", key, escape_attribute(value)))
		.collect()
}

/// Render a `<select>` holding `options`, marking `selected` as chosen
pub fn render_select(attrs: &Attrs, options: &[(String, String)], selected: &str) -> String {
	let mut output = vec![format!("<select{}>", flatatt(attrs))];
	for (value, label) in options {
		let selected_html = if value == selected {
			" selected=\"selected\""
		} else {
			""
		};
		output.push(format!(
			"<option value=\"{}\"{}>{}</option>",
			escape_attribute(value),
			selected_html,
			escape_html(label)
		));
	}
	output.push("</select>".to_string());
	output.join("\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_text_input_omits_empty_value() {
		// Arrange
		let widget = Widget::TextInput;

		// Act
		let html = widget.render("note", Some(&json!("")), &Attrs::new());

		// Assert
		assert_eq!(html, r#"<input name="note" type="text" />"#);
	}

	#[rstest]
	fn test_text_input_escapes_value() {
		// Arrange
		let widget = Widget::TextInput;

		// Act
		let html = widget.render("note", Some(&json!("<b>\"x\"</b>")), &Attrs::new());

		// Assert
		assert!(html.contains(r#"value="&lt;b&gt;&quot;x&quot;&lt;/b&gt;""#));
	}

	#[rstest]
	fn test_textarea_defaults_size() {
		// Act
		let html = Widget::TextArea.render("body", Some(&json!("a & b")), &Attrs::new());

		// Assert
		assert_eq!(
			html,
			"<textarea cols=\"40\" name=\"body\" rows=\"10\">\na &amp; b</textarea>"
		);
	}

	#[rstest]
	fn test_select_marks_selected_option() {
		// Arrange
		let widget = Widget::Select {
			choices: vec![
				("a".to_string(), "A".to_string()),
				("b".to_string(), "B".to_string()),
			],
		};

		// Act
		let html = widget.render("letter", Some(&json!("b")), &Attrs::new());

		// Assert
		assert_eq!(
			html,
			"<select name=\"letter\">\n<option value=\"a\">A</option>\n<option value=\"b\" selected=\"selected\">B</option>\n</select>"
		);
	}

	#[rstest]
	fn test_autocomplete_carries_url() {
		// Arrange
		let widget = Widget::Autocomplete {
			url: "/autocomplete".to_string(),
		};

		// Act
		let html = widget.render("doc", Some(&json!(3)), &Attrs::new());

		// Assert
		assert!(html.contains(r#"data-autocomplete-url="/autocomplete""#));
		assert!(html.contains(r#"<option value="3" selected="selected">3</option>"#));
	}

	#[rstest]
	#[case(json!(null), "")]
	#[case(json!("text"), "text")]
	#[case(json!(12), "12")]
	#[case(json!(true), "true")]
	fn test_value_to_string(#[case] value: Value, #[case] expected: &str) {
		assert_eq!(value_to_string(&value), expected);
	}

	#[rstest]
	fn test_multiple_error_display_joins_messages() {
		// Arrange
		let error = FieldError::Multiple(vec![
			FieldError::required(),
			FieldError::Validation("Too long".to_string()),
		]);

		// Act & Assert
		assert_eq!(error.to_string(), "This field is required. Too long");
		assert!(!error.is_required());
	}
}
