//! Radio list whose last choice carries another field's widget
//!
//! The widget renders two sub-widgets: the selector under `<name>_0` and the
//! other field under `<name>_1`. The other field's markup is not rendered
//! beside the list but placed inside the "Other" item, in the slot the
//! [`ChoiceRenderer`](super::ChoiceRenderer) reserved for it.

use super::choice_renderer::{Markup, RenderError};
use super::multi_widget::{MultiWidget, sub_widget_name};
use crate::choices::OTHER_CHOICE;
use crate::field::{Attrs, FormField, is_empty_value, value_to_string};
use crate::fields::{ChoiceField, EffectiveValue};
use crate::media::{CHOICE_WITH_OTHER_JS_PATH, Media, MediaDefiningWidget};
use serde_json::Value;

/// Marker attribute set on the other field's widget.
pub const CHOICE_FIELDS_OTHER_ATTR: &str = "data-choice-fields-other";

/// Class of the element wrapping the whole widget.
pub const WRAPPER_CLASS: &str = "choice_with_other_wrapper";

/// Composite widget of a selector and an arbitrary other field
///
/// Borrows both fields for the duration of a render or decompress call.
#[derive(Clone, Copy)]
pub struct ChoiceWithOtherWidget<'a> {
	selector: &'a ChoiceField,
	other: &'a dyn FormField,
}

impl<'a> ChoiceWithOtherWidget<'a> {
	pub fn new(selector: &'a ChoiceField, other: &'a dyn FormField) -> Self {
		Self { selector, other }
	}

	fn is_predefined(&self, value: &str) -> bool {
		value != OTHER_CHOICE
			&& self
				.selector
				.choices
				.iter()
				.any(|choice| !choice.is_other() && choice.contains_value(value))
	}

	/// Render both sub-widgets and splice the other one into the list
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Attrs, Choice};
	/// use waff_forms::fields::{CharField, ChoiceWithOtherField};
	/// use serde_json::json;
	///
	/// let field = ChoiceWithOtherField::builder(
	///     "kind",
	///     vec![Choice::new("a", "A")],
	///     Box::new(CharField::new("kind_other".to_string())),
	/// )
	/// .build()
	/// .unwrap();
	///
	/// let html = field.widget_ref().render("kind", Some(&json!("custom")), &Attrs::new()).unwrap();
	/// assert!(html.starts_with("<div class=\"choice_with_other_wrapper\""));
	/// assert!(html.contains("<div class=\"other-field\"><input data-choice-fields-other"));
	/// assert!(html.contains("value=\"custom\""));
	/// ```
	pub fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> Result<String, RenderError> {
		let sub_values = self.sub_values(value);
		let selector_value = sub_values.first().map(value_to_string).unwrap_or_default();

		let selector_attrs = sub_attrs(attrs, 0);
		let choices = self.selector.render_choices(
			&sub_widget_name(name, 0),
			&selector_value,
			&selector_attrs,
		);

		let mut other_attrs = sub_attrs(attrs, 1);
		other_attrs.remove("required");
		other_attrs.insert(
			CHOICE_FIELDS_OTHER_ATTR.to_string(),
			CHOICE_FIELDS_OTHER_ATTR.to_string(),
		);
		let other_html = self
			.other
			.render(&sub_widget_name(name, 1), sub_values.get(1), &other_attrs)?;

		self.format_output(choices, &other_html)
	}

	/// Wrap the selector markup and fill its slot with `other_html`
	pub fn format_output(&self, choices: Markup, other_html: &str) -> Result<String, RenderError> {
		let open = format!("<div class=\"{}\" style=\"display: table-row;\">", WRAPPER_CLASS);
		choices
			.wrap(&open, "</div>")
			.fill_other_slot(other_html)
			.inspect_err(|error| {
				tracing::warn!(selector = %self.selector.name, %error, "cannot place other field");
			})
	}
}

impl MultiWidget for ChoiceWithOtherWidget<'_> {
	fn widget_count(&self) -> usize {
		2
	}

	/// Split a stored value into `[selector, other]`
	///
	/// A predefined choice value selects itself; any other non-empty value
	/// selects "Other" and is shown in the other field.
	fn decompress(&self, value: Option<&Value>) -> Vec<Value> {
		let empty = || vec![Value::String(String::new()), Value::String(String::new())];
		let value = match value {
			Some(value) if !is_empty_value(value) => value,
			_ => return empty(),
		};

		if let Some(effective) = EffectiveValue::from_value(value) {
			return match effective.selected_key {
				None => empty(),
				Some(key) if key == OTHER_CHOICE => {
					vec![Value::String(key), effective.display_value]
				}
				Some(key) => vec![Value::String(key), Value::String(String::new())],
			};
		}

		let text = value_to_string(value);
		if !value.is_object() && !value.is_array() && self.is_predefined(&text) {
			return vec![Value::String(text), Value::String(String::new())];
		}
		vec![Value::String(OTHER_CHOICE.to_string()), value.clone()]
	}
}

impl MediaDefiningWidget for ChoiceWithOtherWidget<'_> {
	fn media(&self) -> Media {
		Media::new().with_js(CHOICE_WITH_OTHER_JS_PATH) + self.other.media()
	}
}

fn sub_attrs(attrs: &Attrs, index: usize) -> Attrs {
	let mut sub = attrs.clone();
	if let Some(id) = attrs.get("id") {
		sub.insert("id".to_string(), format!("{}_{}", id, index));
	}
	sub
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::choices::Choice;
	use crate::fields::CharField;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn selector() -> ChoiceField {
		ChoiceField::new(
			"kind_0",
			vec![
				Choice::new("a", "A"),
				Choice::group("More", [Choice::new("b", "B")]),
				Choice::other(""),
			],
		)
		.radio()
	}

	#[fixture]
	fn other() -> CharField {
		CharField::new("kind_1".to_string()).required()
	}

	#[rstest]
	#[case(None, json!(["", ""]))]
	#[case(Some(json!(null)), json!(["", ""]))]
	#[case(Some(json!("")), json!(["", ""]))]
	#[case(Some(json!("a")), json!(["a", ""]))]
	#[case(Some(json!("b")), json!(["b", ""]))]
	#[case(Some(json!("custom")), json!(["__other__", "custom"]))]
	#[case(Some(json!("__other__")), json!(["__other__", "__other__"]))]
	#[case(Some(json!(7)), json!(["__other__", 7]))]
	fn test_decompress(
		selector: ChoiceField,
		other: CharField,
		#[case] input: Option<Value>,
		#[case] expected: Value,
	) {
		// Arrange
		let widget = ChoiceWithOtherWidget::new(&selector, &other);

		// Act
		let parts = widget.decompress(input.as_ref());

		// Assert
		assert_eq!(Value::Array(parts), expected);
	}

	#[rstest]
	fn test_decompress_effective_value(selector: ChoiceField, other: CharField) {
		// Arrange
		let widget = ChoiceWithOtherWidget::new(&selector, &other);
		let predefined = EffectiveValue::predefined("a").to_value();
		let custom = EffectiveValue::other(json!("typed")).to_value();

		// Act & Assert
		assert_eq!(widget.decompress(Some(&predefined)), vec![json!("a"), json!("")]);
		assert_eq!(
			widget.decompress(Some(&custom)),
			vec![json!("__other__"), json!("typed")]
		);
	}

	#[rstest]
	fn test_render_drops_required_and_marks_other(selector: ChoiceField, other: CharField) {
		// Arrange
		let widget = ChoiceWithOtherWidget::new(&selector, &other);
		let mut attrs = Attrs::new();
		attrs.insert("id".to_string(), "id_kind".to_string());
		attrs.insert("required".to_string(), "required".to_string());

		// Act
		let html = widget.render("kind", Some(&json!(["__other__", "x"])), &attrs).unwrap();

		// Assert
		assert!(html.contains(
			"<input data-choice-fields-other=\"data-choice-fields-other\" id=\"id_kind_1\" name=\"kind_1\" type=\"text\" value=\"x\" />"
		));
		assert!(html.contains("<ul id=\"id_kind_0\">"));
		assert!(html.contains("data-choice-fields=\"kind_0\""));
		assert_eq!(html.matches("name=\"kind_1\"").count(), 1);
		assert!(html.ends_with("</ul></div>"));
	}

	#[rstest]
	fn test_render_without_other_choice_fails(other: CharField) {
		// Arrange
		let plain = ChoiceField::new("kind_0", vec![Choice::new("a", "A")]);
		let widget = ChoiceWithOtherWidget::new(&plain, &other);

		// Act
		let result = widget.render("kind", None, &Attrs::new());

		// Assert
		assert_eq!(result, Err(RenderError::MissingOtherSlot));
	}

	#[rstest]
	fn test_media_declares_script(selector: ChoiceField, other: CharField) {
		// Arrange
		let widget = ChoiceWithOtherWidget::new(&selector, &other);

		// Act
		let media = widget.media();

		// Assert
		assert_eq!(media.js(), [CHOICE_WITH_OTHER_JS_PATH]);
	}
}
