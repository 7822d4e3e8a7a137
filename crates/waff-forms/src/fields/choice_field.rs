//! Single choice from a fixed list

use crate::choices::{Choice, flatten};
use crate::field::{Attrs, FieldError, FieldResult, FormField, Widget, value_to_string};
use crate::widgets::{ChoiceRenderer, Markup, RenderError};
use serde_json::Value;

/// A field whose value must be one of `choices`
///
/// Renders as a `<select>` by default, or as a radio list with
/// [`ChoiceField::radio`]. Grouped choices are searched recursively.
///
/// # Examples
///
/// ```
/// use waff_forms::{Choice, FormField};
/// use waff_forms::fields::ChoiceField;
/// use serde_json::json;
///
/// let field = ChoiceField::new("size", vec![Choice::new("s", "Small"), Choice::new("l", "Large")]);
/// assert_eq!(field.clean(Some(&json!("l"))).unwrap(), json!("l"));
/// assert!(field.clean(Some(&json!("xl"))).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ChoiceField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub initial: Option<Value>,
	pub choices: Vec<Choice>,
	renderer: ChoiceRenderer,
}

impl ChoiceField {
	pub fn new(name: impl Into<String>, choices: Vec<Choice>) -> Self {
		Self {
			name: name.into(),
			label: None,
			required: true,
			help_text: None,
			widget: Widget::Select {
				choices: flatten(&choices),
			},
			initial: None,
			choices,
			renderer: ChoiceRenderer::radio(),
		}
	}

	/// Render as a list of radio buttons
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Choice, FormField, Widget};
	/// use waff_forms::fields::ChoiceField;
	///
	/// let field = ChoiceField::new("size", vec![Choice::new("s", "Small")]).radio();
	/// assert!(matches!(field.widget(), Widget::RadioSelect { .. }));
	/// ```
	pub fn radio(mut self) -> Self {
		self.widget = Widget::RadioSelect {
			choices: flatten(&self.choices),
		};
		self
	}

	pub fn with_required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn with_initial(mut self, initial: impl Into<Value>) -> Self {
		self.initial = Some(initial.into());
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	/// Whether `value` is one of the choices
	pub fn valid_value(&self, value: &str) -> bool {
		self.choices.iter().any(|choice| choice.contains_value(value))
	}

	/// Radio list markup, keeping the slot of an "Other" choice unfilled
	pub fn render_choices(&self, name: &str, value: &str, attrs: &Attrs) -> Markup {
		self.renderer.render(name, value, attrs, &self.choices)
	}
}

impl FormField for ChoiceField {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn required(&self) -> bool {
		self.required
	}

	fn help_text(&self) -> Option<&str> {
		self.help_text.as_deref()
	}

	fn widget(&self) -> &Widget {
		&self.widget
	}

	fn initial(&self) -> Option<&Value> {
		self.initial.as_ref()
	}

	fn clean(&self, value: Option<&Value>) -> FieldResult<Value> {
		let text = match value {
			None | Some(Value::Null) => String::new(),
			Some(Value::String(s)) => s.clone(),
			Some(Value::Number(n)) => n.to_string(),
			Some(other) => {
				return Err(FieldError::Invalid(format!(
					"Select a valid choice. {} is not one of the available choices.",
					other
				)));
			}
		};

		if text.is_empty() {
			if self.required {
				return Err(FieldError::required());
			}
			return Ok(Value::String(text));
		}

		if !self.valid_value(&text) {
			return Err(FieldError::Invalid(format!(
				"Select a valid choice. {} is not one of the available choices.",
				text
			)));
		}

		Ok(Value::String(text))
	}

	fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> Result<String, RenderError> {
		match self.widget {
			Widget::RadioSelect { .. } => {
				let value = value.map(value_to_string).unwrap_or_default();
				Ok(self.render_choices(name, &value, attrs).to_string())
			}
			_ => Ok(self.widget.render(name, value, attrs)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn sizes() -> Vec<Choice> {
		vec![
			Choice::new("s", "Small"),
			Choice::group("Big", [Choice::new("l", "Large"), Choice::new("xl", "Huge")]),
		]
	}

	#[rstest]
	#[case(json!("s"))]
	#[case(json!("xl"))]
	fn test_clean_accepts_top_level_and_grouped(#[case] input: Value) {
		// Arrange
		let field = ChoiceField::new("size", sizes());

		// Act
		let result = field.clean(Some(&input));

		// Assert
		assert_eq!(result, Ok(input));
	}

	#[rstest]
	fn test_clean_rejects_group_label() {
		// Arrange
		let field = ChoiceField::new("size", sizes());

		// Act
		let result = field.clean(Some(&json!("Big")));

		// Assert
		assert_eq!(
			result,
			Err(FieldError::Invalid(
				"Select a valid choice. Big is not one of the available choices.".to_string()
			))
		);
	}

	#[rstest]
	fn test_clean_empty_depends_on_required() {
		// Arrange
		let required = ChoiceField::new("size", sizes());
		let optional = ChoiceField::new("size", sizes()).with_required(false);

		// Act & Assert
		assert_eq!(required.clean(Some(&json!(""))), Err(FieldError::required()));
		assert_eq!(optional.clean(None), Ok(json!("")));
	}

	#[rstest]
	fn test_numeric_choice_values() {
		// Arrange
		let field = ChoiceField::new("n", vec![Choice::new("1", "One")]);

		// Act & Assert
		assert_eq!(field.clean(Some(&json!(1))), Ok(json!("1")));
	}

	#[rstest]
	fn test_radio_render_keeps_groups() {
		// Arrange
		let field = ChoiceField::new("size", sizes()).radio();
		let mut attrs = Attrs::new();
		attrs.insert("id".to_string(), "id_size".to_string());

		// Act
		let html = field.render("size", Some(&json!("l")), &attrs).unwrap();

		// Assert
		assert!(html.contains("<li>Big<ul id=\"id_size_1\">"));
		assert!(html.contains("checked=\"checked\""));
	}

	#[rstest]
	fn test_select_render_flattens_groups() {
		// Arrange
		let field = ChoiceField::new("size", sizes());

		// Act
		let html = field.render("size", None, &Attrs::new()).unwrap();

		// Assert
		assert_eq!(html.matches("<option").count(), 3);
	}
}
