//! Free-text field

use crate::field::{FieldError, FieldResult, FormField, Widget};
use serde_json::Value;

/// Text field with optional length limits
///
/// Commonly used as the "other" sub-field of
/// [`ChoiceWithOtherField`](crate::fields::ChoiceWithOtherField).
#[derive(Debug, Clone)]
pub struct CharField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub initial: Option<Value>,
	pub max_length: Option<usize>,
	pub min_length: Option<usize>,
	pub strip: bool,
}

impl CharField {
	/// Create an optional text field
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::CharField;
	///
	/// let field = CharField::new("note".to_string());
	/// assert_eq!(field.name, "note");
	/// assert!(!field.required);
	/// ```
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::TextInput,
			initial: None,
			max_length: None,
			min_length: None,
			strip: true,
		}
	}

	/// Mark the field as required
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::CharField;
	///
	/// assert!(CharField::new("note".to_string()).required().required);
	/// ```
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.min_length = Some(min_length);
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

	pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
		self.initial = Some(Value::String(initial.into()));
		self
	}

	pub fn no_strip(mut self) -> Self {
		self.strip = false;
		self
	}

	/// Render with another widget, e.g. [`Widget::TextArea`]
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::CharField;
	/// use waff_forms::Widget;
	///
	/// let field = CharField::new("bio".to_string()).with_widget(Widget::TextArea);
	/// assert_eq!(field.widget, Widget::TextArea);
	/// ```
	pub fn with_widget(mut self, widget: Widget) -> Self {
		self.widget = widget;
		self
	}

	fn check_length(&self, text: &str) -> FieldResult<()> {
		// Character count, not bytes
		let count = text.chars().count();
		if let Some(max_length) = self.max_length
			&& count > max_length
		{
			return Err(FieldError::Validation(format!(
				"Ensure this value has at most {} characters (it has {}).",
				max_length, count
			)));
		}
		if let Some(min_length) = self.min_length
			&& count < min_length
		{
			return Err(FieldError::Validation(format!(
				"Ensure this value has at least {} characters (it has {}).",
				min_length, count
			)));
		}
		Ok(())
	}
}

impl FormField for CharField {
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
			Some(_) => {
				return Err(FieldError::Invalid("Enter a valid text value.".to_string()));
			}
		};
		let text = if self.strip {
			text.trim().to_string()
		} else {
			text
		};

		if text.is_empty() {
			if self.required {
				return Err(FieldError::required());
			}
			return Ok(Value::String(text));
		}

		self.check_length(&text)?;
		Ok(Value::String(text))
	}
}
