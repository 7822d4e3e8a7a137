//! Choice of one record out of a queryset

use crate::choices::EMPTY_CHOICE_LABEL;
use crate::field::{
	Attrs, FieldError, FieldResult, FormField, Widget, render_select, value_to_string,
};
use crate::model::FormModel;
use crate::widgets::RenderError;
use serde_json::Value;
use std::collections::HashMap;

/// A field for selecting a single record from a queryset
///
/// Submitted values are primary keys as produced by
/// [`FormModel::to_choice_value`]. Rendered as a `<select>` of every record,
/// or, with [`ModelChoiceField::autocomplete`], as a select that only holds
/// the current record and is filled in by a client-side script.
pub struct ModelChoiceField<T: FormModel> {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub error_messages: HashMap<String, String>,
	pub widget: Widget,
	pub help_text: String,
	pub initial: Option<Value>,
	pub queryset: Vec<T>,
	pub empty_label: Option<String>,
}

impl<T: FormModel> ModelChoiceField<T> {
	/// Create a new ModelChoiceField
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::ModelChoiceField;
	/// use waff_forms::{FormField, FormModel};
	/// use serde_json::{json, Value};
	///
	/// struct Category {
	///     id: i32,
	///     name: String,
	/// }
	///
	/// impl FormModel for Category {
	///     fn field_names() -> Vec<String> {
	///         vec!["id".to_string(), "name".to_string()]
	///     }
	///
	///     fn get_field(&self, name: &str) -> Option<Value> {
	///         match name {
	///             "id" => Some(json!(self.id)),
	///             "name" => Some(json!(self.name)),
	///             _ => None,
	///         }
	///     }
	/// }
	///
	/// let categories = vec![
	///     Category { id: 1, name: "Technology".to_string() },
	///     Category { id: 2, name: "Science".to_string() },
	/// ];
	///
	/// let field = ModelChoiceField::new("category", categories);
	/// assert_eq!(field.name(), "category");
	/// assert!(FormField::required(&field));
	/// assert_eq!(field.clean(Some(&json!("2"))).unwrap(), json!("2"));
	/// ```
	pub fn new(name: impl Into<String>, queryset: Vec<T>) -> Self {
		let mut error_messages = HashMap::new();
		error_messages.insert(
			"invalid_choice".to_string(),
			"Select a valid choice. That choice is not one of the available choices.".to_string(),
		);

		Self {
			name: name.into(),
			label: None,
			required: true,
			error_messages,
			widget: Widget::Select {
				choices: Vec::new(),
			},
			help_text: String::new(),
			initial: None,
			queryset,
			empty_label: Some(EMPTY_CHOICE_LABEL.to_string()),
		}
	}
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}
	pub fn help_text(mut self, text: impl Into<String>) -> Self {
		self.help_text = text.into();
		self
	}
	pub fn initial(mut self, value: Value) -> Self {
		self.initial = Some(value);
		self
	}
	pub fn empty_label(mut self, label: Option<String>) -> Self {
		self.empty_label = label;
		self
	}
	pub fn error_message(
		mut self,
		error_type: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		self.error_messages
			.insert(error_type.into(), message.into());
		self
	}

	/// Render as an autocomplete select fed from `url`
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::ModelChoiceField;
	/// use waff_forms::{FormModel, Widget};
	/// use serde_json::Value;
	///
	/// struct Tag;
	///
	/// impl FormModel for Tag {
	///     fn field_names() -> Vec<String> { vec![] }
	///     fn get_field(&self, _name: &str) -> Option<Value> { None }
	/// }
	///
	/// let field = ModelChoiceField::<Tag>::new("tag", vec![]).autocomplete("/tags/");
	/// assert_eq!(field.widget, Widget::Autocomplete { url: "/tags/".to_string() });
	/// ```
	pub fn autocomplete(mut self, url: impl Into<String>) -> Self {
		self.widget = Widget::Autocomplete { url: url.into() };
		self
	}

	/// The record whose primary key is `pk`
	pub fn resolve(&self, pk: &str) -> Option<&T> {
		self.queryset
			.iter()
			.find(|instance| instance.to_choice_value() == pk)
	}

	/// Converts records to `(value, label)` pairs, led by the empty label
	///
	/// The empty label is left out only for a required field with an initial
	/// value.
	pub fn get_choices(&self) -> Vec<(String, String)> {
		let mut choices = Vec::new();

		if let Some(empty_label) = &self.empty_label
			&& !(self.required && self.initial.is_some())
		{
			choices.push((String::new(), empty_label.clone()));
		}

		for instance in &self.queryset {
			choices.push((instance.to_choice_value(), instance.to_choice_label()));
		}

		choices
	}

	fn invalid_choice(&self) -> FieldError {
		let message = self
			.error_messages
			.get("invalid_choice")
			.map(String::as_str)
			.unwrap_or("Select a valid choice.");
		FieldError::Invalid(message.to_string())
	}
}

impl<T: FormModel> FormField for ModelChoiceField<T> {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn widget(&self) -> &Widget {
		&self.widget
	}

	fn required(&self) -> bool {
		self.required
	}

	fn initial(&self) -> Option<&Value> {
		self.initial.as_ref()
	}

	fn help_text(&self) -> Option<&str> {
		if self.help_text.is_empty() {
			None
		} else {
			Some(&self.help_text)
		}
	}

	fn clean(&self, value: Option<&Value>) -> FieldResult<Value> {
		let pk = match value {
			None | Some(Value::Null) => String::new(),
			Some(Value::String(s)) => s.trim().to_string(),
			Some(Value::Number(n)) => n.to_string(),
			Some(_) => return Err(self.invalid_choice()),
		};

		if pk.is_empty() {
			if self.required {
				return Err(self
					.error_messages
					.get("required")
					.map(|message| FieldError::Required(message.clone()))
					.unwrap_or_else(FieldError::required));
			}
			return Ok(Value::Null);
		}

		if self.resolve(&pk).is_none() {
			tracing::debug!(field = %self.name, %pk, "no record for submitted key");
			return Err(self.invalid_choice());
		}

		Ok(Value::String(pk))
	}

	fn has_changed(&self, initial: Option<&Value>, data: Option<&Value>) -> bool {
		let initial = initial.map(value_to_string).unwrap_or_default();
		let data = data.map(value_to_string).unwrap_or_default();
		initial != data
	}

	fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> Result<String, RenderError> {
		let selected = value.map(value_to_string).unwrap_or_default();
		let mut final_attrs = attrs.clone();
		final_attrs.insert("name".to_string(), name.to_string());

		let options = match &self.widget {
			Widget::Autocomplete { url } => {
				final_attrs.insert("data-autocomplete-url".to_string(), url.clone());
				self.resolve(&selected)
					.map(|instance| vec![(instance.to_choice_value(), instance.to_choice_label())])
					.unwrap_or_default()
			}
			Widget::Select { .. } => self.get_choices(),
			other => return Ok(other.render(name, value, attrs)),
		};

		Ok(render_select(&final_attrs, &options, &selected))
	}
}
