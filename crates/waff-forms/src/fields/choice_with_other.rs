//! Radio choice with a free-form "Other" alternative
//!
//! [`ChoiceWithOtherField`] offers a fixed list of choices plus a final
//! "Other" choice. Picking "Other" hands the input over to a second,
//! caller-supplied field (free text, a model choice, ...). Submitted data
//! arrives as two values, `<name>_0` for the radio list and `<name>_1` for the
//! other field, and is composed into a single [`EffectiveValue`].

use crate::choices::{Choice, EMPTY_CHOICE_LABEL, OTHER_CHOICE, OTHER_CHOICE_DISPLAY, flatten};
use crate::field::{
	Attrs, FieldError, FieldResult, FormField, Widget, is_empty_value, value_to_string,
};
use crate::fields::ChoiceField;
use crate::fields::multi_value_field::clean_sub_values;
use crate::media::{Media, MediaDefiningWidget};
use crate::widgets::{ChoiceWithOtherWidget, MultiWidget, RenderError, all_empty, sub_widget_name};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceWithOtherError {
	#[error("choice `{0}` uses the value reserved for the other choice")]
	ReservedValue(String),
	#[error("choice value `{0}` is offered more than once")]
	DuplicateValue(String),
}

/// The composed value of a [`ChoiceWithOtherField`]
///
/// `selected_key` is the chosen choice value, [`OTHER_CHOICE`] when the
/// other field was used, or `None` when nothing was chosen. `display_value`
/// repeats the chosen value, or holds the other field's cleaned value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveValue {
	pub selected_key: Option<String>,
	pub display_value: Value,
}

impl EffectiveValue {
	pub fn predefined(key: impl Into<String>) -> Self {
		let key = key.into();
		Self {
			display_value: Value::String(key.clone()),
			selected_key: Some(key),
		}
	}

	pub fn other(display_value: Value) -> Self {
		Self {
			selected_key: Some(OTHER_CHOICE.to_string()),
			display_value,
		}
	}

	/// Nothing chosen
	pub fn empty() -> Self {
		Self {
			selected_key: None,
			display_value: Value::String(String::new()),
		}
	}

	pub fn is_other(&self) -> bool {
		self.selected_key.as_deref() == Some(OTHER_CHOICE)
	}

	pub fn is_empty(&self) -> bool {
		self.selected_key.is_none()
	}

	/// JSON object form, as stored in a form's cleaned data
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::fields::EffectiveValue;
	/// use serde_json::json;
	///
	/// let value = EffectiveValue::predefined("choice1").to_value();
	/// assert_eq!(value, json!({"selected_key": "choice1", "display_value": "choice1"}));
	/// assert_eq!(EffectiveValue::from_value(&value), Some(EffectiveValue::predefined("choice1")));
	/// ```
	pub fn to_value(&self) -> Value {
		json!({
			"selected_key": self.selected_key,
			"display_value": self.display_value,
		})
	}

	/// Read back the object produced by [`EffectiveValue::to_value`]
	///
	/// Returns `None` for anything else, including objects missing a key.
	pub fn from_value(value: &Value) -> Option<Self> {
		let object = value.as_object()?;
		if !object.contains_key("selected_key") || !object.contains_key("display_value") {
			return None;
		}
		serde_json::from_value(value.clone()).ok()
	}
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Radio choices plus an "Other" choice backed by another field
///
/// The field itself reports `required() == false`: a required choice-with-other
/// means "a predefined choice is checked or the other field has a value",
/// which is checked when the two sub-values are composed.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Unvalidated
///     Unvalidated --> Decomposed: sub-fields clean <name>_0 and <name>_1
///     Unvalidated --> Rejected: sub-field error
///     Decomposed --> Composed: compress
///     Decomposed --> Rejected: required rule
///     Composed --> [*]
///     Rejected --> [*]
/// ```
///
/// # Examples
///
/// ```
/// use waff_forms::{Choice, FormField};
/// use waff_forms::fields::{CharField, ChoiceWithOtherField, EffectiveValue};
/// use serde_json::json;
///
/// let field = ChoiceWithOtherField::builder(
///     "color",
///     vec![Choice::new("red", "Red"), Choice::new("blue", "Blue")],
///     Box::new(CharField::new("color_other".to_string())),
/// )
/// .build()
/// .unwrap();
///
/// let cleaned = field.clean(Some(&json!(["__other__", "teal"]))).unwrap();
/// assert_eq!(EffectiveValue::from_value(&cleaned), Some(EffectiveValue::other(json!("teal"))));
/// ```
pub struct ChoiceWithOtherField {
	name: String,
	label: Option<String>,
	help_text: Option<String>,
	initial: Option<Value>,
	declared_required: bool,
	choices: Vec<Choice>,
	selector: ChoiceField,
	other: Box<dyn FormField>,
	widget: Widget,
}

impl ChoiceWithOtherField {
	/// Start building a field over `choices` with `other` as the other field
	pub fn builder(
		name: impl Into<String>,
		choices: Vec<Choice>,
		other: Box<dyn FormField>,
	) -> ChoiceWithOtherFieldBuilder {
		ChoiceWithOtherFieldBuilder {
			name: name.into(),
			choices,
			other,
			has_empty_choice: false,
			first_is_preselected: false,
			required: true,
			initial: None,
			label: None,
			help_text: None,
		}
	}

	/// The full choice list: optional empty choice, caller choices, "Other"
	pub fn choices(&self) -> &[Choice] {
		&self.choices
	}

	/// Requiredness the field was declared with
	pub fn is_declared_required(&self) -> bool {
		self.declared_required
	}

	pub fn selector(&self) -> &ChoiceField {
		&self.selector
	}

	pub fn other_field(&self) -> &dyn FormField {
		self.other.as_ref()
	}

	/// The widget pairing the selector with the other field
	pub fn widget_ref(&self) -> ChoiceWithOtherWidget<'_> {
		ChoiceWithOtherWidget::new(&self.selector, self.other.as_ref())
	}

	/// Combine cleaned `[selector, other]` values into one value
	///
	/// A declared-required field needs a selection. An optional field passes
	/// a blank selector through as both key and display value; no values at
	/// all compose to [`EffectiveValue::empty`]. Choosing "Other" always needs
	/// a non-blank other value, whether or not the field is required.
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Choice;
	/// use waff_forms::fields::{CharField, ChoiceWithOtherField, EffectiveValue};
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
	/// assert_eq!(field.compress(&[json!("a"), json!("")]), Ok(EffectiveValue::predefined("a")));
	/// assert!(field.compress(&[]).unwrap_err().is_required());
	/// assert!(field.compress(&[json!("__other__"), json!(null)]).is_err());
	/// ```
	pub fn compress(&self, sub_values: &[Value]) -> FieldResult<EffectiveValue> {
		if self.declared_required && sub_values.first().is_none_or(is_empty_value) {
			tracing::debug!(field = %self.name, "nothing selected on a required field");
			return Err(FieldError::required());
		}

		let Some(selected) = sub_values.first() else {
			return Ok(EffectiveValue::empty());
		};
		if selected.is_null() {
			return Ok(EffectiveValue {
				selected_key: None,
				display_value: Value::Null,
			});
		}

		let key = value_to_string(selected);
		if key != OTHER_CHOICE {
			return Ok(EffectiveValue::predefined(key));
		}

		match sub_values.get(1) {
			Some(other) if !is_blank(other) => {
				tracing::debug!(field = %self.name, "composed other value");
				Ok(EffectiveValue::other(other.clone()))
			}
			_ => {
				tracing::debug!(field = %self.name, "other chosen but left blank");
				Err(FieldError::required())
			}
		}
	}
}

fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		_ => false,
	}
}

impl FormField for ChoiceWithOtherField {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn required(&self) -> bool {
		false
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
		let sub_values = match value {
			Some(Value::Array(items)) => items.clone(),
			other => self.widget_ref().decompress(other),
		};

		let cleaned = if all_empty(&sub_values) {
			Vec::new()
		} else {
			let fields: [&dyn FormField; 2] = [&self.selector, self.other.as_ref()];
			clean_sub_values(&fields, &sub_values)?
		};

		Ok(self.compress(&cleaned)?.to_value())
	}

	fn has_changed(&self, initial: Option<&Value>, data: Option<&Value>) -> bool {
		let widget = self.widget_ref();
		let initial = widget.sub_values(initial);
		let data = widget.sub_values(data);
		initial
			.iter()
			.zip(data.iter())
			.any(|(before, after)| value_to_string(before) != value_to_string(after))
	}

	fn value_from_data(&self, data: &HashMap<String, Value>, name: &str) -> Option<Value> {
		self.widget_ref().value_from_data(data, name)
	}

	fn render(&self, name: &str, value: Option<&Value>, attrs: &Attrs) -> Result<String, RenderError> {
		self.widget_ref().render(name, value, attrs)
	}

	fn media(&self) -> Media {
		self.widget_ref().media()
	}
}

/// Builder returned by [`ChoiceWithOtherField::builder`]
pub struct ChoiceWithOtherFieldBuilder {
	name: String,
	choices: Vec<Choice>,
	other: Box<dyn FormField>,
	has_empty_choice: bool,
	first_is_preselected: bool,
	required: bool,
	initial: Option<Value>,
	label: Option<String>,
	help_text: Option<String>,
}

impl ChoiceWithOtherFieldBuilder {
	/// Prepend an empty `("", "---------")` choice
	pub fn has_empty_choice(mut self, has_empty_choice: bool) -> Self {
		self.has_empty_choice = has_empty_choice;
		self
	}

	/// Use the first choice as the initial value when none is given
	pub fn first_is_preselected(mut self, first_is_preselected: bool) -> Self {
		self.first_is_preselected = first_is_preselected;
		self
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn initial(mut self, initial: impl Into<Value>) -> Self {
		self.initial = Some(initial.into());
		self
	}

	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	/// Assemble the choice list and the sub-fields
	///
	/// Fails when a caller choice uses [`OTHER_CHOICE`] (at any depth) or
	/// when two top-level choices share a value.
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Choice;
	/// use waff_forms::fields::{CharField, ChoiceWithOtherError, ChoiceWithOtherField};
	///
	/// let result = ChoiceWithOtherField::builder(
	///     "kind",
	///     vec![Choice::new("__other__", "Sneaky")],
	///     Box::new(CharField::new("kind_other".to_string())),
	/// )
	/// .build();
	/// assert!(matches!(result, Err(ChoiceWithOtherError::ReservedValue(_))));
	/// ```
	pub fn build(self) -> Result<ChoiceWithOtherField, ChoiceWithOtherError> {
		if let Some(reserved) = self
			.choices
			.iter()
			.find(|choice| choice.contains_value(OTHER_CHOICE))
		{
			return Err(ChoiceWithOtherError::ReservedValue(reserved.label().to_string()));
		}

		let mut choices = Vec::with_capacity(self.choices.len() + 2);
		if self.has_empty_choice {
			choices.push(Choice::new("", EMPTY_CHOICE_LABEL));
		}
		choices.extend(self.choices);

		let mut seen = HashSet::new();
		for value in choices.iter().filter_map(Choice::value) {
			if !seen.insert(value) {
				return Err(ChoiceWithOtherError::DuplicateValue(value.to_string()));
			}
		}

		choices.push(Choice::other(OTHER_CHOICE_DISPLAY));

		let mut initial = self.initial;
		let has_initial = initial.as_ref().is_some_and(|value| !is_empty_value(value));
		if !has_initial
			&& self.first_is_preselected
			&& let Some(Choice::Predefined { value, .. }) = choices.first()
		{
			initial = Some(Value::String(value.clone()));
		}

		let selector = ChoiceField::new(sub_widget_name(&self.name, 0), choices.clone())
			.radio()
			.with_required(false);
		let widget = Widget::MultiWidget {
			widgets: vec![
				Widget::RadioSelect {
					choices: flatten(&choices),
				},
				self.other.widget().clone(),
			],
		};

		tracing::debug!(
			field = %self.name,
			choices = choices.len(),
			required = self.required,
			"built choice-with-other field"
		);

		Ok(ChoiceWithOtherField {
			name: self.name,
			label: self.label,
			help_text: self.help_text,
			initial,
			declared_required: self.required,
			choices,
			selector,
			other: self.other,
			widget,
		})
	}
}
