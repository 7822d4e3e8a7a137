use crate::bound_field::BoundField;
use crate::field::{FieldError, FormField, escape_html};
use crate::media::Media;
use crate::widgets::RenderError;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Index;

#[derive(Debug, thiserror::Error)]
pub enum FormError {
	#[error("Field error in {field}: {error}")]
	Field { field: String, error: FieldError },
	#[error("Validation error: {0}")]
	Validation(String),
}

pub type FormResult<T> = Result<T, FormError>;

type CleanFunction = Box<dyn Fn(&HashMap<String, Value>) -> FormResult<()> + Send + Sync>;

/// Special key for form-level (non-field-specific) errors.
pub const ALL_FIELDS_KEY: &str = "_all";

/// A set of fields bound to submitted data
///
/// Raw submitted data and cleaned values are kept apart: composite fields
/// read several raw keys (`<name>_0`, `<name>_1`) and store one cleaned value
/// under their own name.
pub struct Form {
	fields: Vec<Box<dyn FormField>>,
	data: HashMap<String, Value>,
	cleaned_data: HashMap<String, Value>,
	initial: HashMap<String, Value>,
	errors: HashMap<String, Vec<String>>,
	is_bound: bool,
	clean_functions: Vec<CleanFunction>,
	prefix: String,
}

impl Form {
	/// Create a new empty form
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Form;
	///
	/// let form = Form::new();
	/// assert!(!form.is_bound());
	/// assert!(form.fields().is_empty());
	/// ```
	pub fn new() -> Self {
		Self::with_initial(HashMap::new())
	}

	/// Create a new form with initial data
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Form;
	/// use std::collections::HashMap;
	/// use serde_json::json;
	///
	/// let mut initial = HashMap::new();
	/// initial.insert("name".to_string(), json!("John"));
	///
	/// let form = Form::with_initial(initial);
	/// assert_eq!(form.initial().get("name"), Some(&json!("John")));
	/// ```
	pub fn with_initial(initial: HashMap<String, Value>) -> Self {
		Self {
			fields: vec![],
			data: HashMap::new(),
			cleaned_data: HashMap::new(),
			initial,
			errors: HashMap::new(),
			is_bound: false,
			clean_functions: vec![],
			prefix: String::new(),
		}
	}

	/// Create a new form with a field prefix
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Form;
	///
	/// let form = Form::with_prefix("user".to_string());
	/// assert_eq!(form.prefix(), "user");
	/// assert_eq!(form.add_prefix_to_field_name("email"), "user-email");
	/// ```
	pub fn with_prefix(prefix: String) -> Self {
		let mut form = Self::new();
		form.prefix = prefix;
		form
	}

	pub fn add_field(&mut self, field: Box<dyn FormField>) {
		self.fields.push(field);
	}

	/// Bind submitted data for validation
	///
	/// Binding drops the results of any earlier validation.
	pub fn bind(&mut self, data: HashMap<String, Value>) {
		self.data = data;
		self.cleaned_data.clear();
		self.errors.clear();
		self.is_bound = true;
	}

	/// Validate the form and return true if all fields are valid
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Choice, Form};
	/// use waff_forms::fields::{CharField, ChoiceWithOtherField};
	/// use std::collections::HashMap;
	/// use serde_json::json;
	///
	/// let mut form = Form::new();
	/// form.add_field(Box::new(
	///     ChoiceWithOtherField::builder(
	///         "kind",
	///         vec![Choice::new("a", "A")],
	///         Box::new(CharField::new("kind_other".to_string())),
	///     )
	///     .build()
	///     .unwrap(),
	/// ));
	///
	/// let mut data = HashMap::new();
	/// data.insert("kind_0".to_string(), json!("__other__"));
	/// data.insert("kind_1".to_string(), json!("custom"));
	/// form.bind(data);
	///
	/// assert!(form.is_valid());
	/// assert_eq!(
	///     form.cleaned_data()["kind"],
	///     json!({"selected_key": "__other__", "display_value": "custom"})
	/// );
	/// ```
	pub fn is_valid(&mut self) -> bool {
		if !self.is_bound {
			return false;
		}

		self.errors.clear();
		self.cleaned_data.clear();

		for field in &self.fields {
			let html_name = self.add_prefix_to_field_name(field.name());
			let value = field.value_from_data(&self.data, &html_name);

			match field.clean(value.as_ref()) {
				Ok(cleaned) => {
					self.cleaned_data.insert(field.name().to_string(), cleaned);
				}
				Err(error) => {
					let messages = error.messages();
					tracing::debug!(field = field.name(), ?messages, "field failed validation");
					self.errors
						.entry(field.name().to_string())
						.or_default()
						.extend(messages);
				}
			}
		}

		for clean_fn in &self.clean_functions {
			if let Err(e) = clean_fn(&self.cleaned_data) {
				match e {
					FormError::Field { field, error } => {
						self.errors
							.entry(field)
							.or_default()
							.extend(error.messages());
					}
					FormError::Validation(msg) => {
						self.errors
							.entry(ALL_FIELDS_KEY.to_string())
							.or_default()
							.push(msg);
					}
				}
			}
		}

		self.errors.is_empty()
	}

	pub fn cleaned_data(&self) -> &HashMap<String, Value> {
		&self.cleaned_data
	}
	pub fn data(&self) -> &HashMap<String, Value> {
		&self.data
	}
	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}
	pub fn non_field_errors(&self) -> &[String] {
		self.errors
			.get(ALL_FIELDS_KEY)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}
	pub fn is_bound(&self) -> bool {
		self.is_bound
	}
	pub fn fields(&self) -> &[Box<dyn FormField>] {
		&self.fields
	}
	pub fn initial(&self) -> &HashMap<String, Value> {
		&self.initial
	}

	/// Check if any field has changed from its initial value
	///
	/// A field's initial value comes from the form's initial data, falling
	/// back to the field's own.
	pub fn has_changed(&self) -> bool {
		if !self.is_bound {
			return false;
		}

		self.fields.iter().any(|field| {
			let initial = self.initial.get(field.name()).or_else(|| field.initial());
			let html_name = self.add_prefix_to_field_name(field.name());
			let data = field.value_from_data(&self.data, &html_name);
			field.has_changed(initial, data.as_ref())
		})
	}

	pub fn get_field(&self, name: &str) -> Option<&dyn FormField> {
		self.fields
			.iter()
			.find(|f| f.name() == name)
			.map(|f| f.as_ref())
	}
	pub fn field_count(&self) -> usize {
		self.fields.len()
	}

	/// Add a custom clean function for form validation
	///
	/// Runs after every field, over the cleaned data.
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Form, FormError};
	///
	/// let mut form = Form::new();
	/// form.add_clean_function(|data| {
	///     if data.get("password") != data.get("confirm_password") {
	///         Err(FormError::Validation("Passwords do not match".to_string()))
	///     } else {
	///         Ok(())
	///     }
	/// });
	/// ```
	pub fn add_clean_function<F>(&mut self, f: F)
	where
		F: Fn(&HashMap<String, Value>) -> FormResult<()> + Send + Sync + 'static,
	{
		self.clean_functions.push(Box::new(f));
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}
	pub fn add_prefix_to_field_name(&self, field_name: &str) -> String {
		if self.prefix.is_empty() {
			field_name.to_string()
		} else {
			format!("{}-{}", self.prefix, field_name)
		}
	}

	/// Scripts and stylesheets of every field, merged
	pub fn media(&self) -> Media {
		self.fields
			.iter()
			.fold(Media::new(), |media, field| media + field.media())
	}

	pub fn get_bound_field<'a>(&'a self, name: &str) -> Option<BoundField<'a>> {
		let field = self.get_field(name)?;
		let errors = self.errors.get(name).map(|e| e.as_slice()).unwrap_or(&[]);
		let data = if self.is_bound {
			field.value_from_data(&self.data, &self.add_prefix_to_field_name(name))
		} else {
			None
		};

		Some(BoundField::new(
			field,
			self.is_bound,
			data,
			self.initial.get(name),
			errors,
			&self.prefix,
		))
	}

	pub fn bound_fields(&self) -> Vec<BoundField<'_>> {
		self.fields
			.iter()
			.filter_map(|field| self.get_bound_field(field.name()))
			.collect()
	}

	/// Render every field as a `<p>` block, preceded by non-field errors
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Form;
	/// use waff_forms::fields::CharField;
	///
	/// let mut form = Form::new();
	/// form.add_field(Box::new(CharField::new("first_name".to_string())));
	///
	/// assert_eq!(
	///     form.as_p().unwrap(),
	///     "<p><label for=\"id_first_name\">First name:</label> <input id=\"id_first_name\" name=\"first_name\" type=\"text\" /></p>"
	/// );
	/// ```
	pub fn as_p(&self) -> Result<String, RenderError> {
		let mut output = Vec::new();
		if !self.non_field_errors().is_empty() {
			output.push(error_list(self.non_field_errors()));
		}

		for bound in self.bound_fields() {
			if bound.is_hidden() {
				output.push(bound.render()?);
				continue;
			}
			if bound.has_errors() {
				output.push(error_list(bound.errors()));
			}
			let help_text = bound
				.help_text()
				.map(|text| format!(" <span class=\"helptext\">{}</span>", escape_html(text)))
				.unwrap_or_default();
			output.push(format!(
				"<p>{} {}{}</p>",
				bound.label_tag(),
				bound.render()?,
				help_text
			));
		}

		Ok(output.join("\n"))
	}
}

fn error_list(errors: &[String]) -> String {
	let items: String = errors
		.iter()
		.map(|error| format!("<li>{}</li>", escape_html(error)))
		.collect();
	format!("<ul class=\"errorlist\">{}</ul>", items)
}

impl Default for Form {
	fn default() -> Self {
		Self::new()
	}
}

impl Form {
	// Allow borrowed_box because Index trait impl requires &Box<dyn FormField>
	#[allow(clippy::borrowed_box)]
	pub fn get(&self, name: &str) -> Option<&Box<dyn FormField>> {
		self.fields.iter().find(|f| f.name() == name)
	}
}

impl Index<&str> for Form {
	type Output = Box<dyn FormField>;

	fn index(&self, name: &str) -> &Self::Output {
		self.get(name)
			.unwrap_or_else(|| panic!("Field '{}' not found", name))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::choices::Choice;
	use crate::field::Widget;
	use crate::fields::{CharField, ChoiceField, ChoiceWithOtherField};
	use rstest::rstest;
	use serde_json::json;

	fn data(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
		pairs
			.iter()
			.map(|(key, value)| (key.to_string(), json!(value)))
			.collect()
	}

	fn kind_field() -> ChoiceWithOtherField {
		ChoiceWithOtherField::builder(
			"kind",
			vec![Choice::new("a", "A"), Choice::new("b", "B")],
			Box::new(CharField::new("kind_other".to_string())),
		)
		.build()
		.unwrap()
	}

	#[rstest]
	fn test_form_validation() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("name".to_string()).with_max_length(50)));

		// Act
		form.bind(data(&[("name", "John Doe")]));

		// Assert
		assert!(form.is_valid());
		assert!(form.errors().is_empty());
		assert_eq!(form.cleaned_data()["name"], json!("John Doe"));
	}

	#[rstest]
	fn test_form_validation_error() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("name".to_string()).with_max_length(5)));

		// Act
		form.bind(data(&[("name", "Very Long Name")]));

		// Assert
		assert!(!form.is_valid());
		assert!(form.errors().contains_key("name"));
		assert!(!form.cleaned_data().contains_key("name"));
	}

	#[rstest]
	fn test_form_missing_required_fields() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("username".to_string()).required()));
		form.add_field(Box::new(kind_field()));

		// Act
		form.bind(HashMap::new());

		// Assert
		assert!(!form.is_valid());
		assert_eq!(form.errors()["username"], vec!["This field is required."]);
		assert_eq!(form.errors()["kind"], vec!["This field is required."]);
	}

	#[rstest]
	fn test_form_unbound() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("name".to_string())));

		// Assert
		assert!(!form.is_bound());
		assert!(!form.is_valid());
	}

	#[rstest]
	fn test_form_extra_data_is_not_cleaned() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("name".to_string())));

		// Act
		form.bind(data(&[("name", "John"), ("extra_field", "ignored")]));

		// Assert
		assert!(form.is_valid());
		assert!(!form.cleaned_data().contains_key("extra_field"));
		assert!(form.data().contains_key("extra_field"));
	}

	#[rstest]
	fn test_composite_field_reads_indexed_keys() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(kind_field()));

		// Act
		form.bind(data(&[("kind_0", "b"), ("kind_1", "")]));

		// Assert
		assert!(form.is_valid());
		assert_eq!(
			form.cleaned_data()["kind"],
			json!({"selected_key": "b", "display_value": "b"})
		);
	}

	#[rstest]
	fn test_composite_field_collects_sub_errors() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(
			ChoiceWithOtherField::builder(
				"kind",
				vec![Choice::new("a", "A")],
				Box::new(CharField::new("kind_other".to_string()).with_max_length(2)),
			)
			.build()
			.unwrap(),
		));

		// Act
		form.bind(data(&[("kind_0", "nope"), ("kind_1", "too long")]));

		// Assert
		assert!(!form.is_valid());
		assert_eq!(form.errors()["kind"].len(), 2);
	}

	#[rstest]
	fn test_form_has_changed_uses_field_initial() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(ChoiceField::new("teste", vec![Choice::new("x", "X")]).with_initial("x")));

		// Act
		form.bind(data(&[("teste", "x")]));

		// Assert
		assert!(!form.has_changed());
	}

	#[rstest]
	fn test_form_has_changed() {
		// Arrange
		let mut initial = HashMap::new();
		initial.insert("name".to_string(), json!("John"));
		let mut form = Form::with_initial(initial);
		form.add_field(Box::new(CharField::new("name".to_string())));

		// Act
		form.bind(data(&[("name", "Jane")]));

		// Assert
		assert!(form.has_changed());
	}

	#[rstest]
	fn test_form_index_access() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("name".to_string())));

		// Assert
		assert_eq!(form["name"].name(), "name");
	}

	#[rstest]
	#[should_panic(expected = "Field 'missing' not found")]
	fn test_form_index_access_nonexistent() {
		let form = Form::new();
		let _ = &form["missing"];
	}

	#[rstest]
	fn test_form_custom_validation() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(CharField::new("password".to_string())));
		form.add_field(Box::new(CharField::new("confirm".to_string())));
		form.add_clean_function(|data| {
			if data.get("password") != data.get("confirm") {
				return Err(FormError::Validation("Passwords do not match".to_string()));
			}
			Ok(())
		});

		// Act
		form.bind(data(&[("password", "a"), ("confirm", "b")]));

		// Assert
		assert!(!form.is_valid());
		assert_eq!(form.non_field_errors(), ["Passwords do not match"]);
	}

	#[rstest]
	fn test_form_prefix() {
		// Arrange
		let mut form = Form::with_prefix("doc".to_string());
		form.add_field(Box::new(kind_field()));

		// Act
		form.bind(data(&[("doc-kind_0", "a")]));

		// Assert
		assert!(form.is_valid());
		assert_eq!(
			form.cleaned_data()["kind"],
			json!({"selected_key": "a", "display_value": "a"})
		);
	}

	#[rstest]
	fn test_form_media_merges_fields() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(kind_field()));
		form.add_field(Box::new(kind_field_named("other_kind")));

		// Act
		let media = form.media();

		// Assert
		assert_eq!(media.js(), [crate::media::CHOICE_WITH_OTHER_JS_PATH]);
	}

	fn kind_field_named(name: &str) -> ChoiceWithOtherField {
		ChoiceWithOtherField::builder(
			name,
			vec![Choice::new("a", "A")],
			Box::new(CharField::new("other".to_string())),
		)
		.build()
		.unwrap()
	}

	#[rstest]
	fn test_as_p_shows_errors_and_keeps_submitted_other() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(kind_field()));
		form.bind(data(&[("kind_0", "__other__"), ("kind_1", "")]));
		form.is_valid();

		// Act
		let html = form.as_p().unwrap();

		// Assert
		assert!(html.starts_with("<ul class=\"errorlist\"><li>This field is required.</li></ul>"));
		assert!(html.contains("<label for=\"id_kind_0\">Kind:</label>"));
		assert!(html.contains(
			"<input checked=\"checked\" data-choice-fields=\"kind_0\" id=\"id_kind_0_2\" name=\"kind_0\" type=\"radio\" value=\"__other__\" />"
		));
	}

	#[rstest]
	fn test_as_p_renders_hidden_field_without_label() {
		// Arrange
		let mut form = Form::new();
		form.add_field(Box::new(
			CharField::new("token".to_string())
				.with_widget(Widget::HiddenInput)
				.with_initial("abc"),
		));
		form.add_field(Box::new(CharField::new("note".to_string())));

		// Act
		let html = form.as_p().unwrap();

		// Assert
		assert_eq!(
			html,
			"<input id=\"id_token\" name=\"token\" type=\"hidden\" value=\"abc\" />\n<p><label for=\"id_note\">Note:</label> <input id=\"id_note\" name=\"note\" type=\"text\" /></p>"
		);
	}
}
