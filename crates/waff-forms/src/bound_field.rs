use crate::field::{Attrs, FormField, Widget, escape_html};
use crate::widgets::RenderError;
use serde_json::Value;

/// A field paired with the form state needed to render it
pub struct BoundField<'a> {
	field: &'a dyn FormField,
	is_bound: bool,
	data: Option<Value>,
	form_initial: Option<&'a Value>,
	errors: &'a [String],
	prefix: &'a str,
}

impl<'a> BoundField<'a> {
	/// Create a bound field
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::BoundField;
	/// use waff_forms::fields::CharField;
	/// use serde_json::json;
	///
	/// let field = CharField::new("email".to_string());
	/// let bound = BoundField::new(&field, true, Some(json!("a@b.c")), None, &[], "");
	/// assert_eq!(bound.html_name(), "email");
	/// assert_eq!(bound.value(), Some(&json!("a@b.c")));
	/// ```
	pub fn new(
		field: &'a dyn FormField,
		is_bound: bool,
		data: Option<Value>,
		form_initial: Option<&'a Value>,
		errors: &'a [String],
		prefix: &'a str,
	) -> Self {
		Self {
			field,
			is_bound,
			data,
			form_initial,
			errors,
			prefix,
		}
	}

	pub fn name(&self) -> &str {
		self.field.name()
	}

	/// Name used in submitted data, including the form prefix
	pub fn html_name(&self) -> String {
		if self.prefix.is_empty() {
			self.field.name().to_string()
		} else {
			format!("{}-{}", self.prefix, self.field.name())
		}
	}

	/// Id given to the field's widget
	pub fn auto_id(&self) -> String {
		format!("id_{}", self.html_name())
	}

	/// Id a `<label>` should point at
	pub fn id_for_label(&self) -> String {
		self.field.widget().id_for_label(&self.auto_id())
	}

	/// Explicit label, or the field name with underscores as spaces
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::BoundField;
	/// use waff_forms::fields::CharField;
	///
	/// let field = CharField::new("document_template".to_string());
	/// let bound = BoundField::new(&field, false, None, None, &[], "");
	/// assert_eq!(bound.label(), "Document template");
	/// ```
	pub fn label(&self) -> String {
		match self.field.label() {
			Some(label) => label.to_string(),
			None => pretty_name(self.field.name()),
		}
	}

	pub fn label_tag(&self) -> String {
		format!(
			"<label for=\"{}\">{}:</label>",
			escape_html(&self.id_for_label()),
			escape_html(&self.label())
		)
	}

	/// Submitted data when bound, otherwise the initial value
	pub fn value(&self) -> Option<&Value> {
		if self.is_bound {
			self.data.as_ref()
		} else {
			self.form_initial.or_else(|| self.field.initial())
		}
	}

	/// Render the widget with the current value
	pub fn render(&self) -> Result<String, RenderError> {
		let mut attrs = Attrs::new();
		attrs.insert("id".to_string(), self.auto_id());
		if self.field.required() {
			attrs.insert("required".to_string(), "required".to_string());
		}
		self.field.render(&self.html_name(), self.value(), &attrs)
	}

	pub fn errors(&self) -> &[String] {
		self.errors
	}
	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}
	pub fn widget(&self) -> &Widget {
		self.field.widget()
	}
	pub fn is_hidden(&self) -> bool {
		self.field.widget().is_hidden()
	}
	pub fn help_text(&self) -> Option<&str> {
		self.field.help_text()
	}
	pub fn is_required(&self) -> bool {
		self.field.required()
	}
}

fn pretty_name(name: &str) -> String {
	let spaced = name.replace('_', " ");
	let mut chars = spaced.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
