//! List rendering of radio and checkbox choices
//!
//! [`ChoiceRenderer`] turns a choice list into `<ul>` markup, one `<li>` per
//! choice. The "Other" choice gets an extra slot inside its `<label>` where
//! the composite widget later places the other field's markup. The slot is a
//! node of the returned [`Markup`], not a piece of text, so escaped labels can
//! never be mistaken for it.

use crate::choices::{Choice, OTHER_CHOICE};
use crate::field::{Attrs, escape_attribute, escape_html, flatatt};
use std::fmt;

/// Text printed for an unfilled slot when [`Markup`] is displayed as is.
pub const OTHER_FIELD_PLACEHOLDER: &str = "{other_form_field}";

/// Attribute linking every choice input to the selector's name.
pub const CHOICE_FIELDS_ATTR: &str = "data-choice-fields";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
	#[error("rendered choices contain no slot for the other field")]
	MissingOtherSlot,
	#[error("rendered choices contain {0} slots for the other field, expected exactly one")]
	DuplicateOtherSlot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
	Html(String),
	OtherSlot,
}

/// Rendered HTML that may still hold a slot for the other field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
	fragments: Vec<Fragment>,
}

impl Markup {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append already escaped HTML
	pub fn push_str(&mut self, html: &str) {
		if let Some(Fragment::Html(last)) = self.fragments.last_mut() {
			last.push_str(html);
		} else {
			self.fragments.push(Fragment::Html(html.to_string()));
		}
	}

	pub fn push_slot(&mut self) {
		self.fragments.push(Fragment::OtherSlot);
	}

	pub fn append(&mut self, other: Markup) {
		for fragment in other.fragments {
			match fragment {
				Fragment::Html(html) => self.push_str(&html),
				Fragment::OtherSlot => self.push_slot(),
			}
		}
	}

	/// Surround the markup with an opening and closing tag
	pub fn wrap(self, open: &str, close: &str) -> Markup {
		let mut wrapped = Markup::new();
		wrapped.push_str(open);
		wrapped.append(self);
		wrapped.push_str(close);
		wrapped
	}

	pub fn slot_count(&self) -> usize {
		self.fragments
			.iter()
			.filter(|f| matches!(f, Fragment::OtherSlot))
			.count()
	}

	/// Place `other_html` into the single slot and serialize
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::widgets::{Markup, RenderError};
	///
	/// let mut markup = Markup::new();
	/// markup.push_str("<p>");
	/// markup.push_slot();
	/// markup.push_str("</p>");
	/// assert_eq!(markup.fill_other_slot("<input />").unwrap(), "<p><input /></p>");
	///
	/// assert_eq!(
	///     Markup::new().fill_other_slot("<input />"),
	///     Err(RenderError::MissingOtherSlot)
	/// );
	/// ```
	pub fn fill_other_slot(self, other_html: &str) -> Result<String, RenderError> {
		match self.slot_count() {
			0 => return Err(RenderError::MissingOtherSlot),
			1 => {}
			n => return Err(RenderError::DuplicateOtherSlot(n)),
		}
		let mut html = String::new();
		for fragment in self.fragments {
			match fragment {
				Fragment::Html(part) => html.push_str(&part),
				Fragment::OtherSlot => html.push_str(other_html),
			}
		}
		Ok(html)
	}
}

impl fmt::Display for Markup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for fragment in &self.fragments {
			match fragment {
				Fragment::Html(html) => f.write_str(html)?,
				Fragment::OtherSlot => f.write_str(OTHER_FIELD_PLACEHOLDER)?,
			}
		}
		Ok(())
	}
}

/// Input element used for each choice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChoiceInputType {
	#[default]
	Radio,
	Checkbox,
}

impl ChoiceInputType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ChoiceInputType::Radio => "radio",
			ChoiceInputType::Checkbox => "checkbox",
		}
	}
}

/// Renders a choice list as `<ul>` markup
#[derive(Debug, Clone, Copy, Default)]
pub struct ChoiceRenderer {
	input_type: ChoiceInputType,
}

impl ChoiceRenderer {
	pub fn new(input_type: ChoiceInputType) -> Self {
		Self { input_type }
	}

	pub fn radio() -> Self {
		Self::new(ChoiceInputType::Radio)
	}

	pub fn input_type(&self) -> ChoiceInputType {
		self.input_type
	}

	/// Render `choices` under `name`, checking the one equal to `value`
	///
	/// An `id` in `attrs` is applied to the `<ul>`; each item gets
	/// `<id>_<index>`, and nested groups extend the id once per level.
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::{Attrs, Choice};
	/// use waff_forms::widgets::ChoiceRenderer;
	///
	/// let choices = vec![Choice::new("a", "A")];
	/// let html = ChoiceRenderer::radio().render("pick", "a", &Attrs::new(), &choices).to_string();
	/// assert_eq!(
	///     html,
	///     "<ul>\n<li><label><input checked=\"checked\" data-choice-fields=\"pick\" name=\"pick\" type=\"radio\" value=\"a\" /> A</label></li>\n</ul>"
	/// );
	/// ```
	pub fn render(&self, name: &str, value: &str, attrs: &Attrs, choices: &[Choice]) -> Markup {
		let id = attrs.get("id");
		let mut output = Markup::new();
		match id {
			Some(id) => output.push_str(&format!("<ul id=\"{}\">", escape_attribute(id))),
			None => output.push_str("<ul>"),
		}

		for (index, choice) in choices.iter().enumerate() {
			output.push_str("\n<li>");
			match choice {
				Choice::Group {
					label,
					choices: members,
				} => {
					let mut group_attrs = attrs.clone();
					if let Some(id) = id {
						group_attrs.insert("id".to_string(), format!("{}_{}", id, index));
					}
					output.push_str(&escape_html(label));
					output.append(self.render(name, value, &group_attrs, members));
				}
				Choice::Predefined {
					value: choice_value,
					label,
				} => {
					output.append(self.choice_input(name, value, attrs, choice_value, label, index));
				}
				Choice::Other { label } => {
					output.append(self.other_choice_input(name, value, attrs, label, index));
				}
			}
			output.push_str("</li>");
		}

		output.push_str("\n</ul>");
		output
	}

	fn choice_input(
		&self,
		name: &str,
		value: &str,
		attrs: &Attrs,
		choice_value: &str,
		choice_label: &str,
		index: usize,
	) -> Markup {
		let (label_open, input) = self.tag(name, value, attrs, choice_value, index);
		let mut markup = Markup::new();
		markup.push_str(&format!(
			"{}{} {}</label>",
			label_open,
			input,
			escape_html(choice_label)
		));
		markup
	}

	/// Same shape as a plain choice input, plus the other field's slot
	fn other_choice_input(
		&self,
		name: &str,
		value: &str,
		attrs: &Attrs,
		choice_label: &str,
		index: usize,
	) -> Markup {
		let (label_open, input) = self.tag(name, value, attrs, OTHER_CHOICE, index);
		let mut markup = Markup::new();
		markup.push_str(&format!(
			"{}{} {}<div class=\"other-field\">",
			label_open,
			input,
			escape_html(choice_label)
		));
		markup.push_slot();
		markup.push_str("</div></label>");
		markup
	}

	fn tag(
		&self,
		name: &str,
		value: &str,
		attrs: &Attrs,
		choice_value: &str,
		index: usize,
	) -> (String, String) {
		let mut input_attrs = attrs.clone();
		let id = attrs.get("id").map(|id| format!("{}_{}", id, index));
		let label_open = match &id {
			Some(id) => format!("<label for=\"{}\">", escape_attribute(id)),
			None => "<label>".to_string(),
		};
		if let Some(id) = id {
			input_attrs.insert("id".to_string(), id);
		}
		input_attrs.insert(CHOICE_FIELDS_ATTR.to_string(), name.to_string());
		input_attrs.insert("type".to_string(), self.input_type.as_str().to_string());
		input_attrs.insert("name".to_string(), name.to_string());
		input_attrs.insert("value".to_string(), choice_value.to_string());
		if value == choice_value {
			input_attrs.insert("checked".to_string(), "checked".to_string());
		}
		(label_open, format!("<input{} />", flatatt(&input_attrs)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn id_attrs(id: &str) -> Attrs {
		let mut attrs = Attrs::new();
		attrs.insert("id".to_string(), id.to_string());
		attrs
	}

	#[rstest]
	fn test_render_suffixes_ids_per_item() {
		// Arrange
		let choices = vec![Choice::new("a", "A"), Choice::new("b", "B")];

		// Act
		let html = ChoiceRenderer::radio()
			.render("pick", "", &id_attrs("id_pick"), &choices)
			.to_string();

		// Assert
		assert!(html.starts_with("<ul id=\"id_pick\">"));
		assert!(html.contains("<label for=\"id_pick_0\">"));
		assert!(html.contains("id=\"id_pick_1\""));
		assert!(!html.contains("checked"));
	}

	#[rstest]
	fn test_render_nested_group_extends_ids() {
		// Arrange
		let choices = vec![
			Choice::new("a", "A"),
			Choice::group("More", [Choice::new("b", "B"), Choice::new("c", "C")]),
		];

		// Act
		let html = ChoiceRenderer::radio()
			.render("pick", "c", &id_attrs("id_pick"), &choices)
			.to_string();

		// Assert
		assert!(html.contains("<li>More<ul id=\"id_pick_1\">"));
		assert!(html.contains("<label for=\"id_pick_1_1\"><input checked=\"checked\""));
		assert_eq!(html.matches("<ul").count(), 2);
	}

	#[rstest]
	fn test_other_choice_holds_single_slot() {
		// Arrange
		let choices = vec![Choice::new("a", "A"), Choice::other("")];

		// Act
		let markup = ChoiceRenderer::radio().render("pick", "", &Attrs::new(), &choices);

		// Assert
		assert_eq!(markup.slot_count(), 1);
		let html = markup.to_string();
		assert!(html.contains(
			"value=\"__other__\" /> <div class=\"other-field\">{other_form_field}</div></label>"
		));
	}

	#[rstest]
	fn test_label_text_cannot_forge_slot() {
		// Arrange
		let choices = vec![Choice::new("a", OTHER_FIELD_PLACEHOLDER), Choice::other("")];
		let markup = ChoiceRenderer::radio().render("pick", "", &Attrs::new(), &choices);

		// Act
		let html = markup.fill_other_slot("<input name=\"pick_1\" />").unwrap();

		// Assert
		assert_eq!(html.matches("<input name=\"pick_1\" />").count(), 1);
		assert!(html.contains("/> {other_form_field}</label>"));
	}

	#[rstest]
	fn test_fill_rejects_duplicate_slots() {
		// Arrange
		let mut markup = Markup::new();
		markup.push_slot();
		markup.push_slot();

		// Act & Assert
		assert_eq!(
			markup.fill_other_slot("x"),
			Err(RenderError::DuplicateOtherSlot(2))
		);
	}

	#[rstest]
	fn test_checkbox_input_type() {
		// Arrange
		let renderer = ChoiceRenderer::new(ChoiceInputType::Checkbox);

		// Act
		let html = renderer
			.render("flags", "x", &Attrs::new(), &[Choice::new("x", "X")])
			.to_string();

		// Assert
		assert!(html.contains("type=\"checkbox\""));
	}

	#[rstest]
	fn test_labels_are_escaped() {
		// Act
		let html = ChoiceRenderer::radio()
			.render("pick", "", &Attrs::new(), &[Choice::new("a", "<b>A</b>")])
			.to_string();

		// Assert
		assert!(html.contains("&lt;b&gt;A&lt;/b&gt;"));
	}
}
