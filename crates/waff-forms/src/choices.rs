//! Choices offered by choice-based fields

/// Reserved value of the synthetic "Other" choice.
///
/// Caller-supplied choices must never use it.
pub const OTHER_CHOICE: &str = "__other__";

/// Label rendered next to the "Other" radio button.
pub const OTHER_CHOICE_DISPLAY: &str = "";

/// Label of the optional leading empty choice.
pub const EMPTY_CHOICE_LABEL: &str = "---------";

/// One entry of a choice list
///
/// The variant is decided when the list is built, so renderers switch on the
/// tag instead of comparing values against [`OTHER_CHOICE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
	/// A selectable `(value, label)` pair
	Predefined { value: String, label: String },
	/// A labelled group of nested choices
	Group { label: String, choices: Vec<Choice> },
	/// The synthetic "Other" entry, whose value is [`OTHER_CHOICE`]
	Other { label: String },
}

impl Choice {
	/// Create a selectable choice
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Choice;
	///
	/// let choice = Choice::new("red", "Red");
	/// assert_eq!(choice.value(), Some("red"));
	/// assert_eq!(choice.label(), "Red");
	/// ```
	pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
		Choice::Predefined {
			value: value.into(),
			label: label.into(),
		}
	}

	/// Create a group of nested choices
	///
	/// # Examples
	///
	/// ```
	/// use waff_forms::Choice;
	///
	/// let group = Choice::group("Warm", [Choice::new("red", "Red"), Choice::new("orange", "Orange")]);
	/// assert_eq!(group.value(), None);
	/// assert!(group.contains_value("orange"));
	/// ```
	pub fn group(label: impl Into<String>, choices: impl IntoIterator<Item = Choice>) -> Self {
		Choice::Group {
			label: label.into(),
			choices: choices.into_iter().collect(),
		}
	}

	pub fn other(label: impl Into<String>) -> Self {
		Choice::Other {
			label: label.into(),
		}
	}

	/// The submitted value of this choice; groups have none
	pub fn value(&self) -> Option<&str> {
		match self {
			Choice::Predefined { value, .. } => Some(value),
			Choice::Other { .. } => Some(OTHER_CHOICE),
			Choice::Group { .. } => None,
		}
	}

	pub fn label(&self) -> &str {
		match self {
			Choice::Predefined { label, .. }
			| Choice::Group { label, .. }
			| Choice::Other { label } => label,
		}
	}

	pub fn is_other(&self) -> bool {
		matches!(self, Choice::Other { .. })
	}

	/// Whether `value` selects this choice or, for groups, one of its members
	pub fn contains_value(&self, value: &str) -> bool {
		match self {
			Choice::Group { choices, .. } => choices.iter().any(|c| c.contains_value(value)),
			other => other.value() == Some(value),
		}
	}
}

impl<V, L> From<(V, L)> for Choice
where
	V: Into<String>,
	L: Into<String>,
{
	fn from((value, label): (V, L)) -> Self {
		Choice::new(value, label)
	}
}

/// Flatten nested groups into plain `(value, label)` pairs
///
/// # Examples
///
/// ```
/// use waff_forms::{Choice, choices::flatten};
///
/// let choices = vec![
///     Choice::new("a", "A"),
///     Choice::group("More", [Choice::new("b", "B")]),
/// ];
/// assert_eq!(
///     flatten(&choices),
///     vec![("a".to_string(), "A".to_string()), ("b".to_string(), "B".to_string())]
/// );
/// ```
pub fn flatten(choices: &[Choice]) -> Vec<(String, String)> {
	let mut pairs = Vec::new();
	for choice in choices {
		match choice {
			Choice::Group { choices, .. } => pairs.extend(flatten(choices)),
			other => {
				if let Some(value) = other.value() {
					pairs.push((value.to_string(), other.label().to_string()));
				}
			}
		}
	}
	pairs
}
