//! Minimal model interface used by model-backed choice fields

use crate::field::value_to_string;
use serde_json::Value;

/// A record that can be offered as a choice
///
/// Only `field_names` and `get_field` are required; the choice value defaults
/// to the `id` field and the label to the value.
pub trait FormModel: Send + Sync {
	fn field_names() -> Vec<String>
	where
		Self: Sized;

	fn get_field(&self, name: &str) -> Option<Value>;

	/// Value submitted when this record is chosen
	fn to_choice_value(&self) -> String {
		self.get_field("id")
			.map(|value| value_to_string(&value))
			.unwrap_or_default()
	}

	/// Text shown for this record
	fn to_choice_label(&self) -> String {
		self.to_choice_value()
	}
}
