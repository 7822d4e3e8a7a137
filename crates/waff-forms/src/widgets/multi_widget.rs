//! Widgets made of several sub-widgets
//!
//! A multi-widget renders each sub-widget under `<name>_<index>` and reads
//! submitted data back from the same keys. Turning one logical value into
//! the per-widget values is `decompress`; the reverse belongs to the field.

use crate::field::is_empty_value;
use serde_json::Value;
use std::collections::HashMap;

/// Name of the sub-widget at `index`
///
/// # Examples
///
/// ```
/// use waff_forms::widgets::sub_widget_name;
///
/// assert_eq!(sub_widget_name("kind", 1), "kind_1");
/// ```
pub fn sub_widget_name(name: &str, index: usize) -> String {
	format!("{}_{}", name, index)
}

pub trait MultiWidget {
	/// Number of sub-widgets
	fn widget_count(&self) -> usize;

	/// Split one logical value into one value per sub-widget
	fn decompress(&self, value: Option<&Value>) -> Vec<Value>;

	/// Collect `<name>_0 .. <name>_n` from submitted data into a JSON array
	///
	/// Returns `None` when none of the keys were submitted.
	fn value_from_data(&self, data: &HashMap<String, Value>, name: &str) -> Option<Value> {
		let values: Vec<Option<&Value>> = (0..self.widget_count())
			.map(|index| data.get(&sub_widget_name(name, index)))
			.collect();
		if values.iter().all(Option::is_none) {
			return None;
		}
		Some(Value::Array(
			values
				.into_iter()
				.map(|value| value.cloned().unwrap_or(Value::Null))
				.collect(),
		))
	}

	/// Per-widget values for `value`
	///
	/// A submitted array is used as is (padded or truncated to the widget
	/// count); anything else is decompressed.
	fn sub_values(&self, value: Option<&Value>) -> Vec<Value> {
		match value {
			Some(Value::Array(items)) if !items.is_empty() => {
				let mut items = items.clone();
				items.resize(self.widget_count(), Value::Null);
				items
			}
			other => self.decompress(other),
		}
	}
}

/// Whether every sub-value is empty
pub fn all_empty(values: &[Value]) -> bool {
	values.iter().all(is_empty_value)
}
