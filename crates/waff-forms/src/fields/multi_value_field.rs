//! Cleaning of values split across several sub-fields

use crate::field::{FieldError, FieldResult, FormField, is_empty_value};
use serde_json::Value;

/// Clean `values[i]` with `fields[i]`
///
/// Sub-fields are never required on their own: an empty sub-value becomes
/// `null` without reaching its field. Errors from every sub-field are
/// collected; a single error is returned as is, several as
/// [`FieldError::Multiple`]. Missing trailing values count as empty.
///
/// # Examples
///
/// ```
/// use waff_forms::FormField;
/// use waff_forms::fields::{CharField, clean_sub_values};
/// use serde_json::json;
///
/// let first = CharField::new("a".to_string()).required();
/// let second = CharField::new("b".to_string()).with_max_length(2);
/// let fields: [&dyn FormField; 2] = [&first, &second];
///
/// let cleaned = clean_sub_values(&fields, &[json!(" x "), json!("")]).unwrap();
/// assert_eq!(cleaned, vec![json!("x"), json!(null)]);
/// assert!(clean_sub_values(&fields, &[json!("x"), json!("long")]).is_err());
/// ```
pub fn clean_sub_values(fields: &[&dyn FormField], values: &[Value]) -> FieldResult<Vec<Value>> {
	let mut cleaned = Vec::with_capacity(fields.len());
	let mut errors = Vec::new();

	for (index, field) in fields.iter().enumerate() {
		let Some(value) = values.get(index).filter(|value| !is_empty_value(value)) else {
			cleaned.push(Value::Null);
			continue;
		};
		match field.clean(Some(value)) {
			Ok(value) => cleaned.push(value),
			Err(error) => {
				tracing::debug!(field = field.name(), %error, "sub-field rejected its value");
				errors.push(error);
			}
		}
	}

	match errors.len() {
		0 => Ok(cleaned),
		1 => Err(errors.remove(0)),
		_ => Err(FieldError::Multiple(errors)),
	}
}
