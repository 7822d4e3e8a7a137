use serde_json::{Value, json};
use std::fmt;
use waff::forms::FormModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
	pub id: i64,
	pub name: String,
}

impl DocumentTemplate {
	pub fn new(id: i64, name: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
		}
	}
}

impl fmt::Display for DocumentTemplate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "pk:{} - {}", self.id, self.name)
	}
}

impl FormModel for DocumentTemplate {
	fn field_names() -> Vec<String> {
		vec!["id".to_string(), "name".to_string()]
	}

	fn get_field(&self, name: &str) -> Option<Value> {
		match name {
			"id" => Some(json!(self.id)),
			"name" => Some(json!(self.name)),
			_ => None,
		}
	}

	fn to_choice_label(&self) -> String {
		self.to_string()
	}
}

/// In-memory table of document templates
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
	rows: Vec<DocumentTemplate>,
}

impl TemplateStore {
	pub fn new(rows: Vec<DocumentTemplate>) -> Self {
		Self { rows }
	}

	/// A store with a few sample rows
	pub fn seeded() -> Self {
		Self::new(vec![
			DocumentTemplate::new(1, "Invoice"),
			DocumentTemplate::new(2, "Purchase order"),
			DocumentTemplate::new(3, "Delivery note"),
			DocumentTemplate::new(4, "Credit note"),
			DocumentTemplate::new(5, "Quotation"),
		])
	}

	pub fn all(&self) -> &[DocumentTemplate] {
		&self.rows
	}

	pub fn get(&self, id: i64) -> Option<&DocumentTemplate> {
		self.rows.iter().find(|row| row.id == id)
	}

	/// Rows whose name contains `query`, ignoring case; all rows for an empty query
	pub fn search(&self, query: &str) -> Vec<&DocumentTemplate> {
		let query = query.trim().to_lowercase();
		self.rows
			.iter()
			.filter(|row| query.is_empty() || row.name.to_lowercase().contains(&query))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_display_matches_choice_label() {
		// Arrange
		let template = DocumentTemplate::new(3, "Delivery note");

		// Assert
		assert_eq!(template.to_string(), "pk:3 - Delivery note");
		assert_eq!(template.to_choice_label(), "pk:3 - Delivery note");
		assert_eq!(template.to_choice_value(), "3");
	}

	#[rstest]
	#[case("", 5)]
	#[case("NOTE", 2)]
	#[case("  invoice ", 1)]
	#[case("missing", 0)]
	fn test_search_is_case_insensitive(#[case] query: &str, #[case] hits: usize) {
		// Arrange
		let store = TemplateStore::seeded();

		// Act
		let found = store.search(query);

		// Assert
		assert_eq!(found.len(), hits);
	}

	#[rstest]
	fn test_get_by_id() {
		let store = TemplateStore::seeded();
		assert_eq!(store.get(2).map(|row| row.name.as_str()), Some("Purchase order"));
		assert!(store.get(42).is_none());
	}
}
