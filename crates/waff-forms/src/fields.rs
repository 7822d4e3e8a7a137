// Basic fields
pub mod char_field;
pub mod choice_field;

// Model-backed fields
pub mod model_choice_field;

// Composite fields
pub mod choice_with_other;
pub mod multi_value_field;

pub use char_field::CharField;
pub use choice_field::ChoiceField;
pub use choice_with_other::{
	ChoiceWithOtherError, ChoiceWithOtherField, ChoiceWithOtherFieldBuilder, EffectiveValue,
};
pub use model_choice_field::ModelChoiceField;
pub use multi_value_field::clean_sub_values;
