// Choice list rendering
pub mod choice_renderer;

// Composite widgets
pub mod choice_with_other_widget;
pub mod multi_widget;

pub use choice_renderer::{
	CHOICE_FIELDS_ATTR, ChoiceInputType, ChoiceRenderer, Markup, OTHER_FIELD_PLACEHOLDER,
	RenderError,
};
pub use choice_with_other_widget::{
	CHOICE_FIELDS_OTHER_ATTR, ChoiceWithOtherWidget, WRAPPER_CLASS,
};
pub use multi_widget::{MultiWidget, all_empty, sub_widget_name};
