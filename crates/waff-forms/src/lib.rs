//! Extra form fields and widgets
//!
//! The centerpiece is [`ChoiceWithOtherField`]: a radio list whose last
//! choice, "Other", reveals a second field of any kind. The crate also carries
//! the small forms layer the field plugs into:
//! - the [`FormField`] trait and [`Widget`] kinds
//! - plain, choice and model-backed fields
//! - [`Form`] and [`BoundField`] for binding, validation and rendering
//! - [`Media`] declarations for the companion script

pub mod bound_field;
pub mod choices;
pub mod field;
pub mod fields;
pub mod form;
pub mod media;
pub mod model;
pub mod widgets;

pub use bound_field::BoundField;
pub use choices::{Choice, EMPTY_CHOICE_LABEL, OTHER_CHOICE, OTHER_CHOICE_DISPLAY};
pub use field::{Attrs, FieldError, FieldResult, FormField, Widget};
pub use fields::{
	CharField, ChoiceField, ChoiceWithOtherError, ChoiceWithOtherField, EffectiveValue,
	ModelChoiceField,
};
pub use form::{ALL_FIELDS_KEY, Form, FormError, FormResult};
pub use media::{CHOICE_WITH_OTHER_JS, CHOICE_WITH_OTHER_JS_PATH, Media, MediaDefiningWidget};
pub use model::FormModel;
pub use widgets::{ChoiceRenderer, ChoiceWithOtherWidget, Markup, RenderError};
