//! # waff
//!
//! Extra form fields and widgets for server-rendered HTML forms.
//!
//! The main addition is a radio choice with an "Other" option: picking it
//! reveals a second field (free text, a model choice, anything implementing
//! [`FormField`](forms::FormField)) whose value becomes the field's value.
//!
//! ## Feature Flags
//!
//! - `forms` (default) - the forms layer, re-exported as [`forms`]
//! - `full` - all features enabled
//!
//! ## Example
//!
//! ```
//! use waff::forms::fields::{CharField, ChoiceWithOtherField};
//! use waff::forms::{Choice, FormField};
//!
//! let field = ChoiceWithOtherField::builder(
//! 	"colour",
//! 	vec![Choice::new("red", "Red"), Choice::new("blue", "Blue")],
//! 	Box::new(CharField::new("colour_other".to_string())),
//! )
//! .build()
//! .unwrap();
//!
//! assert_eq!(field.choices().last().and_then(|c| c.value()), Some("__other__"));
//! ```

#[cfg(feature = "forms")]
pub use waff_forms as forms;
