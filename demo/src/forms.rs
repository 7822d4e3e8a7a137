use crate::models::{DocumentTemplate, TemplateStore};
use waff::forms::fields::{CharField, ChoiceField, ChoiceWithOtherField, ModelChoiceField};
use waff::forms::{Choice, ChoiceWithOtherError, Form, FormField, Widget};

pub const SET_OF_CHOICES: &[(&str, &str)] = &[("choice1", "choice1111"), ("choice2", "choice2222")];

pub fn set_of_choices() -> Vec<Choice> {
	SET_OF_CHOICES.iter().copied().map(Choice::from).collect()
}

fn templates(store: &TemplateStore) -> ModelChoiceField<DocumentTemplate> {
	ModelChoiceField::new("document_template_other", store.all().to_vec())
}

fn with_other(
	name: &str,
	other: Box<dyn FormField>,
) -> waff::forms::fields::ChoiceWithOtherFieldBuilder {
	ChoiceWithOtherField::builder(name, set_of_choices(), other)
}

/// The demo document form
///
/// `autocomplete_url` is where autocomplete widgets fetch their options.
pub fn document_form(
	store: &TemplateStore,
	autocomplete_url: &str,
) -> Result<Form, ChoiceWithOtherError> {
	let mut form = Form::new();

	form.add_field(Box::new(CharField::new("other_form_field".to_string())));

	form.add_field(Box::new(
		with_other("document_template", Box::new(templates(store))).build()?,
	));

	form.add_field(Box::new(
		with_other(
			"document_template2",
			Box::new(templates(store).autocomplete(autocomplete_url)),
		)
		.first_is_preselected(true)
		.build()?,
	));

	form.add_field(Box::new(
		with_other(
			"document_template3",
			Box::new(
				CharField::new("document_template3_other".to_string())
					.required()
					.with_widget(Widget::TextArea),
			),
		)
		.initial(SET_OF_CHOICES[1].0)
		.build()?,
	));

	for name in ["document_template4", "document_template5"] {
		form.add_field(Box::new(
			with_other(
				name,
				Box::new(CharField::new(format!("{}_other", name)).required()),
			)
			.initial(SET_OF_CHOICES[1].0)
			.build()?,
		));
	}

	form.add_field(Box::new(
		ModelChoiceField::new("maria", store.all().to_vec()).autocomplete(autocomplete_url),
	));

	form.add_field(Box::new(
		ChoiceField::new("teste", set_of_choices()).with_initial(SET_OF_CHOICES[0].0),
	));

	Ok(form)
}
