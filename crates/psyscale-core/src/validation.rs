//! Input validation helpers shared by the record payloads.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;

/// CPF must be exactly 11 ASCII digits. Punctuated forms are rejected.
pub fn validate_cpf(cpf: &str) -> Result<(), ValidationError> {
    if cpf.len() == 11 && cpf.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("cpf")
            .with_message(Cow::Borrowed("cpf must have exactly 11 digits")))
    }
}

/// Run the derived validators and fold any failures into a [`CoreError`].
pub fn check<T: Validate>(input: &T) -> Result<(), CoreError> {
    input.validate().map_err(CoreError::from)
}

/// Flatten validator errors into one message, fields in alphabetical order.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid ({})", e.code),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
