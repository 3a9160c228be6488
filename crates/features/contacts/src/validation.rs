//! Contact form validation.
//!
//! Works on the raw JSON body so that type mismatches are reported per field
//! instead of failing deserialization as a whole.

use crate::error::ValidationError;
use crate::model::NewContact;
use moringa_kernel::server::FieldError;
use serde_json::{Map, Value};
use std::borrow::Cow;
use validator::{Validate, ValidationErrors};

/// Form fields in reporting order, with their maximum length in characters.
const FIELDS: [(&str, usize); 4] = [("name", 200), ("email", 254), ("service", 120), ("message", 5000)];

/// Validates a submitted body and returns the trimmed payload.
///
/// Unknown properties are ignored.
///
/// # Errors
/// Returns every failing field, in form order.
pub fn validate(body: &Value) -> Result<NewContact, ValidationError> {
    let Value::Object(object) = body else {
        return Err(ValidationError::new(vec![FieldError::new(
            "body",
            "invalid_type",
            format!("Expected object, received {}", json_type(body)),
        )]));
    };

    let mut errors = Vec::new();
    let mut values: [String; 4] = Default::default();
    let mut rejected = [false; 4];

    for (index, (field, _)) in FIELDS.iter().enumerate() {
        match extract(object, *field) {
            Ok(value) => values[index] = value,
            Err(error) => {
                errors.push(error);
                rejected[index] = true;
            },
        }
    }

    let [name, email, service, message] = values;
    let candidate = NewContact { name, email, service, message };

    if let Err(failures) = candidate.validate() {
        collect_rule_failures(&failures, &rejected, &mut errors);
    }

    if errors.is_empty() {
        Ok(candidate)
    } else {
        errors.sort_by_key(|e| field_position(&e.field));
        Err(ValidationError::new(errors))
    }
}

fn extract(object: &Map<String, Value>, field: &'static str) -> Result<String, FieldError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(FieldError::new(field, "required", "Required")),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Err(FieldError::new(field, "too_small", "Must not be empty"))
            } else {
                Ok(trimmed.to_owned())
            }
        },
        Some(other) => Err(FieldError::new(
            field,
            "invalid_type",
            format!("Expected string, received {}", json_type(other)),
        )),
    }
}

fn collect_rule_failures(failures: &ValidationErrors, rejected: &[bool; 4], out: &mut Vec<FieldError>) {
    let by_field = failures.field_errors();

    for (index, (field, max)) in FIELDS.iter().enumerate() {
        if rejected[index] {
            continue;
        }
        let Some(list) = by_field.get(*field) else { continue };

        for failure in list.iter() {
            let message: Cow<'static, str> = match failure.code.as_ref() {
                "too_long" => format!("Must be at most {max} characters").into(),
                "invalid_email" => "Invalid email".into(),
                other => format!("Failed rule '{other}'").into(),
            };
            out.push(FieldError::new(*field, failure.code.clone(), message));
        }
    }
}

fn field_position(field: &str) -> usize {
    FIELDS.iter().position(|(name, _)| *name == field).unwrap_or(FIELDS.len())
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn codes(err: &ValidationError) -> Vec<(String, String)> {
        err.errors().iter().map(|e| (e.field.to_string(), e.code.to_string())).collect()
    }

    #[test]
    fn accepts_and_trims_valid_form() {
        let contact = validate(&json!({
            "name": "  Abdi ",
            "email": "a@b.com",
            "service": "erp",
            "message": "hi\n",
            "extra": 42,
        }))
        .expect("valid form");

        assert_eq!(contact.name, "Abdi");
        assert_eq!(contact.email, "a@b.com");
        assert_eq!(contact.service, "erp");
        assert_eq!(contact.message, "hi");
    }

    #[test]
    fn reports_every_failing_field_in_order() {
        let err = validate(&json!({ "message": 7, "email": "nope", "name": null })).unwrap_err();
        assert_eq!(
            codes(&err),
            vec![
                ("name".into(), "required".into()),
                ("email".into(), "invalid_email".into()),
                ("service".into(), "required".into()),
                ("message".into(), "invalid_type".into()),
            ]
        );
        assert_eq!(err.errors()[3].message, "Expected string, received number");
    }

    #[test]
    fn whitespace_only_is_too_small() {
        let err = validate(&json!({
            "name": "   ",
            "email": "a@b.com",
            "service": "erp",
            "message": "hi",
        }))
        .unwrap_err();
        assert_eq!(codes(&err), vec![("name".into(), "too_small".into())]);
    }

    #[test]
    fn length_limits_are_enforced() {
        let err = validate(&json!({
            "name": "n".repeat(201),
            "email": "a@b.com",
            "service": "s".repeat(121),
            "message": "m".repeat(5000),
        }))
        .unwrap_err();
        assert_eq!(
            codes(&err),
            vec![("name".into(), "too_long".into()), ("service".into(), "too_long".into())]
        );
        assert_eq!(err.errors()[0].message, "Must be at most 200 characters");
    }

    #[test]
    fn non_object_body_is_rejected() {
        let err = validate(&json!(["Abdi"])).unwrap_err();
        assert_eq!(codes(&err), vec![("body".into(), "invalid_type".into())]);
    }

    proptest! {
        #[test]
        fn any_bounded_text_is_accepted(
            name in "[A-Za-z][A-Za-z ]{0,150}[A-Za-z]",
            service in "[a-z]{1,120}",
            message in "\\PC{0,400}[a-z]",
        ) {
            let body = json!({ "name": name, "email": "visitor@example.com", "service": service, "message": message });
            let contact = validate(&body).expect("bounded input is valid");
            prop_assert_eq!(contact.name, name.trim());
            prop_assert_eq!(contact.message, message.trim());
        }

        #[test]
        fn non_string_values_are_type_errors(value in prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            Just(json!([])),
            Just(json!({})),
        ]) {
            let body = json!({ "name": value, "email": "a@b.com", "service": "erp", "message": "hi" });
            let err = validate(&body).unwrap_err();
            prop_assert_eq!(codes(&err), vec![("name".to_owned(), "invalid_type".to_owned())]);
        }
    }
}
