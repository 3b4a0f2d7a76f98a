//! Validation Utilities

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors = Vec::new();
    collect(&errors, None, &mut field_errors);
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    AppError::Validation(field_errors)
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|e| FieldError {
                    field: path.clone(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                }));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", path, index)), out);
                }
            }
        }
    }
}

/// Validate a request body, mapping failures to a 400 with field errors.
pub fn validate<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(validation_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct ProfileForm {
        #[validate(length(min = 2, message = "title.too.short"))]
        title: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validation_error_collects_fields() {
        let form = ProfileForm {
            title: "x".into(),
            email: "nope".into(),
        };
        let err = validate(&form).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "email");
                assert_eq!(fields[0].message, "email");
                assert_eq!(fields[1].field, "title");
                assert_eq!(fields[1].message, "title.too.short");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
