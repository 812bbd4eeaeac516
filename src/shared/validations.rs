//! Bridges `validator` output into domain field violations.

use validator::{ValidationError, ValidationErrors};

use super::errors::{DomainError, FieldViolation};

/// Flattens `validator` errors into one violation per failed rule.
/// Field names are reported in their camelCase wire form and sorted so
/// messages are stable across runs.
pub fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldViolation::new(camel_case(field), message)
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        DomainError::Validation(field_violations(&errors))
    }
}

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   \t").is_err());
        assert!(not_blank("Main St 1").is_ok());
    }

    #[test]
    fn field_names_use_wire_form() {
        assert_eq!(camel_case("charging_points"), "chargingPoints");
        assert_eq!(camel_case("address"), "address");
        assert_eq!(camel_case("min_lat"), "minLat");
    }

    #[test]
    fn validation_errors_become_sorted_violations() {
        let mut errors = ValidationErrors::new();
        errors.add("latitude", ValidationError::new("range"));
        errors.add("charging_points", ValidationError::new("range"));

        let violations = field_violations(&errors);
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["chargingPoints", "latitude"]);
        assert_eq!(violations[0].message, "range");
    }
}
