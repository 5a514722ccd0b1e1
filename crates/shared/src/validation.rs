//! Common validation utilities.

use validator::{ValidateEmail, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Maximum share-link lifetime in days.
const MAX_TTL_DAYS: i32 = 365;

/// Validates that a string is a well-formed email address.
pub fn validate_email_address(email: &str) -> Result<(), ValidationError> {
    if email.validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email_format");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// Validates an optional CC address; `None` is accepted.
pub fn validate_optional_email(email: Option<&str>) -> Result<(), ValidationError> {
    match email {
        Some(addr) => validate_email_address(addr),
        None => Ok(()),
    }
}

/// Validates a share-link TTL in days. Must be a positive integer so that
/// `expires_at > created_at` always holds.
pub fn validate_ttl_days(ttl_days: i32) -> Result<(), ValidationError> {
    if (1..=MAX_TTL_DAYS).contains(&ttl_days) {
        Ok(())
    } else {
        let mut err = ValidationError::new("ttl_days_range");
        err.message = Some("ttl_days must be between 1 and 365".into());
        Err(err)
    }
}

/// Validates that a monetary amount is non-negative and finite.
pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount_range");
        err.message = Some("Amount must be non-negative".into());
        Err(err)
    }
}

/// Validates that a line-item quantity is non-negative and finite.
pub fn validate_quantity(quantity: f64) -> Result<(), ValidationError> {
    if quantity.is_finite() && quantity >= 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_range");
        err.message = Some("Quantity must be non-negative".into());
        Err(err)
    }
}

/// Renders a validation failure as a single user-facing message.
/// Multiple failures are joined with `;`.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let messages = validation_messages(errors);
    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.join("; ")
    }
}

/// Flattens a validation failure into its message texts. Errors on
/// nested structs and list elements are included, as are schema-level
/// errors, which validator files under the `__all__` pseudo-field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages
}

fn collect_messages(errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    messages.push(
                        error
                            .message
                            .clone()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid value for {}", field)),
                    );
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(nested, messages),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_messages(nested, messages);
                }
            }
        }
    }
}

/// Validates a three-letter ISO 4217 currency code.
pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency_format");
        err.message = Some("Currency must be a three-letter ISO 4217 code".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("client@example.com").is_ok());
        assert!(validate_email_address("with+tag@example.co.uk").is_ok());
        assert!(validate_email_address("not-an-email").is_err());
        assert!(validate_email_address("").is_err());
        assert!(validate_email_address("missing@tld@double.com").is_err());
    }

    #[test]
    fn test_validate_email_error_message() {
        let err = validate_email_address("nope").unwrap_err();
        assert_eq!(err.message.unwrap().to_string(), "Invalid email address");
    }

    #[test]
    fn test_validate_optional_email() {
        assert!(validate_optional_email(None).is_ok());
        assert!(validate_optional_email(Some("cc@example.com")).is_ok());
        assert!(validate_optional_email(Some("bad")).is_err());
    }

    #[test]
    fn test_validate_ttl_days() {
        assert!(validate_ttl_days(1).is_ok());
        assert!(validate_ttl_days(30).is_ok());
        assert!(validate_ttl_days(365).is_ok());
        assert!(validate_ttl_days(0).is_err());
        assert!(validate_ttl_days(-5).is_err());
        assert!(validate_ttl_days(366).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(1500.50).is_ok());
        assert!(validate_amount(-0.01).is_err());
        assert!(validate_amount(f64::NAN).is_err());
        assert!(validate_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(2.5).is_ok());
        assert!(validate_quantity(-1.0).is_err());
    }

    #[test]
    fn test_validation_message_surfaces_list_element_error() {
        use validator::Validate;

        #[derive(Validate)]
        struct Line {
            #[validate(custom(function = "validate_quantity"))]
            quantity: f64,
        }

        #[derive(Validate)]
        struct Order {
            #[validate(nested)]
            lines: Vec<Line>,
        }

        let order = Order {
            lines: vec![Line { quantity: -1.0 }],
        };
        let errors = order.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "Quantity must be non-negative");
    }

    #[test]
    fn test_validation_message_joins_multiple_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct Line {
            #[validate(custom(function = "validate_quantity"))]
            quantity: f64,
            #[validate(custom(function = "validate_amount"))]
            amount: f64,
        }

        let line = Line {
            quantity: -1.0,
            amount: -2.0,
        };
        let errors = line.validate().unwrap_err();
        let message = validation_message(&errors);
        assert!(message.contains("Quantity must be non-negative"));
        assert!(message.contains("Amount must be non-negative"));
        assert!(message.contains("; "));
    }

    #[test]
    fn test_validation_messages_include_schema_errors() {
        use validator::Validate;

        fn never(_value: &Pair) -> Result<(), ValidationError> {
            let mut err = ValidationError::new("pair");
            err.message = Some("Values must differ".into());
            Err(err)
        }

        #[derive(Validate)]
        #[validate(schema(function = "never"))]
        struct Pair {
            #[allow(dead_code)]
            a: i32,
        }

        let errors = Pair { a: 1 }.validate().unwrap_err();
        assert_eq!(validation_messages(&errors), vec!["Values must differ"]);
    }

    #[test]
    fn test_validate_currency_code() {
        assert!(validate_currency_code("USD").is_ok());
        assert!(validate_currency_code("EUR").is_ok());
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("US").is_err());
        assert!(validate_currency_code("DOLLARS").is_err());
    }
}
