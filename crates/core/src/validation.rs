//! Field-level validation helpers shared by request DTOs.
//!
//! Request structs derive [`validator::Validate`]; the functions here are
//! used as `#[validate(custom(function = ...))]` hooks and to flatten the
//! resulting [`ValidationErrors`] into a single message.

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;

/// Shortest accepted SKU.
pub const SKU_MIN_LEN: usize = 3;
/// Longest accepted SKU.
pub const SKU_MAX_LEN: usize = 64;

/// Canonical SKU form: trimmed and upper-cased.
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

/// SKU must be 3..=64 characters of `A-Z`, `0-9`, `-` or `_` once normalised.
pub fn validate_sku(sku: &str) -> Result<(), ValidationError> {
    let normalized = normalize_sku(sku);
    let len = normalized.chars().count();
    if !(SKU_MIN_LEN..=SKU_MAX_LEN).contains(&len) {
        return Err(with_message(
            "sku_length",
            format!("SKU must be {SKU_MIN_LEN}-{SKU_MAX_LEN} characters"),
        ));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(with_message(
            "sku_charset",
            "SKU may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

/// Phone numbers: optional leading `+`, then 9 to 15 digits. Spaces and
/// dashes are ignored.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let trimmed = phone.trim();
    let digits_part = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let mut digits = 0usize;
    for c in digits_part.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => {
                return Err(with_message(
                    "phone_charset",
                    "Phone number may only contain digits".to_string(),
                ))
            }
        }
    }
    if !(9..=15).contains(&digits) {
        return Err(with_message(
            "phone_length",
            "Phone number must have 9-15 digits".to_string(),
        ));
    }
    Ok(())
}

/// Largest amount a request may carry: 1,000,000,000.00 in minor units.
pub const MAX_MONEY: i64 = 100_000_000_000;

/// Money amount between zero and [`MAX_MONEY`].
pub fn validate_money(value: &i64) -> Result<(), ValidationError> {
    if *value < 0 {
        return Err(with_message(
            "negative",
            "Value must not be negative".to_string(),
        ));
    }
    if *value > MAX_MONEY {
        return Err(with_message(
            "too_large",
            format!("Value must not exceed {MAX_MONEY}"),
        ));
    }
    Ok(())
}

/// [`validate_money`] for a clearable field; `null` is always accepted.
pub fn validate_money_patch(value: &Option<Option<i64>>) -> Result<(), ValidationError> {
    match value {
        Some(Some(amount)) => validate_money(amount),
        _ => Ok(()),
    }
}

/// Run `validator` on a DTO and convert failures into [`CoreError::Validation`].
pub fn validate_input<T: validator::Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(validation_errors_to_message(&e)))
}

fn with_message(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(custom(function = "validate_sku"))]
        sku: String,
    }

    #[test]
    fn sku_accepts_normalised_codes() {
        assert!(validate_sku("TSHIRT-001").is_ok());
        assert!(validate_sku(" tshirt_red_xl ").is_ok());
    }

    #[test]
    fn sku_rejects_bad_length_and_chars() {
        assert!(validate_sku("AB").is_err());
        assert!(validate_sku(&"A".repeat(65)).is_err());
        assert!(validate_sku("SKU 001").is_err());
        assert!(validate_sku("สินค้า-01").is_err());
    }

    #[test]
    fn normalize_sku_uppercases_and_trims() {
        assert_eq!(normalize_sku("  ab-12 "), "AB-12");
    }

    #[test]
    fn phone_numbers() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("+66 81-234-5678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("08x2345678").is_err());
    }

    #[test]
    fn money_bounds() {
        assert!(validate_money(&0).is_ok());
        assert!(validate_money(&MAX_MONEY).is_ok());
        assert!(validate_money(&-1).is_err());
        assert!(validate_money(&(MAX_MONEY + 1)).is_err());
        assert!(validate_money_patch(&None).is_ok());
        assert!(validate_money_patch(&Some(None)).is_ok());
        assert!(validate_money_patch(&Some(Some(-5))).is_err());
    }

    #[test]
    fn flattened_message_is_sorted_by_field() {
        let sample = Sample {
            name: String::new(),
            email: "not-an-email".into(),
            sku: "x".into(),
        };
        let errors = sample.validate().unwrap_err();
        let msg = validation_errors_to_message(&errors);

        let email_pos = msg.find("email:").unwrap();
        let name_pos = msg.find("name: must not be empty").unwrap();
        let sku_pos = msg.find("sku: SKU must be").unwrap();
        assert!(email_pos < name_pos && name_pos < sku_pos, "{msg}");
    }

    #[derive(Debug, Validate)]
    struct Line {
        #[validate(range(min = 1, message = "Quantity must be at least 1"))]
        quantity: i32,
    }

    #[derive(Debug, Validate)]
    struct Basket {
        #[validate(nested)]
        items: Vec<Line>,
    }

    #[test]
    fn nested_list_errors_carry_their_index() {
        let basket = Basket {
            items: vec![Line { quantity: 1 }, Line { quantity: 0 }],
        };
        let msg = validation_errors_to_message(&basket.validate().unwrap_err());
        assert_eq!(msg, "items[1].quantity: Quantity must be at least 1");
    }

    #[test]
    fn validate_input_maps_to_core_error() {
        let sample = Sample {
            name: "ok".into(),
            email: "a@b.co".into(),
            sku: "SKU-1".into(),
        };
        assert!(validate_input(&sample).is_ok());

        let bad = Sample {
            name: "ok".into(),
            email: "nope".into(),
            sku: "SKU-1".into(),
        };
        assert_matches!(validate_input(&bad), Err(CoreError::Validation(_)));
    }
}
