//! Validation utilities for the Canteen Inventory Platform
//!
//! Plain checks return `&'static str` messages. The `validator` adapters at
//! the bottom wrap them for `#[derive(Validate)]` inputs.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use validator::ValidationError;

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

// ============================================================================
// Stock Validations
// ============================================================================

/// Validate a required text field is present
pub fn validate_not_blank(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// Validate a quantity, threshold or cost is not negative
pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("Value cannot be negative");
    }
    Ok(())
}

/// Validate a consumption amount or sold quantity is strictly positive
pub fn validate_positive(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("Value must be greater than zero");
    }
    Ok(())
}

/// Parse a non-negative quantity typed into a form
pub fn parse_quantity(input: &str) -> Result<Decimal, &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("Value is required");
    }
    let value = Decimal::from_str(trimmed).map_err(|_| "Value must be a number")?;
    validate_non_negative(value)?;
    Ok(value)
}

// ============================================================================
// Contact Validations
// ============================================================================

/// Validate a phone or WhatsApp number
/// Accepts: +919876543210, 98765 43210, 098-765-4321
pub fn validate_messaging_number(number: &str) -> Result<(), &'static str> {
    let trimmed = number.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Phone number may only contain digits, spaces and dashes");
    }

    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(8..=15).contains(&digits) {
        return Err("Phone number must have 8 to 15 digits");
    }
    Ok(())
}

/// Digits of a number as used in a wa.me link
pub fn messaging_digits(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

// ============================================================================
// validator adapters
// ============================================================================

fn to_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    validate_not_blank(value).map_err(|m| to_validation_error("blank", m))
}

pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value).map_err(|m| to_validation_error("negative", m))
}

pub fn positive(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(*value).map_err(|m| to_validation_error("not_positive", m))
}

pub fn messaging_number(value: &str) -> Result<(), ValidationError> {
    validate_messaging_number(value).map_err(|m| to_validation_error("phone", m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Flour").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_amounts() {
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(dec("-0.001")).is_err());
        assert!(validate_positive(dec("0.001")).is_ok());
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_positive(dec("-3")).is_err());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("10"), Ok(dec("10")));
        assert_eq!(parse_quantity(" 2.5 "), Ok(dec("2.5")));
        assert_eq!(parse_quantity("0"), Ok(Decimal::ZERO));
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("-1").is_err());
    }

    #[test]
    fn test_validate_messaging_number() {
        assert!(validate_messaging_number("+919876543210").is_ok());
        assert!(validate_messaging_number("98765 43210").is_ok());
        assert!(validate_messaging_number("098-765-4321").is_ok());
        assert!(validate_messaging_number("12345").is_err());
        assert!(validate_messaging_number("+91abc43210").is_err());
        assert!(validate_messaging_number("1234567890123456").is_err());
    }

    #[test]
    fn test_messaging_digits() {
        assert_eq!(messaging_digits("+91 98765-43210"), "919876543210");
    }

    #[test]
    fn test_validator_adapters_carry_messages() {
        let err = not_blank(" ").unwrap_err();
        assert_eq!(err.code, "blank");
        assert_eq!(err.message.as_deref(), Some("Value is required"));
        assert!(positive(&Decimal::ZERO).is_err());
        assert!(non_negative(&Decimal::ONE).is_ok());
    }
}
