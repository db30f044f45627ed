//! Client-side input validation for the auth forms.
//!
//! Everything here runs before a request is built; a failure never reaches
//! the network.

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;

use crate::error::ClientError;
use crate::net::types::{LoginRequest, RegisterRequest};

pub const PIN_LEN: usize = 4;

pub const PIN_LENGTH_MESSAGE: &str = "PIN must be exactly 4 digits";
pub const PIN_MISMATCH_MESSAGE: &str = "PINs do not match";
pub const PHONE_REQUIRED_MESSAGE: &str = "Enter your mobile number";
pub const NAME_REQUIRED_MESSAGE: &str = "Enter your full name";
pub const IDENTIFIER_REQUIRED_MESSAGE: &str = "Enter your phone number or email";

/// Strip non-digits and cap at [`PIN_LEN`], as a PIN field does while typing.
#[must_use]
pub fn sanitize_pin_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).take(PIN_LEN).collect()
}

/// # Errors
///
/// Returns a validation error unless `pin` is exactly four ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), ClientError> {
    if pin.len() == PIN_LEN && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ClientError::Validation(PIN_LENGTH_MESSAGE.into()))
    }
}

/// Mismatch is reported before length, matching the order the form checks them.
///
/// # Errors
///
/// Returns a validation error on mismatch or a malformed PIN.
pub fn validate_pin_confirmation(pin: &str, confirm: &str) -> Result<(), ClientError> {
    if pin != confirm {
        return Err(ClientError::Validation(PIN_MISMATCH_MESSAGE.into()));
    }
    validate_pin(pin)
}

/// Keep only the digits of a phone number (`+91 98765-43210` -> `919876543210`).
///
/// # Errors
///
/// Returns a validation error when no digits remain.
pub fn normalize_phone(raw: &str) -> Result<String, ClientError> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(ClientError::Validation(PHONE_REQUIRED_MESSAGE.into()));
    }
    Ok(digits)
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

/// # Errors
///
/// Returns a validation error for a blank identifier.
pub fn validate_identifier(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(IDENTIFIER_REQUIRED_MESSAGE.into()));
    }
    Ok(trimmed.to_owned())
}

/// Validate the registration form and build its request.
///
/// # Errors
///
/// Returns the first validation failure: PIN confirmation, PIN format, phone,
/// then name.
pub fn validate_register(
    phone: &str,
    full_name: &str,
    pin: &str,
    confirm_pin: &str,
) -> Result<RegisterRequest, ClientError> {
    validate_pin_confirmation(pin, confirm_pin)?;
    let phone = normalize_phone(phone)?;
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(ClientError::Validation(NAME_REQUIRED_MESSAGE.into()));
    }
    Ok(RegisterRequest { phone, pin: pin.to_owned(), full_name: full_name.to_owned() })
}

/// Validate the login form and build its request.
///
/// # Errors
///
/// Returns a validation error for a malformed PIN or an empty phone number.
pub fn validate_login(phone: &str, pin: &str) -> Result<LoginRequest, ClientError> {
    validate_pin(pin)?;
    let phone = normalize_phone(phone)?;
    Ok(LoginRequest { phone, pin: pin.to_owned() })
}
