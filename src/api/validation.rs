//! Input validation for API requests.
//!
//! This module provides validation functions for API request data,
//! ensuring all inputs meet the required format and constraints.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating usernames (alphanumeric plus ._-, 3-32 chars)
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]{2,31}$").unwrap();

    /// Regex for validating email addresses (permissive; the mail server is the arbiter)
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^@\s]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$").unwrap();

    /// Regex for validating phone numbers (digits, spaces, and +()-)
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9][0-9()\s-]{5,19}$").unwrap();
}

/// Valid account roles
const VALID_ROLES: [&str; 2] = ["admin", "staff"];

/// Valid stock transaction types
const VALID_TRANSACTION_TYPES: [&str; 3] = ["restock", "sale", "adjustment"];

/// Validate a username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username must be 3-32 characters: letters, digits, dots, dashes or underscores"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate an account role
pub fn validate_role(role: &str) -> Result<(), String> {
    if !VALID_ROLES.contains(&role) {
        return Err(format!(
            "Invalid role. Must be one of: {}",
            VALID_ROLES.join(", ")
        ));
    }
    Ok(())
}

/// Validate a display name (product or supplier)
pub fn validate_name(name: &str, field_name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if name.len() > 255 {
        return Err(format!("{} is too long (max 255 characters)", field_name));
    }

    Ok(())
}

/// Validate a price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err("Price must be a number".to_string());
    }

    if price < 0.0 {
        return Err("Price cannot be negative".to_string());
    }

    Ok(())
}

/// Validate a contact email (optional field)
pub fn validate_contact_email(email: &Option<String>) -> Result<(), String> {
    if let Some(e) = email {
        if e.is_empty() {
            return Ok(()); // Empty string treated as no email
        }

        if e.len() > 254 {
            return Err("Email is too long (max 254 characters)".to_string());
        }

        if !EMAIL_REGEX.is_match(e) {
            return Err("Invalid email format".to_string());
        }
    }

    Ok(())
}

/// Validate a phone number (optional field)
pub fn validate_phone_number(phone: &Option<String>) -> Result<(), String> {
    if let Some(p) = phone {
        if p.is_empty() {
            return Ok(()); // Empty string treated as no phone number
        }

        if !PHONE_REGEX.is_match(p) {
            return Err("Invalid phone number format".to_string());
        }
    }

    Ok(())
}

/// Validate a stock transaction type
pub fn validate_transaction_type(transaction_type: &str) -> Result<(), String> {
    let lower = transaction_type.to_lowercase();
    if !VALID_TRANSACTION_TYPES.contains(&lower.as_str()) {
        return Err(format!(
            "Invalid transaction type. Must be one of: {}",
            VALID_TRANSACTION_TYPES.join(", ")
        ));
    }
    Ok(())
}

/// Validate a quantity delta
pub fn validate_quantity_change(quantity_change: i64) -> Result<(), String> {
    if quantity_change == 0 {
        return Err("Quantity change must be non-zero".to_string());
    }
    Ok(())
}

/// Validate an alert type
pub fn validate_alert_type(alert_type: &str) -> Result<(), String> {
    if alert_type.trim().is_empty() {
        return Err("Alert type is required".to_string());
    }

    if alert_type.len() > 64 {
        return Err("Alert type is too long (max 64 characters)".to_string());
    }

    Ok(())
}
