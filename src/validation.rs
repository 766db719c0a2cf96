use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldErrors;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn has_punctuation(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_punctuation())
}

pub fn validate_product_name(name: &str, errors: &mut FieldErrors) {
    if has_punctuation(name) {
        errors.push("name", "The name should not contain special characters.");
    }
    if name.chars().count() <= 1 {
        errors.push("name", "The name is too short.");
    }
}

pub fn validate_product_price(price: f64, errors: &mut FieldErrors) {
    if price <= 0.0 {
        errors.push("price", "The price should be a positive value.");
    }
}

pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    if username.chars().count() <= 1 {
        errors.push("username", "The username is too short.");
    }
    if has_punctuation(username) {
        errors.push("username", "The username should not contain special characters.");
    }
}

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    if !is_valid_email(email) {
        errors.push("email", "Enter a valid email address.");
    }
}

/// Length first, then composition: a password that is purely alphabetic
/// or purely numeric is rejected even when long enough.
pub fn validate_password(password: &str, errors: &mut FieldErrors) {
    if password.chars().count() < 8 {
        errors.push("password", "The password must be at least 8 characters long.");
    }
    let all_alpha = !password.is_empty() && password.chars().all(|c| c.is_alphabetic());
    let all_digit = !password.is_empty() && password.chars().all(|c| c.is_ascii_digit());
    if all_alpha || all_digit {
        errors.push("password", "The password must contain both letters and numbers.");
    }
}

/// Shape check for the favorites payload. Returns the id when it is a
/// well-formed positive integer; membership and existence are checked by
/// the favorites service afterwards.
pub fn validate_favorite_product_id(
    product_id: Option<i64>,
    errors: &mut FieldErrors,
) -> Option<i64> {
    match product_id {
        None => {
            errors.push("product_id", "This field is required.");
            None
        }
        Some(id) if id <= 0 => {
            errors.push("product_id", "A valid positive integer is required.");
            None
        }
        Some(id) => Some(id),
    }
}
