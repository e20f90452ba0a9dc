//! Signup and login input checks.

use nexa_database::ValidationErrors;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

const FULL_NAME_MIN: usize = 2;
const FULL_NAME_MAX: usize = 50;
const PASSWORD_MIN: usize = 6;
const EMAIL_MAX: usize = 255;

/// Trimmed and lower-cased, as stored in the `users` table.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX && EMAIL_REGEX.is_match(email)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Returns the registration with a trimmed name and normalized email, or every
/// violated constraint.
pub fn validate_registration(input: &Registration) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = input.full_name.trim();
    let name_length = full_name.chars().count();
    if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&name_length) {
        errors.push(
            "full_name",
            "Full name must be between 2 and 50 characters",
        );
    }

    let email = normalize_email(&input.email);
    if !is_valid_email(&email) {
        errors.push("email", "Please provide a valid email");
    }

    if input.password.chars().count() < PASSWORD_MIN {
        errors.push("password", "Password must be at least 6 characters long");
    }

    errors.into_result()?;

    Ok(Registration {
        full_name: full_name.to_string(),
        email,
        password: input.password.clone(),
    })
}

pub fn validate_credentials(input: &Credentials) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = normalize_email(&input.email);
    if !is_valid_email(&email) {
        errors.push("email", "Please provide a valid email");
    }

    if input.password.is_empty() {
        errors.push("password", "Password is required");
    }

    errors.into_result()?;

    Ok(Credentials {
        email,
        password: input.password.clone(),
    })
}
