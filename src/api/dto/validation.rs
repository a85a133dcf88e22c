use std::borrow::Cow;

use actix_multipart::form::text::Text;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Character classes a strong password must each contain, in any order.
static PASSWORD_CLASSES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [r"[A-Z]", r"[a-z]", r"[0-9]", r"[#?!@$%^&*-]"]
        .map(|class| Regex::new(class).expect("password character class"))
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

pub fn is_email(email: &str) -> Result<(), ValidationError> {
    if email.len() < 3 || email.len() > 255 {
        return Err(ValidationError::new("0")
            .with_message(Cow::from("Email must contain between 3 and 255 characters")));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new("0").with_message(Cow::from("Invalid email format")));
    }

    Ok(())
}

pub fn is_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 || password.len() > 72 {
        return Err(ValidationError::new("0").with_message(Cow::from(
            "Password must contain between 8 and 72 characters",
        )));
    }

    if !PASSWORD_CLASSES.iter().all(|class| class.is_match(password)) {
        return Err(ValidationError::new("0")
            .with_message(Cow::from(
                "Password must contain at least one uppercase letter, one lowercase letter, one digit and one special character",
            )));
    }

    Ok(())
}

pub fn is_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().chars().count() < 3 {
        return Err(ValidationError::new("0")
            .with_message(Cow::from("Name must have at least 3 characters")));
    }

    Ok(())
}

// Multipart text fields.

pub fn is_name_field(name: &Text<String>) -> Result<(), ValidationError> {
    is_name(name)
}

pub fn is_email_field(email: &Text<String>) -> Result<(), ValidationError> {
    is_email(email)
}

pub fn is_password_field(password: &Text<String>) -> Result<(), ValidationError> {
    is_password(password)
}
