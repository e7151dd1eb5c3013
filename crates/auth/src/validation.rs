//! Client-side form rules.
//!
//! These only save round trips. The backend validates every request again.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern")
});

// Lowercase, uppercase and digit, at least 8 characters on one line.
static PASSWORD_RULES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"[a-z]").expect("lowercase pattern"),
        Regex::new(r"[A-Z]").expect("uppercase pattern"),
        Regex::new(r"[0-9]").expect("digit pattern"),
        Regex::new(r"^[^\n\r\x{2028}\x{2029}]{8,}$").expect("length pattern"),
    ]
});

pub const OTP_LENGTH: usize = 6;

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Otp,
}

/// Inline errors keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if !EMAIL.is_match(email.trim()) {
        return Err("Enter a valid email address".to_string());
    }
    Ok(())
}

pub fn password_is_strong(password: &str) -> bool {
    PASSWORD_RULES.iter().all(|rule| rule.is_match(password))
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if !password_is_strong(password) {
        return Err(
            "Password must be at least 8 characters with an uppercase letter, a lowercase letter and a number"
                .to_string(),
        );
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(())
}

pub fn validate_otp(code: &str) -> Result<(), String> {
    if code.len() != OTP_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("Enter the {OTP_LENGTH}-digit code"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(message) = validate_email(&self.email) {
            errors.insert(Field::Email, message);
        }
        if let Err(message) = validate_password(&self.password) {
            errors.insert(Field::Password, message);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Err(message) = validate_name(&self.name) {
            errors.insert(Field::Name, message);
        }
        if let Err(message) = validate_email(&self.email) {
            errors.insert(Field::Email, message);
        }
        if let Err(message) = validate_password(&self.password) {
            errors.insert(Field::Password, message);
        }
        if self.password != self.confirm_password {
            errors.insert(Field::ConfirmPassword, PASSWORDS_DO_NOT_MATCH);
        }
        errors.into_result()
    }
}
