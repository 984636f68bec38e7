//! Input validation utilities
//!
//! Failures are collected per field so they can be shown next to the
//! offending input; any failure blocks submission.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::models::{LoginCredentials, RegistrationForm};

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Field name to message map of validation failures
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[error("{} field(s) failed validation", .0.len())]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`; the first failure per field wins
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record the outcome of a single-field check
    pub fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok` when nothing failed
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// Validate that a trimmed value is present
pub fn validate_required(value: &str, message: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(message.to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Failed to compile email regex"));

    if !regex.is_match(email) {
        return Err("Email is invalid".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate the registration form
pub fn validate_registration(form: &RegistrationForm) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check("name", validate_required(&form.name, "Name is required"));
    errors.check("email", validate_email(&form.email));
    errors.check("password", validate_password(&form.password));

    if form.password != form.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }

    if !form.agree_to_terms {
        errors.add(
            "agree_to_terms",
            "You must agree to the terms and conditions",
        );
    }

    errors.into_result()
}

/// Validate login credentials before they reach the auth client
pub fn validate_login(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check("email", validate_email(&credentials.email));
    if credentials.password.is_empty() {
        errors.add("password", "Password is required");
    }

    errors.into_result()
}
