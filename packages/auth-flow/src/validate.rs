//! Declarative per-field validation rules, evaluated synchronously before
//! any network call.
//!
//! Each rule returns a [`FieldError`] naming the form field the message
//! belongs to, so views can render it in place. Two password composition
//! rules exist: the basic one for setting an initial password, and the
//! strict one (adds a special character) for resetting or changing one.

use thiserror::Error;

use crate::identifier::{classify, IdentifierKind};

/// Form fields an error can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Identifier,
    Code,
    Password,
    PasswordConfirm,
    OldPassword,
    Email,
    FirstName,
    LastName,
}

impl Field {
    /// Wire name of the field, matching what the server uses in error
    /// payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::Code => "code",
            Field::Password => "password",
            Field::PasswordConfirm => "password2",
            Field::OldPassword => "old_password",
            Field::Email => "email",
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
        }
    }
}

/// A validation or server error attached to a specific form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub const IDENTIFIER_MESSAGE: &str = "Please enter a valid email or phone number.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const OTP_MESSAGE: &str = "Code must be 6 digits.";
pub const LOGIN_PASSWORD_MESSAGE: &str = "Password must be at least 8 characters.";
pub const MISMATCH_MESSAGE: &str = "Passwords don't match";
pub const NAME_MESSAGE: &str = "Must be at most 50 characters";

/// The identifier must be an email or a local mobile number; anything else
/// gets one combined message.
pub fn identifier(value: &str) -> Result<(), FieldError> {
    match classify(value.trim()) {
        IdentifierKind::Invalid => Err(FieldError::new(Field::Identifier, IDENTIFIER_MESSAGE)),
        _ => Ok(()),
    }
}

/// An email address on its own (attaching a secondary address).
pub fn email(value: &str) -> Result<(), FieldError> {
    match classify(value.trim()) {
        IdentifierKind::Email => Ok(()),
        _ => Err(FieldError::new(Field::Email, EMAIL_MESSAGE)),
    }
}

/// Exactly 6 digits. Numeric-only is enforced, not just the length.
pub fn otp_code(value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.len() == 6 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::new(Field::Code, OTP_MESSAGE))
    }
}

/// Entering an existing password: length only, no composition rules.
pub fn login_password(value: &str) -> Result<(), FieldError> {
    if value.chars().count() >= 8 {
        Ok(())
    } else {
        Err(FieldError::new(Field::Password, LOGIN_PASSWORD_MESSAGE))
    }
}

/// One requirement a new password must meet, with the label shown both in
/// error messages and in the live criteria checklist.
pub struct PasswordCriterion {
    pub label: &'static str,
    check: fn(&str) -> bool,
}

impl PasswordCriterion {
    pub fn is_met(&self, password: &str) -> bool {
        (self.check)(password)
    }
}

fn has_min_length(s: &str) -> bool {
    s.chars().count() >= 8
}

fn has_uppercase(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn has_special(s: &str) -> bool {
    s.chars().any(|c| r#"!@#$%^&*(),.?":{}|<>"#.contains(c))
}

static BASIC_CRITERIA: [PasswordCriterion; 4] = [
    PasswordCriterion {
        label: "Must be at least 8 characters",
        check: has_min_length,
    },
    PasswordCriterion {
        label: "Must contain at least one uppercase letter",
        check: has_uppercase,
    },
    PasswordCriterion {
        label: "Must contain at least one lowercase letter",
        check: has_lowercase,
    },
    PasswordCriterion {
        label: "Must contain at least one number",
        check: has_digit,
    },
];

static STRICT_CRITERIA: [PasswordCriterion; 5] = [
    PasswordCriterion {
        label: "Must be at least 8 characters",
        check: has_min_length,
    },
    PasswordCriterion {
        label: "Must contain at least one uppercase letter",
        check: has_uppercase,
    },
    PasswordCriterion {
        label: "Must contain at least one lowercase letter",
        check: has_lowercase,
    },
    PasswordCriterion {
        label: "Must contain at least one number",
        check: has_digit,
    },
    PasswordCriterion {
        label: "Must contain at least one special character",
        check: has_special,
    },
];

/// The checklist for live feedback while the user types a new password.
pub fn password_criteria(strict: bool) -> &'static [PasswordCriterion] {
    if strict {
        &STRICT_CRITERIA
    } else {
        &BASIC_CRITERIA
    }
}

fn first_unmet(criteria: &'static [PasswordCriterion], value: &str) -> Result<(), FieldError> {
    match criteria.iter().find(|c| !c.is_met(value)) {
        Some(criterion) => Err(FieldError::new(Field::Password, criterion.label)),
        None => Ok(()),
    }
}

/// Creating a password: minimum 8 with an uppercase letter, a lowercase
/// letter, and a digit.
pub fn new_password(value: &str) -> Result<(), FieldError> {
    first_unmet(&BASIC_CRITERIA, value)
}

/// The stricter composition rule: [`new_password`] plus at least one
/// special character.
pub fn strict_new_password(value: &str) -> Result<(), FieldError> {
    first_unmet(&STRICT_CRITERIA, value)
}

/// Validate a new password and its confirmation together. A mismatch is
/// attached to the confirmation field, not the password field.
pub fn password_pair(password: &str, confirmation: &str, strict: bool) -> Result<(), FieldError> {
    if strict {
        strict_new_password(password)?;
    } else {
        new_password(password)?;
    }
    if password != confirmation {
        return Err(FieldError::new(Field::PasswordConfirm, MISMATCH_MESSAGE));
    }
    Ok(())
}

/// Profile names are optional but capped at 50 characters.
pub fn profile_name(field: Field, value: &str) -> Result<(), FieldError> {
    if value.chars().count() <= 50 {
        Ok(())
    } else {
        Err(FieldError::new(field, NAME_MESSAGE))
    }
}
