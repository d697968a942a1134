use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContactError {
    #[error("full name cannot be empty")]
    EmptyName,

    #[error("full name must be at least 2 characters")]
    NameTooShort,

    #[error("full name cannot contain digits")]
    NameHasDigits,

    #[error("full name contains unsupported characters")]
    NameHasInvalidChars,

    #[error("email cannot be empty")]
    EmptyEmail,

    #[error("email cannot contain whitespace")]
    EmailHasWhitespace,

    #[error("email must look like example@mail.com")]
    InvalidEmail,

    #[error("role must be selected")]
    EmptyRole,

    #[error("message must be at least 2 characters")]
    MessageTooShort,

    #[error("message must be at most 70 characters")]
    MessageTooLong,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Raw contact-form input, validated into a `ContactSubmission`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub message: String,
}

impl ContactDraft {
    /// Validate and normalize the draft.
    ///
    /// All fields are whitespace-normalized (runs collapse to one space,
    /// ends trimmed) before length checks. The message is optional; when
    /// present it must be 2–70 characters.
    ///
    /// # Errors
    ///
    /// Returns the first failing `ContactError`, field order matching the
    /// form: name, email, role, message.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ContactSubmission, ContactError> {
        let full_name = validate_name(&self.full_name)?;
        let email = validate_email(&self.email)?;
        let role = validate_role(&self.role)?;
        let message = validate_message(&self.message)?;

        Ok(ContactSubmission {
            full_name,
            email,
            role,
            message,
            submitted_at: now,
        })
    }
}

/// A validated contact-form submission.
///
/// Wire shape matches the `contact` field already stored in suspend data:
/// `{ fullName, email, role, message, timestamp }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    #[serde(rename = "fullName")]
    full_name: String,
    email: String,
    role: String,
    message: String,
    #[serde(rename = "timestamp")]
    submitted_at: DateTime<Utc>,
}

impl ContactSubmission {
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

//
// ─── VALIDATORS ────────────────────────────────────────────────────────────────
//

/// Collapse whitespace runs into single spaces and trim the ends.
#[must_use]
pub fn normalize_spaces(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn validate_name(raw: &str) -> Result<String, ContactError> {
    let v = normalize_spaces(raw);
    if v.is_empty() {
        return Err(ContactError::EmptyName);
    }
    if v.chars().count() < 2 {
        return Err(ContactError::NameTooShort);
    }
    if v.chars().any(|c| c.is_ascii_digit()) {
        return Err(ContactError::NameHasDigits);
    }
    if !v.chars().all(is_allowed_name_char) {
        return Err(ContactError::NameHasInvalidChars);
    }
    Ok(v)
}

// Latin or Hebrew letters, spaces, apostrophes and hyphens.
fn is_allowed_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{0590}'..='\u{05FF}').contains(&c) || " '’-".contains(c)
}

fn validate_email(raw: &str) -> Result<String, ContactError> {
    let v = normalize_spaces(raw);
    if v.is_empty() {
        return Err(ContactError::EmptyEmail);
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(ContactError::EmailHasWhitespace);
    }
    if !is_plausible_email(&v) {
        return Err(ContactError::InvalidEmail);
    }
    Ok(v)
}

// Shape check only (local@domain.tld, tld >= 2), not full RFC 5322.
fn is_plausible_email(v: &str) -> bool {
    let mut parts = v.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some(dot) = domain.rfind('.') else {
        return false;
    };
    let (host, tld) = domain.split_at(dot);
    !host.is_empty() && tld.len() > 2 // tld includes the '.'
        && tld.chars().skip(1).count() >= 2
}

fn validate_role(raw: &str) -> Result<String, ContactError> {
    let v = normalize_spaces(raw);
    if v.is_empty() {
        return Err(ContactError::EmptyRole);
    }
    Ok(v)
}

fn validate_message(raw: &str) -> Result<String, ContactError> {
    let v = normalize_spaces(raw);
    if v.is_empty() {
        // Optional field.
        return Ok(v);
    }
    let len = v.chars().count();
    if len < 2 {
        return Err(ContactError::MessageTooShort);
    }
    if len > 70 {
        return Err(ContactError::MessageTooLong);
    }
    Ok(v)
}
