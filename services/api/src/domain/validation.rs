//! Field validation shared by the use cases.
//!
//! Validators push human-readable messages into a [`FieldErrors`] map keyed
//! by request field name, so one response can report every bad field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde::Serialize;

use yamdb_domain::rating::{MAX_SCORE, MIN_SCORE, is_valid_score};

use crate::error::ApiError;

pub const USERNAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;
pub const PERSON_NAME_MAX_LEN: usize = 150;
pub const TERM_NAME_MAX_LEN: usize = 256;
pub const SLUG_MAX_LEN: usize = 50;
pub const TITLE_NAME_MAX_LEN: usize = 200;
pub const TITLE_DESCRIPTION_MAX_LEN: usize = 300;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9\-_.]{1,20}$").expect("username pattern"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("slug pattern"));

// Dot-atom local part, then dot-separated LDH labels ending in an alphabetic TLD.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    ))
    .expect("email pattern")
});

/// Per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, `Err(ApiError::Validation)`
    /// otherwise.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Non-empty and at most `max` characters.
pub fn validate_required_text(
    field: &'static str,
    value: &str,
    max: Option<usize>,
    errors: &mut FieldErrors,
) {
    if value.trim().is_empty() {
        errors.add(field, "this field may not be blank");
        return;
    }
    validate_max_len(field, value, max, errors);
}

pub fn validate_max_len(
    field: &'static str,
    value: &str,
    max: Option<usize>,
    errors: &mut FieldErrors,
) {
    if let Some(max) = max {
        if char_len(value) > max {
            errors.add(field, format!("ensure this field has no more than {max} characters"));
        }
    }
}

/// A letter followed by 1–20 letters, digits, `-`, `_` or `.`; never `me`.
pub fn validate_username(value: &str, errors: &mut FieldErrors) {
    const FIELD: &str = "username";
    if value.is_empty() {
        errors.add(FIELD, "this field may not be blank");
        return;
    }
    if value.eq_ignore_ascii_case("me") {
        errors.add(FIELD, "\"me\" is not allowed as a username");
        return;
    }
    if char_len(value) > USERNAME_MAX_LEN {
        errors.add(
            FIELD,
            format!("ensure this field has no more than {USERNAME_MAX_LEN} characters"),
        );
        return;
    }
    if !USERNAME_RE.is_match(value) {
        errors.add(FIELD, format!("\"{value}\" contains characters that are not allowed"));
    }
}

/// `local@domain.tld` shape, at most 254 characters.
pub fn validate_email(value: &str, errors: &mut FieldErrors) {
    const FIELD: &str = "email";
    if value.is_empty() {
        errors.add(FIELD, "this field may not be blank");
        return;
    }
    if char_len(value) > EMAIL_MAX_LEN {
        errors.add(
            FIELD,
            format!("ensure this field has no more than {EMAIL_MAX_LEN} characters"),
        );
        return;
    }
    if !EMAIL_RE.is_match(value) {
        errors.add(FIELD, "enter a valid email address");
    }
}

/// 1–50 characters from `[-a-zA-Z0-9_]`.
pub fn validate_slug(field: &'static str, value: &str, errors: &mut FieldErrors) {
    if value.is_empty() {
        errors.add(field, "this field may not be blank");
        return;
    }
    if char_len(value) > SLUG_MAX_LEN {
        errors.add(
            field,
            format!("ensure this field has no more than {SLUG_MAX_LEN} characters"),
        );
        return;
    }
    if !SLUG_RE.is_match(value) {
        errors.add(
            field,
            "enter a valid slug consisting of letters, numbers, underscores or hyphens",
        );
    }
}

/// A release year may not lie in the future.
pub fn validate_year(value: i32, errors: &mut FieldErrors) {
    let current = Utc::now().year();
    if value > current {
        errors.add("year", format!("year may not be later than {current}"));
    }
}

/// The score as stored, or `None` after recording why it is out of range.
pub fn validate_score(value: i64, errors: &mut FieldErrors) -> Option<i16> {
    match i16::try_from(value) {
        Ok(score) if is_valid_score(score) => Some(score),
        _ => {
            errors.add(
                "score",
                format!("score must be between {MIN_SCORE} and {MAX_SCORE}"),
            );
            None
        }
    }
}
