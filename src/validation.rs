//! Field validation gates and input shaping.
//!
//! Validators are pure and synchronous, and collect every failure in one
//! pass rather than stopping at the first. Error keys are stable field
//! names so forms can clear a single field's error when it changes.

use std::fmt;

use crate::types::{BankDetails, CustomerDetails};

// ---------------------------------------------------------------------------
// Error collection
// ---------------------------------------------------------------------------

/// Per-field validation failures, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for a field. A later entry for the same field
    /// replaces the earlier one.
    pub fn add(&mut self, field: &str, message: &str) {
        self.clear(field);
        self.entries.push((field.to_string(), message.to_string()));
    }

    /// Remove a field's error, if any. Used for optimistic clearing when
    /// the user edits the field, independent of revalidation.
    pub fn clear(&mut self, field: &str) {
        self.entries.retain(|(f, _)| f != field);
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .entries
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

// ---------------------------------------------------------------------------
// Gates
// ---------------------------------------------------------------------------

/// Validate the customer details step. All failures are reported together.
pub fn validate_customer(details: &CustomerDetails) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if details.full_name.trim().is_empty() {
        errors.add("full_name", "Full name is required");
    }
    if details.date_of_birth.trim().is_empty() {
        errors.add("date_of_birth", "Date of birth is required");
    }
    if details.email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(&details.email) {
        errors.add("email", "Please enter a valid email");
    }
    if details.phone.trim().is_empty() {
        errors.add("phone", "Phone number is required");
    }
    if details.address.line1.trim().is_empty() {
        errors.add("address.line1", "Address line 1 is required");
    }
    if details.address.city.trim().is_empty() {
        errors.add("address.city", "City is required");
    }
    if details.address.postcode.trim().is_empty() {
        errors.add("address.postcode", "Postcode is required");
    }
    if !details.gdpr_consent {
        errors.add("gdpr_consent", "You must agree to continue");
    }

    errors
}

/// Validate the Direct Debit details step.
pub fn validate_banking(details: &BankDetails) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if details.sort_code.trim().is_empty() {
        errors.add("sort_code", "Sort code is required");
    } else if !is_valid_sort_code(&details.sort_code) {
        errors.add("sort_code", "Sort code must be in format XX-XX-XX");
    }

    if details.account_number.trim().is_empty() {
        errors.add("account_number", "Account number is required");
    } else if !is_valid_account_number(&details.account_number) {
        errors.add("account_number", "Account number must be 8 digits");
    }

    if details.account_holder_name.trim().is_empty() {
        errors.add("account_holder_name", "Account holder name is required");
    }
    if !details.direct_debit_consent {
        errors.add(
            "direct_debit_consent",
            "You must authorise Direct Debit to continue",
        );
    }

    errors
}

/// Minimal `local@domain.tld` shape check. Not an RFC parser.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Six digits grouped in hyphen-separated pairs: `DD-DD-DD`.
pub fn is_valid_sort_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 8
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 2 || i == 5 { *b == b'-' } else { b.is_ascii_digit() })
}

/// Exactly eight digits.
pub fn is_valid_account_number(value: &str) -> bool {
    value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Input shaping
// ---------------------------------------------------------------------------

/// Shape raw sort-code input as the user types: strip non-digits, cap at
/// six digits, re-insert hyphens after the 2nd and 4th digit.
pub fn format_sort_code(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(6).collect();
    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}-{}", &digits[..2], &digits[2..]),
        _ => format!("{}-{}-{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

/// Shape raw account-number input: strip non-digits, cap at eight digits.
pub fn format_account_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(8).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
