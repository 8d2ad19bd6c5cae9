//! Per-step form drafts.
//!
//! A form holds the step's draft values and its current error map.
//! Setters apply input shaping as the user types, and editing a field
//! clears that field's error immediately, independent of the next
//! validation pass. Re-entering a step re-seeds the form from the
//! session record, so backed-over data is never lost.

use crate::types::{ApplicationRecord, BankDetails, CustomerDetails};
use crate::validation::{
    format_account_number, format_sort_code, validate_banking, validate_customer,
    ValidationErrors,
};

// ---------------------------------------------------------------------------
// Customer details form
// ---------------------------------------------------------------------------

/// Draft state for the "Your Details" step.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    details: CustomerDetails,
    errors: ValidationErrors,
}

impl CustomerForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the form from previously submitted data, if any.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            details: record.customer.clone().unwrap_or_default(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn details(&self) -> &CustomerDetails {
        &self.details
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn set_full_name(&mut self, value: &str) {
        self.details.full_name = value.to_string();
        self.errors.clear("full_name");
    }

    pub fn set_date_of_birth(&mut self, value: &str) {
        self.details.date_of_birth = value.to_string();
        self.errors.clear("date_of_birth");
    }

    pub fn set_email(&mut self, value: &str) {
        self.details.email = value.to_string();
        self.errors.clear("email");
    }

    pub fn set_phone(&mut self, value: &str) {
        self.details.phone = value.to_string();
        self.errors.clear("phone");
    }

    pub fn set_address_line1(&mut self, value: &str) {
        self.details.address.line1 = value.to_string();
        self.errors.clear("address.line1");
    }

    /// Optional field: blank input stores as absent.
    pub fn set_address_line2(&mut self, value: &str) {
        self.details.address.line2 = if value.trim().is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }

    pub fn set_city(&mut self, value: &str) {
        self.details.address.city = value.to_string();
        self.errors.clear("address.city");
    }

    pub fn set_postcode(&mut self, value: &str) {
        self.details.address.postcode = value.to_string();
        self.errors.clear("address.postcode");
    }

    pub fn set_gdpr_consent(&mut self, value: bool) {
        self.details.gdpr_consent = value;
        self.errors.clear("gdpr_consent");
    }

    /// Run the validation gate. On success the completed details are
    /// returned for submission; on failure the error map is retained for
    /// rendering and `None` is returned.
    pub fn submit(&mut self) -> Option<CustomerDetails> {
        self.errors = validate_customer(&self.details);
        self.errors.is_empty().then(|| self.details.clone())
    }
}

// ---------------------------------------------------------------------------
// Direct Debit form
// ---------------------------------------------------------------------------

/// Draft state for the "Payment Setup" step.
#[derive(Debug, Clone, Default)]
pub struct BankingForm {
    details: BankDetails,
    errors: ValidationErrors,
}

impl BankingForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the form from previously submitted data, if any.
    pub fn from_record(record: &ApplicationRecord) -> Self {
        Self {
            details: record.banking.clone().unwrap_or_default(),
            errors: ValidationErrors::new(),
        }
    }

    pub fn details(&self) -> &BankDetails {
        &self.details
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Raw keystrokes are shaped into `XX-XX-XX` as the user types.
    pub fn set_sort_code(&mut self, raw: &str) {
        self.details.sort_code = format_sort_code(raw);
        self.errors.clear("sort_code");
    }

    /// Raw keystrokes are stripped to digits and capped at eight.
    pub fn set_account_number(&mut self, raw: &str) {
        self.details.account_number = format_account_number(raw);
        self.errors.clear("account_number");
    }

    pub fn set_account_holder_name(&mut self, value: &str) {
        self.details.account_holder_name = value.to_string();
        self.errors.clear("account_holder_name");
    }

    pub fn set_direct_debit_consent(&mut self, value: bool) {
        self.details.direct_debit_consent = value;
        self.errors.clear("direct_debit_consent");
    }

    /// Run the validation gate; see [`CustomerForm::submit`].
    pub fn submit(&mut self) -> Option<BankDetails> {
        self.errors = validate_banking(&self.details);
        self.errors.is_empty().then(|| self.details.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
