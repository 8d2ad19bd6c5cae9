//! Shared types for Lendinsure.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the wizard, broker, and
//! dashboard modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round a raw monetary value to 2 decimal places for display.
///
/// Internal computation stays in full `f64` precision; rounding happens
/// only at the presentation boundary.
pub fn display_amount(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Kind of customer a broker refers into the financing flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    Consumer,
    Business,
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Consumer => write!(f, "Consumer"),
            CustomerType::Business => write!(f, "Business"),
        }
    }
}

impl std::str::FromStr for CustomerType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consumer" => Ok(CustomerType::Consumer),
            "business" => Ok(CustomerType::Business),
            _ => Err(anyhow::anyhow!("Unknown customer type: {s}")),
        }
    }
}

/// Lifecycle status of an application as the broker portal shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    InProgress,
    Approved,
    Declined,
    Pending,
}

impl ApplicationStatus {
    /// All known statuses (useful for iteration).
    pub const ALL: &'static [ApplicationStatus] = &[
        ApplicationStatus::InProgress,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
        ApplicationStatus::Pending,
    ];
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationStatus::InProgress => write!(f, "In Progress"),
            ApplicationStatus::Approved => write!(f, "Approved"),
            ApplicationStatus::Declined => write!(f, "Declined"),
            ApplicationStatus::Pending => write!(f, "Pending"),
        }
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in progress" | "in-progress" | "inprogress" => Ok(ApplicationStatus::InProgress),
            "approved" => Ok(ApplicationStatus::Approved),
            "declined" => Ok(ApplicationStatus::Declined),
            "pending" => Ok(ApplicationStatus::Pending),
            _ => Err(anyhow::anyhow!("Unknown application status: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Loan terms & repayment schedule
// ---------------------------------------------------------------------------

/// Terms of a financed premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// The premium amount being financed, in pounds.
    pub principal: f64,
    /// Annual percentage rate applied to the financed premium.
    pub annual_rate_percent: f64,
    /// Number of monthly instalments.
    pub term_months: u32,
}

impl LoanTerms {
    /// Build validated terms. `term_months` must be positive and the rate
    /// non-negative; the principal may be any non-negative amount (a zero
    /// principal simply yields no schedule).
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        term_months: u32,
    ) -> Result<Self, LendinsureError> {
        if term_months == 0 {
            return Err(LendinsureError::Terms("term must be at least one month".into()));
        }
        if annual_rate_percent < 0.0 || !annual_rate_percent.is_finite() {
            return Err(LendinsureError::Terms(format!(
                "APR must be a non-negative number, got {annual_rate_percent}"
            )));
        }
        if principal < 0.0 || !principal.is_finite() {
            return Err(LendinsureError::Terms(format!(
                "principal must be a non-negative amount, got {principal}"
            )));
        }
        Ok(Self {
            principal,
            annual_rate_percent,
            term_months,
        })
    }

    /// The per-month interest rate as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 100.0 / 12.0
    }
}

impl fmt::Display for LoanTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "£{:.2} @ {}% over {} months",
            self.principal, self.annual_rate_percent, self.term_months,
        )
    }
}

/// Derived repayment figures for a set of loan terms.
///
/// All amounts carry full floating precision; use [`display_amount`] (or
/// [`RepaymentSchedule::rounded`]) when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub monthly_payment: f64,
    pub total_repayable: f64,
    pub total_interest: f64,
    pub broker_profit_share: f64,
}

impl RepaymentSchedule {
    /// Presentation copy with every amount rounded to 2 decimal places.
    pub fn rounded(&self) -> RoundedSchedule {
        RoundedSchedule {
            monthly_payment: display_amount(self.monthly_payment),
            total_repayable: display_amount(self.total_repayable),
            total_interest: display_amount(self.total_interest),
            broker_profit_share: display_amount(self.broker_profit_share),
        }
    }
}

impl fmt::Display for RepaymentSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "£{:.2}/month (total £{:.2}, interest £{:.2}, broker £{:.2})",
            self.monthly_payment, self.total_repayable, self.total_interest, self.broker_profit_share,
        )
    }
}

/// Two-decimal-place rendering of a [`RepaymentSchedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundedSchedule {
    pub monthly_payment: Decimal,
    pub total_repayable: Decimal,
    pub total_interest: Decimal,
    pub broker_profit_share: Decimal,
}

/// One entry of the agreed Direct Debit schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledPayment {
    /// 1-based instalment number.
    pub number: u32,
    pub due_date: DateTime<Utc>,
    pub amount: f64,
}

impl fmt::Display for ScheduledPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payment {} on {}: £{}",
            self.number,
            self.due_date.format("%d/%m/%Y"),
            display_amount(self.amount),
        )
    }
}

// ---------------------------------------------------------------------------
// Application record
// ---------------------------------------------------------------------------

/// Policy summary shown on the landing step and carried through the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDetails {
    pub premium: f64,
    pub broker_name: String,
    pub monthly_amount: f64,
}

impl fmt::Display for PolicyDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: £{} premium, £{}/month",
            self.broker_name,
            display_amount(self.premium),
            display_amount(self.monthly_amount),
        )
    }
}

/// UK postal address collected on the customer details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postcode: String,
}

/// Personal information collected on the customer details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub full_name: String,
    pub date_of_birth: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub gdpr_consent: bool,
}

/// Direct Debit details collected on the payment setup step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub sort_code: String,
    pub account_number: String,
    pub account_holder_name: String,
    pub direct_debit_consent: bool,
}

/// The application data accumulated across the onboarding flow.
///
/// Each sub-record is written exactly once, at the step that owns it.
/// The record lives for one session and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub policy: PolicyDetails,
    pub customer: Option<CustomerDetails>,
    pub banking: Option<BankDetails>,
}

impl ApplicationRecord {
    /// Fresh record seeded from policy defaults.
    pub fn new(policy: PolicyDetails) -> Self {
        Self {
            policy,
            customer: None,
            banking: None,
        }
    }

    /// Pure merge of a step's output into the record. Earlier steps' data
    /// is never overwritten: a second write to the same sub-record keeps
    /// the first value.
    pub fn merged(mut self, patch: StepPatch) -> Self {
        match patch {
            StepPatch::Customer(details) => {
                self.customer.get_or_insert(details);
            }
            StepPatch::Banking(details) => {
                self.banking.get_or_insert(details);
            }
        }
        self
    }
}

/// Output of a completed form step, ready to merge into the record.
#[derive(Debug, Clone)]
pub enum StepPatch {
    Customer(CustomerDetails),
    Banking(BankDetails),
}

// ---------------------------------------------------------------------------
// Broker book row
// ---------------------------------------------------------------------------

/// A customer application as listed on the broker portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerApplication {
    pub id: String,
    pub name: String,
    pub customer_type: CustomerType,
    pub status: ApplicationStatus,
    pub loan_amount: f64,
    /// Human-readable plan label, e.g. "£100 x 12".
    pub instalment_plan: String,
    pub apr: f64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for CustomerApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) £{} {} [{}]",
            self.name,
            self.customer_type,
            self.loan_amount,
            self.instalment_plan,
            self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for Lendinsure.
#[derive(Debug, thiserror::Error)]
pub enum LendinsureError {
    #[error("Invalid loan terms: {0}")]
    Terms(String),

    #[error("Validation failed: {0}")]
    Validation(crate::validation::ValidationErrors),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Provider error ({provider}): {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
