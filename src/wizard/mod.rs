//! Onboarding wizard — the application state machine.
//!
//! A linear step sequence with one conditional branch to a terminal
//! Declined state. Each session owns one [`ApplicationRecord`] for its
//! lifetime; forward transitions from form steps are gated on validation,
//! and the two provider calls are the only suspension points.

pub mod forms;

use std::fmt;

use tracing::{info, warn};
use uuid::Uuid;

use crate::providers::{BankConnector, ConsentOutcome, SignatureProvider, SignatureReceipt};
use crate::repayment::RepaymentCalculator;
use crate::types::{
    ApplicationRecord, BankDetails, CustomerDetails, LendinsureError, PolicyDetails,
    ScheduledPayment, StepPatch,
};
use crate::validation::{validate_banking, validate_customer};

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// Number of steps on the linear (non-declined) path.
const TOTAL_STEPS: usize = 6;

/// A step of the onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnboardingStep {
    Landing,
    CustomerDetails,
    BankConsent,
    BankDetails,
    Signature,
    Success,
    Declined,
}

impl OnboardingStep {
    /// 0-based position on the linear path. The Declined terminal reports
    /// the consent step's position, where the flow ended.
    pub fn index(&self) -> usize {
        match self {
            OnboardingStep::Landing => 0,
            OnboardingStep::CustomerDetails => 1,
            OnboardingStep::BankConsent | OnboardingStep::Declined => 2,
            OnboardingStep::BankDetails => 3,
            OnboardingStep::Signature => 4,
            OnboardingStep::Success => 5,
        }
    }

    /// Step heading as shown to the customer.
    pub fn title(&self) -> &'static str {
        match self {
            OnboardingStep::Landing => "Policy Summary",
            OnboardingStep::CustomerDetails => "Your Details",
            OnboardingStep::BankConsent => "Bank Connection",
            OnboardingStep::BankDetails => "Payment Setup",
            OnboardingStep::Signature => "Sign Agreement",
            OnboardingStep::Success => "Complete",
            OnboardingStep::Declined => "Application Declined",
        }
    }

    /// Progress through the flow as a percentage, monotonic on the
    /// forward path.
    pub fn progress_percent(&self) -> f64 {
        ((self.index() + 1) as f64 / TOTAL_STEPS as f64) * 100.0
    }

    /// Whether the flow has finished, one way or the other.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OnboardingStep::Success | OnboardingStep::Declined)
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One customer's pass through the onboarding flow.
///
/// The session is single-owner: provider calls borrow it exclusively, so a
/// second operation cannot start while one is in flight, and no forward
/// transition can be initiated under a pending call.
pub struct OnboardingSession {
    id: Uuid,
    step: OnboardingStep,
    record: ApplicationRecord,
    schedule_instalments: u32,
    return_url: String,
}

impl OnboardingSession {
    /// Start a session from (possibly referral-seeded) policy defaults.
    pub fn new(policy: PolicyDetails, schedule_instalments: u32, return_url: String) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, policy = %policy, "Onboarding session started");
        Self {
            id,
            step: OnboardingStep::Landing,
            record: ApplicationRecord::new(policy),
            schedule_instalments,
            return_url,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn progress_percent(&self) -> f64 {
        self.step.progress_percent()
    }

    /// Where the customer is handed once the flow has finished. `None`
    /// while the session is still in progress.
    pub fn return_destination(&self) -> Option<&str> {
        self.step.is_terminal().then_some(self.return_url.as_str())
    }

    fn require_step(&self, expected: OnboardingStep, action: &str) -> Result<(), LendinsureError> {
        if self.step != expected {
            return Err(LendinsureError::Session(format!(
                "{action} is not available on the {} step",
                self.step.title(),
            )));
        }
        Ok(())
    }

    fn advance(&mut self, to: OnboardingStep) {
        info!(session = %self.id, from = %self.step, to = %to, "Step transition");
        self.step = to;
    }

    /// Landing → customer details.
    pub fn continue_from_landing(&mut self) -> Result<(), LendinsureError> {
        self.require_step(OnboardingStep::Landing, "Continue")?;
        self.advance(OnboardingStep::CustomerDetails);
        Ok(())
    }

    /// Step back one step. Already-validated data is kept: re-entering a
    /// form step re-seeds it from the record. Landing, the agreement
    /// review, and finished sessions stay where they are.
    pub fn back(&mut self) -> OnboardingStep {
        let to = match self.step {
            OnboardingStep::CustomerDetails => OnboardingStep::Landing,
            OnboardingStep::BankConsent => OnboardingStep::CustomerDetails,
            OnboardingStep::BankDetails => OnboardingStep::BankConsent,
            // Backing out of signing re-presents the agreement review.
            OnboardingStep::Signature => OnboardingStep::Signature,
            other => other,
        };
        if to != self.step {
            self.advance(to);
        }
        self.step
    }

    /// Submit the customer details step. The validation gate runs before
    /// the transition; any failure blocks it and reports every error.
    pub fn submit_customer(&mut self, details: CustomerDetails) -> Result<(), LendinsureError> {
        self.require_step(OnboardingStep::CustomerDetails, "Submitting your details")?;

        let errors = validate_customer(&details);
        if !errors.is_empty() {
            warn!(session = %self.id, errors = %errors, "Customer details rejected");
            return Err(LendinsureError::Validation(errors));
        }

        self.record = self.record.clone().merged(StepPatch::Customer(details));
        self.advance(OnboardingStep::BankConsent);
        Ok(())
    }

    /// Run the affordability check. A decline is a terminal business
    /// outcome, not an error; provider failures surface as errors and
    /// leave the session on the consent step.
    pub async fn connect_bank(
        &mut self,
        connector: &dyn BankConnector,
    ) -> Result<ConsentOutcome, LendinsureError> {
        self.require_step(OnboardingStep::BankConsent, "Connecting your bank")?;

        let outcome = connector
            .connect()
            .await
            .map_err(|e| LendinsureError::Provider {
                provider: connector.name().to_string(),
                message: e.to_string(),
            })?;

        match outcome {
            ConsentOutcome::Consented => self.advance(OnboardingStep::BankDetails),
            ConsentOutcome::Declined => {
                warn!(session = %self.id, "Affordability check declined");
                self.advance(OnboardingStep::Declined);
            }
        }
        Ok(outcome)
    }

    /// Submit the Direct Debit details step, gated like customer details.
    pub fn submit_banking(&mut self, details: BankDetails) -> Result<(), LendinsureError> {
        self.require_step(OnboardingStep::BankDetails, "Submitting payment details")?;

        let errors = validate_banking(&details);
        if !errors.is_empty() {
            warn!(session = %self.id, errors = %errors, "Payment details rejected");
            return Err(LendinsureError::Validation(errors));
        }

        self.record = self.record.clone().merged(StepPatch::Banking(details));
        self.advance(OnboardingStep::Signature);
        Ok(())
    }

    /// Run the signing ceremony and complete the application.
    pub async fn sign(
        &mut self,
        provider: &dyn SignatureProvider,
    ) -> Result<SignatureReceipt, LendinsureError> {
        self.require_step(OnboardingStep::Signature, "Signing the agreement")?;

        let signer = self
            .record
            .customer
            .as_ref()
            .map(|c| c.full_name.clone())
            .ok_or_else(|| LendinsureError::Session("no customer details on record".into()))?;

        let receipt = provider
            .sign(&signer)
            .await
            .map_err(|e| LendinsureError::Provider {
                provider: provider.name().to_string(),
                message: e.to_string(),
            })?;

        self.advance(OnboardingStep::Success);
        Ok(receipt)
    }

    /// The agreed Direct Debit schedule, available once the session has
    /// reached Success.
    pub fn payment_schedule(
        &self,
        calculator: &RepaymentCalculator,
        completed_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<ScheduledPayment>, LendinsureError> {
        self.require_step(OnboardingStep::Success, "The payment schedule")?;
        Ok(calculator.payment_schedule(
            self.record.policy.monthly_amount,
            self.schedule_instalments,
            completed_at,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
