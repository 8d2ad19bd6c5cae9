//! External capability providers.
//!
//! Defines the `BankConnector` and `SignatureProvider` traits and provides
//! simulated implementations:
//! - Open Banking connection — affordability check with configurable
//!   latency and decline probability
//! - E-signature — fixed-latency, always-successful signing ceremony
//!
//! A production Open Banking or e-signature integration plugs in behind
//! the same traits without changing the wizard.

pub mod esignature;
pub mod open_banking;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;

/// Outcome of an affordability check via a bank connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The customer's bank data supports the monthly payments.
    Consented,
    /// The affordability check declined the application.
    Declined,
}

impl fmt::Display for ConsentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentOutcome::Consented => write!(f, "consented"),
            ConsentOutcome::Declined => write!(f, "declined"),
        }
    }
}

/// Receipt returned by a completed signing ceremony.
#[derive(Debug, Clone)]
pub struct SignatureReceipt {
    pub envelope_id: String,
    pub signer: String,
    pub signed_at: DateTime<Utc>,
}

impl fmt::Display for SignatureReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} signed envelope {} at {}",
            self.signer,
            self.envelope_id,
            self.signed_at.to_rfc3339(),
        )
    }
}

/// Abstraction over read-only bank data access for affordability checking.
#[async_trait]
pub trait BankConnector: Send + Sync {
    /// Connect to the customer's bank and run the affordability check.
    /// The call suspends for the provider's round-trip; a decline is a
    /// valid business outcome, not an error.
    async fn connect(&self) -> Result<ConsentOutcome>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}

/// Abstraction over an e-signature ceremony for the financing agreement.
#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Run the signing ceremony for the named signer.
    async fn sign(&self, signer: &str) -> Result<SignatureReceipt>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}
