//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Everything behavioural (provider latencies, the simulated decline
//! probability, term lengths, referral defaults) lives here rather than
//! in code so tests and environments can pin deterministic values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub product: ProductConfig,
    pub repayment: RepaymentConfig,
    pub open_banking: OpenBankingConfig,
    pub signature: SignatureConfig,
    pub referral: ReferralConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductConfig {
    pub name: String,
    pub support_phone: String,
    pub support_email: String,
    /// Destination a finished session (Success or Declined) hands back to.
    pub broker_return_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepaymentConfig {
    /// Broker's share of total interest, as a fraction.
    pub broker_share: f64,
    /// Term used when quoting a referral/preview monthly amount.
    pub preview_term_months: u32,
    /// Number of instalments on the agreed payment schedule. Quoted term
    /// and schedule length currently disagree (12 vs 10); kept separate
    /// until product confirms which is correct.
    pub schedule_instalments: u32,
    /// Days between completion and the first Direct Debit collection.
    pub first_payment_delay_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OpenBankingConfig {
    pub connect_delay_secs: u64,
    /// Probability in [0, 1] that the affordability check declines.
    pub decline_probability: f64,
}

impl OpenBankingConfig {
    pub fn connect_delay(&self) -> Duration {
        Duration::from_secs(self.connect_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SignatureConfig {
    pub sign_delay_secs: u64,
}

impl SignatureConfig {
    pub fn sign_delay(&self) -> Duration {
        Duration::from_secs(self.sign_delay_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReferralConfig {
    pub default_premium: f64,
    /// Broker name used when a referral link omits one.
    pub fallback_broker_name: String,
    /// Product-branded default for sessions started with no referral.
    pub default_broker_name: String,
    /// Monthly amount shown when the referral carries no premium/APR pair.
    pub fallback_monthly_amount: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Sanity checks that cannot be expressed in the type system.
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.open_banking.decline_probability) {
            anyhow::bail!(
                "open_banking.decline_probability must be within [0, 1], got {}",
                self.open_banking.decline_probability
            );
        }
        if self.repayment.preview_term_months == 0 || self.repayment.schedule_instalments == 0 {
            anyhow::bail!("repayment terms must be at least one month");
        }
        if !(0.0..=1.0).contains(&self.repayment.broker_share) {
            anyhow::bail!(
                "repayment.broker_share must be within [0, 1], got {}",
                self.repayment.broker_share
            );
        }
        Ok(())
    }
}
