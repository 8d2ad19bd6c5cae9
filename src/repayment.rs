//! Fixed-rate repayment calculations.
//!
//! Converts a premium amount and APR into a monthly instalment schedule
//! and broker-profit estimate using the standard annuity formula, with
//! configurable term lengths and profit split.

use chrono::{DateTime, Duration, Months, Utc};
use tracing::debug;

use crate::types::{LoanTerms, RepaymentSchedule, ScheduledPayment};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Repayment calculation configuration.
#[derive(Debug, Clone)]
pub struct RepaymentOptions {
    /// Broker's share of total interest, as a fraction.
    pub broker_share: f64,
    /// Days between completion and the first Direct Debit collection.
    pub first_payment_delay_days: i64,
}

impl Default for RepaymentOptions {
    fn default() -> Self {
        Self {
            broker_share: 0.30,
            first_payment_delay_days: 30,
        }
    }
}

impl From<&crate::config::RepaymentConfig> for RepaymentOptions {
    fn from(cfg: &crate::config::RepaymentConfig) -> Self {
        Self {
            broker_share: cfg.broker_share,
            first_payment_delay_days: cfg.first_payment_delay_days,
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

pub struct RepaymentCalculator {
    options: RepaymentOptions,
}

impl RepaymentCalculator {
    pub fn new(options: RepaymentOptions) -> Self {
        Self { options }
    }

    /// Access the calculator options.
    pub fn options(&self) -> &RepaymentOptions {
        &self.options
    }

    /// Compute the repayment schedule for a set of loan terms.
    ///
    /// Annuity formula: `m = p·r·(1+r)^n / ((1+r)^n − 1)` with the monthly
    /// rate `r`; a zero rate degenerates to a straight-line split.
    /// Returns `None` for a zero principal; callers treat that as
    /// "no preview available" rather than an error.
    pub fn schedule(&self, terms: &LoanTerms) -> Option<RepaymentSchedule> {
        if terms.principal <= 0.0 {
            return None;
        }

        let monthly_rate = terms.monthly_rate();
        let n = terms.term_months as f64;

        let monthly_payment = if monthly_rate == 0.0 {
            terms.principal / n
        } else {
            let growth = (1.0 + monthly_rate).powf(n);
            terms.principal * monthly_rate * growth / (growth - 1.0)
        };

        let total_repayable = monthly_payment * n;
        let total_interest = total_repayable - terms.principal;
        let broker_profit_share = total_interest * self.options.broker_share;

        debug!(
            principal = terms.principal,
            apr = terms.annual_rate_percent,
            term_months = terms.term_months,
            monthly_payment = format!("{monthly_payment:.2}"),
            "Repayment schedule computed"
        );

        Some(RepaymentSchedule {
            monthly_payment,
            total_repayable,
            total_interest,
            broker_profit_share,
        })
    }

    /// Monthly payment alone, for callers that only quote an amount.
    pub fn monthly_payment(&self, terms: &LoanTerms) -> Option<f64> {
        self.schedule(terms).map(|s| s.monthly_payment)
    }

    /// The dated Direct Debit schedule agreed at completion: `instalments`
    /// equal payments, the first collected after the configured delay and
    /// the rest at calendar-month steps.
    pub fn payment_schedule(
        &self,
        monthly_amount: f64,
        instalments: u32,
        completed_at: DateTime<Utc>,
    ) -> Vec<ScheduledPayment> {
        let start = completed_at + Duration::days(self.options.first_payment_delay_days);
        (0..instalments)
            .map(|i| ScheduledPayment {
                number: i + 1,
                due_date: start
                    .checked_add_months(Months::new(i))
                    .unwrap_or(start),
                amount: monthly_amount,
            })
            .collect()
    }
}

/// Portal row label for an instalment plan, e.g. "£100 x 12".
pub fn instalment_plan_label(monthly_payment: f64, instalments: u32) -> String {
    format!("£{} x {}", monthly_payment.round() as i64, instalments)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
