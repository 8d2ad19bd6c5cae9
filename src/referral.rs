//! Broker referral hand-off.
//!
//! A broker starts a customer's flow by sending them to the onboarding
//! wizard with plain query parameters (`type`, `premium`, `apr`,
//! `broker`). Parsing is lenient: malformed numbers and unknown keys are
//! ignored so a mangled link still opens a usable session with defaults.

use std::str::FromStr;

use tracing::debug;

use crate::config::ReferralConfig;
use crate::repayment::RepaymentCalculator;
use crate::types::{CustomerType, LoanTerms, PolicyDetails};

/// Pre-seed values carried on a referral link. Absent or unparseable
/// parameters stay `None` and fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferralParams {
    pub customer_type: Option<CustomerType>,
    pub premium: Option<f64>,
    pub apr: Option<f64>,
    pub broker_name: Option<String>,
}

impl ReferralParams {
    /// Parse a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = match pair.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            let value = decode_component(value);
            match key {
                "type" => params.customer_type = CustomerType::from_str(&value).ok(),
                "premium" => params.premium = parse_amount(&value),
                "apr" => params.apr = parse_amount(&value),
                "broker" => {
                    if !value.trim().is_empty() {
                        params.broker_name = Some(value);
                    }
                }
                other => debug!(key = other, "Ignoring unknown referral parameter"),
            }
        }

        params
    }
}

/// Percent-decode a query component, treating `+` as a space.
fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        // Undecodable input is kept as-is rather than failing the link.
        Err(_) => raw,
    }
}

/// Lenient amount parsing: anything that isn't a finite non-negative
/// number is treated as absent.
fn parse_amount(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Policy defaults for a session opened from a referral link.
///
/// The quoted monthly amount is derived at the preview term when the link
/// carries both a premium and an APR; otherwise the configured fallback
/// amount is shown.
pub fn policy_from_referral(
    params: &ReferralParams,
    cfg: &ReferralConfig,
    preview_term_months: u32,
    calculator: &RepaymentCalculator,
) -> PolicyDetails {
    let premium = params.premium.unwrap_or(cfg.default_premium);
    let broker_name = params
        .broker_name
        .clone()
        .unwrap_or_else(|| cfg.fallback_broker_name.clone());

    let monthly_amount = match (params.premium, params.apr) {
        (Some(p), Some(apr)) if p > 0.0 => LoanTerms::new(p, apr, preview_term_months)
            .ok()
            .and_then(|terms| calculator.monthly_payment(&terms))
            .unwrap_or(cfg.fallback_monthly_amount),
        _ => cfg.fallback_monthly_amount,
    };

    PolicyDetails {
        premium,
        broker_name,
        monthly_amount,
    }
}

/// Policy defaults for a session started with no referral at all, the
/// product-branded walk-in path.
pub fn policy_without_referral(cfg: &ReferralConfig) -> PolicyDetails {
    PolicyDetails {
        premium: cfg.default_premium,
        broker_name: cfg.default_broker_name.clone(),
        monthly_amount: cfg.fallback_monthly_amount,
    }
}

/// Build the onboarding link a broker portal hands to a customer.
pub fn build_onboarding_link(
    base: &str,
    customer_type: CustomerType,
    premium: f64,
    apr: f64,
    broker_name: &str,
) -> String {
    format!(
        "{base}?type={}&premium={premium}&apr={apr}&broker={}",
        customer_type,
        urlencoding::encode(broker_name),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
