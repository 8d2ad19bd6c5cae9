//! Simulated Open Banking connection.
//!
//! Stands in for a real aggregator while the product demo runs without
//! bank credentials. The connection takes a fixed round-trip time and
//! declines a configurable fraction of applicants, the only stochastic
//! behaviour in the system, injected here so tests can pin it to 0 or 1.

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info};

use super::{BankConnector, ConsentOutcome};

const PROVIDER_NAME: &str = "open-banking-sim";

/// Simulated affordability-check provider.
#[derive(Debug, Clone)]
pub struct SimulatedOpenBanking {
    latency: Duration,
    decline_probability: f64,
}

impl SimulatedOpenBanking {
    /// Build a simulator. `decline_probability` is clamped to [0, 1].
    pub fn new(latency: Duration, decline_probability: f64) -> Self {
        Self {
            latency,
            decline_probability: decline_probability.clamp(0.0, 1.0),
        }
    }

    pub fn from_config(cfg: &crate::config::OpenBankingConfig) -> Self {
        Self::new(cfg.connect_delay(), cfg.decline_probability)
    }

    pub fn decline_probability(&self) -> f64 {
        self.decline_probability
    }
}

#[async_trait]
impl BankConnector for SimulatedOpenBanking {
    async fn connect(&self) -> Result<ConsentOutcome> {
        info!(
            provider = PROVIDER_NAME,
            latency_secs = self.latency.as_secs_f64(),
            "Connecting to bank"
        );
        tokio::time::sleep(self.latency).await;

        // Uniform draw at call time decides the outcome.
        let draw: f64 = rand::thread_rng().gen();
        let outcome = if draw < self.decline_probability {
            ConsentOutcome::Declined
        } else {
            ConsentOutcome::Consented
        };

        debug!(
            provider = PROVIDER_NAME,
            draw,
            threshold = self.decline_probability,
            outcome = %outcome,
            "Affordability check complete"
        );

        Ok(outcome)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
