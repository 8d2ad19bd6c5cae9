//! Simulated e-signature ceremony.
//!
//! Models the hosted-signing round trip with a fixed delay and a
//! deterministic success, returning a receipt with a fresh envelope id.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{SignatureProvider, SignatureReceipt};

const PROVIDER_NAME: &str = "esign-sim";

/// Simulated signing provider.
#[derive(Debug, Clone)]
pub struct SimulatedESignature {
    latency: Duration,
}

impl SimulatedESignature {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn from_config(cfg: &crate::config::SignatureConfig) -> Self {
        Self::new(cfg.sign_delay())
    }
}

#[async_trait]
impl SignatureProvider for SimulatedESignature {
    async fn sign(&self, signer: &str) -> Result<SignatureReceipt> {
        info!(
            provider = PROVIDER_NAME,
            signer,
            latency_secs = self.latency.as_secs_f64(),
            "Starting signing ceremony"
        );
        tokio::time::sleep(self.latency).await;

        let receipt = SignatureReceipt {
            envelope_id: Uuid::new_v4().to_string(),
            signer: signer.to_string(),
            signed_at: Utc::now(),
        };
        info!(provider = PROVIDER_NAME, envelope_id = %receipt.envelope_id, "Agreement signed");
        Ok(receipt)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}
