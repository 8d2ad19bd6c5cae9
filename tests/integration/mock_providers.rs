//! Mock providers for integration testing.
//!
//! Deterministic `BankConnector` and `SignatureProvider` implementations
//! with scripted outcomes and call counting, all in-memory with no
//! timers, so flow tests run instantly and repeatably.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use lendinsure::providers::{BankConnector, ConsentOutcome, SignatureProvider, SignatureReceipt};

/// A bank connector that replays a scripted sequence of outcomes.
///
/// Once the script is exhausted, every further call consents. An error
/// message can be forced for failure-path testing.
pub struct ScriptedBank {
    script: Mutex<VecDeque<ConsentOutcome>>,
    calls: AtomicUsize,
    force_error: Mutex<Option<String>>,
}

impl ScriptedBank {
    pub fn new(outcomes: impl IntoIterator<Item = ConsentOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: AtomicUsize::new(0),
            force_error: Mutex::new(None),
        }
    }

    pub fn always_consents() -> Self {
        Self::new([])
    }

    /// Force all subsequent connections to fail with this message.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BankConnector for ScriptedBank {
    async fn connect(&self) -> Result<ConsentOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ConsentOutcome::Consented))
    }

    fn name(&self) -> &str {
        "scripted-bank"
    }
}

/// A signature provider that signs instantly with predictable envelope ids.
pub struct InstantSigner {
    calls: AtomicUsize,
}

impl InstantSigner {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureProvider for InstantSigner {
    async fn sign(&self, signer: &str) -> Result<SignatureReceipt> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(SignatureReceipt {
            envelope_id: format!("ENV-{call:04}"),
            signer: signer.to_string(),
            signed_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        "instant-signer"
    }
}
