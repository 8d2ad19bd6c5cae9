//! Lendinsure — pay-monthly premium financing.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! seeds the broker book, starts the portal server, and walks one
//! demonstration onboarding session end-to-end against the simulated
//! providers.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use lendinsure::broker::ApplicationBook;
use lendinsure::config::AppConfig;
use lendinsure::dashboard::{self, routes::DashboardState};
use lendinsure::providers::esignature::SimulatedESignature;
use lendinsure::providers::open_banking::SimulatedOpenBanking;
use lendinsure::referral::{policy_from_referral, ReferralParams};
use lendinsure::repayment::{RepaymentCalculator, RepaymentOptions};
use lendinsure::types::display_amount;
use lendinsure::wizard::forms::{BankingForm, CustomerForm};
use lendinsure::wizard::{OnboardingSession, OnboardingStep};

const BANNER: &str = r#"
 _                   _ _
| |    ___ _ __   __| (_)_ __  ___ _   _ _ __ ___
| |   / _ \ '_ \ / _` | | '_ \/ __| | | | '__/ _ \
| |__|  __/ | | | (_| | | | | \__ \ |_| | | |  __/
|_____\___|_| |_|\__,_|_|_| |_|___/\__,_|_|  \___|

  Pay monthly for insurance
  v0.1.0 — Broker portal & onboarding core
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        product = %cfg.product.name,
        decline_probability = cfg.open_banking.decline_probability,
        preview_term_months = cfg.repayment.preview_term_months,
        schedule_instalments = cfg.repayment.schedule_instalments,
        "Lendinsure starting up"
    );

    let calculator = RepaymentCalculator::new(RepaymentOptions::from(&cfg.repayment));

    // -- Broker portal ---------------------------------------------------

    if cfg.dashboard.enabled {
        let state = Arc::new(DashboardState::new(
            ApplicationBook::with_fixtures(),
            RepaymentCalculator::new(RepaymentOptions::from(&cfg.repayment)),
            cfg.repayment.preview_term_months,
            "/onboarding".to_string(),
        ));
        dashboard::spawn_dashboard(state, cfg.dashboard.port)?;
    }

    // -- Demonstration onboarding session --------------------------------

    run_demo_session(&cfg, &calculator).await?;

    // Keep the portal up until interrupted.
    info!("Portal running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");

    Ok(())
}

/// Walk one onboarding session end-to-end with the simulated providers,
/// exactly as a referred customer would experience it.
async fn run_demo_session(cfg: &AppConfig, calculator: &RepaymentCalculator) -> Result<()> {
    let params = ReferralParams::parse("type=Consumer&premium=1200&apr=4.5&broker=Your+Insurance+Broker");
    let policy = policy_from_referral(
        &params,
        &cfg.referral,
        cfg.repayment.preview_term_months,
        calculator,
    );

    let mut session = OnboardingSession::new(
        policy,
        cfg.repayment.schedule_instalments,
        cfg.product.broker_return_url.clone(),
    );
    info!(
        step = %session.step(),
        progress = format!("{:.0}%", session.progress_percent()),
        monthly = %display_amount(session.record().policy.monthly_amount),
        "Policy summary presented"
    );

    session.continue_from_landing()?;

    let mut customer = CustomerForm::from_record(session.record());
    customer.set_full_name("John Smith");
    customer.set_date_of_birth("1985-06-14");
    customer.set_email("john.smith@example.co.uk");
    customer.set_phone("07700 900123");
    customer.set_address_line1("1 High Street");
    customer.set_city("Manchester");
    customer.set_postcode("M1 1AA");
    customer.set_gdpr_consent(true);
    let details = customer
        .submit()
        .ok_or_else(|| anyhow::anyhow!("demo customer details failed validation: {}", customer.errors()))?;
    session.submit_customer(details)?;

    let bank = SimulatedOpenBanking::from_config(&cfg.open_banking);
    session.connect_bank(&bank).await?;

    if session.step() == OnboardingStep::Declined {
        warn!(
            destination = session.return_destination().unwrap_or("/"),
            "Affordability check declined; returning customer to broker"
        );
        return Ok(());
    }

    let mut banking = BankingForm::from_record(session.record());
    banking.set_sort_code("123456");
    banking.set_account_number("12345678");
    banking.set_account_holder_name("John Smith");
    banking.set_direct_debit_consent(true);
    let details = banking
        .submit()
        .ok_or_else(|| anyhow::anyhow!("demo bank details failed validation: {}", banking.errors()))?;
    session.submit_banking(details)?;

    let esign = SimulatedESignature::from_config(&cfg.signature);
    let receipt = session.sign(&esign).await?;
    info!(envelope = %receipt.envelope_id, "Agreement signed");

    let schedule = session.payment_schedule(calculator, Utc::now())?;
    for payment in &schedule {
        info!("{payment}");
    }
    let total: f64 = schedule.iter().map(|p| p.amount).sum();
    info!(
        instalments = schedule.len(),
        total = %display_amount(total),
        destination = session.return_destination().unwrap_or("/"),
        "Application approved; returning customer to broker"
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lendinsure=info"));

    let json_logging = std::env::var("LENDINSURE_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
