//! End-to-end onboarding flow tests.
//!
//! Drive full sessions, from referral link through terminal state,
//! using the form layer exactly as a host UI would, with deterministic
//! providers.

use chrono::Utc;

use lendinsure::config::ReferralConfig;
use lendinsure::providers::open_banking::SimulatedOpenBanking;
use lendinsure::providers::ConsentOutcome;
use lendinsure::referral::{policy_from_referral, ReferralParams};
use lendinsure::repayment::{RepaymentCalculator, RepaymentOptions};
use lendinsure::wizard::forms::{BankingForm, CustomerForm};
use lendinsure::wizard::{OnboardingSession, OnboardingStep};

use crate::mock_providers::{InstantSigner, ScriptedBank};

fn referral_config() -> ReferralConfig {
    ReferralConfig {
        default_premium: 1200.0,
        fallback_broker_name: "Your Insurance Broker".to_string(),
        default_broker_name: "SecureShield Insurance".to_string(),
        fallback_monthly_amount: 120.0,
    }
}

fn calculator() -> RepaymentCalculator {
    RepaymentCalculator::new(RepaymentOptions::default())
}

/// A session as started from a referral link, with the schedule running
/// ten instalments.
fn session_from_link(query: &str) -> OnboardingSession {
    let params = ReferralParams::parse(query);
    let policy = policy_from_referral(&params, &referral_config(), 12, &calculator());
    OnboardingSession::new(policy, 10, "/".to_string())
}

fn fill_customer(session: &OnboardingSession) -> CustomerForm {
    let mut form = CustomerForm::from_record(session.record());
    form.set_full_name("John Smith");
    form.set_date_of_birth("1985-06-14");
    form.set_email("john.smith@example.co.uk");
    form.set_phone("07700 900123");
    form.set_address_line1("1 High Street");
    form.set_city("Manchester");
    form.set_postcode("M1 1AA");
    form.set_gdpr_consent(true);
    form
}

fn fill_banking(session: &OnboardingSession) -> BankingForm {
    let mut form = BankingForm::from_record(session.record());
    form.set_sort_code("123456");
    form.set_account_number("12345678");
    form.set_account_holder_name("John Smith");
    form.set_direct_debit_consent(true);
    form
}

#[tokio::test]
async fn referred_session_reaches_success_with_full_schedule() {
    // premium=5000 @ 6% with decline probability forced to zero must land
    // on Success with a 10-entry schedule totalling monthly × 10.
    let mut session = session_from_link("type=Business&premium=5000&apr=6&broker=Your+Insurance+Broker");
    let monthly = session.record().policy.monthly_amount;
    assert!(monthly > 0.0);

    session.continue_from_landing().unwrap();

    let details = fill_customer(&session).submit().unwrap();
    session.submit_customer(details).unwrap();

    let bank = SimulatedOpenBanking::new(std::time::Duration::ZERO, 0.0);
    assert_eq!(
        session.connect_bank(&bank).await.unwrap(),
        ConsentOutcome::Consented
    );

    let details = fill_banking(&session).submit().unwrap();
    session.submit_banking(details).unwrap();

    let signer = InstantSigner::new();
    let receipt = session.sign(&signer).await.unwrap();
    assert_eq!(receipt.signer, "John Smith");
    assert_eq!(signer.calls(), 1);

    assert_eq!(session.step(), OnboardingStep::Success);
    let schedule = session.payment_schedule(&calculator(), Utc::now()).unwrap();
    assert_eq!(schedule.len(), 10);
    let total: f64 = schedule.iter().map(|p| p.amount).sum();
    assert!((total - monthly * 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn declined_session_terminates_at_the_consent_step() {
    let mut session = session_from_link("premium=1200&apr=4.5");
    session.continue_from_landing().unwrap();
    session
        .submit_customer(fill_customer(&session).submit().unwrap())
        .unwrap();

    let bank = ScriptedBank::new([ConsentOutcome::Declined]);
    assert_eq!(
        session.connect_bank(&bank).await.unwrap(),
        ConsentOutcome::Declined
    );
    assert_eq!(bank.calls(), 1);
    assert_eq!(session.step(), OnboardingStep::Declined);
    assert_eq!(session.return_destination(), Some("/"));

    // The terminal state is final: the bank is never contacted again.
    assert!(session.connect_bank(&bank).await.is_err());
    assert_eq!(bank.calls(), 1);
}

#[tokio::test]
async fn provider_outage_is_retryable_without_losing_data() {
    let mut session = session_from_link("premium=1200&apr=4.5");
    session.continue_from_landing().unwrap();
    session
        .submit_customer(fill_customer(&session).submit().unwrap())
        .unwrap();

    let bank = ScriptedBank::always_consents();
    bank.set_error("upstream timeout");
    assert!(session.connect_bank(&bank).await.is_err());
    assert_eq!(session.step(), OnboardingStep::BankConsent);
    // Customer details survived the failed call.
    assert!(session.record().customer.is_some());

    bank.clear_error();
    assert_eq!(
        session.connect_bank(&bank).await.unwrap(),
        ConsentOutcome::Consented
    );
    assert_eq!(session.step(), OnboardingStep::BankDetails);
}

#[tokio::test]
async fn back_navigation_reseeds_forms_from_the_record() {
    let mut session = session_from_link("premium=1200&apr=4.5");
    session.continue_from_landing().unwrap();
    session
        .submit_customer(fill_customer(&session).submit().unwrap())
        .unwrap();
    assert_eq!(session.step(), OnboardingStep::BankConsent);

    // Step back to the details form: everything entered is still there.
    session.back();
    assert_eq!(session.step(), OnboardingStep::CustomerDetails);
    let reseeded = CustomerForm::from_record(session.record());
    assert_eq!(reseeded.details().full_name, "John Smith");
    assert_eq!(reseeded.details().email, "john.smith@example.co.uk");
}

#[tokio::test]
async fn invalid_forms_block_and_corrections_unblock() {
    let mut session = session_from_link("premium=1200&apr=4.5");
    session.continue_from_landing().unwrap();

    let mut form = fill_customer(&session);
    form.set_email("not-an-email");
    assert!(form.submit().is_none());
    assert_eq!(form.errors().get("email"), Some("Please enter a valid email"));
    assert_eq!(session.step(), OnboardingStep::CustomerDetails);

    form.set_email("john.smith@example.co.uk");
    assert!(form.errors().get("email").is_none());
    let details = form.submit().unwrap();
    session.submit_customer(details).unwrap();
    assert_eq!(session.step(), OnboardingStep::BankConsent);
}

#[tokio::test]
async fn bare_link_session_falls_back_to_defaults() {
    let session = session_from_link("");
    assert_eq!(session.record().policy.premium, 1200.0);
    assert_eq!(session.record().policy.monthly_amount, 120.0);
    // No referral broker on the link: the configured fallback applies.
    assert_eq!(session.record().policy.broker_name, "Your Insurance Broker");
}
