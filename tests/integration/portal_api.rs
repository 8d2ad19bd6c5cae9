//! Broker portal API tests, including the portal → onboarding hand-off.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use lendinsure::broker::ApplicationBook;
use lendinsure::config::ReferralConfig;
use lendinsure::dashboard::routes::DashboardState;
use lendinsure::dashboard::build_router;
use lendinsure::providers::open_banking::SimulatedOpenBanking;
use lendinsure::referral::{policy_from_referral, ReferralParams};
use lendinsure::repayment::{RepaymentCalculator, RepaymentOptions};
use lendinsure::wizard::forms::{BankingForm, CustomerForm};
use lendinsure::wizard::{OnboardingSession, OnboardingStep};

use crate::mock_providers::InstantSigner;

fn state() -> Arc<DashboardState> {
    Arc::new(DashboardState::new(
        ApplicationBook::with_fixtures(),
        RepaymentCalculator::new(RepaymentOptions::default()),
        12,
        "/onboarding".to_string(),
    ))
}

async fn post_customer(state: Arc<DashboardState>, payload: serde_json::Value) -> serde_json::Value {
    let app = build_router(state);
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/applications")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn added_customer_appears_in_listing_and_stats() {
    let state = state();
    let resp = post_customer(
        state.clone(),
        serde_json::json!({
            "name": "Acme Widgets Ltd",
            "customer_type": "Business",
            "premium_amount": 2400.0,
            "apr": 5.0,
        }),
    )
    .await;
    assert_eq!(resp["application"]["name"], "Acme Widgets Ltd");

    let app = build_router(state);
    let list = app
        .oneshot(
            Request::builder()
                .uri("/api/applications?search=acme")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = axum::body::to_bytes(list.into_body(), 100_000).await.unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "InProgress");
}

#[tokio::test]
async fn portal_link_seeds_a_session_that_completes() {
    // The broker adds a customer; the link the portal hands back must
    // open a session carrying that premium and APR, and that session
    // must run to Success against deterministic providers.
    let resp = post_customer(
        state(),
        serde_json::json!({
            "customer_type": "Consumer",
            "premium_amount": 5000.0,
            "apr": 6.0,
        }),
    )
    .await;

    let link = resp["onboarding_link"].as_str().unwrap();
    let query = link.split_once('?').unwrap().1;
    let params = ReferralParams::parse(query);
    assert_eq!(params.premium, Some(5000.0));
    assert_eq!(params.apr, Some(6.0));

    let referral_cfg = ReferralConfig {
        default_premium: 1200.0,
        fallback_broker_name: "Your Insurance Broker".to_string(),
        default_broker_name: "SecureShield Insurance".to_string(),
        fallback_monthly_amount: 120.0,
    };
    let calculator = RepaymentCalculator::new(RepaymentOptions::default());
    let policy = policy_from_referral(&params, &referral_cfg, 12, &calculator);
    assert_eq!(policy.premium, 5000.0);
    assert_eq!(policy.broker_name, "Your Insurance Broker");

    let mut session = OnboardingSession::new(policy, 10, "/".to_string());
    session.continue_from_landing().unwrap();

    let mut customer = CustomerForm::from_record(session.record());
    customer.set_full_name("Alice Carter");
    customer.set_date_of_birth("1992-09-30");
    customer.set_email("alice@example.com");
    customer.set_phone("07700 900987");
    customer.set_address_line1("9 Mill Lane");
    customer.set_city("Bristol");
    customer.set_postcode("BS1 5TR");
    customer.set_gdpr_consent(true);
    session.submit_customer(customer.submit().unwrap()).unwrap();

    let bank = SimulatedOpenBanking::new(std::time::Duration::ZERO, 0.0);
    session.connect_bank(&bank).await.unwrap();

    let mut banking = BankingForm::from_record(session.record());
    banking.set_sort_code("40-47-84");
    banking.set_account_number("87654321");
    banking.set_account_holder_name("Alice Carter");
    banking.set_direct_debit_consent(true);
    session.submit_banking(banking.submit().unwrap()).unwrap();

    session.sign(&InstantSigner::new()).await.unwrap();
    assert_eq!(session.step(), OnboardingStep::Success);
}
