//! Portal API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<DashboardState>`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::broker::{ApplicationBook, BookStats};
use crate::referral::build_onboarding_link;
use crate::repayment::{instalment_plan_label, RepaymentCalculator};
use crate::types::{CustomerApplication, CustomerType, LoanTerms, RoundedSchedule};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub book: RwLock<ApplicationBook>,
    calculator: RepaymentCalculator,
    preview_term_months: u32,
    onboarding_base: String,
}

impl DashboardState {
    pub fn new(
        book: ApplicationBook,
        calculator: RepaymentCalculator,
        preview_term_months: u32,
        onboarding_base: String,
    ) -> Self {
        Self {
            book: RwLock::new(book),
            calculator,
            preview_term_months,
            onboarding_base,
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// "Consumer" | "Business"; anything else lists every type.
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddCustomerRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub customer_type: CustomerType,
    pub premium_amount: f64,
    pub apr: f64,
}

#[derive(Debug, Serialize)]
pub struct AddCustomerResponse {
    pub application: CustomerApplication,
    /// Hand this link to the customer to start their onboarding session.
    pub onboarding_link: String,
    pub preview: RoundedSchedule,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/applications
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<CustomerApplication>> {
    // Unrecognised filter values fall back to "All" rather than erroring.
    let type_filter = query
        .type_filter
        .as_deref()
        .and_then(|t| CustomerType::from_str(t).ok());
    let search = query.search.unwrap_or_default();

    let book = state.book.read().await;
    Json(
        book.filtered(type_filter, &search)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// GET /api/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<BookStats> {
    let book = state.book.read().await;
    Json(book.stats())
}

/// POST /api/applications
///
/// Adds a row to the book and returns the onboarding link for the new
/// customer along with the repayment preview at the quoted term.
pub async fn add_application(
    State(state): State<AppState>,
    Json(request): Json<AddCustomerRequest>,
) -> Result<Json<AddCustomerResponse>, StatusCode> {
    let terms = LoanTerms::new(request.premium_amount, request.apr, state.preview_term_months)
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    let schedule = state
        .calculator
        .schedule(&terms)
        .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let name = request.name.as_deref().unwrap_or("New Customer");
    let plan = instalment_plan_label(schedule.monthly_payment, state.preview_term_months);

    let mut book = state.book.write().await;
    let application = book
        .add(
            name,
            request.customer_type,
            request.premium_amount,
            plan,
            request.apr,
        )
        .clone();

    let onboarding_link = build_onboarding_link(
        &state.onboarding_base,
        request.customer_type,
        request.premium_amount,
        request.apr,
        "Your Insurance Broker",
    );

    Ok(Json(AddCustomerResponse {
        application,
        onboarding_link,
        preview: schedule.rounded(),
    }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
