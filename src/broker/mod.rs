//! Broker-facing application book.
//!
//! An in-memory list of customer applications, seeded with fixture rows.
//! Additions are local to the running process; there is no write-back
//! to any store.

use chrono::{TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use crate::types::{ApplicationStatus, CustomerApplication, CustomerType};

/// Headline figures for the portal's stat cards.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BookStats {
    pub total: usize,
    pub approved: usize,
    /// Approved share of all applications, as a percentage.
    pub approval_rate_percent: f64,
    pub total_loan_value: f64,
}

/// The broker's in-memory book of customer applications.
#[derive(Debug, Clone)]
pub struct ApplicationBook {
    applications: Vec<CustomerApplication>,
}

impl ApplicationBook {
    /// An empty book.
    pub fn new() -> Self {
        Self {
            applications: Vec::new(),
        }
    }

    /// The book as shipped in the demo: four applications across both
    /// customer types and all four statuses.
    pub fn with_fixtures() -> Self {
        let fixture = |id: &str,
                       name: &str,
                       customer_type: CustomerType,
                       status: ApplicationStatus,
                       loan_amount: f64,
                       instalment_plan: &str,
                       apr: f64,
                       (y, m, d): (i32, u32, u32)| CustomerApplication {
            id: id.to_string(),
            name: name.to_string(),
            customer_type,
            status,
            loan_amount,
            instalment_plan: instalment_plan.to_string(),
            apr,
            created_at: Utc
                .with_ymd_and_hms(y, m, d, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        };

        Self {
            applications: vec![
                fixture(
                    "1",
                    "John Smith",
                    CustomerType::Consumer,
                    ApplicationStatus::Approved,
                    1200.0,
                    "£100 x 12",
                    4.5,
                    (2024, 1, 15),
                ),
                fixture(
                    "2",
                    "Tech Solutions Ltd",
                    CustomerType::Business,
                    ApplicationStatus::InProgress,
                    5000.0,
                    "£208 x 24",
                    6.2,
                    (2024, 1, 20),
                ),
                fixture(
                    "3",
                    "Sarah Johnson",
                    CustomerType::Consumer,
                    ApplicationStatus::Declined,
                    800.0,
                    "£133 x 6",
                    3.8,
                    (2024, 1, 22),
                ),
                fixture(
                    "4",
                    "Manchester Motors Ltd",
                    CustomerType::Business,
                    ApplicationStatus::Pending,
                    3500.0,
                    "£292 x 12",
                    5.5,
                    (2024, 1, 25),
                ),
            ],
        }
    }

    pub fn all(&self) -> &[CustomerApplication] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    /// Rows matching a type filter and a free-text search. The search is a
    /// case-insensitive substring match over name and status.
    pub fn filtered(
        &self,
        type_filter: Option<CustomerType>,
        search: &str,
    ) -> Vec<&CustomerApplication> {
        let needle = search.trim().to_lowercase();
        self.applications
            .iter()
            .filter(|app| type_filter.map_or(true, |t| app.customer_type == t))
            .filter(|app| {
                needle.is_empty()
                    || app.name.to_lowercase().contains(&needle)
                    || app.status.to_string().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Headline figures. A book with no applications reports a zero
    /// approval rate rather than dividing by zero.
    pub fn stats(&self) -> BookStats {
        let total = self.applications.len();
        let approved = self
            .applications
            .iter()
            .filter(|app| app.status == ApplicationStatus::Approved)
            .count();
        let approval_rate_percent = if total == 0 {
            0.0
        } else {
            (approved as f64 / total as f64) * 100.0
        };
        BookStats {
            total,
            approved,
            approval_rate_percent,
            total_loan_value: self.applications.iter().map(|app| app.loan_amount).sum(),
        }
    }

    /// Append a new in-progress application and return it.
    pub fn add(
        &mut self,
        name: &str,
        customer_type: CustomerType,
        loan_amount: f64,
        instalment_plan: String,
        apr: f64,
    ) -> &CustomerApplication {
        let application = CustomerApplication {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            customer_type,
            status: ApplicationStatus::InProgress,
            loan_amount,
            instalment_plan,
            apr,
            created_at: Utc::now(),
        };
        info!(id = %application.id, name, "Application added to book");
        self.applications.push(application);
        self.applications.last().expect("just pushed")
    }
}

impl Default for ApplicationBook {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
