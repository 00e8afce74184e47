//! Request and response bodies specific to the HTTP API.
//!
//! Most endpoints take and return the domain models directly; the types here
//! cover the bodies that bundle several of them.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{EmployeeSalaryProfile, PayPeriod};
use crate::service::{PayrollBatchEntry, PayrollBatchResult};

/// Request body for `POST /attendance/clock-out`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockOutRequest {
    /// The employee clocking out.
    pub employee_id: String,
    /// Local wall-clock time of the clock-out.
    pub timestamp: NaiveDateTime,
    /// Whether the employee gave notice of leaving early.
    #[serde(default)]
    pub notice_given: bool,
}

/// Request body for `POST /payroll/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// Salary profile of the employee.
    pub profile: EmployeeSalaryProfile,
    /// The pay period.
    pub period: PayPeriod,
    /// Reward points earned in the period.
    #[serde(default)]
    pub reward_points: i64,
}

/// Request body for `POST /payroll/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollBatchRequest {
    /// The pay period shared by every employee.
    pub period: PayPeriod,
    /// The employees to run.
    pub employees: Vec<PayrollBatchEntry>,
}

/// Response body for `POST /payroll/batch`.
#[derive(Debug, Clone, Serialize)]
pub struct PayrollBatchResponse {
    /// Employees computed successfully.
    pub succeeded: usize,
    /// Employees that failed.
    pub failed: usize,
    /// Per-employee outcomes, in request order.
    pub results: Vec<PayrollBatchResult>,
}

/// Query string of the project summary endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryQuery {
    /// Roll-up date; today when omitted.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Response body for `PUT /policies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVersionResponse {
    /// The replaced document's domain.
    pub domain: String,
    /// The snapshot version now in effect.
    pub version: u64,
}
