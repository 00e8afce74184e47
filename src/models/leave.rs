//! Leave models: requests, applications, balances and validation results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ValidationIssue;
use crate::error::{EngineError, EngineResult};

/// A leave request as submitted by an employee.
///
/// # Example
///
/// ```
/// use workforce_engine::models::LeaveApplicationRequest;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let request = LeaveApplicationRequest {
///     employee_id: "emp_001".to_string(),
///     leave_type: "annual_leave".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 3, 16).unwrap(),
///     reason: "Family trip".to_string(),
///     documents: vec![],
///     applied_on: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
/// };
/// assert_eq!(request.days(), Decimal::from(3));
/// assert_eq!(request.advance_notice_days(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplicationRequest {
    /// The applicant.
    pub employee_id: String,
    /// Leave type key in the leave policy (e.g. "annual_leave").
    #[serde(rename = "type")]
    pub leave_type: String,
    /// First day of leave (inclusive).
    pub start_date: NaiveDate,
    /// Last day of leave (inclusive).
    pub end_date: NaiveDate,
    /// Free-text reason, matched against the emergency allowlist.
    #[serde(default)]
    pub reason: String,
    /// Supporting document references.
    #[serde(default)]
    pub documents: Vec<String>,
    /// Date the request was submitted.
    pub applied_on: NaiveDate,
}

impl LeaveApplicationRequest {
    /// Inclusive calendar-day count of the request. Zero for an inverted range.
    pub fn days(&self) -> Decimal {
        let span = (self.end_date - self.start_date).num_days() + 1;
        Decimal::from(span.max(0))
    }

    /// Days between submission and the first day of leave, never negative.
    pub fn advance_notice_days(&self) -> i64 {
        (self.start_date - self.applied_on).num_days().max(0)
    }

    /// Returns true if the end date precedes the start date.
    pub fn has_inverted_range(&self) -> bool {
        self.end_date < self.start_date
    }
}

/// Approval status of a leave application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    /// Submitted and awaiting a decision.
    Pending,
    /// Approved; the balance has been deducted.
    Approved,
    /// Rejected.
    Rejected,
}

/// How a leave is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayType {
    /// Fully paid.
    FullPay,
    /// Paid, with an extra deduction for short notice.
    SalaryDeduction,
    /// Not paid.
    Unpaid,
}

/// The pay consequence of a leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayImpact {
    /// How the leave is paid.
    pub pay_type: PayType,
    /// Days of salary to deduct.
    pub deduction: Decimal,
    /// Fixed currency penalty.
    pub penalty: Decimal,
    /// True if the same-day penalty applied.
    pub penalty_applied: bool,
    /// Human-readable summary.
    pub message: String,
}

impl PayImpact {
    /// A fully paid leave with no deduction.
    pub fn full_pay() -> Self {
        Self {
            pay_type: PayType::FullPay,
            deduction: Decimal::ZERO,
            penalty: Decimal::ZERO,
            penalty_applied: false,
            message: "Full pay".to_string(),
        }
    }
}

/// A stored leave application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    /// Application id.
    pub id: String,
    /// The applicant.
    pub employee_id: String,
    /// Leave type key.
    #[serde(rename = "type")]
    pub leave_type: String,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Inclusive day count.
    pub days: Decimal,
    /// Notice given in days.
    pub advance_notice_days: i64,
    /// Stated reason.
    pub reason: String,
    /// Supporting documents.
    pub documents: Vec<String>,
    /// Submission date.
    pub applied_on: NaiveDate,
    /// Approval status.
    pub status: LeaveStatus,
    /// Pay consequence computed at submission.
    pub pay_impact: PayImpact,
}

impl LeaveApplication {
    /// Builds a pending application from a request.
    pub fn pending(id: String, request: LeaveApplicationRequest, pay_impact: PayImpact) -> Self {
        Self {
            id,
            days: request.days(),
            advance_notice_days: request.advance_notice_days(),
            employee_id: request.employee_id,
            leave_type: request.leave_type,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            documents: request.documents,
            applied_on: request.applied_on,
            status: LeaveStatus::Pending,
            pay_impact,
        }
    }

    /// Returns true if the application is approved.
    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }
}

/// Leave balance for one employee, leave type and year.
///
/// `remaining` is kept equal to `entitled + carry_forward - used` and never
/// drops below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Days granted for the year.
    pub entitled: Decimal,
    /// Days consumed by approved leave.
    pub used: Decimal,
    /// Days still available.
    pub remaining: Decimal,
    /// Days carried over from the previous year.
    pub carry_forward: Decimal,
}

impl LeaveBalance {
    /// Opens a fresh balance for a year.
    pub fn open(entitled: Decimal, carry_forward: Decimal) -> Self {
        Self {
            entitled,
            used: Decimal::ZERO,
            remaining: entitled + carry_forward,
            carry_forward,
        }
    }

    /// Consumes `days` from the balance.
    ///
    /// Fails with [`EngineError::InsufficientBalance`] and leaves the balance
    /// untouched if `days` exceeds what remains.
    pub fn deduct(&mut self, leave_type: &str, days: Decimal) -> EngineResult<()> {
        if days > self.remaining {
            return Err(EngineError::InsufficientBalance {
                leave_type: leave_type.to_string(),
                requested: days,
                remaining: self.remaining,
            });
        }
        self.used += days;
        self.remaining = self.entitled + self.carry_forward - self.used;
        Ok(())
    }

    /// Days this balance carries into the next year, capped at `max_carry_forward`.
    pub fn carry_over(&self, max_carry_forward: Decimal) -> Decimal {
        self.remaining.min(max_carry_forward).max(Decimal::ZERO)
    }

    /// Opens next year's balance, carrying over at most `max_carry_forward` days.
    pub fn roll_over(&self, next_entitled: Decimal, max_carry_forward: Decimal) -> Self {
        Self::open(next_entitled, self.carry_over(max_carry_forward))
    }

    /// Replaces the carry-forward of a balance that may already be in use.
    ///
    /// Fails with [`EngineError::InsufficientBalance`] if the days already
    /// used no longer fit the new total.
    pub fn with_carry_forward(&self, leave_type: &str, carry_forward: Decimal) -> EngineResult<Self> {
        let available = self.entitled + carry_forward;
        if self.used > available {
            return Err(EngineError::InsufficientBalance {
                leave_type: leave_type.to_string(),
                requested: self.used,
                remaining: available,
            });
        }
        Ok(Self {
            entitled: self.entitled,
            used: self.used,
            remaining: available - self.used,
            carry_forward,
        })
    }

    /// Checks the balance invariant.
    pub fn is_consistent(&self) -> bool {
        self.remaining == self.entitled + self.carry_forward - self.used
            && self.remaining >= Decimal::ZERO
    }
}

/// Outcome of validating a leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveValidationResult {
    /// True if there are no errors.
    pub is_valid: bool,
    /// Business-rule violations that block the request.
    pub errors: Vec<ValidationIssue>,
    /// Findings that do not block the request.
    pub warnings: Vec<ValidationIssue>,
}

/// Result of submitting a leave request: the validation outcome and, if valid,
/// the stored pending application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDecision {
    /// Validation outcome.
    pub validation: LeaveValidationResult,
    /// Pay consequence of the request.
    pub pay_impact: PayImpact,
    /// The stored application when validation passed.
    pub application: Option<LeaveApplication>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate, applied_on: NaiveDate) -> LeaveApplicationRequest {
        LeaveApplicationRequest {
            employee_id: "emp_001".to_string(),
            leave_type: "annual_leave".to_string(),
            start_date: start,
            end_date: end,
            reason: String::new(),
            documents: vec![],
            applied_on,
        }
    }

    #[test]
    fn test_single_day_request_counts_one_day() {
        let req = request(date(2025, 3, 14), date(2025, 3, 14), date(2025, 3, 14));
        assert_eq!(req.days(), dec("1"));
        assert_eq!(req.advance_notice_days(), 0);
    }

    #[test]
    fn test_retroactive_request_has_zero_notice() {
        let req = request(date(2025, 3, 1), date(2025, 3, 2), date(2025, 3, 4));
        assert_eq!(req.advance_notice_days(), 0);
    }

    #[test]
    fn test_inverted_range_has_zero_days() {
        let req = request(date(2025, 3, 10), date(2025, 3, 8), date(2025, 3, 1));
        assert!(req.has_inverted_range());
        assert_eq!(req.days(), Decimal::ZERO);
    }

    #[test]
    fn test_open_balance_includes_carry_forward() {
        let balance = LeaveBalance::open(dec("18"), dec("3"));
        assert_eq!(balance.remaining, dec("21"));
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_deduct_keeps_invariant() {
        let mut balance = LeaveBalance::open(dec("18"), dec("2"));
        balance.deduct("annual_leave", dec("5")).unwrap();

        assert_eq!(balance.used, dec("5"));
        assert_eq!(balance.remaining, dec("15"));
        assert!(balance.is_consistent());
    }

    #[test]
    fn test_deduct_beyond_remaining_fails_and_leaves_balance_untouched() {
        let mut balance = LeaveBalance::open(dec("2"), Decimal::ZERO);
        let result = balance.deduct("annual_leave", dec("3"));

        match result {
            Err(EngineError::InsufficientBalance {
                requested,
                remaining,
                ..
            }) => {
                assert_eq!(requested, dec("3"));
                assert_eq!(remaining, dec("2"));
            }
            other => panic!("Expected InsufficientBalance, got {:?}", other),
        }
        assert_eq!(balance.used, Decimal::ZERO);
        assert_eq!(balance.remaining, dec("2"));
    }

    #[test]
    fn test_roll_over_caps_carry_forward() {
        let mut balance = LeaveBalance::open(dec("18"), Decimal::ZERO);
        balance.deduct("annual_leave", dec("10")).unwrap();

        let next = balance.roll_over(dec("18"), dec("5"));
        assert_eq!(next.carry_forward, dec("5"));
        assert_eq!(next.remaining, dec("23"));
        assert_eq!(next.used, Decimal::ZERO);
    }

    #[test]
    fn test_roll_over_carries_less_than_cap() {
        let mut balance = LeaveBalance::open(dec("18"), Decimal::ZERO);
        balance.deduct("annual_leave", dec("16")).unwrap();

        let next = balance.roll_over(dec("18"), dec("5"));
        assert_eq!(next.carry_forward, dec("2"));
    }

    #[test]
    fn test_carry_forward_update_keeps_usage() {
        let mut balance = LeaveBalance::open(dec("18"), Decimal::ZERO);
        balance.deduct("annual_leave", dec("5")).unwrap();

        let updated = balance.with_carry_forward("annual_leave", dec("5")).unwrap();
        assert_eq!(updated.used, dec("5"));
        assert_eq!(updated.carry_forward, dec("5"));
        assert_eq!(updated.remaining, dec("18"));
        assert!(updated.is_consistent());
    }

    #[test]
    fn test_carry_forward_cannot_shrink_below_usage() {
        let mut balance = LeaveBalance::open(dec("18"), dec("5"));
        balance.deduct("annual_leave", dec("20")).unwrap();

        let result = balance.with_carry_forward("annual_leave", dec("1"));
        assert!(matches!(result, Err(EngineError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_request_deserializes_type_field() {
        let json = r#"{
            "employee_id": "emp_001",
            "type": "sick_leave",
            "start_date": "2025-03-04",
            "end_date": "2025-03-04",
            "applied_on": "2025-03-04"
        }"#;
        let req: LeaveApplicationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.leave_type, "sick_leave");
        assert!(req.documents.is_empty());
    }
}
