//! Leave applications and balances.

use std::sync::{Arc, Mutex};

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{calculate_pay_impact, validate_leave};
use crate::config::{LeaveTypePolicy, PolicyStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    LeaveApplication, LeaveApplicationRequest, LeaveBalance, LeaveDecision, LeaveStatus,
};
use crate::repository::LeaveRepository;

use super::lock;

/// Validates, approves and rejects leave, and keeps per-year balances.
///
/// A balance is opened from the leave type's annual entitlement the first
/// time it is needed and only deducted when an application is approved.
pub struct LeaveService {
    policies: Arc<PolicyStore>,
    leaves: Arc<dyn LeaveRepository>,
    writes: Mutex<()>,
}

impl LeaveService {
    /// Creates a service over a policy store and a leave repository.
    pub fn new(policies: Arc<PolicyStore>, leaves: Arc<dyn LeaveRepository>) -> Self {
        Self {
            policies,
            leaves,
            writes: Mutex::new(()),
        }
    }

    fn stored_or_opened(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
        rules: &LeaveTypePolicy,
    ) -> EngineResult<Option<LeaveBalance>> {
        let Some(entitled) = rules.annual_entitlement else {
            return Ok(None);
        };
        let stored = self.leaves.get_balance(employee_id, leave_type, year)?;
        Ok(Some(
            stored.unwrap_or_else(|| LeaveBalance::open(entitled, Decimal::ZERO)),
        ))
    }

    /// Validates a request and, if valid, stores it as a pending application.
    ///
    /// Business-rule failures are returned in the decision's validation
    /// result; the application is `None` when the request is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownLeaveType`] for a type missing from the policy.
    pub fn apply(&self, request: LeaveApplicationRequest) -> EngineResult<LeaveDecision> {
        let snapshot = self.policies.snapshot();
        let policy = &snapshot.leave;
        let rules = policy.leave_type(&request.leave_type)?;
        let balance = self.stored_or_opened(
            &request.employee_id,
            &request.leave_type,
            request.start_date.year(),
            rules,
        )?;

        let validation = validate_leave(&request, balance.as_ref(), policy)?;
        let pay_impact = calculate_pay_impact(
            &request.leave_type,
            request.days(),
            request.advance_notice_days(),
            &request.reason,
            policy,
        )?;

        let application = if validation.is_valid {
            let application =
                LeaveApplication::pending(Uuid::new_v4().to_string(), request, pay_impact.clone());
            self.leaves.save_application(application.clone())?;
            info!(
                id = %application.id,
                employee_id = %application.employee_id,
                leave_type = %application.leave_type,
                days = %application.days,
                "Leave application submitted"
            );
            Some(application)
        } else {
            info!(
                employee_id = %request.employee_id,
                leave_type = %request.leave_type,
                errors = validation.errors.len(),
                "Leave request rejected by validation"
            );
            None
        };

        Ok(LeaveDecision {
            validation,
            pay_impact,
            application,
        })
    }

    fn pending(&self, id: &str) -> EngineResult<LeaveApplication> {
        let application = self
            .leaves
            .get_application(id)?
            .ok_or_else(|| EngineError::LeaveApplicationNotFound { id: id.to_string() })?;
        if application.status != LeaveStatus::Pending {
            return Err(EngineError::LeaveApplicationNotPending {
                id: id.to_string(),
                status: status_label(application.status).to_string(),
            });
        }
        Ok(application)
    }

    /// Approves a pending application and deducts its days from the balance.
    ///
    /// # Errors
    ///
    /// - [`EngineError::LeaveApplicationNotFound`] for an unknown id.
    /// - [`EngineError::LeaveApplicationNotPending`] if it was already decided.
    /// - [`EngineError::InsufficientBalance`] if the balance no longer covers it.
    pub fn approve(&self, id: &str) -> EngineResult<LeaveApplication> {
        let _guard = lock(&self.writes, "leave writes")?;
        let mut application = self.pending(id)?;

        let snapshot = self.policies.snapshot();
        let rules = snapshot.leave.leave_type(&application.leave_type)?;
        let year = application.start_date.year();
        if let Some(mut balance) =
            self.stored_or_opened(&application.employee_id, &application.leave_type, year, rules)?
        {
            balance.deduct(&application.leave_type, application.days)?;
            self.leaves.save_balance(
                &application.employee_id,
                &application.leave_type,
                year,
                balance,
            )?;
        }

        application.status = LeaveStatus::Approved;
        self.leaves.save_application(application.clone())?;
        info!(id = %application.id, days = %application.days, "Leave approved");
        Ok(application)
    }

    /// Rejects a pending application.
    pub fn reject(&self, id: &str) -> EngineResult<LeaveApplication> {
        let _guard = lock(&self.writes, "leave writes")?;
        let mut application = self.pending(id)?;
        application.status = LeaveStatus::Rejected;
        self.leaves.save_application(application.clone())?;
        info!(id = %application.id, "Leave rejected");
        Ok(application)
    }

    /// Every application of an employee.
    pub fn applications(&self, employee_id: &str) -> EngineResult<Vec<LeaveApplication>> {
        self.leaves.list_applications(employee_id)
    }

    /// The balance of an employee for a leave type and year.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`] for a type without an annual entitlement.
    pub fn balance(&self, employee_id: &str, leave_type: &str, year: i32) -> EngineResult<LeaveBalance> {
        let snapshot = self.policies.snapshot();
        let rules = snapshot.leave.leave_type(leave_type)?;
        self.stored_or_opened(employee_id, leave_type, year, rules)?
            .ok_or_else(|| untracked(leave_type))
    }

    /// Closes `year` and sets the next year's carry-forward, capped by policy.
    ///
    /// A next-year balance that already exists keeps its usage and only has
    /// its carry-forward replaced, so rolling over twice is harmless.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidRecord`] for a type without an annual entitlement.
    /// - [`EngineError::InsufficientBalance`] if next year's usage no longer
    ///   fits the new carry-forward.
    pub fn roll_over_year(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
    ) -> EngineResult<LeaveBalance> {
        let _guard = lock(&self.writes, "leave writes")?;
        let snapshot = self.policies.snapshot();
        let rules = snapshot.leave.leave_type(leave_type)?;
        let entitled = rules.annual_entitlement.ok_or_else(|| untracked(leave_type))?;
        let current = self
            .stored_or_opened(employee_id, leave_type, year, rules)?
            .ok_or_else(|| untracked(leave_type))?;

        let next = match self.leaves.get_balance(employee_id, leave_type, year + 1)? {
            Some(existing) => {
                existing.with_carry_forward(leave_type, current.carry_over(rules.max_carry_forward))?
            }
            None => current.roll_over(entitled, rules.max_carry_forward),
        };
        self.leaves
            .save_balance(employee_id, leave_type, year + 1, next.clone())?;
        info!(
            employee_id = %employee_id,
            leave_type = %leave_type,
            year = year + 1,
            carry_forward = %next.carry_forward,
            "Leave balance rolled over"
        );
        Ok(next)
    }
}

fn status_label(status: LeaveStatus) -> &'static str {
    match status {
        LeaveStatus::Pending => "pending",
        LeaveStatus::Approved => "approved",
        LeaveStatus::Rejected => "rejected",
    }
}

fn untracked(leave_type: &str) -> EngineError {
    EngineError::InvalidRecord {
        field: "leave_type".to_string(),
        message: format!("'{}' has no annual entitlement", leave_type),
    }
}
