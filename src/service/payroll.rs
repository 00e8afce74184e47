//! Payroll runs over the stored attendance, task and leave records.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{PayrollInputs, calculate_payroll};
use crate::config::PolicyStore;
use crate::error::EngineResult;
use crate::models::{EmployeeSalaryProfile, PayPeriod, PayrollRecord};
use crate::repository::{
    AttendanceRepository, LeaveRepository, PayrollRepository, TaskRepository,
};

/// One employee of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollBatchEntry {
    /// Salary profile of the employee.
    pub profile: EmployeeSalaryProfile,
    /// Reward points earned in the period.
    #[serde(default)]
    pub reward_points: i64,
}

/// The outcome of one employee in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollBatchResult {
    /// The employee.
    pub employee_id: String,
    /// The stored record, when the computation succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PayrollRecord>,
    /// The failure, when it did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Computes and stores payroll records.
///
/// A record is keyed by employee and period; recomputing a period replaces
/// the stored record.
pub struct PayrollService {
    policies: Arc<PolicyStore>,
    attendance: Arc<dyn AttendanceRepository>,
    tasks: Arc<dyn TaskRepository>,
    leaves: Arc<dyn LeaveRepository>,
    payroll: Arc<dyn PayrollRepository>,
}

impl PayrollService {
    /// Creates a service over the policy store and every repository it reads.
    pub fn new(
        policies: Arc<PolicyStore>,
        attendance: Arc<dyn AttendanceRepository>,
        tasks: Arc<dyn TaskRepository>,
        leaves: Arc<dyn LeaveRepository>,
        payroll: Arc<dyn PayrollRepository>,
    ) -> Self {
        Self {
            policies,
            attendance,
            tasks,
            leaves,
            payroll,
        }
    }

    /// Computes the period record of one employee and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`](crate::error::EngineError::InvalidRecord)
    /// for an inverted period before any record is read, and any error of
    /// [`calculate_payroll`].
    pub fn calculate(
        &self,
        profile: &EmployeeSalaryProfile,
        period: &PayPeriod,
        reward_points: i64,
    ) -> EngineResult<PayrollRecord> {
        period.validate()?;
        let employee_id = profile.employee_id.as_str();
        let snapshot = self.policies.snapshot();
        let attendance =
            self.attendance
                .list_for_employee(employee_id, period.start_date, period.end_date)?;
        let tasks = self.tasks.list_for_employee(employee_id)?;
        let leaves = self.leaves.list_applications(employee_id)?;

        let inputs = PayrollInputs {
            profile,
            period,
            attendance: &attendance,
            tasks: &tasks,
            leaves: &leaves,
            reward_points,
        };
        let record = calculate_payroll(&inputs, &snapshot, Utc::now())?;

        let replaced = self.payroll.upsert(record.clone())?;
        info!(
            employee_id = %employee_id,
            period = %period.key(),
            policy_version = record.policy_version,
            net_salary = %record.net_salary,
            replaced = replaced.is_some(),
            "Payroll calculated"
        );
        Ok(record)
    }

    /// Runs payroll for several employees.
    ///
    /// Each employee is computed on its own; a failure is reported in that
    /// employee's result and does not stop the others.
    pub fn run_batch(&self, period: &PayPeriod, entries: &[PayrollBatchEntry]) -> Vec<PayrollBatchResult> {
        entries
            .iter()
            .map(|entry| {
                let employee_id = entry.profile.employee_id.clone();
                match self.calculate(&entry.profile, period, entry.reward_points) {
                    Ok(record) => PayrollBatchResult {
                        employee_id,
                        record: Some(record),
                        error: None,
                    },
                    Err(err) => {
                        warn!(employee_id = %employee_id, error = %err, "Payroll failed");
                        PayrollBatchResult {
                            employee_id,
                            record: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect()
    }

    /// The stored record of an employee for a period.
    pub fn record(&self, employee_id: &str, period: &PayPeriod) -> EngineResult<Option<PayrollRecord>> {
        self.payroll.get(employee_id, &period.key())
    }

    /// Every stored record of an employee.
    pub fn history(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        self.payroll.list_for_employee(employee_id)
    }
}
