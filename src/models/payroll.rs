//! Payroll models.
//!
//! A [`PayrollRecord`] is the period net-salary record produced by the payroll
//! aggregator. Every monetary field is rounded to whole currency units; the
//! intermediate values used to compute them are not.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditStep, PayPeriod};

/// A manual salary adjustment (positive allowance or negative recovery).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryAdjustment {
    /// What the adjustment is for.
    pub label: String,
    /// Signed monthly amount.
    pub amount: Decimal,
}

/// Salary inputs for one employee.
///
/// When `base_salary` is `None` the monthly base is looked up from the payroll
/// policy's salary structure by role and experience tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSalaryProfile {
    /// The employee.
    pub employee_id: String,
    /// Role key in the salary structure (e.g. "engineer").
    pub role: String,
    /// Experience tier key (e.g. "senior").
    pub experience_tier: String,
    /// Monthly base salary override.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// Manual adjustments applied every period.
    #[serde(default)]
    pub custom_adjustments: Vec<SalaryAdjustment>,
}

/// Attendance figures aggregated over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceMetrics {
    /// Working days in the period.
    pub working_days: u32,
    /// Days with a completed attendance record.
    pub present_days: u32,
    /// Working days with neither attendance nor approved leave.
    pub absent_days: u32,
    /// Present days with a late arrival.
    pub late_days: u32,
    /// Approved leave days inside the period.
    pub leave_days: Decimal,
    /// Present days over working days, as a percentage (two decimals).
    pub attendance_percentage: Decimal,
    /// Total overtime hours.
    pub overtime_hours: Decimal,
}

/// Task figures aggregated over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetrics {
    /// Tasks completed in the period.
    pub completed_tasks: u32,
    /// Mean efficiency of the completed tasks (two decimals).
    pub average_efficiency: Decimal,
    /// Mean quality rating of the rated completed tasks (two decimals).
    pub average_quality: Decimal,
    /// Completed tasks delivered after their planned end date.
    pub missed_deadlines: u32,
}

/// Bonus components of a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollBonuses {
    /// Efficiency bonus.
    pub efficiency: Decimal,
    /// Quality bonus.
    pub quality: Decimal,
    /// Attendance bonus.
    pub attendance: Decimal,
    /// Task-completion bonus.
    pub task_completion: Decimal,
    /// Reward points converted to currency.
    pub reward_points: Decimal,
    /// Overtime pay.
    pub overtime: Decimal,
    /// Sum of custom adjustments.
    pub adjustments: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

/// Penalty components of a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollPenalties {
    /// Late-day penalty.
    pub late: Decimal,
    /// Missed-deadline penalty.
    pub missed_deadlines: Decimal,
    /// Absence penalty.
    pub absent: Decimal,
    /// Leave deductions and penalties.
    pub leave: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

/// Statutory deductions of a payroll record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatutoryDeductions {
    /// Income tax.
    pub tax: Decimal,
    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Employee state insurance contribution.
    pub esi: Decimal,
    /// Sum of the above.
    pub total: Decimal,
}

/// The payroll outcome for one employee and one period.
///
/// Recomputing with identical inputs yields an identical record except for
/// `computed_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee.
    pub employee_id: String,
    /// The period.
    pub period: PayPeriod,
    /// Version of the policy snapshot used.
    pub policy_version: u64,
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Base salary pro-rated by present days.
    pub earned_salary: Decimal,
    /// Attendance figures.
    pub attendance: AttendanceMetrics,
    /// Task figures.
    pub tasks: TaskMetrics,
    /// Bonus breakdown.
    pub bonuses: PayrollBonuses,
    /// Penalty breakdown.
    pub penalties: PayrollPenalties,
    /// Statutory deduction breakdown.
    pub statutory_deductions: StatutoryDeductions,
    /// Earned salary plus bonuses.
    pub gross_salary: Decimal,
    /// Gross salary less penalties and statutory deductions.
    pub net_salary: Decimal,
    /// Audit trail of the bracket resolutions.
    pub audit_steps: Vec<AuditStep>,
    /// When the record was computed.
    pub computed_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Returns a copy with the run timestamp cleared, for comparing recomputations.
    pub fn without_run_metadata(&self) -> Self {
        Self {
            computed_at: DateTime::<Utc>::default(),
            ..self.clone()
        }
    }
}
