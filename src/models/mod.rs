//! Core data models for the workforce engine.
//!
//! Every input event and output record is a plain serde struct with no embedded
//! policy behavior.

mod attendance;
mod audit;
mod leave;
mod pay_period;
mod payroll;
mod project;
mod streak;
mod task;

pub use attendance::{
    AttendanceClockEvent, AttendanceRecord, AttendanceStatus, ClockInResult, ClockMethod,
};
pub use audit::{AuditStep, ValidationIssue};
pub use leave::{
    LeaveApplication, LeaveApplicationRequest, LeaveBalance, LeaveDecision, LeaveStatus,
    LeaveValidationResult, PayImpact, PayType,
};
pub use pay_period::{DayType, Holiday, PayPeriod};
pub use payroll::{
    AttendanceMetrics, EmployeeSalaryProfile, PayrollBonuses, PayrollPenalties, PayrollRecord,
    SalaryAdjustment, StatutoryDeductions, TaskMetrics,
};
pub use project::{ProjectGrade, ProjectStatus, ProjectSummary};
pub use streak::Streak;
pub use task::{
    ApprovalState, RewardGrant, RewardMultipliers, TaskCompletion, TaskCompletionEvent,
    TaskStartEvent, TaskStatus, TatRecord,
};
