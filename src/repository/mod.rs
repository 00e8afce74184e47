//! Storage abstractions used by the services.
//!
//! Each record family has one trait; the services only ever talk to these
//! traits. [`memory`] holds the in-memory implementations used by the server
//! binary and the tests.

pub mod memory;

use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{AttendanceRecord, LeaveApplication, LeaveBalance, PayrollRecord, TatRecord};

pub use memory::{
    InMemoryAttendanceRepository, InMemoryLeaveRepository, InMemoryPayrollRepository,
    InMemoryTaskRepository,
};

/// Attendance records keyed by employee and date.
pub trait AttendanceRepository: Send + Sync {
    /// The record of an employee for a date.
    fn find(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>>;

    /// Inserts or replaces the record for its employee and date.
    fn save(&self, record: AttendanceRecord) -> EngineResult<()>;

    /// Records of an employee dated within `[start, end]`, in date order.
    fn list_for_employee(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;
}

/// TAT records keyed by task id.
pub trait TaskRepository: Send + Sync {
    /// The record of a task.
    fn get(&self, task_id: &str) -> EngineResult<Option<TatRecord>>;

    /// Inserts or replaces a record.
    fn save(&self, record: TatRecord) -> EngineResult<()>;

    /// Every record of an employee.
    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<TatRecord>>;

    /// Every record of a project.
    fn list_for_project(&self, project_id: &str) -> EngineResult<Vec<TatRecord>>;

    /// Every record.
    fn list_all(&self) -> EngineResult<Vec<TatRecord>>;
}

/// Leave applications and per-year balances.
pub trait LeaveRepository: Send + Sync {
    /// An application by id.
    fn get_application(&self, id: &str) -> EngineResult<Option<LeaveApplication>>;

    /// Inserts or replaces an application.
    fn save_application(&self, application: LeaveApplication) -> EngineResult<()>;

    /// Every application of an employee.
    fn list_applications(&self, employee_id: &str) -> EngineResult<Vec<LeaveApplication>>;

    /// The balance of an employee for a leave type and year.
    fn get_balance(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>>;

    /// Inserts or replaces a balance.
    fn save_balance(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
        balance: LeaveBalance,
    ) -> EngineResult<()>;
}

/// Payroll records, one per employee and period.
pub trait PayrollRepository: Send + Sync {
    /// Stores a record, replacing any record for the same employee and period.
    ///
    /// Returns the replaced record.
    fn upsert(&self, record: PayrollRecord) -> EngineResult<Option<PayrollRecord>>;

    /// The record of an employee for a period key (see [`PayPeriod::key`](crate::models::PayPeriod::key)).
    fn get(&self, employee_id: &str, period_key: &str) -> EngineResult<Option<PayrollRecord>>;

    /// Every record of an employee, in period order.
    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>>;
}
