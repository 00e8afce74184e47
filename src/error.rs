//! Error types for the workforce engine.
//!
//! Structural and configuration failures are surfaced as [`EngineError`] and abort
//! the computation. Business-rule violations (late arrival, insufficient notice,
//! blackout overlap and so on) are not errors; they are returned as data inside the
//! evaluator results.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the workforce engine.
///
/// # Example
///
/// ```
/// use workforce_engine::error::EngineError;
///
/// let error = EngineError::PolicyNotFound {
///     table: "attendance.late_arrival".to_string(),
/// };
/// assert_eq!(error.to_string(), "Policy table not found: attendance.late_arrival");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A bracket table or lookup entry required by an evaluator is missing or unusable.
    #[error("Policy table not found: {table}")]
    PolicyNotFound {
        /// Dotted path of the missing table or entry.
        table: String,
    },

    /// A policy document failed structural validation.
    #[error("Invalid policy '{policy}': {message}")]
    InvalidPolicy {
        /// The policy document or table that failed validation.
        policy: String,
        /// A description of the problem.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Clock-out was attempted without an open clock-in for the day.
    #[error("No active session for employee '{employee_id}' on {date}")]
    NoActiveSession {
        /// The employee that attempted to clock out.
        employee_id: String,
        /// The attendance date.
        date: NaiveDate,
    },

    /// Clock-in was attempted while a session for the day is still open.
    #[error("Employee '{employee_id}' already has an open session on {date}")]
    SessionAlreadyOpen {
        /// The employee that attempted to clock in.
        employee_id: String,
        /// The attendance date.
        date: NaiveDate,
    },

    /// A leave balance cannot cover the requested days.
    #[error("Insufficient '{leave_type}' balance: requested {requested} days, {remaining} remaining")]
    InsufficientBalance {
        /// The leave type.
        leave_type: String,
        /// Days requested.
        requested: Decimal,
        /// Days remaining in the balance.
        remaining: Decimal,
    },

    /// The leave type is not configured in the leave policy.
    #[error("Unknown leave type: {leave_type}")]
    UnknownLeaveType {
        /// The leave type that was requested.
        leave_type: String,
    },

    /// No task record exists for the given id.
    #[error("Task not found: {task_id}")]
    TaskNotFound {
        /// The task id.
        task_id: String,
    },

    /// The task has already been completed and its metrics are frozen.
    #[error("Task '{task_id}' is already completed")]
    TaskAlreadyCompleted {
        /// The task id.
        task_id: String,
    },

    /// No task has been recorded for the project.
    #[error("Project not found: {project_id}")]
    ProjectNotFound {
        /// The project id.
        project_id: String,
    },

    /// No leave application exists for the given id.
    #[error("Leave application not found: {id}")]
    LeaveApplicationNotFound {
        /// The application id.
        id: String,
    },

    /// The leave application has already been decided.
    #[error("Leave application '{id}' is already {status}")]
    LeaveApplicationNotPending {
        /// The application id.
        id: String,
        /// The current status.
        status: String,
    },

    /// A repository or the policy store could not be accessed.
    #[error("Storage error: {message}")]
    StorageError {
        /// A description of the failure.
        message: String,
    },

    /// An input record was invalid or contained inconsistent data.
    #[error("Invalid record field '{field}': {message}")]
    InvalidRecord {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
