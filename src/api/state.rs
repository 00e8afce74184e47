//! Application state for the workforce engine API.
//!
//! The state wires one policy store and one set of repositories into the four
//! services shared by every request handler.

use std::sync::Arc;

use crate::config::PolicyStore;
use crate::repository::{
    AttendanceRepository, InMemoryAttendanceRepository, InMemoryLeaveRepository,
    InMemoryPayrollRepository, InMemoryTaskRepository, LeaveRepository, PayrollRepository,
    TaskRepository,
};
use crate::service::{AttendanceService, LeaveService, PayrollService, TaskService};

/// The repositories backing the services.
#[derive(Clone)]
pub struct Repositories {
    /// Attendance records.
    pub attendance: Arc<dyn AttendanceRepository>,
    /// TAT records.
    pub tasks: Arc<dyn TaskRepository>,
    /// Leave applications and balances.
    pub leaves: Arc<dyn LeaveRepository>,
    /// Payroll records.
    pub payroll: Arc<dyn PayrollRepository>,
}

impl Repositories {
    /// Empty in-memory repositories.
    pub fn in_memory() -> Self {
        Self {
            attendance: Arc::new(InMemoryAttendanceRepository::new()),
            tasks: Arc::new(InMemoryTaskRepository::new()),
            leaves: Arc::new(InMemoryLeaveRepository::new()),
            payroll: Arc::new(InMemoryPayrollRepository::new()),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    policies: Arc<PolicyStore>,
    attendance: Arc<AttendanceService>,
    tasks: Arc<TaskService>,
    leave: Arc<LeaveService>,
    payroll: Arc<PayrollService>,
}

impl AppState {
    /// Creates the state over in-memory repositories.
    pub fn new(policies: PolicyStore) -> Self {
        Self::with_repositories(policies, Repositories::in_memory())
    }

    /// Creates the state over the given repositories.
    pub fn with_repositories(policies: PolicyStore, repositories: Repositories) -> Self {
        let policies = Arc::new(policies);
        Self {
            attendance: Arc::new(AttendanceService::new(
                Arc::clone(&policies),
                Arc::clone(&repositories.attendance),
            )),
            tasks: Arc::new(TaskService::new(
                Arc::clone(&policies),
                Arc::clone(&repositories.tasks),
            )),
            leave: Arc::new(LeaveService::new(
                Arc::clone(&policies),
                Arc::clone(&repositories.leaves),
            )),
            payroll: Arc::new(PayrollService::new(
                Arc::clone(&policies),
                repositories.attendance,
                repositories.tasks,
                repositories.leaves,
                repositories.payroll,
            )),
            policies,
        }
    }

    /// The policy store.
    pub fn policies(&self) -> &PolicyStore {
        &self.policies
    }

    /// The attendance service.
    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    /// The task service.
    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    /// The leave service.
    pub fn leave(&self) -> &LeaveService {
        &self.leave
    }

    /// The payroll service.
    pub fn payroll(&self) -> &PayrollService {
        &self.payroll
    }
}
