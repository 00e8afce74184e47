//! Services orchestrating the policy store, the repositories and the evaluators.
//!
//! Each service reads one policy snapshot per operation, so an operation never
//! mixes two policy versions even if a document is replaced while it runs.

mod attendance;
mod leave;
mod payroll;
mod task;

use std::sync::{Mutex, MutexGuard};

use crate::error::{EngineError, EngineResult};

pub use attendance::AttendanceService;
pub use leave::LeaveService;
pub use payroll::{PayrollBatchEntry, PayrollBatchResult, PayrollService};
pub use task::TaskService;

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> EngineResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| EngineError::StorageError {
        message: format!("{} lock poisoned", name),
    })
}
