//! HTTP API module for the workforce engine.
//!
//! This module exposes the attendance, task, leave, payroll and policy
//! services as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ClockOutRequest, PayrollBatchRequest, PayrollBatchResponse, PayrollRequest,
    PolicyVersionResponse, SummaryQuery,
};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{AppState, Repositories};
