//! HTTP request handlers for the workforce engine API.
//!
//! This module contains the router and one handler per endpoint. Handlers
//! tag their log lines with a per-request correlation id and translate
//! [`EngineError`]s through [`ApiErrorResponse`].

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PolicyDocument;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceClockEvent, LeaveApplicationRequest, TaskCompletionEvent, TaskStartEvent};

use super::request::{
    ClockOutRequest, PayrollBatchRequest, PayrollBatchResponse, PayrollRequest,
    PolicyVersionResponse, SummaryQuery,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/attendance/clock-in", post(clock_in_handler))
        .route("/attendance/clock-out", post(clock_out_handler))
        .route("/attendance/:employee_id/streak", get(streak_handler))
        .route("/tasks", post(start_task_handler))
        .route("/tasks/complete", post(complete_task_handler))
        .route("/projects/summary", get(project_summaries_handler))
        .route("/projects/:project_id/summary", get(project_summary_handler))
        .route("/leave/applications", post(apply_leave_handler))
        .route("/leave/applications/:id/approve", post(approve_leave_handler))
        .route("/leave/applications/:id/reject", post(reject_leave_handler))
        .route(
            "/leave/balances/:employee_id/:leave_type/:year",
            get(leave_balance_handler),
        )
        .route(
            "/leave/balances/:employee_id/:leave_type/:year/roll-over",
            post(roll_over_handler),
        )
        .route("/payroll/calculate", post(calculate_payroll_handler))
        .route("/payroll/batch", post(payroll_batch_handler))
        .route("/policies", put(replace_policy_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn respond<T: Serialize>(correlation_id: Uuid, status: StatusCode, result: EngineResult<T>) -> Response {
    match result {
        Ok(body) => json_response(status, body),
        Err(err) => error_response(correlation_id, err),
    }
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

macro_rules! json_body {
    ($payload:expr, $correlation_id:expr) => {
        match $payload {
            Ok(Json(body)) => body,
            Err(rejection) => return rejection_response($correlation_id, rejection),
        }
    };
}

/// Handler for POST /attendance/clock-in.
async fn clock_in_handler(
    State(state): State<AppState>,
    payload: Result<Json<AttendanceClockEvent>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let event = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        employee_id = %event.employee_id,
        "Processing clock-in"
    );
    respond(correlation_id, StatusCode::OK, state.attendance().clock_in(&event))
}

/// Handler for POST /attendance/clock-out.
async fn clock_out_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClockOutRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        "Processing clock-out"
    );
    let result = state.attendance().clock_out(
        &request.employee_id,
        request.timestamp,
        request.notice_given,
    );
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for GET /attendance/:employee_id/streak.
async fn streak_handler(State(state): State<AppState>, Path(employee_id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    respond(correlation_id, StatusCode::OK, state.attendance().streak(&employee_id))
}

/// Handler for POST /tasks.
async fn start_task_handler(
    State(state): State<AppState>,
    payload: Result<Json<TaskStartEvent>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let event = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        task_id = %event.task_id,
        "Processing task start"
    );
    respond(correlation_id, StatusCode::CREATED, state.tasks().start_task(&event))
}

/// Handler for POST /tasks/complete.
async fn complete_task_handler(
    State(state): State<AppState>,
    payload: Result<Json<TaskCompletionEvent>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let event = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        task_id = %event.task_id,
        "Processing task completion"
    );
    respond(correlation_id, StatusCode::OK, state.tasks().complete_task(&event))
}

/// Handler for GET /projects/:project_id/summary.
async fn project_summary_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    respond(
        correlation_id,
        StatusCode::OK,
        state.tasks().project_summary(&project_id, as_of),
    )
}

/// Handler for GET /projects/summary.
async fn project_summaries_handler(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    respond(correlation_id, StatusCode::OK, state.tasks().project_summaries(as_of))
}

/// Handler for POST /leave/applications.
///
/// Returns 200 with the validation result even when the request breaks a
/// leave rule; only structural problems produce an error status.
async fn apply_leave_handler(
    State(state): State<AppState>,
    payload: Result<Json<LeaveApplicationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee_id,
        leave_type = %request.leave_type,
        "Processing leave application"
    );
    respond(correlation_id, StatusCode::OK, state.leave().apply(request))
}

/// Handler for POST /leave/applications/:id/approve.
async fn approve_leave_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, id = %id, "Approving leave");
    respond(correlation_id, StatusCode::OK, state.leave().approve(&id))
}

/// Handler for POST /leave/applications/:id/reject.
async fn reject_leave_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, id = %id, "Rejecting leave");
    respond(correlation_id, StatusCode::OK, state.leave().reject(&id))
}

/// Handler for GET /leave/balances/:employee_id/:leave_type/:year.
async fn leave_balance_handler(
    State(state): State<AppState>,
    Path((employee_id, leave_type, year)): Path<(String, String, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().balance(&employee_id, &leave_type, year),
    )
}

/// Handler for POST /leave/balances/:employee_id/:leave_type/:year/roll-over.
async fn roll_over_handler(
    State(state): State<AppState>,
    Path((employee_id, leave_type, year)): Path<(String, String, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        employee_id = %employee_id,
        leave_type = %leave_type,
        year,
        "Rolling over leave balance"
    );
    respond(
        correlation_id,
        StatusCode::OK,
        state.leave().roll_over_year(&employee_id, &leave_type, year),
    )
}

/// Handler for POST /payroll/calculate.
async fn calculate_payroll_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);
    info!(
        correlation_id = %correlation_id,
        employee_id = %request.profile.employee_id,
        period = %request.period.key(),
        "Processing payroll request"
    );

    let start_time = Instant::now();
    let result = state
        .payroll()
        .calculate(&request.profile, &request.period, request.reward_points);
    if let Ok(record) = &result {
        info!(
            correlation_id = %correlation_id,
            employee_id = %record.employee_id,
            net_salary = %record.net_salary,
            duration_us = start_time.elapsed().as_micros(),
            "Payroll completed successfully"
        );
    }
    respond(correlation_id, StatusCode::OK, result)
}

/// Handler for POST /payroll/batch.
///
/// Always 200: each employee's failure is reported in its own result.
async fn payroll_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayrollBatchRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = json_body!(payload, correlation_id);

    let start_time = Instant::now();
    let results = state.payroll().run_batch(&request.period, &request.employees);
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let response = PayrollBatchResponse {
        succeeded: results.len() - failed,
        failed,
        results,
    };
    info!(
        correlation_id = %correlation_id,
        period = %request.period.key(),
        succeeded = response.succeeded,
        failed = response.failed,
        duration_us = start_time.elapsed().as_micros(),
        "Payroll batch completed"
    );
    json_response(StatusCode::OK, response)
}

/// Handler for PUT /policies.
async fn replace_policy_handler(
    State(state): State<AppState>,
    payload: Result<Json<PolicyDocument>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let document = json_body!(payload, correlation_id);
    let domain = document.domain();
    info!(correlation_id = %correlation_id, domain, "Replacing policy document");

    let result = state
        .policies()
        .replace(document)
        .map(|version| PolicyVersionResponse {
            domain: domain.to_string(),
            version,
        });
    respond(correlation_id, StatusCode::OK, result)
}
