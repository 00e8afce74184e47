//! Calculation logic for the workforce engine.
//!
//! Every evaluator here is a pure function over an immutable policy document
//! and explicit input records: bracket resolution, clock-in and clock-out
//! evaluation, streak tracking, task turnaround time and rewards, leave
//! validation and pay impact, period payroll aggregation and project roll-up.

mod attendance;
mod bracket;
mod leave;
mod payroll;
mod project;
mod streak;
mod tat;

pub use attendance::{evaluate_clock_in, evaluate_clock_out};
pub use bracket::{resolve_bracket, validate_tiers};
pub use leave::{calculate_pay_impact, validate_leave};
pub use payroll::{MAX_SALARY_AMOUNT, PayrollInputs, calculate_payroll, round_money};
pub use project::{classify_project, grade_for, project_score, roll_up_all, roll_up_project};
pub use streak::{StreakTracker, StreakUpdate};
pub use tat::{MAX_QUALITY_RATING, calculate_efficiency, complete_task};
