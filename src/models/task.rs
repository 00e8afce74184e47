//! Task turnaround-time (TAT) models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AuditStep;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Started, not yet completed.
    InProgress,
    /// Completed; efficiency and quality are frozen.
    Completed,
}

/// Review outcome of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    /// Awaiting review.
    #[default]
    Pending,
    /// Accepted by the reviewer.
    Approved,
    /// Rejected by the reviewer.
    Rejected,
}

/// Event emitted when work on a task starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStartEvent {
    /// The task.
    pub task_id: String,
    /// The assignee.
    pub employee_id: String,
    /// The owning project.
    pub project_id: String,
    /// Estimated effort in hours.
    pub planned_hours: Decimal,
    /// Date the task is due.
    pub planned_end_date: NaiveDate,
}

/// Event emitted when a task is completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletionEvent {
    /// The task.
    pub task_id: String,
    /// The assignee.
    pub employee_id: String,
    /// Effort estimate at completion (may revise the estimate given at start).
    pub planned_hours: Decimal,
    /// Effort actually spent.
    pub actual_hours: Decimal,
    /// Reviewer rating from 1 to 5.
    #[serde(default)]
    pub quality_rating: Option<u8>,
    /// Review outcome.
    #[serde(default)]
    pub approval_state: ApprovalState,
    /// When the task was completed.
    pub completed_at: NaiveDateTime,
}

/// Turnaround-time record for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TatRecord {
    /// The task.
    pub task_id: String,
    /// The assignee.
    pub employee_id: String,
    /// The owning project.
    pub project_id: String,
    /// Estimated effort in hours.
    pub planned_hours: Decimal,
    /// Effort actually spent (zero until completion).
    pub actual_hours: Decimal,
    /// Date the task is due.
    pub planned_end_date: NaiveDate,
    /// Date the task was completed.
    pub actual_end_date: Option<NaiveDate>,
    /// Planned over actual hours as a whole percentage.
    pub efficiency: Decimal,
    /// Reviewer rating from 1 to 5.
    pub quality_rating: Option<u8>,
    /// Review outcome.
    pub approval_state: ApprovalState,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Days between planned and actual end date; positive means late.
    pub date_variance: i64,
}

impl TatRecord {
    /// Creates an in-progress record from a start event.
    pub fn start(event: &TaskStartEvent) -> Self {
        Self {
            task_id: event.task_id.clone(),
            employee_id: event.employee_id.clone(),
            project_id: event.project_id.clone(),
            planned_hours: event.planned_hours,
            actual_hours: Decimal::ZERO,
            planned_end_date: event.planned_end_date,
            actual_end_date: None,
            efficiency: Decimal::ZERO,
            quality_rating: None,
            approval_state: ApprovalState::Pending,
            status: TaskStatus::InProgress,
            date_variance: 0,
        }
    }

    /// Returns true once the task is completed.
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Returns true if the task was completed after its planned end date.
    pub fn delivered_late(&self) -> bool {
        self.is_completed() && self.date_variance > 0
    }

    /// Returns true if the task is still open and past its planned end date.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        !self.is_completed() && self.planned_end_date < as_of
    }
}

/// A reward issued for a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// Reward type name (e.g. "star").
    #[serde(rename = "type")]
    pub reward_type: String,
    /// Currency value of one unit.
    pub unit_value: Decimal,
    /// Number of units granted.
    pub count: u32,
    /// When the reward was earned.
    pub timestamp: NaiveDateTime,
}

impl RewardGrant {
    /// Returns `count * unit_value`.
    pub fn value(&self) -> Decimal {
        Decimal::from(self.count) * self.unit_value
    }
}

/// The multipliers applied to a completed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardMultipliers {
    /// Label of the efficiency tier (e.g. "excellent").
    pub efficiency_tier: String,
    /// Efficiency multiplier.
    pub efficiency: Decimal,
    /// Label of the quality tier.
    pub quality_tier: String,
    /// Quality multiplier.
    pub quality: Decimal,
    /// Approval multiplier.
    pub approval: Decimal,
}

impl RewardMultipliers {
    /// The multiplicative composition of all three multipliers.
    pub fn combined(&self) -> Decimal {
        self.efficiency * self.quality * self.approval
    }
}

/// The result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    /// The finalized record.
    pub record: TatRecord,
    /// Multipliers used for the reward counts.
    pub multipliers: RewardMultipliers,
    /// Non-empty reward grants.
    pub rewards: Vec<RewardGrant>,
    /// Sum of all grant values.
    pub total_value: Decimal,
    /// Audit trail of the multiplier resolutions.
    pub audit_steps: Vec<AuditStep>,
}
