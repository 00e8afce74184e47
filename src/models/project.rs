//! Project roll-up models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delivery health of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// High efficiency and near-perfect on-time delivery.
    Excellent,
    /// Healthy.
    OnTrack,
    /// Efficiency or delivery slipping.
    NeedsAttention,
    /// Overdue work or poor delivery.
    AtRisk,
}

/// Letter grade of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectGrade {
    /// Score of 90 and above.
    A,
    /// Score of 80 and above.
    B,
    /// Score of 70 and above.
    C,
    /// Score of 60 and above.
    D,
    /// Anything lower.
    F,
}

/// Aggregated TAT figures for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// The project.
    pub project_id: String,
    /// All tasks seen for the project.
    pub total_tasks: u32,
    /// Completed tasks.
    pub completed_tasks: u32,
    /// Open tasks past their planned end date.
    pub overdue_tasks: u32,
    /// Completed tasks delivered late.
    pub late_deliveries: u32,
    /// Mean efficiency of completed tasks (two decimals).
    pub average_efficiency: Decimal,
    /// Mean quality rating of rated completed tasks (two decimals).
    pub average_quality: Decimal,
    /// Percentage of completed tasks delivered on time (two decimals).
    pub on_time_delivery_rate: Decimal,
    /// Delivery health.
    pub status: ProjectStatus,
    /// Letter grade.
    pub grade: ProjectGrade,
}
