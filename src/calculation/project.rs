//! Project roll-up of TAT records.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::RewardPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{ProjectGrade, ProjectStatus, ProjectSummary, TatRecord};

use super::payroll::mean;
use super::resolve_bracket;

/// Classifies project health. The first matching rule wins:
///
/// 1. `at_risk` if any task is overdue or on-time delivery is below 80%
/// 2. `needs_attention` if efficiency is below 80% or on-time delivery below 90%
/// 3. `excellent` if efficiency is above 110% and on-time delivery above 95%
/// 4. `on_track` otherwise
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::classify_project;
/// use workforce_engine::models::ProjectStatus;
/// use rust_decimal::Decimal;
///
/// assert_eq!(
///     classify_project(Decimal::from(115), Decimal::from(100), 0),
///     ProjectStatus::Excellent
/// );
/// assert_eq!(
///     classify_project(Decimal::from(70), Decimal::from(85), 0),
///     ProjectStatus::NeedsAttention
/// );
/// ```
pub fn classify_project(
    average_efficiency: Decimal,
    on_time_rate: Decimal,
    overdue_tasks: u32,
) -> ProjectStatus {
    if overdue_tasks > 0 || on_time_rate < Decimal::from(80) {
        ProjectStatus::AtRisk
    } else if average_efficiency < Decimal::from(80) || on_time_rate < Decimal::from(90) {
        ProjectStatus::NeedsAttention
    } else if average_efficiency > Decimal::from(110) && on_time_rate > Decimal::from(95) {
        ProjectStatus::Excellent
    } else {
        ProjectStatus::OnTrack
    }
}

/// `(efficiency + on_time_rate + quality * 20) / 3`, to two decimals.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the sum overflows.
pub fn project_score(
    average_efficiency: Decimal,
    on_time_rate: Decimal,
    average_quality: Decimal,
) -> EngineResult<Decimal> {
    average_quality
        .checked_mul(Decimal::from(20))
        .and_then(|quality| quality.checked_add(on_time_rate))
        .and_then(|sum| sum.checked_add(average_efficiency))
        .map(|sum| (sum / Decimal::from(3)).round_dp(2))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("project score of efficiency {} overflows", average_efficiency),
        })
}

/// Resolves the letter grade of a project score.
pub fn grade_for(score: Decimal, policy: &RewardPolicy) -> EngineResult<ProjectGrade> {
    let tier = resolve_bracket(score, &policy.project_grades, "reward.project_grades")?;
    Ok(tier.effect.grade)
}

/// Summarises the records of one project as of a date.
///
/// Averages use completed records only. The on-time delivery rate is the
/// share of completed tasks not delivered late (100 with nothing completed);
/// open tasks whose planned end date is before `as_of` are overdue.
pub fn roll_up_project(
    project_id: &str,
    records: &[TatRecord],
    as_of: NaiveDate,
    policy: &RewardPolicy,
) -> EngineResult<ProjectSummary> {
    let records: Vec<&TatRecord> = records
        .iter()
        .filter(|r| r.project_id == project_id)
        .collect();
    let completed: Vec<&TatRecord> = records.iter().copied().filter(|r| r.is_completed()).collect();

    let completed_tasks = completed.len() as u32;
    let late_deliveries = completed.iter().filter(|r| r.delivered_late()).count() as u32;
    let overdue_tasks = records.iter().filter(|r| r.is_overdue(as_of)).count() as u32;

    let average_efficiency = mean(completed.iter().map(|r| r.efficiency))?;
    let average_quality = mean(
        completed
            .iter()
            .filter_map(|r| r.quality_rating.map(Decimal::from)),
    )?;
    let on_time_delivery_rate = if completed_tasks == 0 {
        Decimal::ONE_HUNDRED
    } else {
        (Decimal::from(completed_tasks - late_deliveries) * Decimal::ONE_HUNDRED
            / Decimal::from(completed_tasks))
        .round_dp(2)
    };

    let status = classify_project(average_efficiency, on_time_delivery_rate, overdue_tasks);
    let score = project_score(average_efficiency, on_time_delivery_rate, average_quality)?;
    let grade = grade_for(score, policy)?;

    Ok(ProjectSummary {
        project_id: project_id.to_string(),
        total_tasks: records.len() as u32,
        completed_tasks,
        overdue_tasks,
        late_deliveries,
        average_efficiency,
        average_quality,
        on_time_delivery_rate,
        status,
        grade,
    })
}

/// Summarises every project in `records`, ordered by project id.
pub fn roll_up_all(
    records: &[TatRecord],
    as_of: NaiveDate,
    policy: &RewardPolicy,
) -> EngineResult<Vec<ProjectSummary>> {
    let project_ids: BTreeSet<&str> = records.iter().map(|r| r.project_id.as_str()).collect();

    project_ids
        .into_iter()
        .map(|project_id| roll_up_project(project_id, records, as_of, policy))
        .collect()
}
