//! Task turnaround-time evaluation.
//!
//! Completing a task freezes its efficiency and quality and derives the
//! reward grants. Three independent multipliers (efficiency tier, quality
//! tier, approval state) are resolved and multiplied together; each reward
//! type's count is `floor(base_count * combined multiplier)`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::config::RewardPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, RewardGrant, RewardMultipliers, TaskCompletion, TaskCompletionEvent, TaskStatus,
    TatRecord,
};

use super::resolve_bracket;

/// Highest reviewer rating.
pub const MAX_QUALITY_RATING: u8 = 5;

/// Efficiency percentage of a task: `planned / actual * 100`, rounded half
/// away from zero to a whole percent.
///
/// Zero (or negative) actual hours yield 0 rather than a division error.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if the ratio does not fit in a
/// `Decimal`, which happens for vanishingly small actual hours.
///
/// # Examples
///
/// ```
/// use workforce_engine::calculation::calculate_efficiency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(calculate_efficiency(Decimal::from(8), Decimal::from(6)).unwrap(), Decimal::from(133));
/// assert_eq!(calculate_efficiency(Decimal::from(4), Decimal::from(6)).unwrap(), Decimal::from(67));
/// assert_eq!(calculate_efficiency(Decimal::from(5), Decimal::ZERO).unwrap(), Decimal::ZERO);
/// ```
pub fn calculate_efficiency(planned_hours: Decimal, actual_hours: Decimal) -> EngineResult<Decimal> {
    if actual_hours <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    planned_hours
        .checked_div(actual_hours)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|efficiency| efficiency.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "efficiency of {} planned over {} actual hours overflows",
                planned_hours, actual_hours
            ),
        })
}

/// Completes an in-progress task and derives its reward grants.
///
/// The completion event carries the authoritative planned and actual hours.
/// An unrated task resolves the lowest quality tier. Reward types whose final
/// count floors to zero are not granted.
///
/// # Errors
///
/// - [`EngineError::TaskAlreadyCompleted`] if the record is already completed.
/// - [`EngineError::InvalidRecord`] for negative hours or a rating outside 1-5.
/// - [`EngineError::PolicyNotFound`] if a multiplier table is malformed.
/// - [`EngineError::CalculationError`] if the efficiency overflows.
pub fn complete_task(
    record: &TatRecord,
    event: &TaskCompletionEvent,
    policy: &RewardPolicy,
) -> EngineResult<TaskCompletion> {
    if record.is_completed() {
        return Err(EngineError::TaskAlreadyCompleted {
            task_id: record.task_id.clone(),
        });
    }
    if event.planned_hours < Decimal::ZERO || event.actual_hours < Decimal::ZERO {
        return Err(EngineError::InvalidRecord {
            field: "hours".to_string(),
            message: "planned and actual hours must not be negative".to_string(),
        });
    }
    if let Some(rating) = event.quality_rating {
        if !(1..=MAX_QUALITY_RATING).contains(&rating) {
            return Err(EngineError::InvalidRecord {
                field: "quality_rating".to_string(),
                message: format!("rating {} is outside 1-{}", rating, MAX_QUALITY_RATING),
            });
        }
    }

    let efficiency = calculate_efficiency(event.planned_hours, event.actual_hours)?;
    let mut audit_steps = Vec::with_capacity(4);

    let efficiency_tier = resolve_bracket(
        efficiency,
        &policy.efficiency_multipliers,
        "reward.efficiency_multipliers",
    )?;
    audit_steps.push(AuditStep {
        step_number: 1,
        rule_id: "efficiency_multiplier".to_string(),
        rule_name: "Efficiency Multiplier".to_string(),
        policy_ref: "reward.efficiency_multipliers".to_string(),
        input: serde_json::json!({
            "planned_hours": event.planned_hours.normalize().to_string(),
            "actual_hours": event.actual_hours.normalize().to_string(),
        }),
        output: serde_json::json!({
            "efficiency": efficiency.to_string(),
            "tier": efficiency_tier.effect.label,
            "multiplier": efficiency_tier.effect.multiplier.normalize().to_string(),
        }),
        reasoning: format!(
            "Efficiency {}% falls in the '{}' tier",
            efficiency, efficiency_tier.effect.label
        ),
    });

    let rating_value = Decimal::from(event.quality_rating.unwrap_or(0));
    let quality_tier = resolve_bracket(
        rating_value,
        &policy.quality_multipliers,
        "reward.quality_multipliers",
    )?;
    audit_steps.push(AuditStep {
        step_number: 2,
        rule_id: "quality_multiplier".to_string(),
        rule_name: "Quality Multiplier".to_string(),
        policy_ref: "reward.quality_multipliers".to_string(),
        input: serde_json::json!({ "quality_rating": event.quality_rating }),
        output: serde_json::json!({
            "tier": quality_tier.effect.label,
            "multiplier": quality_tier.effect.multiplier.normalize().to_string(),
        }),
        reasoning: match event.quality_rating {
            Some(rating) => format!(
                "Rating {} falls in the '{}' tier",
                rating, quality_tier.effect.label
            ),
            None => format!(
                "Unrated task uses the lowest tier '{}'",
                quality_tier.effect.label
            ),
        },
    });

    let approval = policy.approval_multipliers.for_state(event.approval_state);
    audit_steps.push(AuditStep {
        step_number: 3,
        rule_id: "approval_multiplier".to_string(),
        rule_name: "Approval Multiplier".to_string(),
        policy_ref: "reward.approval_multipliers".to_string(),
        input: serde_json::json!({ "approval_state": event.approval_state }),
        output: serde_json::json!({ "multiplier": approval.normalize().to_string() }),
        reasoning: format!(
            "Approval state {:?} multiplies by {}",
            event.approval_state,
            approval.normalize()
        ),
    });

    let multipliers = RewardMultipliers {
        efficiency_tier: efficiency_tier.effect.label.clone(),
        efficiency: efficiency_tier.effect.multiplier,
        quality_tier: quality_tier.effect.label.clone(),
        quality: quality_tier.effect.multiplier,
        approval,
    };
    let combined = multipliers.combined();

    let mut rewards = Vec::new();
    for reward_type in &policy.reward_types {
        let scaled = (Decimal::from(reward_type.base_count) * combined).floor();
        let count = scaled.to_u32().ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "reward count {} for '{}' is out of range",
                scaled, reward_type.name
            ),
        })?;
        if count == 0 {
            continue;
        }
        rewards.push(RewardGrant {
            reward_type: reward_type.name.clone(),
            unit_value: reward_type.unit_value,
            count,
            timestamp: event.completed_at,
        });
    }
    let total_value: Decimal = rewards.iter().map(RewardGrant::value).sum();

    audit_steps.push(AuditStep {
        step_number: 4,
        rule_id: "reward_counts".to_string(),
        rule_name: "Reward Counts".to_string(),
        policy_ref: "reward.reward_types".to_string(),
        input: serde_json::json!({ "combined_multiplier": combined.normalize().to_string() }),
        output: serde_json::json!({
            "rewards": rewards
                .iter()
                .map(|r| serde_json::json!({ "type": r.reward_type, "count": r.count }))
                .collect::<Vec<_>>(),
            "total_value": total_value.normalize().to_string(),
        }),
        reasoning: format!(
            "{} x {} x {} = {}; each count is floor(base_count x {})",
            multipliers.efficiency.normalize(),
            multipliers.quality.normalize(),
            multipliers.approval.normalize(),
            combined.normalize(),
            combined.normalize()
        ),
    });

    let completed_on = event.completed_at.date();
    let mut finalized = record.clone();
    finalized.planned_hours = event.planned_hours;
    finalized.actual_hours = event.actual_hours;
    finalized.actual_end_date = Some(completed_on);
    finalized.efficiency = efficiency;
    finalized.quality_rating = event.quality_rating;
    finalized.approval_state = event.approval_state;
    finalized.status = TaskStatus::Completed;
    finalized.date_variance = (completed_on - record.planned_end_date).num_days();

    debug!(
        task_id = %finalized.task_id,
        efficiency = %efficiency,
        combined_multiplier = %combined,
        total_value = %total_value,
        "Evaluated task completion"
    );

    Ok(TaskCompletion {
        record: finalized,
        multipliers,
        rewards,
        total_value,
        audit_steps,
    })
}
