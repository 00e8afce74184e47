//! Leave validation and pay impact.
//!
//! Validation never fails for business-rule violations: they come back as
//! [`ValidationIssue`]s so callers can show every problem at once. Only an
//! unknown leave type (a structural problem) is an error.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::LeavePolicy;
use crate::error::EngineResult;
use crate::models::{
    LeaveApplicationRequest, LeaveBalance, LeaveValidationResult, PayImpact, PayType,
    ValidationIssue,
};

use super::resolve_bracket;

/// Validates a leave request.
///
/// Checks, in order: the leave type exists, the date range is not inverted,
/// advance notice (short notice only warns), the remaining balance, the
/// consecutive-day limit and blackout windows. Balance is checked only for
/// leave types with an annual entitlement; `None` for such a type is treated
/// as an empty balance.
///
/// # Errors
///
/// Returns [`EngineError::UnknownLeaveType`](crate::error::EngineError::UnknownLeaveType)
/// if the type is not in the policy, or
/// [`EngineError::PolicyNotFound`](crate::error::EngineError::PolicyNotFound)
/// if the notice-deficit table is malformed.
pub fn validate_leave(
    request: &LeaveApplicationRequest,
    balance: Option<&LeaveBalance>,
    policy: &LeavePolicy,
) -> EngineResult<LeaveValidationResult> {
    let rules = policy.leave_type(&request.leave_type)?;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if request.has_inverted_range() {
        errors.push(ValidationIssue::new(
            "invalid_date_range",
            format!(
                "End date {} is before start date {}",
                request.end_date, request.start_date
            ),
        ));
    }

    let days = request.days();
    let advance = request.advance_notice_days();
    let required = i64::from(rules.advance_notice_days);
    if advance < required {
        if policy.is_emergency(&request.reason) {
            warnings.push(ValidationIssue::new(
                "emergency_short_notice",
                format!(
                    "{} days notice given, {} required; accepted as an emergency",
                    advance, required
                ),
            ));
        } else {
            let impact = calculate_pay_impact(
                &request.leave_type,
                days,
                advance,
                &request.reason,
                policy,
            )?;
            warnings.push(ValidationIssue::new(
                "insufficient_notice",
                format!(
                    "{} days notice given, {} required: {}",
                    advance, required, impact.message
                ),
            ));
        }
    }

    if rules.annual_entitlement.is_some() {
        let remaining = balance.map(|b| b.remaining).unwrap_or(Decimal::ZERO);
        if remaining < days {
            errors.push(ValidationIssue::new(
                "insufficient_balance",
                format!(
                    "Insufficient '{}' balance: requested {} days, {} remaining",
                    request.leave_type, days, remaining
                ),
            ));
        }
    }

    if days > Decimal::from(rules.max_consecutive_days) {
        errors.push(ValidationIssue::new(
            "max_consecutive_days",
            format!(
                "{} days exceeds the {}-day limit for '{}'",
                days, rules.max_consecutive_days, request.leave_type
            ),
        ));
    }

    if rules.blackout_applies {
        for period in policy
            .blackout_periods
            .iter()
            .filter(|p| p.overlaps(request.start_date, request.end_date))
        {
            errors.push(ValidationIssue::new(
                "blackout_period",
                format!(
                    "Requested dates overlap the '{}' blackout ({} to {})",
                    period.name, period.start_date, period.end_date
                ),
            ));
        }
    }

    debug!(
        employee_id = %request.employee_id,
        leave_type = %request.leave_type,
        errors = errors.len(),
        warnings = warnings.len(),
        "Validated leave request"
    );

    Ok(LeaveValidationResult {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    })
}

/// Calculates the pay impact of a leave.
///
/// - Unpaid leave deducts `days` outright.
/// - Paid leave with at least the required notice is full pay.
/// - Paid leave with short notice resolves a ratio from the percentage of the
///   required notice that was given and deducts `days * ratio - days`.
///   Same-day leave without an emergency reason also pays the fixed penalty.
///
/// # Errors
///
/// Returns [`EngineError::UnknownLeaveType`](crate::error::EngineError::UnknownLeaveType)
/// or [`EngineError::PolicyNotFound`](crate::error::EngineError::PolicyNotFound).
///
/// # Examples
///
/// ```no_run
/// use workforce_engine::calculation::calculate_pay_impact;
/// use workforce_engine::config::PolicyLoader;
/// use workforce_engine::models::PayType;
/// use rust_decimal::Decimal;
///
/// let policies = PolicyLoader::load("config/policies").unwrap();
/// let leave = &policies.snapshot().leave;
///
/// let impact = calculate_pay_impact("annual_leave", Decimal::from(2), 10, "Vacation", leave).unwrap();
/// assert_eq!(impact.pay_type, PayType::FullPay);
///
/// // 2 of 7 days notice is 28.6% of the requirement: ratio 1.75
/// let impact = calculate_pay_impact("annual_leave", Decimal::from(2), 2, "Vacation", leave).unwrap();
/// assert_eq!(impact.deduction, Decimal::new(15, 1));
/// ```
pub fn calculate_pay_impact(
    leave_type: &str,
    days: Decimal,
    advance_notice_days: i64,
    reason: &str,
    policy: &LeavePolicy,
) -> EngineResult<PayImpact> {
    let rules = policy.leave_type(leave_type)?;

    if !rules.paid {
        return Ok(PayImpact {
            pay_type: PayType::Unpaid,
            deduction: days,
            penalty: Decimal::ZERO,
            penalty_applied: false,
            message: format!("Unpaid leave: {} days deducted", days),
        });
    }

    let required = i64::from(rules.advance_notice_days);
    let advance = advance_notice_days.max(0);
    if advance >= required {
        return Ok(PayImpact::full_pay());
    }

    let notice_percentage =
        Decimal::from(advance) * Decimal::ONE_HUNDRED / Decimal::from(required);
    let tier = resolve_bracket(
        notice_percentage,
        &policy.notice_deficit_ratios,
        "leave.notice_deficit_ratios",
    )?;
    let ratio = tier.effect.ratio;
    let deduction = (days * ratio - days).max(Decimal::ZERO);

    let penalty_applied = advance == 0 && !policy.is_emergency(reason);
    let penalty = if penalty_applied {
        policy.same_day_penalty
    } else {
        Decimal::ZERO
    };

    let pay_type = if deduction > Decimal::ZERO || penalty_applied {
        PayType::SalaryDeduction
    } else {
        PayType::FullPay
    };

    let mut message = format!(
        "Short notice ({} of {} days): pay ratio {}, {} days deducted",
        advance,
        required,
        ratio.normalize(),
        deduction.normalize()
    );
    if penalty_applied {
        message.push_str(&format!(", same-day penalty {}", penalty.normalize()));
    }

    Ok(PayImpact {
        pay_type,
        deduction,
        penalty,
        penalty_applied,
        message,
    })
}
