//! Clock-in and clock-out evaluation.
//!
//! Both evaluators are pure: they read one attendance policy and the event
//! and return the derived effect. Persisting the open record and enforcing one
//! session per employee and day is left to the attendance service.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::AttendancePolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceClockEvent, AttendanceRecord, AttendanceStatus, ClockInResult};

use super::resolve_bracket;

/// Evaluates a clock-in against the attendance policy.
///
/// An arrival at or before `early_bonus_before` earns the early-arrival bonus.
/// An arrival after the on-time threshold (start time plus grace period) is
/// late, and the lateness tier is resolved from the minutes past the
/// threshold. Anything in between is on time with no effect.
///
/// # Errors
///
/// Returns [`EngineError::PolicyNotFound`] if the lateness table is malformed.
///
/// # Examples
///
/// ```no_run
/// use workforce_engine::calculation::evaluate_clock_in;
/// use workforce_engine::config::PolicyLoader;
/// use workforce_engine::models::{AttendanceClockEvent, ClockMethod};
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let policies = PolicyLoader::load("config/policies").unwrap();
/// let event = AttendanceClockEvent {
///     employee_id: "emp_001".to_string(),
///     timestamp: NaiveDateTime::parse_from_str("2025-03-03 09:20:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     location: None,
///     method: ClockMethod::Biometric,
/// };
///
/// let result = evaluate_clock_in(&event, &policies.snapshot().attendance).unwrap();
/// // 20 minutes past the 09:15 threshold falls in the 15-30 minute tier
/// assert!(result.is_late);
/// assert_eq!(result.late_by, 20);
/// assert_eq!(result.penalty, Decimal::from(200));
/// ```
pub fn evaluate_clock_in(
    event: &AttendanceClockEvent,
    policy: &AttendancePolicy,
) -> EngineResult<ClockInResult> {
    let hours = &policy.work_hours;
    let arrival = event.timestamp.time();
    let threshold = hours.on_time_threshold();
    let late_by = (arrival - threshold).num_minutes().max(0);

    let result = if arrival <= hours.early_bonus_before {
        ClockInResult {
            is_late: false,
            late_by: 0,
            penalty: Decimal::ZERO,
            bonus: policy.early_arrival.bonus,
            points: policy.early_arrival.points,
            milestone: None,
        }
    } else if arrival > threshold {
        let tier = resolve_bracket(
            Decimal::from(late_by),
            &policy.late_arrival,
            "attendance.late_arrival",
        )?;
        ClockInResult {
            is_late: true,
            late_by,
            penalty: tier.effect.penalty,
            bonus: Decimal::ZERO,
            points: tier.effect.points,
            milestone: None,
        }
    } else {
        ClockInResult {
            is_late: false,
            late_by: 0,
            penalty: Decimal::ZERO,
            bonus: Decimal::ZERO,
            points: 0,
            milestone: None,
        }
    };

    debug!(
        employee_id = %event.employee_id,
        arrival = %arrival,
        is_late = result.is_late,
        late_by = result.late_by,
        "Evaluated clock-in"
    );

    Ok(result)
}

/// Closes an open attendance record.
///
/// Worked hours are measured from the clock-in; time beyond
/// `minimum_hours` is overtime. Leaving before the standard end time on the
/// same day is an early leave, penalised from the `without_notice` table
/// unless the policy honours notice and `notice_given` is set. The early-leave
/// effect is added to the arrival effect already on the record.
///
/// # Errors
///
/// - [`EngineError::NoActiveSession`] if the record is already closed.
/// - [`EngineError::InvalidRecord`] if `clock_out` precedes the clock-in.
/// - [`EngineError::PolicyNotFound`] if the early-leave table is malformed.
pub fn evaluate_clock_out(
    record: &AttendanceRecord,
    clock_out: NaiveDateTime,
    notice_given: bool,
    policy: &AttendancePolicy,
) -> EngineResult<AttendanceRecord> {
    if !record.is_open() {
        return Err(EngineError::NoActiveSession {
            employee_id: record.employee_id.clone(),
            date: record.date,
        });
    }
    if clock_out < record.clock_in {
        return Err(EngineError::InvalidRecord {
            field: "timestamp".to_string(),
            message: format!(
                "clock-out {} is before clock-in {}",
                clock_out, record.clock_in
            ),
        });
    }

    let hours = &policy.work_hours;
    let worked_minutes = (clock_out - record.clock_in).num_minutes();
    let worked = Decimal::from(worked_minutes) / Decimal::from(60);
    let overtime = (worked - hours.minimum_hours).max(Decimal::ZERO);

    // Sessions that run past midnight never count as early leaves.
    let early_leave_by = if clock_out.date() == record.date {
        (hours.end_time - clock_out.time()).num_minutes().max(0)
    } else {
        0
    };

    let mut closed = record.clone();
    closed.clock_out = Some(clock_out);
    closed.worked_hours = worked.round_dp(2);
    closed.overtime_hours = overtime.round_dp(2);
    closed.is_early_leave = early_leave_by > 0;
    closed.early_leave_by = early_leave_by;

    if closed.is_early_leave {
        let (table, table_name) = if policy.early_leave.honour_notice && notice_given {
            (
                &policy.early_leave.with_notice,
                "attendance.early_leave.with_notice",
            )
        } else {
            (
                &policy.early_leave.without_notice,
                "attendance.early_leave.without_notice",
            )
        };
        let tier = resolve_bracket(Decimal::from(early_leave_by), table, table_name)?;
        closed.penalty += tier.effect.penalty;
        closed.points += tier.effect.points;
    }

    closed.status = if worked < hours.half_day_hours {
        AttendanceStatus::HalfDay
    } else if closed.is_late {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };

    debug!(
        employee_id = %closed.employee_id,
        date = %closed.date,
        worked_hours = %closed.worked_hours,
        overtime_hours = %closed.overtime_hours,
        early_leave_by = closed.early_leave_by,
        "Evaluated clock-out"
    );

    Ok(closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockMethod;
    use crate::test_support::{datetime, dec, policies};
    use proptest::prelude::*;

    fn event(ts: &str) -> AttendanceClockEvent {
        AttendanceClockEvent {
            employee_id: "emp_001".to_string(),
            timestamp: datetime(ts),
            location: Some("HQ".to_string()),
            method: ClockMethod::Card,
        }
    }

    fn open_record(ts: &str) -> AttendanceRecord {
        let policy = policies().attendance;
        let event = event(ts);
        let effect = evaluate_clock_in(&event, &policy).unwrap();
        AttendanceRecord::open(&event, &effect)
    }

    #[test]
    fn test_early_arrival_earns_bonus() {
        let policy = policies().attendance;
        let result = evaluate_clock_in(&event("2025-03-03 08:40:00"), &policy).unwrap();

        assert!(!result.is_late);
        assert_eq!(result.late_by, 0);
        assert_eq!(result.bonus, dec("50"));
        assert_eq!(result.penalty, Decimal::ZERO);
        assert_eq!(result.points, 10);
    }

    #[test]
    fn test_early_bonus_threshold_is_inclusive() {
        let policy = policies().attendance;
        let result = evaluate_clock_in(&event("2025-03-03 08:45:00"), &policy).unwrap();
        assert_eq!(result.bonus, dec("50"));
    }

    #[test]
    fn test_twenty_minutes_late_hits_second_tier() {
        let policy = policies().attendance;
        let result = evaluate_clock_in(&event("2025-03-03 09:20:00"), &policy).unwrap();

        assert!(result.is_late);
        assert_eq!(result.late_by, 20);
        assert_eq!(result.penalty, dec("200"));
        assert_eq!(result.bonus, Decimal::ZERO);
        assert_eq!(result.points, -10);
    }

    #[test]
    fn test_arrival_within_grace_period_is_on_time() {
        let policy = policies().attendance;
        for ts in ["2025-03-03 09:00:00", "2025-03-03 09:15:00"] {
            let result = evaluate_clock_in(&event(ts), &policy).unwrap();
            assert!(!result.is_late, "{} should be on time", ts);
            assert_eq!(result.penalty, Decimal::ZERO);
            assert_eq!(result.bonus, Decimal::ZERO);
        }
    }

    #[test]
    fn test_seconds_past_threshold_is_late_in_first_tier() {
        let policy = policies().attendance;
        let result = evaluate_clock_in(&event("2025-03-03 09:15:30"), &policy).unwrap();
        assert!(result.is_late);
        assert_eq!(result.late_by, 0);
        assert_eq!(result.penalty, dec("100"));
    }

    #[test]
    fn test_full_day_has_no_overtime_or_early_leave() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:00:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 17:00:00"), false, &policy).unwrap();

        assert_eq!(closed.worked_hours, dec("8"));
        assert_eq!(closed.overtime_hours, Decimal::ZERO);
        assert!(!closed.is_early_leave);
        assert_eq!(closed.status, AttendanceStatus::Present);
        assert!(!closed.is_open());
    }

    #[test]
    fn test_overtime_beyond_minimum_hours() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 08:30:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 19:00:00"), false, &policy).unwrap();

        assert_eq!(closed.worked_hours, dec("10.5"));
        assert_eq!(closed.overtime_hours, dec("2.5"));
        assert_eq!(closed.bonus, dec("50"));
    }

    #[test]
    fn test_early_leave_uses_without_notice_table_by_default() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:00:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 16:15:00"), true, &policy).unwrap();

        assert!(closed.is_early_leave);
        assert_eq!(closed.early_leave_by, 45);
        assert_eq!(closed.penalty, dec("250"));
        assert_eq!(closed.points, -10);
    }

    #[test]
    fn test_early_leave_with_notice_when_honoured() {
        let mut policy = policies().attendance;
        policy.early_leave.honour_notice = true;
        let record = open_record("2025-03-03 09:00:00");

        let with_notice =
            evaluate_clock_out(&record, datetime("2025-03-03 16:15:00"), true, &policy).unwrap();
        assert_eq!(with_notice.penalty, dec("50"));

        let without_notice =
            evaluate_clock_out(&record, datetime("2025-03-03 16:15:00"), false, &policy).unwrap();
        assert_eq!(without_notice.penalty, dec("250"));
    }

    #[test]
    fn test_late_arrival_and_early_leave_penalties_add_up() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:20:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 16:50:00"), false, &policy).unwrap();

        // 200 for arriving 20 minutes late, 100 for leaving 10 minutes early
        assert_eq!(closed.penalty, dec("300"));
        assert_eq!(closed.points, -15);
        assert_eq!(closed.status, AttendanceStatus::Late);
    }

    #[test]
    fn test_short_day_is_half_day() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:00:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 12:30:00"), false, &policy).unwrap();

        assert_eq!(closed.status, AttendanceStatus::HalfDay);
        assert_eq!(closed.worked_hours, dec("3.5"));
    }

    #[test]
    fn test_overnight_session_is_not_early_leave() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 22:00:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-04 07:00:00"), false, &policy).unwrap();

        assert!(!closed.is_early_leave);
        assert_eq!(closed.worked_hours, dec("9"));
        assert_eq!(closed.overtime_hours, dec("1"));
    }

    #[test]
    fn test_closed_record_is_no_active_session() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:00:00");
        let closed =
            evaluate_clock_out(&record, datetime("2025-03-03 17:00:00"), false, &policy).unwrap();

        match evaluate_clock_out(&closed, datetime("2025-03-03 18:00:00"), false, &policy) {
            Err(EngineError::NoActiveSession { employee_id, .. }) => {
                assert_eq!(employee_id, "emp_001")
            }
            other => panic!("Expected NoActiveSession, got {:?}", other),
        }
    }

    #[test]
    fn test_clock_out_before_clock_in_is_invalid() {
        let policy = policies().attendance;
        let record = open_record("2025-03-03 09:00:00");
        assert!(matches!(
            evaluate_clock_out(&record, datetime("2025-03-03 08:00:00"), false, &policy),
            Err(EngineError::InvalidRecord { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_penalty_non_decreasing_with_lateness(a in 0u32..600, b in 0u32..600) {
            let policy = policies().attendance;
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let at = |minutes: u32| {
                let mut e = event("2025-03-03 09:15:00");
                e.timestamp += chrono::Duration::minutes(i64::from(minutes) + 1);
                evaluate_clock_in(&e, &policy).unwrap().penalty
            };
            prop_assert!(at(early) <= at(late));
        }
    }
}
