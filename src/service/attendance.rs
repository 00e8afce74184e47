//! Clock-in and clock-out orchestration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::info;

use crate::calculation::{StreakTracker, evaluate_clock_in, evaluate_clock_out};
use crate::config::PolicyStore;
use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceClockEvent, AttendanceRecord, ClockInResult, Streak};
use crate::repository::AttendanceRepository;

use super::lock;

type DayKey = (String, NaiveDate);

/// Records clock events and keeps streaks.
///
/// Clock-in and clock-out for the same employee and date are serialised
/// through a per-day lock, so a day never ends up with two open sessions.
pub struct AttendanceService {
    policies: Arc<PolicyStore>,
    records: Arc<dyn AttendanceRepository>,
    streaks: Mutex<StreakTracker>,
    day_locks: Mutex<HashMap<DayKey, Arc<Mutex<()>>>>,
}

impl AttendanceService {
    /// Creates a service over a policy store and an attendance repository.
    pub fn new(policies: Arc<PolicyStore>, records: Arc<dyn AttendanceRepository>) -> Self {
        Self {
            policies,
            records,
            streaks: Mutex::new(StreakTracker::new()),
            day_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `f` while holding the lock of one employee's day.
    ///
    /// The lock entry is dropped from the map once no other caller holds or
    /// waits for it, so the map only holds days with work in flight.
    fn with_day_lock<T>(
        &self,
        employee_id: &str,
        date: NaiveDate,
        f: impl FnOnce() -> EngineResult<T>,
    ) -> EngineResult<T> {
        let key = (employee_id.to_string(), date);
        let day = Arc::clone(
            lock(&self.day_locks, "attendance day map")?
                .entry(key.clone())
                .or_default(),
        );

        let result = match lock(&day, "attendance day") {
            Ok(_guard) => f(),
            Err(err) => Err(err),
        };

        if let Ok(mut locks) = self.day_locks.lock() {
            // One reference in the map, one here.
            if Arc::strong_count(&day) == 2 {
                locks.remove(&key);
            }
        }
        result
    }

    /// Opens the day's session and updates the employee's streak.
    ///
    /// A clock-in that brings the on-time streak to a policy milestone
    /// carries the milestone, and its bonus points are added to the day.
    ///
    /// # Errors
    ///
    /// - [`EngineError::SessionAlreadyOpen`] if the day already has an open session.
    /// - [`EngineError::InvalidRecord`] if the day's attendance is already closed.
    pub fn clock_in(&self, event: &AttendanceClockEvent) -> EngineResult<ClockInResult> {
        let date = event.date();
        let result = self.with_day_lock(&event.employee_id, date, || {
            if let Some(existing) = self.records.find(&event.employee_id, date)? {
                if existing.is_open() {
                    return Err(EngineError::SessionAlreadyOpen {
                        employee_id: event.employee_id.clone(),
                        date,
                    });
                }
                return Err(EngineError::InvalidRecord {
                    field: "timestamp".to_string(),
                    message: format!("attendance for {} is already recorded", date),
                });
            }

            let snapshot = self.policies.snapshot();
            let mut result = evaluate_clock_in(event, &snapshot.attendance)?;
            self.records.save(AttendanceRecord::open(event, &result))?;

            let update = lock(&self.streaks, "streak tracker")?.on_event(
                &event.employee_id,
                !result.is_late,
                &snapshot.attendance,
            );
            if let Some(milestone) = update.milestone {
                info!(
                    employee_id = %event.employee_id,
                    days = milestone.days,
                    bonus_points = milestone.bonus_points,
                    "Streak milestone reached"
                );
                result = result.with_milestone(milestone);
                self.records.save(AttendanceRecord::open(event, &result))?;
            }
            Ok(result)
        })?;

        info!(
            employee_id = %event.employee_id,
            %date,
            is_late = result.is_late,
            late_by = result.late_by,
            "Clocked in"
        );
        Ok(result)
    }

    /// Closes the open session the clock-out belongs to.
    ///
    /// The session is looked up on the clock-out date first, then on the
    /// previous date for shifts that run past midnight.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoActiveSession`] if neither date has an open session.
    pub fn clock_out(
        &self,
        employee_id: &str,
        timestamp: NaiveDateTime,
        notice_given: bool,
    ) -> EngineResult<AttendanceRecord> {
        let date = timestamp.date();
        let candidates = [Some(date), date.checked_sub_days(Days::new(1))];

        for day in candidates.into_iter().flatten() {
            let closed = self.with_day_lock(employee_id, day, || {
                let Some(record) = self.records.find(employee_id, day)? else {
                    return Ok(None);
                };
                if !record.is_open() {
                    return Ok(None);
                }

                let snapshot = self.policies.snapshot();
                let closed =
                    evaluate_clock_out(&record, timestamp, notice_given, &snapshot.attendance)?;
                self.records.save(closed.clone())?;
                Ok(Some(closed))
            })?;

            if let Some(closed) = closed {
                info!(
                    employee_id = %employee_id,
                    date = %closed.date,
                    worked_hours = %closed.worked_hours,
                    overtime_hours = %closed.overtime_hours,
                    status = ?closed.status,
                    "Clocked out"
                );
                return Ok(closed);
            }
        }

        Err(EngineError::NoActiveSession {
            employee_id: employee_id.to_string(),
            date,
        })
    }

    /// Current streak of an employee.
    pub fn streak(&self, employee_id: &str) -> EngineResult<Streak> {
        Ok(lock(&self.streaks, "streak tracker")?.get(employee_id))
    }

    /// Attendance records of an employee within `[start, end]`.
    pub fn records(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        self.records.list_for_employee(employee_id, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, ClockMethod};
    use crate::service::fixtures::backing;
    use crate::test_support::{date, datetime, dec};

    fn service() -> AttendanceService {
        let backing = backing();
        AttendanceService::new(backing.policies, backing.attendance)
    }

    fn clock_event(ts: &str) -> AttendanceClockEvent {
        AttendanceClockEvent {
            employee_id: "emp_001".to_string(),
            timestamp: datetime(ts),
            location: Some("HQ".to_string()),
            method: ClockMethod::Card,
        }
    }

    #[test]
    fn test_full_day_is_recorded() {
        let service = service();
        service.clock_in(&clock_event("2025-03-03 08:55:00")).unwrap();
        let record = service
            .clock_out("emp_001", datetime("2025-03-03 17:30:00"), false)
            .unwrap();

        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.worked_hours, dec("8.58"));

        let stored = service
            .records("emp_001", date("2025-03-01"), date("2025-03-31"))
            .unwrap();
        assert_eq!(stored, vec![record]);
    }

    #[test]
    fn test_second_clock_in_on_open_day_is_rejected() {
        let service = service();
        service.clock_in(&clock_event("2025-03-03 09:00:00")).unwrap();
        let result = service.clock_in(&clock_event("2025-03-03 09:05:00"));

        assert!(matches!(result, Err(EngineError::SessionAlreadyOpen { .. })));
        // The rejected clock-in must not count towards the streak.
        assert_eq!(service.streak("emp_001").unwrap().working_streak, 1);
    }

    #[test]
    fn test_clock_in_after_closed_day_is_rejected() {
        let service = service();
        service.clock_in(&clock_event("2025-03-03 09:00:00")).unwrap();
        service
            .clock_out("emp_001", datetime("2025-03-03 17:00:00"), false)
            .unwrap();

        let result = service.clock_in(&clock_event("2025-03-03 18:00:00"));
        assert!(matches!(result, Err(EngineError::InvalidRecord { .. })));
    }

    #[test]
    fn test_clock_out_without_session() {
        let service = service();
        let result = service.clock_out("emp_001", datetime("2025-03-03 17:00:00"), false);

        match result {
            Err(EngineError::NoActiveSession { employee_id, date: d }) => {
                assert_eq!(employee_id, "emp_001");
                assert_eq!(d, date("2025-03-03"));
            }
            other => panic!("Expected NoActiveSession, got {:?}", other),
        }
    }

    #[test]
    fn test_overnight_clock_out_closes_previous_day() {
        let service = service();
        service.clock_in(&clock_event("2025-03-03 20:00:00")).unwrap();
        let record = service
            .clock_out("emp_001", datetime("2025-03-04 02:00:00"), false)
            .unwrap();

        assert_eq!(record.date, date("2025-03-03"));
        assert_eq!(record.worked_hours, dec("6"));
    }

    #[test]
    fn test_streak_follows_clock_ins() {
        let service = service();
        for day in 3..=7 {
            service
                .clock_in(&clock_event(&format!("2025-03-{:02} 09:00:00", day)))
                .unwrap();
        }
        service.clock_in(&clock_event("2025-03-10 09:40:00")).unwrap();

        let streak = service.streak("emp_001").unwrap();
        assert_eq!(streak.on_time_streak, 0);
        assert_eq!(streak.best_on_time, 5);
        assert_eq!(streak.working_streak, 6);
        assert_eq!(service.streak("emp_999").unwrap(), Streak::default());
    }

    #[test]
    fn test_day_locks_are_released_after_use() {
        let service = service();
        service.clock_in(&clock_event("2025-03-03 09:00:00")).unwrap();
        service
            .clock_out("emp_001", datetime("2025-03-04 01:00:00"), false)
            .unwrap();
        let _ = service.clock_out("emp_001", datetime("2025-03-05 17:00:00"), false);

        assert!(service.day_locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fifth_on_time_day_reaches_milestone() {
        let service = service();
        for day in 3..=6 {
            let result = service
                .clock_in(&clock_event(&format!("2025-03-{:02} 08:40:00", day)))
                .unwrap();
            assert!(result.milestone.is_none());
            assert_eq!(result.points, 10);
        }

        let fifth = service.clock_in(&clock_event("2025-03-07 08:40:00")).unwrap();
        let milestone = fifth.milestone.clone().unwrap();
        assert_eq!(milestone.days, 5);
        assert_eq!(fifth.points, 10 + 25);

        let record = service
            .records("emp_001", date("2025-03-07"), date("2025-03-07"))
            .unwrap();
        assert_eq!(record[0].points, 35);
    }

    #[test]
    fn test_concurrent_clock_ins_open_one_session() {
        let service = Arc::new(service());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || service.clock_in(&clock_event("2025-03-03 09:00:00")))
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(successes, 1);
    }
}
