//! Attendance models.
//!
//! An [`AttendanceRecord`] is opened by a clock-in and completed by the matching
//! clock-out on the same date.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::StreakMilestone;

/// How a clock event was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMethod {
    /// Manual entry through the web or mobile client.
    #[default]
    Manual,
    /// Biometric terminal.
    Biometric,
    /// Badge or RFID card reader.
    Card,
    /// Mobile check-in with geolocation.
    Mobile,
}

/// A raw clock event produced by a terminal or client.
///
/// # Example
///
/// ```
/// use workforce_engine::models::{AttendanceClockEvent, ClockMethod};
/// use chrono::NaiveDateTime;
///
/// let event = AttendanceClockEvent {
///     employee_id: "emp_001".to_string(),
///     timestamp: NaiveDateTime::parse_from_str("2025-03-04 08:40:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     location: Some("HQ".to_string()),
///     method: ClockMethod::Card,
/// };
/// assert_eq!(event.date().to_string(), "2025-03-04");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceClockEvent {
    /// The employee clocking in or out.
    pub employee_id: String,
    /// Local wall-clock time of the event.
    pub timestamp: NaiveDateTime,
    /// Where the event was captured.
    #[serde(default)]
    pub location: Option<String>,
    /// How the event was captured.
    #[serde(default)]
    pub method: ClockMethod,
}

impl AttendanceClockEvent {
    /// Returns the attendance date of the event.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Lifecycle status of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Clocked in, not yet clocked out.
    Active,
    /// Completed day, on time.
    Present,
    /// Completed day with a late arrival.
    Late,
    /// Completed day below the half-day hour threshold.
    HalfDay,
}

impl AttendanceStatus {
    /// Returns true if the record has been closed by a clock-out.
    pub fn is_closed(&self) -> bool {
        !matches!(self, AttendanceStatus::Active)
    }
}

/// The policy effect of a clock-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockInResult {
    /// True if the arrival was after the on-time threshold.
    pub is_late: bool,
    /// Minutes after the on-time threshold (zero when not late).
    pub late_by: i64,
    /// Lateness penalty amount.
    pub penalty: Decimal,
    /// Early-arrival bonus amount.
    pub bonus: Decimal,
    /// Point delta (bonus points or negative lateness points), including the
    /// bonus points of a streak milestone reached by this clock-in.
    pub points: i32,
    /// On-time streak milestone reached by this clock-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<StreakMilestone>,
}

impl ClockInResult {
    /// Adds a reached streak milestone and its bonus points.
    pub fn with_milestone(mut self, milestone: StreakMilestone) -> Self {
        self.points += milestone.bonus_points;
        self.milestone = Some(milestone);
        self
    }
}

/// One employee's attendance for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee.
    pub employee_id: String,
    /// The attendance date.
    pub date: NaiveDate,
    /// Clock-in time.
    pub clock_in: NaiveDateTime,
    /// Clock-out time, `None` while the session is open.
    pub clock_out: Option<NaiveDateTime>,
    /// True if the arrival was late.
    pub is_late: bool,
    /// Minutes late.
    pub late_by: i64,
    /// True if the employee left before the standard end time.
    pub is_early_leave: bool,
    /// Minutes before the standard end time.
    pub early_leave_by: i64,
    /// Hours between clock-in and clock-out.
    pub worked_hours: Decimal,
    /// Hours beyond the policy minimum.
    pub overtime_hours: Decimal,
    /// Total penalty (arrival plus early leave).
    pub penalty: Decimal,
    /// Total bonus.
    pub bonus: Decimal,
    /// Net point delta.
    pub points: i32,
    /// Lifecycle status.
    pub status: AttendanceStatus,
    /// Where the clock-in was captured.
    pub location: Option<String>,
    /// How the clock-in was captured.
    pub method: ClockMethod,
}

impl AttendanceRecord {
    /// Opens a record from a clock-in event and its evaluated effect.
    pub fn open(event: &AttendanceClockEvent, effect: &ClockInResult) -> Self {
        Self {
            employee_id: event.employee_id.clone(),
            date: event.date(),
            clock_in: event.timestamp,
            clock_out: None,
            is_late: effect.is_late,
            late_by: effect.late_by,
            is_early_leave: false,
            early_leave_by: 0,
            worked_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            penalty: effect.penalty,
            bonus: effect.bonus,
            points: effect.points,
            status: AttendanceStatus::Active,
            location: event.location.clone(),
            method: event.method,
        }
    }

    /// Returns true while the record has no clock-out.
    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}
