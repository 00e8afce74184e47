//! Per-employee attendance streaks.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::{AttendancePolicy, StreakMilestone};
use crate::models::Streak;

/// The streak after one attendance event, plus any milestone it reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    /// The employee's streak after the event.
    pub streak: Streak,
    /// Milestone whose length the on-time streak now equals.
    pub milestone: Option<StreakMilestone>,
}

/// Consecutive-day counters keyed by employee.
///
/// A late arrival resets the on-time streak but still counts as a worked day,
/// so the working streak keeps growing.
#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    streaks: HashMap<String, Streak>,
}

impl StreakTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one attendance day for an employee.
    pub fn on_event(
        &mut self,
        employee_id: &str,
        is_on_time: bool,
        policy: &AttendancePolicy,
    ) -> StreakUpdate {
        let streak = self.streaks.entry(employee_id.to_string()).or_default();
        streak.record(is_on_time);

        let milestone = if is_on_time {
            policy.milestone_for(streak.on_time_streak).cloned()
        } else {
            None
        };

        StreakUpdate {
            streak: *streak,
            milestone,
        }
    }

    /// Current streak of an employee; all zeros if nothing was recorded.
    pub fn get(&self, employee_id: &str) -> Streak {
        self.streaks.get(employee_id).copied().unwrap_or_default()
    }
}
