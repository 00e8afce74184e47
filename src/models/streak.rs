//! Attendance streak model.

use serde::{Deserialize, Serialize};

/// Consecutive-day counters for one employee.
///
/// Best values are monotone: they never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    /// Consecutive on-time arrivals.
    pub on_time_streak: u32,
    /// Consecutive worked days (late days included).
    pub working_streak: u32,
    /// Highest on-time streak seen.
    pub best_on_time: u32,
    /// Highest working streak seen.
    pub best_working: u32,
}

impl Streak {
    /// Applies one worked day.
    ///
    /// A late day resets the on-time streak but still counts as a worked day.
    ///
    /// # Example
    ///
    /// ```
    /// use workforce_engine::models::Streak;
    ///
    /// let mut streak = Streak::default();
    /// streak.record(true);
    /// streak.record(false);
    /// assert_eq!(streak.on_time_streak, 0);
    /// assert_eq!(streak.working_streak, 2);
    /// assert_eq!(streak.best_on_time, 1);
    /// ```
    pub fn record(&mut self, is_on_time: bool) {
        if is_on_time {
            self.on_time_streak += 1;
        } else {
            self.on_time_streak = 0;
        }
        self.working_streak += 1;
        self.best_on_time = self.best_on_time.max(self.on_time_streak);
        self.best_working = self.best_working.max(self.working_streak);
    }
}
