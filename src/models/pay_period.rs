//! Pay period and holiday models.
//!
//! This module contains the [`PayPeriod`] and [`Holiday`] types that define the
//! calendar context for payroll: which dates are inside the period, which are
//! working days, and which overtime multiplier a date attracts.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A company or public holiday.
///
/// # Example
///
/// ```
/// use workforce_engine::models::Holiday;
/// use chrono::NaiveDate;
///
/// let holiday = Holiday {
///     date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
///     name: "Labour Day".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The date of the holiday.
    pub date: NaiveDate,
    /// The name of the holiday.
    pub name: String,
}

/// Calendar classification of a date for overtime purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday to Friday, not a holiday.
    Weekday,
    /// Saturday or Sunday, not a holiday.
    Weekend,
    /// A listed holiday (takes precedence over weekend).
    Holiday,
}

/// A payroll period with its date range and holidays.
///
/// # Example
///
/// ```
/// use workforce_engine::models::{Holiday, PayPeriod};
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
///     holidays: vec![Holiday {
///         date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
///         name: "Spring Festival".to_string(),
///     }],
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()));
/// assert!(period.is_holiday(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()));
/// assert_eq!(period.working_days(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Holidays that fall within this period.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
}

impl PayPeriod {
    /// Rejects a period that ends before it starts.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`] for an inverted date range.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date < self.start_date {
            return Err(EngineError::InvalidRecord {
                field: "period".to_string(),
                message: format!(
                    "period ends on {} before it starts on {}",
                    self.end_date, self.start_date
                ),
            });
        }
        Ok(())
    }

    /// Checks if a given date falls within this period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Checks if a given date is a listed holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.date == date)
    }

    /// Classifies a date as weekday, weekend or holiday.
    pub fn day_type(&self, date: NaiveDate) -> DayType {
        if self.is_holiday(date) {
            DayType::Holiday
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayType::Weekend
        } else {
            DayType::Weekday
        }
    }

    /// Counts the weekdays in the period that are not holidays.
    pub fn working_days(&self) -> u32 {
        self.start_date
            .iter_days()
            .take_while(|d| *d <= self.end_date)
            .filter(|d| self.day_type(*d) == DayType::Weekday)
            .count() as u32
    }

    /// A stable key identifying the period, used to address stored records.
    pub fn key(&self) -> String {
        format!("{}..{}", self.start_date, self.end_date)
    }
}
