//! Policy document types.
//!
//! This module contains the strongly-typed policy structures that are
//! deserialized from the YAML documents in a policy directory. Each domain
//! (attendance, payroll, leave, reward) is one document; every threshold chain
//! inside a document is expressed as an ordered list of [`Tier`]s.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::validate_tiers;
use crate::error::{EngineError, EngineResult};
use crate::models::{ApprovalState, DayType, ProjectGrade};

/// One bracket of a tiered policy table.
///
/// A tier covers `[min, max)`; `max: None` means unbounded.
///
/// # Example
///
/// ```
/// use workforce_engine::config::{AttendanceEffect, Tier};
/// use rust_decimal::Decimal;
///
/// let tier: Tier<AttendanceEffect> = serde_yaml::from_str(
///     "{ min: 15, max: 30, effect: { penalty: 200, points: -10 } }",
/// ).unwrap();
/// assert!(tier.contains(Decimal::from(20)));
/// assert!(!tier.contains(Decimal::from(30)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier<E> {
    /// Inclusive lower bound.
    pub min: Decimal,
    /// Exclusive upper bound, `None` for the open-ended top tier.
    #[serde(default)]
    pub max: Option<Decimal>,
    /// The policy effect of the tier.
    pub effect: E,
}

impl<E> Tier<E> {
    /// Returns true if `value` lies in `[min, max)`.
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && self.max.is_none_or(|max| value < max)
    }
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

/// Penalty and point delta of an attendance tier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttendanceEffect {
    /// Currency penalty.
    #[serde(default)]
    pub penalty: Decimal,
    /// Point delta (usually negative).
    #[serde(default)]
    pub points: i32,
}

/// Standard working hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    /// Standard start of day.
    pub start_time: NaiveTime,
    /// Standard end of day.
    pub end_time: NaiveTime,
    /// Minutes after `start_time` still counted as on time.
    pub grace_period_minutes: u32,
    /// Arrivals at or before this time earn the early-arrival bonus.
    pub early_bonus_before: NaiveTime,
    /// Hours after which time counts as overtime.
    pub minimum_hours: Decimal,
    /// Days with fewer worked hours are half days.
    pub half_day_hours: Decimal,
}

impl WorkHours {
    /// Latest clock-in time that is still on time.
    pub fn on_time_threshold(&self) -> NaiveTime {
        self.start_time + Duration::minutes(i64::from(self.grace_period_minutes))
    }
}

/// Fixed early-arrival reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyArrivalBonus {
    /// Currency bonus.
    pub bonus: Decimal,
    /// Bonus points.
    pub points: i32,
}

/// Early-leave penalty tables keyed by minutes before the standard end time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyLeaveTables {
    /// When false (the default) the `without_notice` table is used for every
    /// early leave, whether or not notice was given.
    #[serde(default)]
    pub honour_notice: bool,
    /// Penalties when notice was given.
    pub with_notice: Vec<Tier<AttendanceEffect>>,
    /// Penalties when no notice was given.
    pub without_notice: Vec<Tier<AttendanceEffect>>,
}

/// A reward for reaching an on-time streak length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakMilestone {
    /// Streak length that triggers the milestone.
    pub days: u32,
    /// Points awarded.
    pub bonus_points: i32,
}

/// Attendance policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePolicy {
    /// Document name.
    pub name: String,
    /// Document version label.
    pub version: String,
    /// Standard working hours.
    pub work_hours: WorkHours,
    /// Early-arrival reward.
    pub early_arrival: EarlyArrivalBonus,
    /// Lateness tiers keyed by minutes after the on-time threshold.
    pub late_arrival: Vec<Tier<AttendanceEffect>>,
    /// Early-leave tiers.
    pub early_leave: EarlyLeaveTables,
    /// On-time streak milestones.
    #[serde(default)]
    pub streak_milestones: Vec<StreakMilestone>,
}

impl AttendancePolicy {
    /// Validates the document structure.
    pub fn validate(&self) -> EngineResult<()> {
        validate_tiers(&self.late_arrival, "attendance.late_arrival")?;
        validate_tiers(&self.early_leave.with_notice, "attendance.early_leave.with_notice")?;
        validate_tiers(
            &self.early_leave.without_notice,
            "attendance.early_leave.without_notice",
        )?;

        let hours = &self.work_hours;
        if hours.end_time <= hours.start_time {
            return Err(invalid("attendance.work_hours", "end_time must be after start_time"));
        }
        if hours.early_bonus_before > hours.on_time_threshold() {
            return Err(invalid(
                "attendance.work_hours",
                "early_bonus_before must not be after the on-time threshold",
            ));
        }
        if hours.minimum_hours <= Decimal::ZERO {
            return Err(invalid("attendance.work_hours", "minimum_hours must be positive"));
        }
        if self.streak_milestones.iter().any(|m| m.days == 0) {
            return Err(invalid("attendance.streak_milestones", "days must be positive"));
        }
        Ok(())
    }

    /// Returns the milestone reached at exactly `on_time_streak` days, if any.
    pub fn milestone_for(&self, on_time_streak: u32) -> Option<&StreakMilestone> {
        self.streak_milestones
            .iter()
            .find(|m| m.days == on_time_streak)
    }
}

// ---------------------------------------------------------------------------
// Payroll
// ---------------------------------------------------------------------------

/// Effect of a payroll bonus tier: the larger of a percentage of base salary
/// and a fixed amount.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BonusEffect {
    /// Fraction of base salary (0.05 = 5%).
    #[serde(default)]
    pub percentage: Decimal,
    /// Fixed currency amount.
    #[serde(default)]
    pub fixed_amount: Decimal,
}

/// Effect of a tax bracket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxEffect {
    /// Marginal rate applied above the bracket's lower bound.
    pub rate: Decimal,
    /// Tax accumulated by all lower brackets.
    #[serde(default)]
    pub base_amount: Decimal,
}

/// The four independently-thresholded bonus tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTables {
    /// Keyed by mean task efficiency.
    pub efficiency: Vec<Tier<BonusEffect>>,
    /// Keyed by mean quality rating.
    pub quality: Vec<Tier<BonusEffect>>,
    /// Keyed by attendance percentage.
    pub attendance: Vec<Tier<BonusEffect>>,
    /// Keyed by completed task count.
    pub task_completion: Vec<Tier<BonusEffect>>,
}

/// Overtime multipliers by day type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeMultipliers {
    /// Monday to Friday.
    pub weekday: Decimal,
    /// Saturday and Sunday.
    pub weekend: Decimal,
    /// Listed holidays.
    pub holiday: Decimal,
}

impl OvertimeMultipliers {
    /// Returns the multiplier for a day type.
    pub fn for_day(&self, day_type: DayType) -> Decimal {
        match day_type {
            DayType::Weekday => self.weekday,
            DayType::Weekend => self.weekend,
            DayType::Holiday => self.holiday,
        }
    }
}

/// Flat payroll penalties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPenaltyRates {
    /// Penalty per late day.
    pub late_day: Decimal,
    /// Penalty per missed deadline.
    pub missed_deadline: Decimal,
    /// Fraction of the daily salary deducted per absent day.
    pub absent_day_fraction: Decimal,
}

/// Statutory deduction configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryConfig {
    /// Progressive tax brackets keyed by gross salary.
    pub tax_brackets: Vec<Tier<TaxEffect>>,
    /// Provident fund fraction of earned salary.
    pub provident_fund_rate: Decimal,
    /// ESI fraction of earned salary.
    pub esi_rate: Decimal,
    /// ESI applies only while gross salary is at or below this ceiling.
    #[serde(default)]
    pub esi_wage_ceiling: Option<Decimal>,
}

/// Payroll policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPolicy {
    /// Document name.
    pub name: String,
    /// Document version label.
    pub version: String,
    /// Divisor turning a monthly salary into a daily salary.
    pub working_days_per_month: Decimal,
    /// Divisor turning a daily salary into an hourly rate.
    pub standard_hours_per_day: Decimal,
    /// Monthly base salary by role, then experience tier.
    pub salary_structure: BTreeMap<String, BTreeMap<String, Decimal>>,
    /// Bonus tables.
    pub bonuses: BonusTables,
    /// Currency value of one reward point.
    pub reward_point_value: Decimal,
    /// Overtime multipliers.
    pub overtime_multipliers: OvertimeMultipliers,
    /// Flat penalties.
    pub penalties: PayrollPenaltyRates,
    /// Statutory deductions.
    pub statutory: StatutoryConfig,
}

impl PayrollPolicy {
    /// Validates the document structure.
    pub fn validate(&self) -> EngineResult<()> {
        validate_tiers(&self.bonuses.efficiency, "payroll.bonuses.efficiency")?;
        validate_tiers(&self.bonuses.quality, "payroll.bonuses.quality")?;
        validate_tiers(&self.bonuses.attendance, "payroll.bonuses.attendance")?;
        validate_tiers(&self.bonuses.task_completion, "payroll.bonuses.task_completion")?;
        validate_tiers(&self.statutory.tax_brackets, "payroll.statutory.tax_brackets")?;

        if self.working_days_per_month <= Decimal::ZERO {
            return Err(invalid("payroll", "working_days_per_month must be positive"));
        }
        if self.standard_hours_per_day <= Decimal::ZERO {
            return Err(invalid("payroll", "standard_hours_per_day must be positive"));
        }
        Ok(())
    }

    /// Looks up the monthly base salary for a role and experience tier.
    pub fn base_salary_for(&self, role: &str, experience_tier: &str) -> EngineResult<Decimal> {
        self.salary_structure
            .get(role)
            .and_then(|tiers| tiers.get(experience_tier))
            .copied()
            .ok_or_else(|| EngineError::PolicyNotFound {
                table: format!("payroll.salary_structure.{}.{}", role, experience_tier),
            })
    }
}

// ---------------------------------------------------------------------------
// Leave
// ---------------------------------------------------------------------------

/// Rules for one leave type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveTypePolicy {
    /// Whether the leave is paid.
    pub paid: bool,
    /// Days granted per year; `None` for leave that is not balance-tracked.
    #[serde(default)]
    pub annual_entitlement: Option<Decimal>,
    /// Required notice in days.
    pub advance_notice_days: u32,
    /// Longest allowed single request.
    pub max_consecutive_days: u32,
    /// Whether blackout periods apply.
    #[serde(default)]
    pub blackout_applies: bool,
    /// Most days that roll over into the next year.
    #[serde(default)]
    pub max_carry_forward: Decimal,
}

/// A window during which blackout-restricted leave is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlackoutPeriod {
    /// Label shown in validation errors.
    pub name: String,
    /// First blocked day (inclusive).
    pub start_date: NaiveDate,
    /// Last blocked day (inclusive).
    pub end_date: NaiveDate,
}

impl BlackoutPeriod {
    /// Returns true if `[start, end]` intersects the blackout window.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end_date && end >= self.start_date
    }
}

/// Effect of a notice-deficit tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeRatio {
    /// Days of pay charged per leave day.
    pub ratio: Decimal,
}

/// Leave policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePolicy {
    /// Document name.
    pub name: String,
    /// Document version label.
    pub version: String,
    /// Rules by leave type key.
    pub leave_types: BTreeMap<String, LeaveTypePolicy>,
    /// Reasons that excuse short notice.
    #[serde(default)]
    pub emergency_reasons: Vec<String>,
    /// Ratio tiers keyed by the percentage of required notice that was given.
    pub notice_deficit_ratios: Vec<Tier<NoticeRatio>>,
    /// Fixed penalty for same-day leave without an emergency reason.
    pub same_day_penalty: Decimal,
    /// Blackout windows.
    #[serde(default)]
    pub blackout_periods: Vec<BlackoutPeriod>,
}

impl LeavePolicy {
    /// Validates the document structure.
    pub fn validate(&self) -> EngineResult<()> {
        validate_tiers(&self.notice_deficit_ratios, "leave.notice_deficit_ratios")?;
        if self.leave_types.is_empty() {
            return Err(invalid("leave.leave_types", "at least one leave type is required"));
        }
        if let Some(period) = self
            .blackout_periods
            .iter()
            .find(|p| p.end_date < p.start_date)
        {
            return Err(invalid(
                "leave.blackout_periods",
                format!("'{}' ends before it starts", period.name),
            ));
        }
        Ok(())
    }

    /// Looks up the rules for a leave type.
    pub fn leave_type(&self, leave_type: &str) -> EngineResult<&LeaveTypePolicy> {
        self.leave_types
            .get(leave_type)
            .ok_or_else(|| EngineError::UnknownLeaveType {
                leave_type: leave_type.to_string(),
            })
    }

    /// Returns true if the reason matches an entry of the emergency allowlist.
    ///
    /// Matching is case-insensitive and by substring.
    pub fn is_emergency(&self, reason: &str) -> bool {
        let reason = reason.to_lowercase();
        !reason.trim().is_empty()
            && self
                .emergency_reasons
                .iter()
                .any(|allowed| reason.contains(&allowed.to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Reward
// ---------------------------------------------------------------------------

/// A labelled multiplier tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiplierEffect {
    /// Tier label (e.g. "excellent").
    pub label: String,
    /// Multiplier applied to reward counts.
    pub multiplier: Decimal,
}

/// Multipliers by review outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalMultipliers {
    /// Approved tasks.
    pub approved: Decimal,
    /// Rejected tasks.
    pub rejected: Decimal,
    /// Tasks not yet reviewed.
    pub pending: Decimal,
}

impl ApprovalMultipliers {
    /// Returns the multiplier for an approval state.
    pub fn for_state(&self, state: ApprovalState) -> Decimal {
        match state {
            ApprovalState::Approved => self.approved,
            ApprovalState::Rejected => self.rejected,
            ApprovalState::Pending => self.pending,
        }
    }
}

/// A reward currency issued on task completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardType {
    /// Reward name (e.g. "star").
    pub name: String,
    /// Units granted before multipliers.
    pub base_count: u32,
    /// Currency value of one unit.
    pub unit_value: Decimal,
}

/// Effect of a project-grade tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeEffect {
    /// The letter grade.
    pub grade: ProjectGrade,
}

/// Reward policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    /// Document name.
    pub name: String,
    /// Document version label.
    pub version: String,
    /// Tiers keyed by task efficiency percentage.
    pub efficiency_multipliers: Vec<Tier<MultiplierEffect>>,
    /// Tiers keyed by quality rating.
    pub quality_multipliers: Vec<Tier<MultiplierEffect>>,
    /// Multipliers by approval state.
    pub approval_multipliers: ApprovalMultipliers,
    /// Reward currencies.
    pub reward_types: Vec<RewardType>,
    /// Grade tiers keyed by project score.
    pub project_grades: Vec<Tier<GradeEffect>>,
}

impl RewardPolicy {
    /// Validates the document structure.
    pub fn validate(&self) -> EngineResult<()> {
        validate_tiers(&self.efficiency_multipliers, "reward.efficiency_multipliers")?;
        validate_tiers(&self.quality_multipliers, "reward.quality_multipliers")?;
        validate_tiers(&self.project_grades, "reward.project_grades")?;

        let negative = self
            .efficiency_multipliers
            .iter()
            .chain(self.quality_multipliers.iter())
            .any(|t| t.effect.multiplier < Decimal::ZERO);
        if negative {
            return Err(invalid("reward", "multipliers must not be negative"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// An immutable set of all four policy documents.
///
/// Evaluators always read from one snapshot for the duration of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Monotonic version, bumped on every accepted replacement.
    pub version: u64,
    /// Attendance policy.
    pub attendance: AttendancePolicy,
    /// Payroll policy.
    pub payroll: PayrollPolicy,
    /// Leave policy.
    pub leave: LeavePolicy,
    /// Reward policy.
    pub reward: RewardPolicy,
}

impl PolicySnapshot {
    /// Validates every document.
    pub fn validate(&self) -> EngineResult<()> {
        self.attendance.validate()?;
        self.payroll.validate()?;
        self.leave.validate()?;
        self.reward.validate()
    }
}

/// A full-document policy update for one domain.
///
/// Updates always replace the whole document; there is no field-level patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "document", rename_all = "snake_case")]
pub enum PolicyDocument {
    /// Replaces the attendance policy.
    Attendance(AttendancePolicy),
    /// Replaces the payroll policy.
    Payroll(PayrollPolicy),
    /// Replaces the leave policy.
    Leave(LeavePolicy),
    /// Replaces the reward policy.
    Reward(RewardPolicy),
}

impl PolicyDocument {
    /// Validates the carried document.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            PolicyDocument::Attendance(doc) => doc.validate(),
            PolicyDocument::Payroll(doc) => doc.validate(),
            PolicyDocument::Leave(doc) => doc.validate(),
            PolicyDocument::Reward(doc) => doc.validate(),
        }
    }

    /// The domain name of the document.
    pub fn domain(&self) -> &'static str {
        match self {
            PolicyDocument::Attendance(_) => "attendance",
            PolicyDocument::Payroll(_) => "payroll",
            PolicyDocument::Leave(_) => "leave",
            PolicyDocument::Reward(_) => "reward",
        }
    }
}

fn invalid(policy: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidPolicy {
        policy: policy.to_string(),
        message: message.into(),
    }
}
