//! Period payroll aggregation.
//!
//! Combines the attendance, task and leave records of one employee and one
//! pay period into a [`PayrollRecord`]. The computation is a pure function of
//! its inputs and the policy snapshot; the only value that differs between
//! two runs over the same inputs is `computed_at`.
//!
//! Intermediate values keep full decimal precision. Every monetary field is
//! rounded to whole currency units (half away from zero) only as it is
//! written into the record.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;
use tracing::debug;

use crate::config::{BonusEffect, PolicySnapshot, Tier};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceMetrics, AttendanceRecord, AuditStep, DayType, EmployeeSalaryProfile,
    LeaveApplication, PayPeriod, PayrollBonuses, PayrollPenalties, PayrollRecord,
    StatutoryDeductions, TaskMetrics, TatRecord,
};

use super::resolve_bracket;

/// Everything recorded for one employee that feeds a payroll run.
#[derive(Debug, Clone, Copy)]
pub struct PayrollInputs<'a> {
    /// Salary profile of the employee.
    pub profile: &'a EmployeeSalaryProfile,
    /// The pay period.
    pub period: &'a PayPeriod,
    /// Attendance records of the employee; records outside the period or
    /// still open are ignored.
    pub attendance: &'a [AttendanceRecord],
    /// TAT records of the employee; only those completed in the period count.
    pub tasks: &'a [TatRecord],
    /// Leave applications of the employee; only approved ones count.
    pub leaves: &'a [LeaveApplication],
    /// Reward points earned in the period.
    pub reward_points: i64,
}

/// Largest magnitude (10^15) accepted for a base salary or a salary
/// adjustment, so every intermediate product stays inside `Decimal`'s range.
pub const MAX_SALARY_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Rounds a monetary amount for storage.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

struct AuditTrail {
    steps: Vec<AuditStep>,
}

impl AuditTrail {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        policy_ref: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.push(AuditStep {
            step_number: self.steps.len() as u32 + 1,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            policy_ref: policy_ref.to_string(),
            input,
            output,
            reasoning,
        });
    }
}

/// Calculates the payroll record of one employee for one period.
///
/// # Errors
///
/// - [`EngineError::PolicyNotFound`] if the profile has no base salary and the
///   salary structure has no entry for its role and tier, or a bonus or tax
///   table is malformed.
/// - [`EngineError::CalculationError`] if the base salary is negative.
/// - [`EngineError::InvalidRecord`] for an inverted period, or a base salary
///   or adjustment beyond [`MAX_SALARY_AMOUNT`].
pub fn calculate_payroll(
    inputs: &PayrollInputs<'_>,
    snapshot: &PolicySnapshot,
    computed_at: DateTime<Utc>,
) -> EngineResult<PayrollRecord> {
    let policy = &snapshot.payroll;
    let profile = inputs.profile;
    let period = inputs.period;
    let mut trail = AuditTrail::new();

    period.validate()?;
    let base_salary = match profile.base_salary {
        Some(salary) => salary,
        None => policy.base_salary_for(&profile.role, &profile.experience_tier)?,
    };
    if base_salary < Decimal::ZERO {
        return Err(EngineError::CalculationError {
            message: format!(
                "base salary {} for '{}' is negative",
                base_salary, profile.employee_id
            ),
        });
    }
    if base_salary > MAX_SALARY_AMOUNT {
        return Err(EngineError::InvalidRecord {
            field: "base_salary".to_string(),
            message: format!("base salary exceeds {}", MAX_SALARY_AMOUNT),
        });
    }
    if let Some(adjustment) = profile
        .custom_adjustments
        .iter()
        .find(|a| a.amount.abs() > MAX_SALARY_AMOUNT)
    {
        return Err(EngineError::InvalidRecord {
            field: "custom_adjustments".to_string(),
            message: format!(
                "adjustment '{}' exceeds {} in magnitude",
                adjustment.label, MAX_SALARY_AMOUNT
            ),
        });
    }
    let daily_salary = base_salary / policy.working_days_per_month;
    let hourly_rate = daily_salary / policy.standard_hours_per_day;
    trail.record(
        "base_salary",
        "Base Salary",
        "payroll.salary_structure",
        json!({
            "role": profile.role,
            "experience_tier": profile.experience_tier,
            "override": profile.base_salary.map(|s| s.normalize().to_string()),
        }),
        json!({
            "base_salary": base_salary.normalize().to_string(),
            "daily_salary": daily_salary.round_dp(2).to_string(),
            "hourly_rate": hourly_rate.round_dp(2).to_string(),
        }),
        format!(
            "Daily salary = {} / {} working days per month",
            base_salary.normalize(),
            policy.working_days_per_month.normalize()
        ),
    );

    let attendance = attendance_metrics(inputs);
    let earned_salary = daily_salary * Decimal::from(attendance.present_days);
    trail.record(
        "attendance_metrics",
        "Attendance Metrics",
        "payroll.working_days_per_month",
        json!({
            "working_days": attendance.working_days,
            "present_days": attendance.present_days,
            "leave_days": attendance.leave_days.normalize().to_string(),
        }),
        json!({
            "absent_days": attendance.absent_days,
            "late_days": attendance.late_days,
            "attendance_percentage": attendance.attendance_percentage.to_string(),
            "earned_salary": earned_salary.round_dp(2).to_string(),
        }),
        format!(
            "Earned salary = daily salary x {} present days",
            attendance.present_days
        ),
    );

    let tasks = task_metrics(inputs)?;

    let efficiency_bonus = bonus_for(
        &mut trail,
        "efficiency_bonus",
        "Efficiency Bonus",
        "payroll.bonuses.efficiency",
        tasks.average_efficiency,
        &policy.bonuses.efficiency,
        base_salary,
    )?;
    let quality_bonus = bonus_for(
        &mut trail,
        "quality_bonus",
        "Quality Bonus",
        "payroll.bonuses.quality",
        tasks.average_quality,
        &policy.bonuses.quality,
        base_salary,
    )?;
    let attendance_bonus = bonus_for(
        &mut trail,
        "attendance_bonus",
        "Attendance Bonus",
        "payroll.bonuses.attendance",
        attendance.attendance_percentage,
        &policy.bonuses.attendance,
        base_salary,
    )?;
    let task_completion_bonus = bonus_for(
        &mut trail,
        "task_completion_bonus",
        "Task Completion Bonus",
        "payroll.bonuses.task_completion",
        Decimal::from(tasks.completed_tasks),
        &policy.bonuses.task_completion,
        base_salary,
    )?;

    let reward_points_bonus = Decimal::from(inputs.reward_points) * policy.reward_point_value;

    let mut overtime_pay = Decimal::ZERO;
    for record in closed_in_period(inputs) {
        if record.overtime_hours <= Decimal::ZERO {
            continue;
        }
        let multiplier = policy
            .overtime_multipliers
            .for_day(period.day_type(record.date));
        overtime_pay += record.overtime_hours * hourly_rate * multiplier;
    }
    trail.record(
        "overtime_pay",
        "Overtime Pay",
        "payroll.overtime_multipliers",
        json!({
            "overtime_hours": attendance.overtime_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.round_dp(2).to_string(),
        }),
        json!({ "overtime_pay": overtime_pay.round_dp(2).to_string() }),
        "Overtime hours x hourly rate x day-type multiplier".to_string(),
    );

    let adjustments: Decimal = profile.custom_adjustments.iter().map(|a| a.amount).sum();

    let bonuses_total = efficiency_bonus
        + quality_bonus
        + attendance_bonus
        + task_completion_bonus
        + reward_points_bonus
        + overtime_pay
        + adjustments;

    let late_penalty = policy.penalties.late_day * Decimal::from(attendance.late_days);
    let missed_deadline_penalty =
        policy.penalties.missed_deadline * Decimal::from(tasks.missed_deadlines);
    let absent_penalty = Decimal::from(attendance.absent_days)
        * policy.penalties.absent_day_fraction
        * daily_salary;
    let leave_penalty: Decimal = inputs
        .leaves
        .iter()
        .filter(|leave| leave.is_approved() && period.contains_date(leave.start_date))
        .map(|leave| leave.pay_impact.deduction * daily_salary + leave.pay_impact.penalty)
        .sum();
    let penalties_total = late_penalty + missed_deadline_penalty + absent_penalty + leave_penalty;
    trail.record(
        "penalties",
        "Penalties",
        "payroll.penalties",
        json!({
            "late_days": attendance.late_days,
            "missed_deadlines": tasks.missed_deadlines,
            "absent_days": attendance.absent_days,
        }),
        json!({
            "late": late_penalty.round_dp(2).to_string(),
            "missed_deadlines": missed_deadline_penalty.round_dp(2).to_string(),
            "absent": absent_penalty.round_dp(2).to_string(),
            "leave": leave_penalty.round_dp(2).to_string(),
        }),
        format!(
            "Absent days cost {} of the daily salary each",
            policy.penalties.absent_day_fraction.normalize()
        ),
    );

    let gross_salary = earned_salary + bonuses_total;

    let statutory = &policy.statutory;
    let tax_tier = resolve_bracket(
        gross_salary,
        &statutory.tax_brackets,
        "payroll.statutory.tax_brackets",
    )?;
    let taxable_above_min = (gross_salary - tax_tier.min).max(Decimal::ZERO);
    let tax = tax_tier.effect.base_amount + taxable_above_min * tax_tier.effect.rate;
    let provident_fund = earned_salary * statutory.provident_fund_rate;
    let esi = match statutory.esi_wage_ceiling {
        Some(ceiling) if gross_salary > ceiling => Decimal::ZERO,
        _ => earned_salary * statutory.esi_rate,
    };
    let statutory_total = tax + provident_fund + esi;
    trail.record(
        "statutory_deductions",
        "Statutory Deductions",
        "payroll.statutory",
        json!({
            "gross_salary": gross_salary.round_dp(2).to_string(),
            "earned_salary": earned_salary.round_dp(2).to_string(),
        }),
        json!({
            "tax_rate": tax_tier.effect.rate.normalize().to_string(),
            "tax": tax.round_dp(2).to_string(),
            "provident_fund": provident_fund.round_dp(2).to_string(),
            "esi": esi.round_dp(2).to_string(),
        }),
        format!(
            "Tax = {} + (gross - {}) x {}",
            tax_tier.effect.base_amount.normalize(),
            tax_tier.min.normalize(),
            tax_tier.effect.rate.normalize()
        ),
    );

    let net_salary = gross_salary - penalties_total - statutory_total;
    trail.record(
        "net_salary",
        "Net Salary",
        "payroll",
        json!({
            "gross_salary": gross_salary.round_dp(2).to_string(),
            "penalties": penalties_total.round_dp(2).to_string(),
            "statutory_deductions": statutory_total.round_dp(2).to_string(),
        }),
        json!({ "net_salary": round_money(net_salary).to_string() }),
        "Net = gross - penalties - statutory deductions".to_string(),
    );

    debug!(
        employee_id = %profile.employee_id,
        period = %period.key(),
        gross_salary = %round_money(gross_salary),
        net_salary = %round_money(net_salary),
        "Calculated payroll"
    );

    Ok(PayrollRecord {
        employee_id: profile.employee_id.clone(),
        period: period.clone(),
        policy_version: snapshot.version,
        base_salary: round_money(base_salary),
        earned_salary: round_money(earned_salary),
        attendance,
        tasks,
        bonuses: PayrollBonuses {
            efficiency: round_money(efficiency_bonus),
            quality: round_money(quality_bonus),
            attendance: round_money(attendance_bonus),
            task_completion: round_money(task_completion_bonus),
            reward_points: round_money(reward_points_bonus),
            overtime: round_money(overtime_pay),
            adjustments: round_money(adjustments),
            total: round_money(bonuses_total),
        },
        penalties: PayrollPenalties {
            late: round_money(late_penalty),
            missed_deadlines: round_money(missed_deadline_penalty),
            absent: round_money(absent_penalty),
            leave: round_money(leave_penalty),
            total: round_money(penalties_total),
        },
        statutory_deductions: StatutoryDeductions {
            tax: round_money(tax),
            provident_fund: round_money(provident_fund),
            esi: round_money(esi),
            total: round_money(statutory_total),
        },
        gross_salary: round_money(gross_salary),
        net_salary: round_money(net_salary),
        audit_steps: trail.steps,
        computed_at,
    })
}

fn closed_in_period<'a>(
    inputs: &'a PayrollInputs<'_>,
) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
    inputs.attendance.iter().filter(move |record| {
        record.employee_id == inputs.profile.employee_id
            && !record.is_open()
            && inputs.period.contains_date(record.date)
    })
}

fn attendance_metrics(inputs: &PayrollInputs<'_>) -> AttendanceMetrics {
    let period = inputs.period;
    let working_days = period.working_days();

    let mut present_days = 0u32;
    let mut late_days = 0u32;
    let mut overtime_hours = Decimal::ZERO;
    for record in closed_in_period(inputs) {
        present_days += 1;
        if record.is_late {
            late_days += 1;
        }
        overtime_hours += record.overtime_hours;
    }

    // Approved leave only excuses working days inside the period.
    let leave_days = inputs
        .leaves
        .iter()
        .filter(|leave| leave.is_approved())
        .flat_map(|leave| {
            leave
                .start_date
                .iter_days()
                .take_while(move |d| *d <= leave.end_date)
        })
        .filter(|d| period.contains_date(*d) && period.day_type(*d) == DayType::Weekday)
        .count() as u32;

    let absent_days = working_days.saturating_sub(present_days + leave_days);
    let attendance_percentage = if working_days == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(present_days) * Decimal::ONE_HUNDRED / Decimal::from(working_days))
            .round_dp(2)
    };

    AttendanceMetrics {
        working_days,
        present_days,
        absent_days,
        late_days,
        leave_days: Decimal::from(leave_days),
        attendance_percentage,
        overtime_hours,
    }
}

fn task_metrics(inputs: &PayrollInputs<'_>) -> EngineResult<TaskMetrics> {
    let completed: Vec<&TatRecord> = inputs
        .tasks
        .iter()
        .filter(|task| {
            task.employee_id == inputs.profile.employee_id
                && task.is_completed()
                && task
                    .actual_end_date
                    .is_some_and(|d| inputs.period.contains_date(d))
        })
        .collect();

    let average_efficiency = mean(completed.iter().map(|t| t.efficiency))?;
    let average_quality = mean(
        completed
            .iter()
            .filter_map(|t| t.quality_rating.map(Decimal::from)),
    )?;

    Ok(TaskMetrics {
        completed_tasks: completed.len() as u32,
        average_efficiency,
        average_quality,
        missed_deadlines: completed.iter().filter(|t| t.delivered_late()).count() as u32,
    })
}

/// Mean of the values to two decimals; zero for no values.
pub(crate) fn mean(values: impl Iterator<Item = Decimal>) -> EngineResult<Decimal> {
    let mut sum = Decimal::ZERO;
    let mut count = 0u32;
    for value in values {
        sum = sum.checked_add(value).ok_or_else(|| EngineError::CalculationError {
            message: format!("sum of {} values overflows", count + 1),
        })?;
        count += 1;
    }
    if count == 0 {
        Ok(Decimal::ZERO)
    } else {
        Ok((sum / Decimal::from(count)).round_dp(2))
    }
}

fn bonus_for(
    trail: &mut AuditTrail,
    rule_id: &str,
    rule_name: &str,
    table: &str,
    value: Decimal,
    tiers: &[Tier<BonusEffect>],
    base_salary: Decimal,
) -> EngineResult<Decimal> {
    let tier = resolve_bracket(value, tiers, table)?;
    let percentage_amount = tier.effect.percentage * base_salary;
    let amount = percentage_amount.max(tier.effect.fixed_amount);

    trail.record(
        rule_id,
        rule_name,
        table,
        json!({ "value": value.normalize().to_string() }),
        json!({
            "tier_min": tier.min.normalize().to_string(),
            "percentage": tier.effect.percentage.normalize().to_string(),
            "fixed_amount": tier.effect.fixed_amount.normalize().to_string(),
            "amount": amount.round_dp(2).to_string(),
        }),
        format!(
            "Value {} resolves the tier starting at {}: max({} x base, {})",
            value.normalize(),
            tier.min.normalize(),
            tier.effect.percentage.normalize(),
            tier.effect.fixed_amount.normalize()
        ),
    );

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ApprovalState, AttendanceStatus, ClockMethod, LeaveStatus, PayImpact, PayType,
        SalaryAdjustment, TaskStatus,
    };
    use crate::test_support::{date, dec, policies};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn march() -> PayPeriod {
        PayPeriod {
            start_date: date("2025-03-01"),
            end_date: date("2025-03-31"),
            holidays: vec![],
        }
    }

    fn profile() -> EmployeeSalaryProfile {
        EmployeeSalaryProfile {
            employee_id: "emp_001".to_string(),
            role: "engineer".to_string(),
            experience_tier: "mid".to_string(),
            base_salary: None,
            custom_adjustments: vec![],
        }
    }

    fn weekdays(period: &PayPeriod) -> Vec<NaiveDate> {
        period
            .start_date
            .iter_days()
            .take_while(|d| *d <= period.end_date)
            .filter(|d| period.day_type(*d) == DayType::Weekday)
            .collect()
    }

    fn day(date: NaiveDate, is_late: bool, overtime: &str) -> AttendanceRecord {
        let clock_in = date.and_hms_opt(9, 0, 0).unwrap();
        let worked = dec("8") + dec(overtime);
        AttendanceRecord {
            employee_id: "emp_001".to_string(),
            date,
            clock_in,
            clock_out: Some(clock_in + Duration::hours(8)),
            is_late,
            late_by: if is_late { 20 } else { 0 },
            is_early_leave: false,
            early_leave_by: 0,
            worked_hours: worked,
            overtime_hours: dec(overtime),
            penalty: Decimal::ZERO,
            bonus: Decimal::ZERO,
            points: 0,
            status: AttendanceStatus::Present,
            location: None,
            method: ClockMethod::Card,
        }
    }

    fn task(id: usize, efficiency: &str, rating: u8, completed_on: &str) -> TatRecord {
        TatRecord {
            task_id: format!("task_{:03}", id),
            employee_id: "emp_001".to_string(),
            project_id: "proj_001".to_string(),
            planned_hours: dec("8"),
            actual_hours: dec("8"),
            planned_end_date: date("2025-03-20"),
            actual_end_date: Some(date(completed_on)),
            efficiency: dec(efficiency),
            quality_rating: Some(rating),
            approval_state: ApprovalState::Approved,
            status: TaskStatus::Completed,
            date_variance: (date(completed_on) - date("2025-03-20")).num_days(),
        }
    }

    fn leave(start: &str, end: &str, pay_impact: PayImpact) -> LeaveApplication {
        LeaveApplication {
            id: "leave_001".to_string(),
            employee_id: "emp_001".to_string(),
            leave_type: "annual_leave".to_string(),
            start_date: date(start),
            end_date: date(end),
            days: Decimal::from((date(end) - date(start)).num_days() + 1),
            advance_notice_days: 10,
            reason: String::new(),
            documents: vec![],
            applied_on: date("2025-03-01"),
            status: LeaveStatus::Approved,
            pay_impact,
        }
    }

    fn run_at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, second).unwrap()
    }

    struct Fixture {
        profile: EmployeeSalaryProfile,
        period: PayPeriod,
        attendance: Vec<AttendanceRecord>,
        tasks: Vec<TatRecord>,
        leaves: Vec<LeaveApplication>,
        reward_points: i64,
    }

    impl Fixture {
        /// 20 of 21 working days present (2 late, 2h weekday overtime once),
        /// one approved full-pay leave day, 10 tasks at 120% quality 5.
        fn standard() -> Self {
            let period = march();
            let days = weekdays(&period);
            let attendance = days[..20]
                .iter()
                .enumerate()
                .map(|(i, d)| match i {
                    0 | 1 => day(*d, true, "0"),
                    2 => day(*d, false, "2"),
                    _ => day(*d, false, "0"),
                })
                .collect();
            let tasks = (0..10).map(|i| task(i, "120", 5, "2025-03-18")).collect();
            let leaves = vec![leave("2025-03-31", "2025-03-31", PayImpact::full_pay())];

            Self {
                profile: profile(),
                period,
                attendance,
                tasks,
                leaves,
                reward_points: 150,
            }
        }

        fn inputs(&self) -> PayrollInputs<'_> {
            PayrollInputs {
                profile: &self.profile,
                period: &self.period,
                attendance: &self.attendance,
                tasks: &self.tasks,
                leaves: &self.leaves,
                reward_points: self.reward_points,
            }
        }
    }

    #[test]
    fn test_standard_month() {
        let fixture = Fixture::standard();
        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();

        assert_eq!(record.base_salary, dec("66000"));
        assert_eq!(record.attendance.working_days, 21);
        assert_eq!(record.attendance.present_days, 20);
        assert_eq!(record.attendance.leave_days, dec("1"));
        assert_eq!(record.attendance.absent_days, 0);
        assert_eq!(record.attendance.late_days, 2);
        assert_eq!(record.attendance.attendance_percentage, dec("95.24"));
        assert_eq!(record.earned_salary, dec("60000"));

        assert_eq!(record.bonuses.attendance, dec("1320"));
        assert_eq!(record.bonuses.efficiency, dec("3300"));
        assert_eq!(record.bonuses.quality, dec("3300"));
        assert_eq!(record.bonuses.task_completion, dec("1320"));
        assert_eq!(record.bonuses.reward_points, dec("150"));
        assert_eq!(record.bonuses.overtime, dec("1125"));
        assert_eq!(record.bonuses.total, dec("10515"));
        assert_eq!(record.gross_salary, dec("70515"));

        assert_eq!(record.penalties.late, dec("200"));
        assert_eq!(record.penalties.total, dec("200"));

        // 1250 + (70515 - 50000) x 0.2
        assert_eq!(record.statutory_deductions.tax, dec("5353"));
        assert_eq!(record.statutory_deductions.provident_fund, dec("7200"));
        assert_eq!(record.statutory_deductions.esi, Decimal::ZERO);
        assert_eq!(record.net_salary, dec("57762"));
    }

    #[test]
    fn test_recomputation_is_identical_except_timestamp() {
        let fixture = Fixture::standard();
        let snapshot = policies();
        let first = calculate_payroll(&fixture.inputs(), &snapshot, run_at(0)).unwrap();
        let second = calculate_payroll(&fixture.inputs(), &snapshot, run_at(30)).unwrap();

        assert_ne!(first.computed_at, second.computed_at);
        assert_eq!(first.without_run_metadata(), second.without_run_metadata());
        assert_eq!(
            serde_json::to_string(&first.without_run_metadata()).unwrap(),
            serde_json::to_string(&second.without_run_metadata()).unwrap()
        );
    }

    #[test]
    fn test_absence_and_leave_deductions() {
        let mut fixture = Fixture::standard();
        let days = weekdays(&fixture.period);
        fixture.attendance = days[..18].iter().map(|d| day(*d, false, "0")).collect();
        let same_day = PayImpact {
            pay_type: PayType::SalaryDeduction,
            deduction: dec("1"),
            penalty: dec("500"),
            penalty_applied: true,
            message: String::new(),
        };
        fixture.leaves = vec![leave("2025-03-31", "2025-03-31", same_day)];

        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();

        // 21 working days - 18 present - 1 leave
        assert_eq!(record.attendance.absent_days, 2);
        // 2 x 0.5 x 3000
        assert_eq!(record.penalties.absent, dec("3000"));
        // 1 x 3000 + 500
        assert_eq!(record.penalties.leave, dec("3500"));
    }

    #[test]
    fn test_open_and_out_of_period_records_are_ignored() {
        let mut fixture = Fixture::standard();
        let mut open = day(date("2025-03-31"), false, "0");
        open.clock_out = None;
        fixture.attendance.push(open);
        fixture.attendance.push(day(date("2025-04-01"), true, "0"));

        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();
        assert_eq!(record.attendance.present_days, 20);
        assert_eq!(record.attendance.late_days, 2);
    }

    #[test]
    fn test_missed_deadlines_are_penalised() {
        let mut fixture = Fixture::standard();
        fixture.tasks = vec![
            task(1, "100", 4, "2025-03-25"),
            task(2, "100", 4, "2025-03-19"),
        ];
        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();

        assert_eq!(record.tasks.completed_tasks, 2);
        assert_eq!(record.tasks.missed_deadlines, 1);
        assert_eq!(record.penalties.missed_deadlines, dec("500"));
    }

    #[test]
    fn test_holiday_overtime_uses_holiday_multiplier() {
        let mut fixture = Fixture::standard();
        fixture.period.holidays.push(crate::models::Holiday {
            date: date("2025-03-05"),
            name: "Founders Day".to_string(),
        });
        fixture.attendance = vec![day(date("2025-03-05"), false, "2")];

        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();
        // 2h x 375 x 2.5
        assert_eq!(record.bonuses.overtime, dec("1875"));
    }

    #[test]
    fn test_low_earner_pays_esi() {
        let mut fixture = Fixture::standard();
        fixture.profile.base_salary = Some(dec("11000"));
        fixture.tasks.clear();
        fixture.reward_points = 0;

        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();
        // earned 500 x 20 = 10000; ESI 0.75% of earned
        assert_eq!(record.earned_salary, dec("10000"));
        assert_eq!(record.statutory_deductions.esi, dec("75"));
        assert_eq!(record.statutory_deductions.tax, Decimal::ZERO);
    }

    #[test]
    fn test_custom_adjustments_are_added_to_bonuses() {
        let mut fixture = Fixture::standard();
        fixture.profile.custom_adjustments = vec![
            SalaryAdjustment {
                label: "Remote allowance".to_string(),
                amount: dec("2000"),
            },
            SalaryAdjustment {
                label: "Laptop recovery".to_string(),
                amount: dec("-500"),
            },
        ];
        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();
        assert_eq!(record.bonuses.adjustments, dec("1500"));
        assert_eq!(record.bonuses.total, dec("12015"));
    }

    #[test]
    fn test_unknown_salary_grade_is_policy_not_found() {
        let mut fixture = Fixture::standard();
        fixture.profile.role = "astronaut".to_string();
        match calculate_payroll(&fixture.inputs(), &policies(), run_at(0)) {
            Err(EngineError::PolicyNotFound { table }) => {
                assert_eq!(table, "payroll.salary_structure.astronaut.mid")
            }
            other => panic!("Expected PolicyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_audit_steps_are_numbered_in_order() {
        let fixture = Fixture::standard();
        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();
        for (i, step) in record.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, i as u32 + 1);
        }
        assert_eq!(record.audit_steps.first().unwrap().rule_id, "base_salary");
        assert_eq!(record.audit_steps.last().unwrap().rule_id, "net_salary");
    }

    #[test]
    fn test_inverted_period_is_invalid() {
        let mut fixture = Fixture::standard();
        fixture.period = PayPeriod {
            start_date: date("2025-03-31"),
            end_date: date("2025-03-01"),
            holidays: vec![],
        };
        let result = calculate_payroll(&fixture.inputs(), &policies(), run_at(0));
        assert!(matches!(result, Err(EngineError::InvalidRecord { field, .. }) if field == "period"));
    }

    #[test]
    fn test_period_without_working_days() {
        let mut fixture = Fixture::standard();
        // Saturday and Sunday only.
        fixture.period = PayPeriod {
            start_date: date("2025-03-01"),
            end_date: date("2025-03-02"),
            holidays: vec![],
        };
        let record = calculate_payroll(&fixture.inputs(), &policies(), run_at(0)).unwrap();

        assert_eq!(record.attendance.working_days, 0);
        assert_eq!(record.attendance.present_days, 0);
        assert_eq!(record.attendance.absent_days, 0);
        assert_eq!(record.attendance.attendance_percentage, Decimal::ZERO);
        assert_eq!(record.earned_salary, Decimal::ZERO);
        assert_eq!(record.penalties.absent, Decimal::ZERO);
    }

    #[test]
    fn test_out_of_range_salary_amounts_are_invalid() {
        let mut fixture = Fixture::standard();
        fixture.profile.base_salary = Some(Decimal::MAX);
        let result = calculate_payroll(&fixture.inputs(), &policies(), run_at(0));
        assert!(matches!(result, Err(EngineError::InvalidRecord { field, .. }) if field == "base_salary"));

        let mut fixture = Fixture::standard();
        fixture.profile.custom_adjustments = vec![SalaryAdjustment {
            label: "Windfall".to_string(),
            amount: Decimal::MIN,
        }];
        let result = calculate_payroll(&fixture.inputs(), &policies(), run_at(0));
        assert!(
            matches!(result, Err(EngineError::InvalidRecord { field, .. }) if field == "custom_adjustments")
        );
    }

    #[test]
    fn test_overflowing_efficiency_sum_is_a_calculation_error() {
        let mut fixture = Fixture::standard();
        fixture.tasks = (0..2)
            .map(|i| task(i, "50000000000000000000000000000", 5, "2025-03-18"))
            .collect();
        let result = calculate_payroll(&fixture.inputs(), &policies(), run_at(0));
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}
