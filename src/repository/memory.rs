//! In-memory repository implementations.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, LeaveApplication, LeaveBalance, PayrollRecord, TatRecord};

use super::{AttendanceRepository, LeaveRepository, PayrollRepository, TaskRepository};

fn read<'a, T>(lock: &'a RwLock<T>, name: &str) -> EngineResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| EngineError::StorageError {
        message: format!("{} lock poisoned", name),
    })
}

fn write<'a, T>(lock: &'a RwLock<T>, name: &str) -> EngineResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| EngineError::StorageError {
        message: format!("{} lock poisoned", name),
    })
}

/// Attendance records in a map keyed by (employee, date).
#[derive(Debug, Default)]
pub struct InMemoryAttendanceRepository {
    records: RwLock<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
}

impl InMemoryAttendanceRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceRepository for InMemoryAttendanceRepository {
    fn find(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Option<AttendanceRecord>> {
        let records = read(&self.records, "attendance")?;
        Ok(records.get(&(employee_id.to_string(), date)).cloned())
    }

    fn save(&self, record: AttendanceRecord) -> EngineResult<()> {
        let mut records = write(&self.records, "attendance")?;
        records.insert((record.employee_id.clone(), record.date), record);
        Ok(())
    }

    fn list_for_employee(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        if end < start {
            return Ok(Vec::new());
        }
        let records = read(&self.records, "attendance")?;
        Ok(records
            .range((employee_id.to_string(), start)..=(employee_id.to_string(), end))
            .map(|(_, record)| record.clone())
            .collect())
    }
}

/// TAT records in a map keyed by task id.
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    records: RwLock<BTreeMap<String, TatRecord>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn get(&self, task_id: &str) -> EngineResult<Option<TatRecord>> {
        Ok(read(&self.records, "task")?.get(task_id).cloned())
    }

    fn save(&self, record: TatRecord) -> EngineResult<()> {
        write(&self.records, "task")?.insert(record.task_id.clone(), record);
        Ok(())
    }

    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<TatRecord>> {
        let records = read(&self.records, "task")?;
        Ok(records
            .values()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn list_for_project(&self, project_id: &str) -> EngineResult<Vec<TatRecord>> {
        let records = read(&self.records, "task")?;
        Ok(records
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> EngineResult<Vec<TatRecord>> {
        Ok(read(&self.records, "task")?.values().cloned().collect())
    }
}

type BalanceKey = (String, String, i32);

/// Leave applications by id and balances by (employee, leave type, year).
#[derive(Debug, Default)]
pub struct InMemoryLeaveRepository {
    applications: RwLock<BTreeMap<String, LeaveApplication>>,
    balances: RwLock<BTreeMap<BalanceKey, LeaveBalance>>,
}

impl InMemoryLeaveRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LeaveRepository for InMemoryLeaveRepository {
    fn get_application(&self, id: &str) -> EngineResult<Option<LeaveApplication>> {
        Ok(read(&self.applications, "leave application")?.get(id).cloned())
    }

    fn save_application(&self, application: LeaveApplication) -> EngineResult<()> {
        write(&self.applications, "leave application")?
            .insert(application.id.clone(), application);
        Ok(())
    }

    fn list_applications(&self, employee_id: &str) -> EngineResult<Vec<LeaveApplication>> {
        let applications = read(&self.applications, "leave application")?;
        Ok(applications
            .values()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn get_balance(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
    ) -> EngineResult<Option<LeaveBalance>> {
        let balances = read(&self.balances, "leave balance")?;
        Ok(balances
            .get(&(employee_id.to_string(), leave_type.to_string(), year))
            .cloned())
    }

    fn save_balance(
        &self,
        employee_id: &str,
        leave_type: &str,
        year: i32,
        balance: LeaveBalance,
    ) -> EngineResult<()> {
        write(&self.balances, "leave balance")?.insert(
            (employee_id.to_string(), leave_type.to_string(), year),
            balance,
        );
        Ok(())
    }
}

/// Payroll records keyed by (employee, period key).
#[derive(Debug, Default)]
pub struct InMemoryPayrollRepository {
    records: RwLock<BTreeMap<(String, String), PayrollRecord>>,
}

impl InMemoryPayrollRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PayrollRepository for InMemoryPayrollRepository {
    fn upsert(&self, record: PayrollRecord) -> EngineResult<Option<PayrollRecord>> {
        let key = (record.employee_id.clone(), record.period.key());
        Ok(write(&self.records, "payroll")?.insert(key, record))
    }

    fn get(&self, employee_id: &str, period_key: &str) -> EngineResult<Option<PayrollRecord>> {
        let records = read(&self.records, "payroll")?;
        Ok(records
            .get(&(employee_id.to_string(), period_key.to_string()))
            .cloned())
    }

    fn list_for_employee(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let records = read(&self.records, "payroll")?;
        Ok(records
            .iter()
            .filter(|((employee, _), _)| employee == employee_id)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceClockEvent, ClockInResult, ClockMethod, PayrollRecord, TaskStartEvent,
    };
    use crate::test_support::{date, datetime, dec};

    fn record(employee_id: &str, ts: &str) -> AttendanceRecord {
        let event = AttendanceClockEvent {
            employee_id: employee_id.to_string(),
            timestamp: datetime(ts),
            location: None,
            method: ClockMethod::Manual,
        };
        let effect = ClockInResult {
            is_late: false,
            late_by: 0,
            penalty: dec("0"),
            bonus: dec("0"),
            points: 0,
            milestone: None,
        };
        AttendanceRecord::open(&event, &effect)
    }

    #[test]
    fn test_attendance_range_is_per_employee_and_inclusive() {
        let repo = InMemoryAttendanceRepository::new();
        repo.save(record("emp_001", "2025-03-03 09:00:00")).unwrap();
        repo.save(record("emp_001", "2025-03-04 09:00:00")).unwrap();
        repo.save(record("emp_001", "2025-03-10 09:00:00")).unwrap();
        repo.save(record("emp_002", "2025-03-04 09:00:00")).unwrap();

        let found = repo
            .list_for_employee("emp_001", date("2025-03-03"), date("2025-03-04"))
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.employee_id == "emp_001"));
        assert!(repo.find("emp_002", date("2025-03-03")).unwrap().is_none());

        let inverted = repo
            .list_for_employee("emp_001", date("2025-03-31"), date("2025-03-01"))
            .unwrap();
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_task_lists_by_project() {
        let repo = InMemoryTaskRepository::new();
        for (task, project) in [("t1", "alpha"), ("t2", "beta"), ("t3", "alpha")] {
            repo.save(TatRecord::start(&TaskStartEvent {
                task_id: task.to_string(),
                employee_id: "emp_001".to_string(),
                project_id: project.to_string(),
                planned_hours: dec("4"),
                planned_end_date: date("2025-03-10"),
            }))
            .unwrap();
        }
        assert_eq!(repo.list_for_project("alpha").unwrap().len(), 2);
        assert_eq!(repo.list_for_employee("emp_001").unwrap().len(), 3);
        assert_eq!(repo.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_balances_are_keyed_by_year() {
        let repo = InMemoryLeaveRepository::new();
        repo.save_balance("emp_001", "annual_leave", 2025, LeaveBalance::open(dec("18"), dec("0")))
            .unwrap();

        assert!(repo.get_balance("emp_001", "annual_leave", 2025).unwrap().is_some());
        assert!(repo.get_balance("emp_001", "annual_leave", 2026).unwrap().is_none());
        assert!(repo.get_balance("emp_001", "sick_leave", 2025).unwrap().is_none());
    }

    fn payroll(net: &str) -> PayrollRecord {
        let json = serde_json::json!({
            "employee_id": "emp_001",
            "period": { "start_date": "2025-03-01", "end_date": "2025-03-31" },
            "policy_version": 1,
            "base_salary": "66000",
            "earned_salary": "60000",
            "attendance": {
                "working_days": 21, "present_days": 20, "absent_days": 0, "late_days": 0,
                "leave_days": "1", "attendance_percentage": "95.24", "overtime_hours": "0"
            },
            "tasks": {
                "completed_tasks": 0, "average_efficiency": "0", "average_quality": "0",
                "missed_deadlines": 0
            },
            "bonuses": {
                "efficiency": "0", "quality": "0", "attendance": "0", "task_completion": "0",
                "reward_points": "0", "overtime": "0", "adjustments": "0", "total": "0"
            },
            "penalties": { "late": "0", "missed_deadlines": "0", "absent": "0", "leave": "0", "total": "0" },
            "statutory_deductions": { "tax": "0", "provident_fund": "0", "esi": "0", "total": "0" },
            "gross_salary": "60000",
            "net_salary": net,
            "audit_steps": [],
            "computed_at": "2025-04-01T00:00:00Z"
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_payroll_upsert_replaces_same_period() {
        let repo = InMemoryPayrollRepository::new();
        assert!(repo.upsert(payroll("50000")).unwrap().is_none());
        let replaced = repo.upsert(payroll("51000")).unwrap();

        assert_eq!(replaced.unwrap().net_salary, dec("50000"));
        let stored = repo.list_for_employee("emp_001").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].net_salary, dec("51000"));
        assert!(repo.get("emp_001", "2025-03-01..2025-03-31").unwrap().is_some());
    }
}
