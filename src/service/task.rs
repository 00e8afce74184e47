//! Task lifecycle and project summaries.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::{complete_task, roll_up_all, roll_up_project};
use crate::config::PolicyStore;
use crate::error::{EngineError, EngineResult};
use crate::models::{ProjectSummary, TaskCompletion, TaskCompletionEvent, TaskStartEvent, TatRecord};
use crate::repository::TaskRepository;

use super::lock;

/// Starts and completes tasks and rolls them up per project.
pub struct TaskService {
    policies: Arc<PolicyStore>,
    tasks: Arc<dyn TaskRepository>,
    writes: Mutex<()>,
}

impl TaskService {
    /// Creates a service over a policy store and a task repository.
    pub fn new(policies: Arc<PolicyStore>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self {
            policies,
            tasks,
            writes: Mutex::new(()),
        }
    }

    /// Records a new in-progress task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRecord`] if the task id is taken or the
    /// planned hours are negative.
    pub fn start_task(&self, event: &TaskStartEvent) -> EngineResult<TatRecord> {
        if event.planned_hours < Decimal::ZERO {
            return Err(EngineError::InvalidRecord {
                field: "planned_hours".to_string(),
                message: "planned hours cannot be negative".to_string(),
            });
        }

        let _guard = lock(&self.writes, "task writes")?;
        if self.tasks.get(&event.task_id)?.is_some() {
            return Err(EngineError::InvalidRecord {
                field: "task_id".to_string(),
                message: format!("task '{}' already exists", event.task_id),
            });
        }

        let record = TatRecord::start(event);
        self.tasks.save(record.clone())?;
        info!(
            task_id = %record.task_id,
            project_id = %record.project_id,
            "Task started"
        );
        Ok(record)
    }

    /// Completes a task and grants its rewards.
    ///
    /// # Errors
    ///
    /// - [`EngineError::TaskNotFound`] if the task was never started.
    /// - [`EngineError::InvalidRecord`] if the event names another employee.
    /// - Any error of [`complete_task`].
    pub fn complete_task(&self, event: &TaskCompletionEvent) -> EngineResult<TaskCompletion> {
        let record = self.stored(&event.task_id)?;
        if record.employee_id != event.employee_id {
            return Err(EngineError::InvalidRecord {
                field: "employee_id".to_string(),
                message: format!(
                    "task '{}' belongs to '{}', not '{}'",
                    record.task_id, record.employee_id, event.employee_id
                ),
            });
        }

        let snapshot = self.policies.snapshot();
        let completion = complete_task(&record, event, &snapshot.reward)?;

        // Another completion may have landed while the rewards were evaluated.
        {
            let _guard = lock(&self.writes, "task writes")?;
            if self.stored(&event.task_id)?.is_completed() {
                return Err(EngineError::TaskAlreadyCompleted {
                    task_id: event.task_id.clone(),
                });
            }
            self.tasks.save(completion.record.clone())?;
        }

        info!(
            task_id = %completion.record.task_id,
            efficiency = %completion.record.efficiency,
            total_value = %completion.total_value,
            "Task completed"
        );
        Ok(completion)
    }

    fn stored(&self, task_id: &str) -> EngineResult<TatRecord> {
        self.tasks
            .get(task_id)?
            .ok_or_else(|| EngineError::TaskNotFound {
                task_id: task_id.to_string(),
            })
    }

    /// Summary of one project as of a date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ProjectNotFound`] if no task names the project.
    pub fn project_summary(&self, project_id: &str, as_of: NaiveDate) -> EngineResult<ProjectSummary> {
        let records = self.tasks.list_for_project(project_id)?;
        if records.is_empty() {
            return Err(EngineError::ProjectNotFound {
                project_id: project_id.to_string(),
            });
        }
        let snapshot = self.policies.snapshot();
        roll_up_project(project_id, &records, as_of, &snapshot.reward)
    }

    /// Summaries of every project, ordered by project id.
    pub fn project_summaries(&self, as_of: NaiveDate) -> EngineResult<Vec<ProjectSummary>> {
        let records = self.tasks.list_all()?;
        let snapshot = self.policies.snapshot();
        roll_up_all(&records, as_of, &snapshot.reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalState, ProjectGrade, ProjectStatus};
    use crate::service::fixtures::backing;
    use crate::test_support::{date, datetime, dec};

    fn service() -> TaskService {
        let backing = backing();
        TaskService::new(backing.policies, backing.tasks)
    }

    fn start(task_id: &str, project_id: &str, planned_end: &str) -> TaskStartEvent {
        TaskStartEvent {
            task_id: task_id.to_string(),
            employee_id: "emp_001".to_string(),
            project_id: project_id.to_string(),
            planned_hours: dec("8"),
            planned_end_date: date(planned_end),
        }
    }

    fn completion(task_id: &str, actual: &str, completed_at: &str) -> TaskCompletionEvent {
        TaskCompletionEvent {
            task_id: task_id.to_string(),
            employee_id: "emp_001".to_string(),
            planned_hours: dec("8"),
            actual_hours: dec(actual),
            quality_rating: Some(5),
            approval_state: ApprovalState::Approved,
            completed_at: datetime(completed_at),
        }
    }

    #[test]
    fn test_start_then_complete() {
        let service = service();
        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();
        let done = service
            .complete_task(&completion("t1", "6", "2025-03-07 16:00:00"))
            .unwrap();

        assert_eq!(done.record.efficiency, dec("133"));
        assert_eq!(done.total_value, dec("305"));

        let again = service.complete_task(&completion("t1", "6", "2025-03-07 17:00:00"));
        assert!(matches!(again, Err(EngineError::TaskAlreadyCompleted { .. })));
    }

    #[test]
    fn test_overflowing_hours_leave_the_service_usable() {
        let service = service();
        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();
        let mut event = completion("t1", "6", "2025-03-07 16:00:00");
        event.actual_hours = Decimal::new(1, 28);

        let result = service.complete_task(&event);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));

        // The task stays open and later writes still go through.
        service.start_task(&start("t2", "alpha", "2025-03-10")).unwrap();
        let done = service
            .complete_task(&completion("t1", "8", "2025-03-07 16:00:00"))
            .unwrap();
        assert_eq!(done.record.efficiency, dec("100"));
    }

    #[test]
    fn test_concurrent_completions_complete_once() {
        let service = Arc::new(service());
        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                std::thread::spawn(move || {
                    service.complete_task(&completion("t1", "6", "2025-03-07 16:00:00"))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, EngineError::TaskAlreadyCompleted { .. }))
        );
    }

    #[test]
    fn test_duplicate_start_is_rejected() {
        let service = service();
        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();
        let result = service.start_task(&start("t1", "beta", "2025-03-10"));
        assert!(matches!(result, Err(EngineError::InvalidRecord { field, .. }) if field == "task_id"));
    }

    #[test]
    fn test_unknown_task_and_wrong_employee() {
        let service = service();
        let result = service.complete_task(&completion("missing", "6", "2025-03-07 16:00:00"));
        assert!(matches!(result, Err(EngineError::TaskNotFound { .. })));

        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();
        let mut event = completion("t1", "6", "2025-03-07 16:00:00");
        event.employee_id = "emp_002".to_string();
        assert!(matches!(
            service.complete_task(&event),
            Err(EngineError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_project_summary() {
        let service = service();
        service.start_task(&start("t1", "alpha", "2025-03-10")).unwrap();
        service.start_task(&start("t2", "alpha", "2025-03-10")).unwrap();
        service
            .complete_task(&completion("t1", "7", "2025-03-07 16:00:00"))
            .unwrap();
        service
            .complete_task(&completion("t2", "7", "2025-03-10 16:00:00"))
            .unwrap();

        let summary = service.project_summary("alpha", date("2025-03-31")).unwrap();
        assert_eq!(summary.completed_tasks, 2);
        assert_eq!(summary.average_efficiency, dec("114"));
        assert_eq!(summary.on_time_delivery_rate, dec("100"));
        assert_eq!(summary.status, ProjectStatus::Excellent);
        assert_eq!(summary.grade, ProjectGrade::A);

        let missing = service.project_summary("beta", date("2025-03-31"));
        assert!(matches!(missing, Err(EngineError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_project_summaries_cover_every_project() {
        let service = service();
        service.start_task(&start("t1", "beta", "2025-03-10")).unwrap();
        service.start_task(&start("t2", "alpha", "2025-03-10")).unwrap();

        let summaries = service.project_summaries(date("2025-03-31")).unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.project_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "beta"]);
        assert!(summaries.iter().all(|s| s.status == ProjectStatus::AtRisk));
    }
}
