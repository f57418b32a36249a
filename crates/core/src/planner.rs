//! Command layer shared by every protocol surface
//!
//! REST handlers and GraphQL resolvers both call into [`Planner`], so a
//! record written through one surface is immediately visible through the
//! other with the same validation and error semantics.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use crate::notify::{ChangeAction, ChangeEvent, ChangeNotifier};
use crate::store::RecordStore;
use crate::task::{BulkTaskUpdate, NewTask, Task, TaskPatch, TaskRepository};
use crate::week::{Week, WeekInput, WeekRepository};
use crate::Result;

#[derive(Clone)]
pub struct Planner {
    weeks: WeekRepository,
    tasks: TaskRepository,
    notifier: ChangeNotifier,
}

impl Planner {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            weeks: WeekRepository::new(Arc::clone(&store)),
            tasks: TaskRepository::new(store),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Receive every change committed after this call
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    // ------------------------------------------------------------------
    // Weeks
    // ------------------------------------------------------------------

    pub async fn list_weeks(&self) -> Result<Vec<Week>> {
        self.weeks.list().await
    }

    pub async fn create_week(&self, input: WeekInput) -> Result<Week> {
        let week = self.weeks.create(input).await?;
        info!("Created week {} ({}-W{})", week.id, week.year, week.numweek);
        self.notifier
            .publish(ChangeEvent::week(ChangeAction::Created, &week));
        Ok(week)
    }

    /// Full replace: every field of the stored week is overwritten
    pub async fn update_week(&self, id: &str, input: WeekInput) -> Result<Week> {
        let week = self.weeks.update(id, input).await?;
        info!("Replaced week {}", week.id);
        self.notifier
            .publish(ChangeEvent::week(ChangeAction::Updated, &week));
        Ok(week)
    }

    pub async fn delete_week(&self, id: &str) -> Result<Week> {
        let week = self.weeks.delete(id).await?;
        info!("Deleted week {}", week.id);
        self.notifier
            .publish(ChangeEvent::week(ChangeAction::Deleted, &week));
        Ok(week)
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        self.tasks.list().await
    }

    pub async fn get_task(&self, id: &str) -> Result<Task> {
        self.tasks.get(id).await
    }

    pub async fn create_task(&self, task: NewTask) -> Result<Task> {
        let task = self.tasks.create(task).await?;
        info!("Created task {} on {} {}", task.id, task.yearweek, task.dayofweek);
        self.notifier
            .publish(ChangeEvent::task(ChangeAction::Created, &task));
        Ok(task)
    }

    /// Partial merge: only the fields present in `patch` change
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let task = self.tasks.update(id, patch).await?;
        info!("Updated task {}", task.id);
        self.notifier
            .publish(ChangeEvent::task(ChangeAction::Updated, &task));
        Ok(task)
    }

    /// Update the single task named inside the payload
    pub async fn update_tasks(&self, update: BulkTaskUpdate) -> Result<Task> {
        self.update_task(&update.id, update.patch).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<Task> {
        let task = self.tasks.delete(id).await?;
        info!("Deleted task {}", task.id);
        self.notifier
            .publish(ChangeEvent::task(ChangeAction::Deleted, &task));
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EntityKind;
    use crate::store::MemoryStore;
    use crate::Error;

    fn planner() -> Planner {
        Planner::new(Arc::new(MemoryStore::new()))
    }

    fn week_input() -> WeekInput {
        WeekInput {
            year: 2024,
            numweek: 10,
            color: "#fff".to_string(),
            description: "Sprint".to_string(),
            priority: 1,
            link: String::new(),
        }
    }

    fn new_task(yearweek: &str) -> NewTask {
        NewTask {
            yearweek: yearweek.to_string(),
            dayofweek: "Mon".to_string(),
            name: "A".to_string(),
            description: String::new(),
            color: "#fff".to_string(),
            time_start: "09:00".to_string(),
            time_end: "10:00".to_string(),
            finished: 0,
            priority: 1,
            file: None,
        }
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let planner = planner();
        let mut rx = planner.subscribe();

        let task = planner.create_task(new_task("2024-W10")).await.unwrap();
        planner
            .update_task(&task.id, TaskPatch::file(Some("plan.pdf".to_string())))
            .await
            .unwrap();
        planner.delete_task(&task.id).await.unwrap();

        let actions: Vec<ChangeAction> = (0..3)
            .map(|_| {
                let event = rx.try_recv().unwrap();
                assert_eq!(event.entity, EntityKind::Task);
                event.action
            })
            .collect();
        assert_eq!(
            actions,
            vec![ChangeAction::Created, ChangeAction::Updated, ChangeAction::Deleted]
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_publishes_nothing() {
        let planner = planner();
        let mut rx = planner.subscribe();

        let result = planner.delete_week("missing").await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_task_may_reference_missing_week() {
        let planner = planner();
        let task = planner.create_task(new_task("1999-W01")).await.unwrap();
        assert!(planner.list_weeks().await.unwrap().is_empty());
        assert_eq!(task.yearweek, "1999-W01");
    }

    #[tokio::test]
    async fn test_deleting_week_keeps_tasks() {
        let planner = planner();
        let week = planner.create_week(week_input()).await.unwrap();
        planner.create_task(new_task("2024-W10")).await.unwrap();

        planner.delete_week(&week.id).await.unwrap();
        assert_eq!(planner.list_tasks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_tasks_targets_payload_id() {
        let planner = planner();
        let a = planner.create_task(new_task("2024-W10")).await.unwrap();
        let b = planner.create_task(new_task("2024-W10")).await.unwrap();

        let updated = planner
            .update_tasks(BulkTaskUpdate {
                id: b.id.clone(),
                patch: TaskPatch {
                    finished: Some(1),
                    ..TaskPatch::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.finished, 1);
        assert_eq!(planner.get_task(&a.id).await.unwrap().finished, 0);
    }
}
