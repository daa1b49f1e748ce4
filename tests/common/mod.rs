//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

use tasklist_undo::deleter::TaskDeleter;
use tasklist_undo::scheduler::ManualScheduler;
use tasklist_undo::{DeleteFailure, Task, TaskPriority, TaskStatus, UndoConfig, UndoDeleteController};

/// Default undo window used by the fixtures.
pub const WINDOW: Duration = Duration::from_secs(10);

/// Deleter that records calls and fails for configured task ids.
#[derive(Default)]
pub struct RecordingDeleter {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, DeleteFailure>>,
}

impl RecordingDeleter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_for(&self, task_id: &str, failure: DeleteFailure) {
        self.failures.lock().insert(task_id.to_string(), failure);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TaskDeleter for RecordingDeleter {
    async fn delete(&self, task_id: &str) -> Result<(), DeleteFailure> {
        self.calls.lock().push(task_id.to_string());
        match self.failures.lock().get(task_id) {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

/// Deleter that blocks until released, to hold a commit in flight.
pub struct GatedDeleter {
    pub started: Notify,
    release: Semaphore,
    outcome: Result<(), DeleteFailure>,
}

impl GatedDeleter {
    pub fn new(outcome: Result<(), DeleteFailure>) -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Semaphore::new(0),
            outcome,
        })
    }

    pub fn release(&self) {
        self.release.add_permits(1);
    }
}

#[async_trait]
impl TaskDeleter for GatedDeleter {
    async fn delete(&self, _task_id: &str) -> Result<(), DeleteFailure> {
        self.started.notify_one();
        if let Ok(permit) = self.release.acquire().await {
            permit.forget();
        }
        self.outcome.clone()
    }
}

pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("t1", "Write report")
            .with_user("u-1")
            .with_status(TaskStatus::InProgress)
            .with_priority(TaskPriority::High)
            .with_category("work")
            .with_description("Quarterly numbers"),
        Task::new("t2", "Book flights").with_category("travel"),
        Task::new("t3", "Water plants").with_status(TaskStatus::Completed),
    ]
}

pub fn controller_with(
    deleter: Arc<dyn TaskDeleter>,
) -> (UndoDeleteController, Arc<ManualScheduler>) {
    let scheduler = Arc::new(ManualScheduler::new());
    let controller = UndoDeleteController::new(
        UndoConfig::default().with_undo_window(WINDOW),
        scheduler.clone(),
        deleter,
    );
    controller.load_tasks(sample_tasks());
    (controller, scheduler)
}

pub fn visible_ids(controller: &UndoDeleteController) -> Vec<String> {
    controller.tasks().into_iter().map(|t| t.id).collect()
}

pub fn notification_ids(controller: &UndoDeleteController) -> Vec<String> {
    controller.notifications().into_iter().map(|n| n.id).collect()
}
