//! Task list store.
//!
//! # Responsibility
//! - Own the task list and persist it after every mutation.
//! - Provide filtered views and the persisted priority sort.
//!
//! # Invariants
//! - Task ids are unique and strictly increasing in issue order.
//! - List order changes only through [`TaskListStore::sort`] (and appends).
//! - A failed write leaves the in-memory list untouched.

use crate::model::task::{Priority, Task, TaskFilter, TaskId, TaskValidationError};
use crate::repo::kv_repo::{load_list, save_list, KvRepository, RepoError, TODOS_KEY};
use crate::service::store_error::{StoreError, StoreResult};
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;

/// Task list backed by a key-value repository.
pub struct TaskListStore<R: KvRepository> {
    repo: R,
    tasks: Vec<Task>,
    last_issued_id: TaskId,
}

impl<R: KvRepository> TaskListStore<R> {
    /// Restores the persisted task list.
    pub fn load(repo: R) -> StoreResult<Self> {
        let tasks: Vec<Task> = load_list(&repo, TODOS_KEY)?;
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            task.validate().map_err(|err| RepoError::InvalidData {
                key: TODOS_KEY.to_string(),
                message: format!("task {}: {err}", task.id),
            })?;
            if !seen.insert(task.id) {
                return Err(RepoError::InvalidData {
                    key: TODOS_KEY.to_string(),
                    message: format!("duplicate task id {}", task.id),
                }
                .into());
            }
        }
        let last_issued_id = tasks.iter().map(|task| task.id).max().unwrap_or(0);
        info!("event=task_load module=task status=ok tasks={}", tasks.len());
        Ok(Self {
            repo,
            tasks,
            last_issued_id,
        })
    }

    /// Appends a new incomplete, unarchived task.
    pub fn add(&mut self, text: &str, priority: Priority) -> StoreResult<Task> {
        let text = normalize_text(text)?;
        let task = Task {
            id: self.peek_next_id()?,
            text,
            priority,
            completed: false,
            archived: false,
            created_at: Utc::now(),
        };

        let mut next = self.tasks.clone();
        next.push(task.clone());
        self.commit(next)?;
        self.last_issued_id = task.id;
        info!(
            "event=task_add module=task status=ok id={} priority={}",
            task.id, task.priority
        );
        Ok(task)
    }

    /// Flips the completion flag.
    pub fn toggle_complete(&mut self, id: TaskId) -> StoreResult<Task> {
        self.mutate(id, "toggle_complete", |task| task.completed = !task.completed)
    }

    /// Replaces the task text.
    pub fn edit(&mut self, id: TaskId, text: &str) -> StoreResult<Task> {
        let text = normalize_text(text)?;
        self.mutate(id, "edit", move |task| task.text = text)
    }

    /// Flips the archived flag.
    pub fn archive(&mut self, id: TaskId) -> StoreResult<Task> {
        self.mutate(id, "archive", |task| task.archived = !task.archived)
    }

    /// Deletes a task. Returns `Ok(false)` when the id is unknown.
    pub fn delete(&mut self, id: TaskId) -> StoreResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        next.remove(index);
        self.commit(next)?;
        info!("event=task_delete module=task status=ok id={id}");
        Ok(true)
    }

    /// Returns tasks accepted by `criterion`, in stored order.
    pub fn filter(&self, criterion: TaskFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| criterion.accepts(task))
            .cloned()
            .collect()
    }

    /// Tasks the interval timer may be linked to.
    pub fn active_for_timer(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_actionable())
            .cloned()
            .collect()
    }

    /// Reorders the stored list: incomplete first, then priority high to low.
    ///
    /// The sort is stable, so applying it twice yields the same order.
    pub fn sort(&mut self) -> StoreResult<()> {
        let mut next = self.tasks.clone();
        next.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
        });
        self.commit(next)?;
        info!("event=task_sort module=task status=ok tasks={}", self.tasks.len());
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn mutate(
        &mut self,
        id: TaskId,
        op: &'static str,
        apply: impl FnOnce(&mut Task),
    ) -> StoreResult<Task> {
        let index = self.position(id).ok_or(StoreError::TaskNotFound(id))?;
        let mut next = self.tasks.clone();
        apply(&mut next[index]);
        let updated = next[index].clone();
        self.commit(next)?;
        info!("event=task_{op} module=task status=ok id={id}");
        Ok(updated)
    }

    fn peek_next_id(&self) -> StoreResult<TaskId> {
        let floor = self
            .last_issued_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted)?;
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        Ok(now_ms.max(floor))
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn commit(&mut self, next: Vec<Task>) -> StoreResult<()> {
        if let Err(err) = save_list(&self.repo, TODOS_KEY, &next) {
            warn!("event=task_persist module=task status=error error={err}");
            return Err(err.into());
        }
        self.tasks = next;
        Ok(())
    }
}

fn normalize_text(raw: &str) -> Result<String, TaskValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyText);
    }
    Ok(trimmed.to_string())
}
