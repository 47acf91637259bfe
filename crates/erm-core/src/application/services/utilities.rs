//! Observations, process history, tasks and notifications

use chrono::Utc;
use std::cmp::Reverse;
use std::sync::Arc;

use crate::application::dto::{NewObservation, NewTask, ObservationView};
use crate::domain::aggregates::{Notification, Observation, ProcessChange, Task, TaskStatus};
use crate::domain::value_objects::{required_text, EntityId};
use crate::error::{ServiceError, ServiceResult};
use crate::infrastructure::persistence::{RiskStore, Tables};

fn observation_view(tables: &Tables, observation: &Observation) -> ObservationView {
    ObservationView {
        observation: observation.clone(),
        author: tables.users.get(&observation.author_id).cloned(),
    }
}

pub struct UtilityService {
    store: Arc<RiskStore>,
}

impl UtilityService {
    pub fn new(store: Arc<RiskStore>) -> Self {
        Self { store }
    }

    // ============ Observations ============

    /// Newest first
    pub fn observations(&self, process_id: Option<&EntityId>) -> Vec<ObservationView> {
        self.store.read(|tables| {
            let mut rows: Vec<&Observation> = tables
                .observations
                .values()
                .filter(|o| process_id.map_or(true, |p| &o.process_id == p))
                .collect();
            rows.sort_by_key(|o| Reverse(o.created_at));
            rows.into_iter().map(|o| observation_view(tables, o)).collect()
        })
    }

    pub fn add_observation(&self, command: NewObservation) -> ServiceResult<ObservationView> {
        let view = self.store.transact(|tables| {
            tables.process(&command.process_id)?;
            tables.user(&command.author_id)?;
            let observation = Observation {
                id: EntityId::new(),
                process_id: command.process_id,
                author_id: command.author_id,
                text: required_text("text", &command.text)?,
                created_at: Utc::now(),
            };
            tables.observations.insert(observation.id.clone(), observation.clone());
            Ok::<_, ServiceError>(observation_view(tables, &observation))
        })?;
        tracing::info!(
            observation_id = %view.observation.id,
            process_id = %view.observation.process_id,
            "Observation added"
        );
        Ok(view)
    }

    // ============ History ============

    /// Newest first. Rows of deleted processes are kept.
    pub fn history(&self, process_id: Option<&EntityId>) -> Vec<ProcessChange> {
        self.store.read(|tables| {
            tables
                .process_history
                .iter()
                .rev()
                .filter(|c| process_id.map_or(true, |p| &c.process_id == p))
                .cloned()
                .collect()
        })
    }

    // ============ Tasks ============

    /// Newest first
    pub fn tasks(&self, user_id: Option<&EntityId>) -> Vec<Task> {
        self.store.read(|tables| {
            let mut tasks: Vec<Task> = tables
                .tasks
                .values()
                .filter(|t| user_id.map_or(true, |u| &t.user_id == u))
                .cloned()
                .collect();
            tasks.sort_by_key(|t| Reverse(t.created_at));
            tasks
        })
    }

    /// The assignee is notified in the same transaction
    pub fn create_task(&self, command: NewTask) -> ServiceResult<Task> {
        let task = self.store.transact(|tables| {
            tables.user(&command.user_id)?;
            let task = Task {
                id: EntityId::new(),
                user_id: command.user_id,
                title: required_text("title", &command.title)?,
                description: command.description,
                due_date: command.due_date,
                status: TaskStatus::default(),
                created_at: Utc::now(),
            };
            let notification = Notification::new(task.user_id.clone(), format!("New task assigned: {}", task.title));
            tables.notifications.insert(notification.id.clone(), notification);
            tables.tasks.insert(task.id.clone(), task.clone());
            Ok::<_, ServiceError>(task)
        })?;
        tracing::info!(task_id = %task.id, user_id = %task.user_id, "Task created");
        Ok(task)
    }

    pub fn set_task_status(&self, id: &EntityId, status: TaskStatus) -> ServiceResult<Task> {
        self.store.transact(|tables| {
            let task = tables.tasks.get_mut(id).ok_or_else(|| ServiceError::not_found("task", id))?;
            task.status = status;
            Ok(task.clone())
        })
    }

    // ============ Notifications ============

    /// Newest first
    pub fn notifications(&self, user_id: Option<&EntityId>, unread_only: bool) -> Vec<Notification> {
        self.store.read(|tables| {
            let mut rows: Vec<Notification> = tables
                .notifications
                .values()
                .filter(|n| user_id.map_or(true, |u| &n.user_id == u))
                .filter(|n| !unread_only || !n.read)
                .cloned()
                .collect();
            rows.sort_by_key(|n| Reverse(n.created_at));
            rows
        })
    }

    pub fn mark_read(&self, id: &EntityId) -> ServiceResult<Notification> {
        self.store.transact(|tables| {
            let notification = tables
                .notifications
                .get_mut(id)
                .ok_or_else(|| ServiceError::not_found("notification", id))?;
            notification.read = true;
            Ok(notification.clone())
        })
    }
}
