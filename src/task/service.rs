//! Task operations for the manager app.

use chrono::NaiveDate;

use crate::classification::ClassificationRegistry;
use crate::error::{Result, ServerError};
use crate::task::{Task, TaskRepository};
use crate::user::User;

/// Creation input for [`TaskService::create_task`].
#[derive(Debug, Clone)]
pub struct NewTask {
    pub tarea: String,
    pub tipo: String,
    pub duracion_total: f64,
    pub fecha_inicio: NaiveDate,
    pub fecha_final: NaiveDate,
}

/// Task manager.
#[derive(Clone)]
pub struct TaskService {
    pub repo: TaskRepository,
    pub classifications: ClassificationRegistry,
}

impl TaskService {
    /// Create a new [`TaskService`].
    pub fn new(
        repo: TaskRepository,
        classifications: ClassificationRegistry,
    ) -> Self {
        Self {
            repo,
            classifications,
        }
    }

    /// Insert a task owned by `user`.
    ///
    /// Dates are checked at creation only; the tier must exist in the
    /// registry. The title is normalized to title case before storage.
    pub async fn create_task(&self, user: &User, new: NewTask) -> Result<Task> {
        if new.fecha_inicio > new.fecha_final {
            return Err(ServerError::InvalidDateRange);
        }
        let classification = self.classifications.get(&new.tipo).await?;

        let task = Task {
            usuario: user.id,
            tarea: title_case(&new.tarea),
            tipo: classification.tipo,
            tiempo_empleado: 0.0,
            duracion_total: new.duracion_total,
            finalizada: false,
            fecha_inicio: new.fecha_inicio,
            fecha_final: new.fecha_final,
            ..Default::default()
        };

        self.repo.insert(&task).await
    }

    /// Every task `user` owns, in insertion order.
    pub async fn list_tasks(&self, user: &User) -> Result<Vec<Task>> {
        self.repo.list_by_owner(user.id).await
    }

    /// Update time spent and completion, writing back only when a field
    /// actually changed.
    pub async fn update_progress(
        &self,
        user: &User,
        task_id: i32,
        tiempo_empleado: f64,
        finalizada: bool,
    ) -> Result<Task> {
        let Some(mut task) = self.repo.find_by_owner(task_id, user.id).await?
        else {
            return Err(ServerError::NotFound("task"));
        };

        let mut modified = false;
        if task.tiempo_empleado != tiempo_empleado {
            task.tiempo_empleado = tiempo_empleado;
            modified = true;
        }
        if task.finalizada != finalizada {
            task.finalizada = finalizada;
            modified = true;
        }

        if modified {
            self.repo.update_progress(&task).await?;
        }

        Ok(task)
    }

    /// Delete a task `user` owns.
    pub async fn delete_task(&self, user: &User, task_id: i32) -> Result<()> {
        match self.repo.delete(task_id, user.id).await? {
            0 => Err(ServerError::NotFound("task")),
            _ => Ok(()),
        }
    }
}

/// Uppercase every letter following a non-letter, lowercase the rest.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alphabetic = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }

    out
}
