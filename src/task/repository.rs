//! Handle database requests.

use sqlx::PgPool;

use crate::error::Result;
use crate::task::Task;

const COLUMNS: &str = "id, usuario, tarea, tipo, tiempo_empleado, \
                       duracion_total, finalizada, fecha_inicio, fecha_final";

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new [`TaskRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert [`Task`] into database.
    pub async fn insert(&self, task: &Task) -> Result<Task> {
        Ok(sqlx::query_as::<_, Task>(&format!(
            r#"INSERT INTO manager
                (usuario, tarea, tipo, tiempo_empleado, duracion_total, finalizada, fecha_inicio, fecha_final)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {COLUMNS}"#,
        ))
        .bind(task.usuario)
        .bind(&task.tarea)
        .bind(&task.tipo)
        .bind(task.tiempo_empleado)
        .bind(task.duracion_total)
        .bind(task.finalizada)
        .bind(task.fecha_inicio)
        .bind(task.fecha_final)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Every task a user owns, in insertion order.
    pub async fn list_by_owner(&self, user_id: i32) -> Result<Vec<Task>> {
        Ok(sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM manager WHERE usuario = $1 ORDER BY id",
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Find a task by id, scoped to its owner.
    pub async fn find_by_owner(
        &self,
        id: i32,
        user_id: i32,
    ) -> Result<Option<Task>> {
        Ok(sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM manager WHERE id = $1 AND usuario = $2",
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Persist progress fields of a task.
    pub async fn update_progress(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"UPDATE manager SET tiempo_empleado = $1, finalizada = $2
                WHERE id = $3 AND usuario = $4"#,
        )
        .bind(task.tiempo_empleado)
        .bind(task.finalizada)
        .bind(task.id)
        .bind(task.usuario)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a task, scoped to its owner. Returns affected rows.
    pub async fn delete(&self, id: i32, user_id: i32) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM manager WHERE id = $1 AND usuario = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
