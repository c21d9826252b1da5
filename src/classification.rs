//! ABC task-classification reference data.
//!
//! Three fixed tiers ordering tasks by value: (A) critical work that
//! cannot be delegated, (B) supportive work that helps reach the
//! objectives, (C) low-value routine that should come last.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{Result, ServerError};

/// Classification tier as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Classification {
    pub id: i32,
    /// Single-letter tier code.
    pub tipo: String,
    pub descripcion: String,
    /// Numeric weighting of the tier.
    pub ponderacion: i32,
}

/// Read-mostly registry over the `clasificador_tareas` table.
#[derive(Clone)]
pub struct ClassificationRegistry {
    pool: PgPool,
}

impl ClassificationRegistry {
    /// Create a new [`ClassificationRegistry`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the three fixed tiers when absent. Safe to re-run.
    pub async fn seed(&self) -> Result<()> {
        let tiers: [(&str, &str, i32); 3] = [
            (
                "A",
                "Critical tasks, essential to the stated objectives; they \
                 cannot be delegated and deserve most of the effort.",
                70,
            ),
            (
                "B",
                "Supportive tasks, not tied directly to the objectives but \
                 helping to reach them; they can occasionally be delegated.",
                20,
            ),
            (
                "C",
                "Low-value tasks, irrelevant to the objectives; they should \
                 come last and be delegated when possible.",
                10,
            ),
        ];

        for (tipo, descripcion, ponderacion) in tiers {
            sqlx::query(
                r#"INSERT INTO clasificador_tareas (tipo, descripcion, ponderacion)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (tipo) DO NOTHING"#,
            )
            .bind(tipo)
            .bind(descripcion)
            .bind(ponderacion)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("task classifications seeded");

        Ok(())
    }

    /// Find a tier using its code.
    pub async fn get(&self, tipo: &str) -> Result<Classification> {
        sqlx::query_as::<_, Classification>(
            r#"SELECT id, tipo, descripcion, ponderacion
                FROM clasificador_tareas WHERE tipo = $1"#,
        )
        .bind(tipo)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServerError::NotFound("classification"))
    }

    /// Every tier, in seeding order.
    pub async fn list(&self) -> Result<Vec<Classification>> {
        Ok(sqlx::query_as::<_, Classification>(
            r#"SELECT id, tipo, descripcion, ponderacion
                FROM clasificador_tareas ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }
}
