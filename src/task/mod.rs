mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Task as saved on database (`manager` table).
///
/// Column names follow the schema: `usuario` is the owning user, `tarea`
/// the title, `tipo` the ABC tier code.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Task {
    pub id: i32,
    pub usuario: i32,
    pub tarea: String,
    pub tipo: String,
    /// Hours spent so far.
    pub tiempo_empleado: f64,
    /// Planned duration, in hours.
    pub duracion_total: f64,
    pub finalizada: bool,
    pub fecha_inicio: NaiveDate,
    pub fecha_final: NaiveDate,
}
