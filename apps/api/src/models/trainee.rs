use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TraineeAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub employee_id: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub password_is_temporary: bool,
    pub phase: i32,
    pub progress: i32,
    pub score: i32,
    pub status: String,
    pub specialization: String,
    pub batch_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}
