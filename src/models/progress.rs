use crate::entities::progress_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordProgressRequest {
    pub lesson_id: i32,
    /// Seconds watched; overwrites the previous value.
    pub watched_duration: i32,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub id: i32,
    pub enrollment_id: i32,
    pub lesson_id: i32,
    pub watched_duration: i32,
    pub is_completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

impl From<progress_entity::Model> for ProgressResponse {
    fn from(p: progress_entity::Model) -> Self {
        Self {
            id: p.id,
            enrollment_id: p.enrollment_id,
            lesson_id: p.lesson_id,
            watched_duration: p.watched_duration,
            is_completed: p.is_completed,
            last_watched_at: p.last_watched_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProgressQuery {
    pub enrollment_id: Option<i32>,
}
