use crate::models::LessonResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    #[schema(example = "Excel desde cero")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    /// Price in cents; required to be positive when `is_paid` is set.
    #[serde(default)]
    #[schema(example = 4990)]
    pub price_cents: i64,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub is_paid: Option<bool>,
    pub price_cents: Option<i64>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub teacher_id: i32,
    pub teacher_name: String,
    pub is_paid: bool,
    pub price_cents: i64,
    pub is_published: bool,
    pub total_lessons: u64,
    pub total_students: u64,
    /// The viewer holds an approved enrollment.
    pub is_enrolled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentStatus {
    pub is_approved: bool,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseSummary,
    pub teacher_phone: String,
    pub teacher_yape_qr: Option<String>,
    pub teacher_plin_qr: Option<String>,
    pub lessons: Vec<LessonResponse>,
    pub enrollment_status: Option<EnrollmentStatus>,
    pub progress_percentage: f64,
}
