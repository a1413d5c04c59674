use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub course_id: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentResponse {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub student_email: String,
    pub course_id: i32,
    pub course_title: String,
    pub is_approved: bool,
    pub enrolled_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub progress_percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollResponse {
    pub enrollment: EnrollmentResponse,
    /// Informational: the pair already existed and was returned unchanged.
    pub already_enrolled: bool,
}
