use crate::entities::lesson_entity;
use crate::models::ProgressResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLessonRequest {
    pub course_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to one past the current last lesson.
    pub order: Option<i32>,
    pub youtube_video_id: Option<String>,
    #[serde(default)]
    pub video_duration: i32,
    #[serde(default)]
    pub pdf_files: Vec<String>,
    #[serde(default)]
    pub docx_files: Vec<String>,
    #[serde(default)]
    pub xlsx_files: Vec<String>,
    #[serde(default)]
    pub pptx_files: Vec<String>,
    pub audio_file: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub youtube_video_id: Option<String>,
    pub video_duration: Option<i32>,
    pub pdf_files: Option<Vec<String>>,
    pub docx_files: Option<Vec<String>>,
    pub xlsx_files: Option<Vec<String>>,
    pub pptx_files: Option<Vec<String>>,
    pub audio_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonResponse {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub youtube_video_id: Option<String>,
    pub video_duration: i32,
    pub pdf_files: Vec<String>,
    pub docx_files: Vec<String>,
    pub xlsx_files: Vec<String>,
    pub pptx_files: Vec<String>,
    pub audio_file: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressResponse>,
}

impl From<lesson_entity::Model> for LessonResponse {
    fn from(lesson: lesson_entity::Model) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            description: lesson.description,
            order: lesson.order,
            youtube_video_id: lesson.youtube_video_id,
            video_duration: lesson.video_duration,
            pdf_files: lesson.pdf_files.0,
            docx_files: lesson.docx_files.0,
            xlsx_files: lesson.xlsx_files.0,
            pptx_files: lesson.pptx_files.0,
            audio_file: lesson.audio_file,
            created_at: lesson.created_at,
            progress: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LessonListQuery {
    pub course_id: Option<i32>,
}
