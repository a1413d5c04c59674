use crate::entities::{
    DocumentUrls, course_entity as courses, enrollment_entity as enrollments,
    lesson_entity as lessons, progress_entity as progress,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::{find_approved_enrollment, find_owned_course};
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set,
};

fn clean_urls(urls: Vec<String>) -> DocumentUrls {
    DocumentUrls(
        urls.into_iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect(),
    )
}

fn validate_duration(seconds: i32) -> AppResult<()> {
    if seconds < 0 {
        return Err(AppError::ValidationError(
            "Video duration cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct LessonService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl LessonService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// With a course filter every lesson of that course is listed. Without
    /// one, teachers get their own courses' lessons and students the lessons
    /// of courses they are approved in.
    pub async fn list_lessons(
        &self,
        viewer: &AuthUser,
        course_id: Option<i32>,
    ) -> AppResult<Vec<LessonResponse>> {
        let course_ids: Vec<i32> = match course_id {
            Some(id) => vec![id],
            None if viewer.is_teacher() => courses::Entity::find()
                .filter(courses::Column::TeacherId.eq(viewer.id))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect(),
            None => enrollments::Entity::find()
                .filter(enrollments::Column::StudentId.eq(viewer.id))
                .filter(enrollments::Column::IsApproved.eq(true))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|e| e.course_id)
                .collect(),
        };

        Ok(lessons::Entity::find()
            .filter(lessons::Column::CourseId.is_in(course_ids))
            .order_by_asc(lessons::Column::CourseId)
            .order_by_asc(lessons::Column::Order)
            .order_by_asc(lessons::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(LessonResponse::from)
            .collect())
    }

    pub async fn get_lesson(&self, viewer: &AuthUser, lesson_id: i32) -> AppResult<LessonResponse> {
        let lesson = lessons::Entity::find_by_id(lesson_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;

        let watched = match find_approved_enrollment(&self.pool, viewer.id, lesson.course_id).await? {
            Some(enrollment) => progress::Entity::find()
                .filter(progress::Column::EnrollmentId.eq(enrollment.id))
                .filter(progress::Column::LessonId.eq(lesson.id))
                .one(&self.pool)
                .await?
                .map(ProgressResponse::from),
            None => None,
        };

        let mut response = LessonResponse::from(lesson);
        response.progress = watched;
        Ok(response)
    }

    pub async fn create_lesson(
        &self,
        teacher: &AuthUser,
        request: CreateLessonRequest,
    ) -> AppResult<LessonResponse> {
        teacher.require_teacher()?;
        let course = find_owned_course(&self.pool, teacher.id, request.course_id).await?;

        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        validate_duration(request.video_duration)?;

        let order = match request.order {
            Some(order) => order,
            None => course
                .find_related(lessons::Entity)
                .order_by_desc(lessons::Column::Order)
                .one(&self.pool)
                .await?
                .map(|last| last.order + 1)
                .unwrap_or(1),
        };

        let now = self.clock.now();
        let lesson = lessons::ActiveModel {
            course_id: Set(course.id),
            title: Set(title),
            description: Set(request.description),
            order: Set(order),
            youtube_video_id: Set(request.youtube_video_id),
            video_duration: Set(request.video_duration),
            pdf_files: Set(clean_urls(request.pdf_files)),
            docx_files: Set(clean_urls(request.docx_files)),
            xlsx_files: Set(clean_urls(request.xlsx_files)),
            pptx_files: Set(clean_urls(request.pptx_files)),
            audio_file: Set(request.audio_file),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Lesson {} added to course {}", lesson.id, course.id);
        Ok(LessonResponse::from(lesson))
    }

    pub async fn update_lesson(
        &self,
        teacher: &AuthUser,
        lesson_id: i32,
        request: UpdateLessonRequest,
    ) -> AppResult<LessonResponse> {
        teacher.require_teacher()?;
        let lesson = self.find_owned_lesson(teacher, lesson_id).await?;

        let mut model = lesson.into_active_model();
        if let Some(title) = request.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::ValidationError("Title is required".to_string()));
            }
            model.title = Set(title);
        }
        if let Some(description) = request.description {
            model.description = Set(description);
        }
        if let Some(order) = request.order {
            model.order = Set(order);
        }
        if let Some(video_id) = request.youtube_video_id {
            model.youtube_video_id = Set((!video_id.trim().is_empty()).then_some(video_id));
        }
        if let Some(duration) = request.video_duration {
            validate_duration(duration)?;
            model.video_duration = Set(duration);
        }
        if let Some(urls) = request.pdf_files {
            model.pdf_files = Set(clean_urls(urls));
        }
        if let Some(urls) = request.docx_files {
            model.docx_files = Set(clean_urls(urls));
        }
        if let Some(urls) = request.xlsx_files {
            model.xlsx_files = Set(clean_urls(urls));
        }
        if let Some(urls) = request.pptx_files {
            model.pptx_files = Set(clean_urls(urls));
        }
        if let Some(audio) = request.audio_file {
            model.audio_file = Set((!audio.trim().is_empty()).then_some(audio));
        }
        model.updated_at = Set(self.clock.now());

        Ok(LessonResponse::from(model.update(&self.pool).await?))
    }

    pub async fn delete_lesson(&self, teacher: &AuthUser, lesson_id: i32) -> AppResult<()> {
        teacher.require_teacher()?;
        let lesson = self.find_owned_lesson(teacher, lesson_id).await?;
        lesson.delete(&self.pool).await?;
        Ok(())
    }

    async fn find_owned_lesson(&self, teacher: &AuthUser, lesson_id: i32) -> AppResult<lessons::Model> {
        let lesson = lessons::Entity::find_by_id(lesson_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;
        find_owned_course(&self.pool, teacher.id, lesson.course_id).await?;
        Ok(lesson)
    }
}
