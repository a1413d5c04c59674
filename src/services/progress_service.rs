use crate::entities::{
    course_entity as courses, enrollment_entity as enrollments, lesson_entity as lessons,
    progress_entity as progress,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::find_approved_enrollment;
use crate::utils::SharedClock;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct ProgressService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl ProgressService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Upserts the (enrollment, lesson) row. Last write wins: a smaller
    /// duration than before is stored as reported.
    pub async fn record_progress(
        &self,
        student: &AuthUser,
        request: RecordProgressRequest,
    ) -> AppResult<ProgressResponse> {
        if request.watched_duration < 0 {
            return Err(AppError::ValidationError(
                "Watched duration cannot be negative".to_string(),
            ));
        }
        let now = self.clock.now();

        let txn = self.pool.begin().await?;
        let lesson = lessons::Entity::find_by_id(request.lesson_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Lesson not found".to_string()))?;
        let enrollment = find_approved_enrollment(&txn, student.id, lesson.course_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("You are not enrolled in this course".to_string())
            })?;

        progress::Entity::insert(progress::ActiveModel {
            enrollment_id: Set(enrollment.id),
            lesson_id: Set(lesson.id),
            watched_duration: Set(request.watched_duration),
            is_completed: Set(request.is_completed),
            last_watched_at: Set(now),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([progress::Column::EnrollmentId, progress::Column::LessonId])
                .update_columns([
                    progress::Column::WatchedDuration,
                    progress::Column::IsCompleted,
                    progress::Column::LastWatchedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        let row = progress::Entity::find()
            .filter(progress::Column::EnrollmentId.eq(enrollment.id))
            .filter(progress::Column::LessonId.eq(lesson.id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::InternalError("Progress row missing after upsert".to_string()))?;
        txn.commit().await?;

        Ok(ProgressResponse::from(row))
    }

    /// Students see their own rows, teachers the rows of their courses.
    pub async fn list_progress(
        &self,
        user: &AuthUser,
        enrollment_id: Option<i32>,
    ) -> AppResult<Vec<ProgressResponse>> {
        let enrollment_ids: Vec<i32> = if user.is_teacher() {
            let owned: Vec<i32> = courses::Entity::find()
                .filter(courses::Column::TeacherId.eq(user.id))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            enrollments::Entity::find()
                .filter(enrollments::Column::CourseId.is_in(owned))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect()
        } else {
            enrollments::Entity::find()
                .filter(enrollments::Column::StudentId.eq(user.id))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect()
        };

        let mut query = progress::Entity::find()
            .filter(progress::Column::EnrollmentId.is_in(enrollment_ids))
            .order_by_desc(progress::Column::LastWatchedAt);
        if let Some(id) = enrollment_id {
            query = query.filter(progress::Column::EnrollmentId.eq(id));
        }

        Ok(query
            .all(&self.pool)
            .await?
            .into_iter()
            .map(ProgressResponse::from)
            .collect())
    }
}
