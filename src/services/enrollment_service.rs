use crate::entities::{
    course_entity as courses, enrollment_entity as enrollments, lesson_entity as lessons,
    progress_entity as progress, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::find_owned_course;
use crate::utils::SharedClock;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

/// Completed share of a course, in percent with two decimals. A course
/// without lessons reports zero.
pub fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ratio = completed.min(total) as f64 / total as f64;
    (ratio * 100.0 * 100.0).round() / 100.0
}

pub async fn progress_percentage<C: ConnectionTrait>(
    db: &C,
    enrollment: &enrollments::Model,
) -> AppResult<f64> {
    let total = lessons::Entity::find()
        .filter(lessons::Column::CourseId.eq(enrollment.course_id))
        .count(db)
        .await?;
    let completed = progress::Entity::find()
        .filter(progress::Column::EnrollmentId.eq(enrollment.id))
        .filter(progress::Column::IsCompleted.eq(true))
        .count(db)
        .await?;
    Ok(completion_percentage(completed, total))
}

/// Inserts the (student, course) pair unless it already exists and returns
/// the stored row together with whether it was already there. Free courses
/// are approved on creation.
pub(crate) async fn enroll_or_fetch<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    course: &courses::Model,
    now: DateTime<Utc>,
) -> AppResult<(enrollments::Model, bool)> {
    let auto_approve = !course.is_paid;
    let record = enrollments::ActiveModel {
        student_id: Set(student_id),
        course_id: Set(course.id),
        is_approved: Set(auto_approve),
        enrolled_at: Set(now),
        approved_at: Set(auto_approve.then_some(now)),
        ..Default::default()
    };

    let inserted = match enrollments::Entity::insert(record)
        .on_conflict(
            OnConflict::columns([enrollments::Column::StudentId, enrollments::Column::CourseId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
    {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e.into()),
    };

    let enrollment = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::CourseId.eq(course.id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::InternalError("Enrollment vanished after insert".to_string()))?;

    Ok((enrollment, !inserted))
}

#[derive(Clone)]
pub struct EnrollmentService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl EnrollmentService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Idempotent: enrolling twice returns the existing row with
    /// `already_enrolled` set.
    pub async fn enroll(&self, student: &AuthUser, course_id: i32) -> AppResult<EnrollResponse> {
        student.require_student()?;
        let course = courses::Entity::find_by_id(course_id)
            .one(&self.pool)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let (enrollment, already_enrolled) =
            enroll_or_fetch(&self.pool, student.id, &course, self.clock.now()).await?;
        if already_enrolled {
            log::info!("Student {} already enrolled in course {course_id}", student.id);
        } else {
            log::info!(
                "Student {} enrolled in course {course_id} (approved={})",
                student.id,
                enrollment.is_approved
            );
        }

        Ok(EnrollResponse {
            enrollment: self.describe(enrollment).await?,
            already_enrolled,
        })
    }

    pub async fn approve(&self, teacher: &AuthUser, enrollment_id: i32) -> AppResult<EnrollmentResponse> {
        let mut model = self.find_for_review(teacher, enrollment_id).await?.into_active_model();
        model.is_approved = Set(true);
        model.approved_at = Set(Some(self.clock.now()));
        let enrollment = model.update(&self.pool).await?;
        log::info!("Enrollment {enrollment_id} approved by teacher {}", teacher.id);
        self.describe(enrollment).await
    }

    pub async fn reject(&self, teacher: &AuthUser, enrollment_id: i32) -> AppResult<EnrollmentResponse> {
        let mut model = self.find_for_review(teacher, enrollment_id).await?.into_active_model();
        model.is_approved = Set(false);
        model.approved_at = Set(None);
        let enrollment = model.update(&self.pool).await?;
        log::info!("Enrollment {enrollment_id} rejected by teacher {}", teacher.id);
        self.describe(enrollment).await
    }

    /// Readable by the enrolled student and by the course's teacher.
    pub async fn progress_percentage(&self, viewer: &AuthUser, enrollment_id: i32) -> AppResult<f64> {
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;
        if enrollment.student_id != viewer.id {
            find_owned_course(&self.pool, viewer.id, enrollment.course_id).await?;
        }
        progress_percentage(&self.pool, &enrollment).await
    }

    /// Teachers see enrollments in their courses, students their own.
    pub async fn list_enrollments(&self, user: &AuthUser) -> AppResult<Vec<EnrollmentResponse>> {
        let mut query = enrollments::Entity::find().order_by_desc(enrollments::Column::EnrolledAt);
        if user.is_teacher() {
            let owned: Vec<i32> = courses::Entity::find()
                .filter(courses::Column::TeacherId.eq(user.id))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            query = query.filter(enrollments::Column::CourseId.is_in(owned));
        } else {
            query = query.filter(enrollments::Column::StudentId.eq(user.id));
        }
        let list = query.all(&self.pool).await?;
        self.describe_all(list).await
    }

    async fn find_for_review(&self, teacher: &AuthUser, enrollment_id: i32) -> AppResult<enrollments::Model> {
        teacher.require_teacher()?;
        let enrollment = enrollments::Entity::find_by_id(enrollment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;
        find_owned_course(&self.pool, teacher.id, enrollment.course_id).await?;
        Ok(enrollment)
    }

    async fn describe(&self, enrollment: enrollments::Model) -> AppResult<EnrollmentResponse> {
        self.describe_all(vec![enrollment])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Enrollment description missing".to_string()))
    }

    async fn describe_all(&self, list: Vec<enrollments::Model>) -> AppResult<Vec<EnrollmentResponse>> {
        let student_ids: Vec<i32> = list.iter().map(|e| e.student_id).collect();
        let course_ids: Vec<i32> = list.iter().map(|e| e.course_id).collect();

        let students: HashMap<i32, users::Model> = users::Entity::find()
            .filter(users::Column::Id.is_in(student_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let course_titles: HashMap<i32, String> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();

        let mut out = Vec::with_capacity(list.len());
        for e in list {
            let percentage = progress_percentage(&self.pool, &e).await?;
            let student = students.get(&e.student_id);
            out.push(EnrollmentResponse {
                id: e.id,
                student_id: e.student_id,
                student_name: student.map(|s| s.full_name()).unwrap_or_default(),
                student_email: student.map(|s| s.email.clone()).unwrap_or_default(),
                course_id: e.course_id,
                course_title: course_titles.get(&e.course_id).cloned().unwrap_or_default(),
                is_approved: e.is_approved,
                enrolled_at: e.enrolled_at,
                approved_at: e.approved_at,
                progress_percentage: percentage,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(3, 3), 100.0);
        assert_eq!(completion_percentage(1, 3), 33.33);
        assert_eq!(completion_percentage(2, 3), 66.67);
        assert_eq!(completion_percentage(0, 5), 0.0);
    }
}
