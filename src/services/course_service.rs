use crate::entities::{
    course_entity as courses, enrollment_entity as enrollments, lesson_entity as lessons,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::progress_percentage;
use crate::utils::SharedClock;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::{HashMap, HashSet};

/// Loads a course and checks that `teacher_id` owns it.
pub(crate) async fn find_owned_course<C: ConnectionTrait>(
    db: &C,
    teacher_id: i32,
    course_id: i32,
) -> AppResult<courses::Model> {
    let course = courses::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    if course.teacher_id != teacher_id {
        return Err(AppError::Forbidden(
            "You can only manage your own courses".to_string(),
        ));
    }
    Ok(course)
}

pub(crate) async fn find_approved_enrollment<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    course_id: i32,
) -> AppResult<Option<enrollments::Model>> {
    Ok(enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::CourseId.eq(course_id))
        .filter(enrollments::Column::IsApproved.eq(true))
        .one(db)
        .await?)
}

fn validate_pricing(is_paid: bool, price_cents: i64) -> AppResult<()> {
    if price_cents < 0 {
        return Err(AppError::ValidationError("Price cannot be negative".to_string()));
    }
    if is_paid && price_cents == 0 {
        return Err(AppError::ValidationError(
            "A paid course needs a price".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, FromQueryResult)]
struct CourseCount {
    course_id: i32,
    count: i64,
}

#[derive(Clone)]
pub struct CourseService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl CourseService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Teachers browse their own catalogue, everyone else the published one.
    pub async fn list_courses(&self, viewer: Option<&AuthUser>) -> AppResult<Vec<CourseSummary>> {
        let mut query = courses::Entity::find().order_by_desc(courses::Column::CreatedAt);
        query = match viewer {
            Some(user) if user.is_teacher() => {
                query.filter(courses::Column::TeacherId.eq(user.id))
            }
            _ => query.filter(courses::Column::IsPublished.eq(true)),
        };
        let list = query.all(&self.pool).await?;
        self.summarize(list, viewer.map(|u| u.id)).await
    }

    pub async fn my_courses(&self, user: &AuthUser) -> AppResult<Vec<CourseSummary>> {
        let list = if user.is_teacher() {
            courses::Entity::find()
                .filter(courses::Column::TeacherId.eq(user.id))
                .order_by_desc(courses::Column::CreatedAt)
                .all(&self.pool)
                .await?
        } else {
            let course_ids: Vec<i32> = enrollments::Entity::find()
                .filter(enrollments::Column::StudentId.eq(user.id))
                .filter(enrollments::Column::IsApproved.eq(true))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|e| e.course_id)
                .collect();
            courses::Entity::find()
                .filter(courses::Column::Id.is_in(course_ids))
                .order_by_desc(courses::Column::CreatedAt)
                .all(&self.pool)
                .await?
        };
        self.summarize(list, Some(user.id)).await
    }

    pub async fn get_course(&self, viewer: Option<&AuthUser>, course_id: i32) -> AppResult<CourseDetail> {
        let course = courses::Entity::find_by_id(course_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let is_owner = viewer.is_some_and(|u| u.id == course.teacher_id);
        if !course.is_published && !is_owner {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        let teacher = users::Entity::find_by_id(course.teacher_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))?;

        let lesson_list: Vec<LessonResponse> = course
            .find_related(lessons::Entity)
            .order_by_asc(lessons::Column::Order)
            .order_by_asc(lessons::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(LessonResponse::from)
            .collect();

        let enrollment = match viewer {
            Some(user) => enrollments::Entity::find()
                .filter(enrollments::Column::StudentId.eq(user.id))
                .filter(enrollments::Column::CourseId.eq(course.id))
                .one(&self.pool)
                .await?,
            None => None,
        };
        let progress_percentage = match &enrollment {
            Some(e) if e.is_approved => progress_percentage(&self.pool, e).await?,
            _ => 0.0,
        };
        let enrollment_status = enrollment.map(|e| EnrollmentStatus {
            is_approved: e.is_approved,
            enrolled_at: e.enrolled_at,
        });

        let summary = self
            .summarize(vec![course], viewer.map(|u| u.id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Course summary missing".to_string()))?;

        Ok(CourseDetail {
            course: summary,
            teacher_phone: teacher.phone,
            teacher_yape_qr: teacher.yape_qr,
            teacher_plin_qr: teacher.plin_qr,
            lessons: lesson_list,
            enrollment_status,
            progress_percentage,
        })
    }

    pub async fn create_course(
        &self,
        teacher: &AuthUser,
        request: CreateCourseRequest,
    ) -> AppResult<CourseSummary> {
        teacher.require_teacher()?;
        let title = request.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        validate_pricing(request.is_paid, request.price_cents)?;

        let now = self.clock.now();
        let course = courses::ActiveModel {
            title: Set(title),
            description: Set(request.description),
            thumbnail: Set(request.thumbnail),
            teacher_id: Set(teacher.id),
            is_paid: Set(request.is_paid),
            price_cents: Set(if request.is_paid { request.price_cents } else { 0 }),
            is_published: Set(request.is_published.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Teacher {} created course {}", teacher.id, course.id);
        self.summarize_one(course, teacher.id).await
    }

    pub async fn update_course(
        &self,
        teacher: &AuthUser,
        course_id: i32,
        request: UpdateCourseRequest,
    ) -> AppResult<CourseSummary> {
        teacher.require_teacher()?;
        let course = find_owned_course(&self.pool, teacher.id, course_id).await?;

        let is_paid = request.is_paid.unwrap_or(course.is_paid);
        let price_cents = request.price_cents.unwrap_or(course.price_cents);
        validate_pricing(is_paid, price_cents)?;

        let mut model = course.into_active_model();
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
        if let Some(thumbnail) = request.thumbnail {
            model.thumbnail = Set((!thumbnail.trim().is_empty()).then_some(thumbnail));
        }
        if let Some(published) = request.is_published {
            model.is_published = Set(published);
        }
        model.is_paid = Set(is_paid);
        model.price_cents = Set(if is_paid { price_cents } else { 0 });
        model.updated_at = Set(self.clock.now());
        let course = model.update(&self.pool).await?;

        self.summarize_one(course, teacher.id).await
    }

    /// Lessons, enrollments, vouchers and progress go with the course.
    pub async fn delete_course(&self, teacher: &AuthUser, course_id: i32) -> AppResult<()> {
        teacher.require_teacher()?;
        let course = find_owned_course(&self.pool, teacher.id, course_id).await?;
        course.delete(&self.pool).await?;
        log::info!("Teacher {} deleted course {course_id}", teacher.id);
        Ok(())
    }

    async fn summarize_one(&self, course: courses::Model, viewer_id: i32) -> AppResult<CourseSummary> {
        self.summarize(vec![course], Some(viewer_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Course summary missing".to_string()))
    }

    async fn summarize(
        &self,
        list: Vec<courses::Model>,
        viewer_id: Option<i32>,
    ) -> AppResult<Vec<CourseSummary>> {
        if list.is_empty() {
            return Ok(Vec::new());
        }
        let course_ids: Vec<i32> = list.iter().map(|c| c.id).collect();
        let teacher_ids: HashSet<i32> = list.iter().map(|c| c.teacher_id).collect();

        let teacher_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(teacher_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();

        let lesson_counts: HashMap<i32, i64> = lessons::Entity::find()
            .select_only()
            .column(lessons::Column::CourseId)
            .column_as(Expr::col(lessons::Column::Id).count(), "count")
            .filter(lessons::Column::CourseId.is_in(course_ids.clone()))
            .group_by(lessons::Column::CourseId)
            .into_model::<CourseCount>()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|r| (r.course_id, r.count))
            .collect();

        let student_counts: HashMap<i32, i64> = enrollments::Entity::find()
            .select_only()
            .column(enrollments::Column::CourseId)
            .column_as(Expr::col(enrollments::Column::Id).count(), "count")
            .filter(enrollments::Column::CourseId.is_in(course_ids.clone()))
            .filter(enrollments::Column::IsApproved.eq(true))
            .group_by(enrollments::Column::CourseId)
            .into_model::<CourseCount>()
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|r| (r.course_id, r.count))
            .collect();

        let enrolled: HashSet<i32> = match viewer_id {
            Some(id) => enrollments::Entity::find()
                .filter(enrollments::Column::StudentId.eq(id))
                .filter(enrollments::Column::CourseId.is_in(course_ids))
                .filter(enrollments::Column::IsApproved.eq(true))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|e| e.course_id)
                .collect(),
            None => HashSet::new(),
        };

        Ok(list
            .into_iter()
            .map(|c| CourseSummary {
                teacher_name: teacher_names.get(&c.teacher_id).cloned().unwrap_or_default(),
                total_lessons: lesson_counts.get(&c.id).copied().unwrap_or(0) as u64,
                total_students: student_counts.get(&c.id).copied().unwrap_or(0) as u64,
                is_enrolled: enrolled.contains(&c.id),
                id: c.id,
                title: c.title,
                description: c.description,
                thumbnail: c.thumbnail,
                teacher_id: c.teacher_id,
                is_paid: c.is_paid,
                price_cents: c.price_cents,
                is_published: c.is_published,
                created_at: c.created_at,
            })
            .collect())
    }
}
