use crate::entities::{
    VoucherStatus, course_entity as courses, enrollment_entity as enrollments,
    user_entity as users, voucher_payment_entity as vouchers,
};
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::find_owned_course;
use crate::utils::SharedClock;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;

#[derive(Clone)]
pub struct VoucherService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl VoucherService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Students may submit any number of vouchers for the same course.
    pub async fn submit(&self, student: &AuthUser, request: SubmitVoucherRequest) -> AppResult<VoucherResponse> {
        student.require_student()?;
        let image = request.voucher_image.trim().to_string();
        if image.is_empty() {
            return Err(AppError::ValidationError("Voucher image is required".to_string()));
        }
        let course = courses::Entity::find_by_id(request.course_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let voucher = vouchers::ActiveModel {
            student_id: Set(student.id),
            course_id: Set(course.id),
            voucher_image: Set(image),
            status: Set(VoucherStatus::Pending),
            is_seen: Set(false),
            submitted_at: Set(self.clock.now()),
            reviewed_at: Set(None),
            reviewed_by: Set(None),
            notes: Set(String::new()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!("Voucher {} submitted by student {} for course {}", voucher.id, student.id, course.id);
        self.describe(voucher).await
    }

    /// Approves the voucher and grants the enrollment in the same
    /// transaction, creating the enrollment when the student never enrolled.
    /// Re-approving is a no-op in effect; approving a rejected voucher is a conflict.
    pub async fn approve(
        &self,
        reviewer: &AuthUser,
        voucher_id: i32,
        notes: Option<String>,
    ) -> AppResult<VoucherResponse> {
        reviewer.require_teacher()?;
        let now = self.clock.now();

        let txn = self.pool.begin().await?;
        let voucher = vouchers::Entity::find_by_id(voucher_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Voucher not found".to_string()))?;
        find_owned_course(&txn, reviewer.id, voucher.course_id).await?;
        if voucher.status == VoucherStatus::Rejected {
            return Err(AppError::Conflict("Voucher has already been rejected".to_string()));
        }

        let (student_id, course_id) = (voucher.student_id, voucher.course_id);
        let mut model = voucher.into_active_model();
        model.status = Set(VoucherStatus::Approved);
        model.reviewed_at = Set(Some(now));
        model.reviewed_by = Set(Some(reviewer.id));
        if let Some(notes) = notes {
            model.notes = Set(notes);
        }
        let voucher = model.update(&txn).await?;

        enrollments::Entity::insert(enrollments::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
            is_approved: Set(true),
            enrolled_at: Set(now),
            approved_at: Set(Some(now)),
            ..Default::default()
        })
        .on_conflict(
            OnConflict::columns([enrollments::Column::StudentId, enrollments::Column::CourseId])
                .update_columns([enrollments::Column::IsApproved, enrollments::Column::ApprovedAt])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;
        log::info!(
            "Voucher {voucher_id} approved by teacher {}; student {student_id} granted course {course_id}",
            reviewer.id
        );
        self.describe(voucher).await
    }

    /// Marks the voucher rejected. Enrollment state is left as it is.
    pub async fn reject(
        &self,
        reviewer: &AuthUser,
        voucher_id: i32,
        notes: Option<String>,
    ) -> AppResult<VoucherResponse> {
        reviewer.require_teacher()?;

        let txn = self.pool.begin().await?;
        let voucher = vouchers::Entity::find_by_id(voucher_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Voucher not found".to_string()))?;
        find_owned_course(&txn, reviewer.id, voucher.course_id).await?;
        if voucher.status == VoucherStatus::Approved {
            return Err(AppError::Conflict("Voucher has already been approved".to_string()));
        }

        let mut model = voucher.into_active_model();
        model.status = Set(VoucherStatus::Rejected);
        model.reviewed_at = Set(Some(self.clock.now()));
        model.reviewed_by = Set(Some(reviewer.id));
        if let Some(notes) = notes {
            model.notes = Set(notes);
        }
        let voucher = model.update(&txn).await?;
        txn.commit().await?;

        log::info!("Voucher {voucher_id} rejected by teacher {}", reviewer.id);
        self.describe(voucher).await
    }

    /// Dismisses the review notification. Only the submitter may do this.
    pub async fn mark_seen(&self, actor: &AuthUser, voucher_id: i32) -> AppResult<VoucherResponse> {
        let voucher = vouchers::Entity::find_by_id(voucher_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Voucher not found".to_string()))?;
        if voucher.student_id != actor.id {
            return Err(AppError::Forbidden(
                "Only the submitter can mark this voucher as seen".to_string(),
            ));
        }

        let mut model = voucher.into_active_model();
        model.is_seen = Set(true);
        let voucher = model.update(&self.pool).await?;
        self.describe(voucher).await
    }

    /// Newest first. Teachers see vouchers for their courses, students their own.
    pub async fn list_vouchers(&self, user: &AuthUser) -> AppResult<Vec<VoucherResponse>> {
        let mut query = vouchers::Entity::find()
            .order_by_desc(vouchers::Column::SubmittedAt)
            .order_by_desc(vouchers::Column::Id);
        if user.is_teacher() {
            let owned: Vec<i32> = courses::Entity::find()
                .filter(courses::Column::TeacherId.eq(user.id))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            query = query.filter(vouchers::Column::CourseId.is_in(owned));
        } else {
            query = query.filter(vouchers::Column::StudentId.eq(user.id));
        }
        let list = query.all(&self.pool).await?;
        self.describe_all(list).await
    }

    async fn describe(&self, voucher: vouchers::Model) -> AppResult<VoucherResponse> {
        self.describe_all(vec![voucher])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::InternalError("Voucher description missing".to_string()))
    }

    async fn describe_all(&self, list: Vec<vouchers::Model>) -> AppResult<Vec<VoucherResponse>> {
        let student_ids: Vec<i32> = list.iter().map(|v| v.student_id).collect();
        let course_ids: Vec<i32> = list.iter().map(|v| v.course_id).collect();

        let student_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(student_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name()))
            .collect();
        let course_titles: HashMap<i32, String> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c.title))
            .collect();

        Ok(list
            .into_iter()
            .map(|v| VoucherResponse {
                student_name: student_names.get(&v.student_id).cloned().unwrap_or_default(),
                course_title: course_titles.get(&v.course_id).cloned().unwrap_or_default(),
                id: v.id,
                student_id: v.student_id,
                course_id: v.course_id,
                voucher_image: v.voucher_image,
                status: v.status,
                is_seen: v.is_seen,
                submitted_at: v.submitted_at,
                reviewed_at: v.reviewed_at,
                reviewed_by: v.reviewed_by,
                notes: v.notes,
            })
            .collect())
    }
}
