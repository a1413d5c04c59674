mod common;

use aula_backend::entities::{VoucherStatus, enrollment_entity as enrollments};
use aula_backend::error::AppError;
use aula_backend::models::SubmitVoucherRequest;
use aula_backend::services::{EnrollmentService, VoucherService};
use aula_backend::utils::SharedClock;
use common::*;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

async fn services() -> (DatabaseConnection, VoucherService, EnrollmentService) {
    let db = setup_db().await;
    let clock: SharedClock = ManualClock::new();
    (
        db.clone(),
        VoucherService::new(db.clone(), clock.clone()),
        EnrollmentService::new(db, clock),
    )
}

fn voucher_for(course_id: i32) -> SubmitVoucherRequest {
    SubmitVoucherRequest {
        course_id,
        voucher_image: "https://res.cloudinary.com/demo/image/upload/yape.png".to_string(),
    }
}

async fn enrollments_of(db: &DatabaseConnection, student_id: i32, course_id: i32) -> Vec<enrollments::Model> {
    enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::CourseId.eq(course_id))
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn approving_grants_the_course_once() {
    let (db, vouchers, _) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;

    let voucher = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    assert_eq!(voucher.status, VoucherStatus::Pending);
    assert!(enrollments_of(&db, student.id, course.id).await.is_empty());

    let approved = vouchers
        .approve(&auth(&teacher), voucher.id, Some("Pago recibido".to_string()))
        .await
        .unwrap();
    assert_eq!(approved.status, VoucherStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(teacher.id));
    assert_eq!(approved.notes, "Pago recibido");

    let again = vouchers.approve(&auth(&teacher), voucher.id, None).await.unwrap();
    assert_eq!(again.status, VoucherStatus::Approved);
    assert_eq!(again.notes, "Pago recibido");

    let rows = enrollments_of(&db, student.id, course.id).await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_approved);
    assert!(rows[0].approved_at.is_some());
}

#[tokio::test]
async fn approving_upgrades_a_pending_enrollment() {
    let (db, vouchers, enrollment_svc) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;

    let pending = enrollment_svc.enroll(&auth(&student), course.id).await.unwrap().enrollment;
    assert!(!pending.is_approved);

    let voucher = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    vouchers.approve(&auth(&teacher), voucher.id, None).await.unwrap();

    let rows = enrollments_of(&db, student.id, course.id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, pending.id);
    assert!(rows[0].is_approved);
}

#[tokio::test]
async fn rejecting_leaves_enrollment_alone() {
    let (db, vouchers, enrollment_svc) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;

    let pending = enrollment_svc.enroll(&auth(&student), course.id).await.unwrap().enrollment;
    let voucher = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();

    let rejected = vouchers
        .reject(&auth(&teacher), voucher.id, Some("Monto incorrecto".to_string()))
        .await
        .unwrap();
    assert_eq!(rejected.status, VoucherStatus::Rejected);
    assert!(rejected.reviewed_at.is_some());

    let rows = enrollments_of(&db, student.id, course.id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, pending.id);
    assert!(!rows[0].is_approved);

    let err = vouchers.approve(&auth(&teacher), voucher.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // A new submission after rejection can still be approved.
    let retry = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    assert_ne!(retry.id, voucher.id);
    vouchers.approve(&auth(&teacher), retry.id, None).await.unwrap();
    assert!(enrollments_of(&db, student.id, course.id).await[0].is_approved);
}

#[tokio::test]
async fn an_approved_voucher_cannot_be_rejected_afterwards() {
    let (db, vouchers, _) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;

    let voucher = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    vouchers.approve(&auth(&teacher), voucher.id, None).await.unwrap();

    let err = vouchers
        .reject(&auth(&teacher), voucher.id, Some("Revisión tardía".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = vouchers.list_vouchers(&auth(&student)).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, VoucherStatus::Approved);
    assert_eq!(stored[0].notes, "");

    let rows = enrollments_of(&db, student.id, course.id).await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_approved);
}

#[tokio::test]
async fn only_the_owning_teacher_reviews() {
    let (db, vouchers, _) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let other_teacher = insert_teacher(&db, "otro@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;
    let voucher = vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();

    let err = vouchers.approve(&auth(&other_teacher), voucher.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = vouchers.reject(&auth(&student), voucher.id, None).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = vouchers.approve(&auth(&teacher), 9_999, None).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(enrollments_of(&db, student.id, course.id).await.is_empty());
}

#[tokio::test]
async fn only_the_submitter_marks_seen() {
    let (db, vouchers, _) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let ana = insert_student(&db, "ana@example.com", "Ana").await;
    let luis = insert_student(&db, "luis@example.com", "Luis").await;
    let course = insert_course(&db, teacher.id, true).await;
    let voucher = vouchers.submit(&auth(&ana), voucher_for(course.id)).await.unwrap();
    assert!(!voucher.is_seen);

    let err = vouchers.mark_seen(&auth(&luis), voucher.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = vouchers.mark_seen(&auth(&teacher), voucher.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let seen = vouchers.mark_seen(&auth(&ana), voucher.id).await.unwrap();
    assert!(seen.is_seen);
    assert_eq!(seen.status, VoucherStatus::Pending);
}

#[tokio::test]
async fn submissions_need_an_image_and_a_course() {
    let (db, vouchers, _) = services().await;
    let teacher = insert_teacher(&db, "profe@example.com").await;
    let student = insert_student(&db, "ana@example.com", "Ana").await;
    let course = insert_course(&db, teacher.id, true).await;

    let mut blank = voucher_for(course.id);
    blank.voucher_image = "   ".to_string();
    let err = vouchers.submit(&auth(&student), blank).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let err = vouchers.submit(&auth(&student), voucher_for(9_999)).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = vouchers.submit(&auth(&teacher), voucher_for(course.id)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    vouchers.submit(&auth(&student), voucher_for(course.id)).await.unwrap();
    assert_eq!(vouchers.list_vouchers(&auth(&student)).await.unwrap().len(), 2);
    assert_eq!(vouchers.list_vouchers(&auth(&teacher)).await.unwrap().len(), 2);
}
