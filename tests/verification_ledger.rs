mod common;

use aula_backend::entities::{UserRole, email_verification_entity as verifications, user_entity as users};
use aula_backend::error::AppError;
use aula_backend::external::{EmailKind, SharedEmailSender};
use aula_backend::models::RequestCodeRequest;
use aula_backend::services::RegistrationService;
use aula_backend::utils::SharedClock;
use common::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use std::sync::Arc;

struct Harness {
    db: DatabaseConnection,
    clock: Arc<ManualClock>,
    mailer: Arc<RecordingMailer>,
    service: RegistrationService,
}

async fn harness() -> Harness {
    let db = setup_db().await;
    let clock = ManualClock::new();
    let mailer = RecordingMailer::new();
    let shared_clock: SharedClock = clock.clone();
    let sender: SharedEmailSender = mailer.clone();
    let service = RegistrationService::new(db.clone(), jwt(), sender, shared_clock);
    Harness {
        db,
        clock,
        mailer,
        service,
    }
}

fn payload(email: &str) -> RequestCodeRequest {
    RequestCodeRequest {
        email: email.to_string(),
        first_name: "Ana".to_string(),
        middle_name: Some("María".to_string()),
        last_name: "Quispe".to_string(),
        second_last_name: "N/A".to_string(),
        password: "clave-segura".to_string(),
        phone: Some("+51987654321".to_string()),
    }
}

#[tokio::test]
async fn resend_is_blocked_until_cooldown_elapses() {
    let h = harness().await;
    h.service.request_code(payload("ana@example.com")).await.unwrap();
    let first = h.mailer.last_code(EmailKind::VerificationCode);

    let err = h.service.resend_code("ana@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));

    h.clock.advance(59);
    let err = h.service.resend_code("ana@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));

    h.clock.advance(1);
    h.service.resend_code("ana@example.com").await.unwrap();
    let second = h.mailer.last_code(EmailKind::VerificationCode);
    assert_ne!(first, second);
    assert_eq!(h.mailer.sent().len(), 2);

    // The cooldown restarts from the latest send.
    let err = h.service.resend_code("ana@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::RateLimited(_)));
}

#[tokio::test]
async fn resend_without_pending_record_is_not_found() {
    let h = harness().await;
    let err = h.service.resend_code("nobody@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn confirm_materialises_a_single_student() {
    let h = harness().await;
    h.service.request_code(payload("Ana@Example.com ")).await.unwrap();
    let code = h.mailer.last_code(EmailKind::VerificationCode);
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let err = h.service.confirm_code("ana@example.com", wrong).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(users::Entity::find().count(&h.db).await.unwrap(), 0);

    let auth = h.service.confirm_code("ana@example.com", &code).await.unwrap();
    assert_eq!(auth.user.email, "ana@example.com");
    assert_eq!(auth.user.role, UserRole::Student);
    assert_eq!(auth.user.full_name, "Ana María Quispe");
    assert_eq!(auth.user.second_last_name, "");
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());

    let err = h.service.confirm_code("ana@example.com", &code).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(users::Entity::find().count(&h.db).await.unwrap(), 1);
}

#[tokio::test]
async fn request_overwrites_the_pending_record() {
    let h = harness().await;
    h.service.request_code(payload("ana@example.com")).await.unwrap();
    h.clock.advance(5);

    let mut second = payload("ana@example.com");
    second.phone = Some("+51900000000".to_string());
    h.service.request_code(second).await.unwrap();

    let records = verifications::Entity::find().all(&h.db).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].phone, "+51900000000");
    assert_eq!(records[0].code, h.mailer.last_code(EmailKind::VerificationCode));

    let code = h.mailer.last_code(EmailKind::VerificationCode);
    let auth = h.service.confirm_code("ana@example.com", &code).await.unwrap();
    assert_eq!(auth.user.phone, "+51900000000");
}

#[tokio::test]
async fn registered_email_and_identity_are_conflicts() {
    let h = harness().await;
    h.service.request_code(payload("ana@example.com")).await.unwrap();
    let code = h.mailer.last_code(EmailKind::VerificationCode);
    h.service.confirm_code("ana@example.com", &code).await.unwrap();

    let err = h.service.request_code(payload("ana@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // "N/A" and an empty second last name are the same identity.
    let mut namesake = payload("other@example.com");
    namesake.second_last_name = "  n/a ".to_string();
    let err = h.service.request_code(namesake).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mut relative = payload("prima@example.com");
    relative.second_last_name = "Mamani".to_string();
    h.service.request_code(relative).await.unwrap();
}

#[tokio::test]
async fn invalid_payloads_are_rejected_before_anything_is_stored() {
    let h = harness().await;

    let mut bad_email = payload("not-an-email");
    bad_email.email = "not-an-email".to_string();
    assert!(matches!(
        h.service.request_code(bad_email).await.unwrap_err(),
        AppError::ValidationError(_)
    ));

    let mut numeric = payload("ana@example.com");
    numeric.password = "12345678".to_string();
    assert!(matches!(
        h.service.request_code(numeric).await.unwrap_err(),
        AppError::ValidationError(_)
    ));

    let mut nameless = payload("ana@example.com");
    nameless.last_name = "  ".to_string();
    assert!(matches!(
        h.service.request_code(nameless).await.unwrap_err(),
        AppError::ValidationError(_)
    ));

    assert_eq!(verifications::Entity::find().count(&h.db).await.unwrap(), 0);
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn failed_delivery_surfaces_upstream_error_and_keeps_the_record() {
    let h = harness().await;
    h.mailer.set_failing(true);

    let err = h.service.request_code(payload("ana@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::ExternalApiError(_)));
    assert_eq!(verifications::Entity::find().count(&h.db).await.unwrap(), 1);

    h.mailer.set_failing(false);
    h.clock.advance(60);
    h.service.resend_code("ana@example.com").await.unwrap();
    let code = h.mailer.last_code(EmailKind::VerificationCode);
    h.service.confirm_code("ana@example.com", &code).await.unwrap();
}

#[tokio::test]
async fn namesakes_pending_together_register_only_once() {
    let h = harness().await;
    h.service.request_code(payload("ana@example.com")).await.unwrap();
    let first_code = h.mailer.last_code(EmailKind::VerificationCode);
    h.service.request_code(payload("ana.q@example.com")).await.unwrap();
    let second_code = h.mailer.last_code(EmailKind::VerificationCode);

    h.service.confirm_code("ana@example.com", &first_code).await.unwrap();
    let err = h
        .service
        .confirm_code("ana.q@example.com", &second_code)
        .await
        .unwrap_err();
    match err {
        AppError::Conflict(msg) => assert!(msg.contains("full name")),
        other => panic!("expected conflict, got {other:?}"),
    }

    let all = users::Entity::find().all(&h.db).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].email, "ana@example.com");

    // The losing record is still pending, nothing was half-applied.
    let pending = verifications::Entity::find()
        .filter(verifications::Column::Email.eq("ana.q@example.com"))
        .one(&h.db)
        .await
        .unwrap()
        .unwrap();
    assert!(!pending.is_verified);
}

#[tokio::test]
async fn storage_rejects_a_second_user_with_the_same_name() {
    let h = harness().await;
    let first = insert_student(&h.db, "ana@example.com", "Ana").await;

    let now = chrono::Utc::now();
    let twin = users::ActiveModel {
        email: Set("otra.ana@example.com".to_string()),
        username: Set("otra.ana@example.com".to_string()),
        password_hash: Set("unused".to_string()),
        first_name: Set(first.first_name.clone()),
        middle_name: Set(first.middle_name.clone()),
        last_name: Set(first.last_name.clone()),
        second_last_name: Set(first.second_last_name.clone()),
        role: Set(UserRole::Student),
        phone: Set(String::new()),
        avatar: Set(None),
        yape_qr: Set(None),
        plin_qr: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&h.db)
    .await
    .unwrap_err();
    let err = AppError::from_db_unique(twin, "duplicate identity");
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(users::Entity::find().count(&h.db).await.unwrap(), 1);
}
