#![allow(dead_code)]

use async_trait::async_trait;
use aula_backend::entities::{
    DocumentUrls, UserRole, course_entity as courses, lesson_entity as lessons,
    user_entity as users,
};
use aula_backend::error::{AppError, AppResult};
use aula_backend::external::{EmailKind, EmailMessage, EmailSender};
use aula_backend::middlewares::AuthUser;
use aula_backend::utils::{Clock, JwtService};
use chrono::{DateTime, Duration, TimeZone, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Fresh in-memory database. A single pooled connection keeps every query
/// on the same SQLite instance.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn jwt() -> JwtService {
    JwtService::new("test-secret", 3600, 86_400)
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Keeps every message it is asked to send; can be switched to fail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_code(&self, kind: EmailKind) -> String {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.kind == kind)
            .map(|m| m.code)
            .expect("a message of this kind was sent")
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApiError("Failed to send email".to_string()));
        }
        Ok(())
    }
}

pub async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    first_name: &str,
    role: UserRole,
    password_hash: &str,
) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        email: Set(email.to_string()),
        username: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        first_name: Set(first_name.to_string()),
        middle_name: Set(String::new()),
        last_name: Set("Test".to_string()),
        second_last_name: Set(String::new()),
        role: Set(role),
        phone: Set(String::new()),
        avatar: Set(None),
        yape_qr: Set(None),
        plin_qr: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn insert_teacher(db: &DatabaseConnection, email: &str) -> users::Model {
    let handle = email.split('@').next().unwrap_or(email);
    let first_name = format!("Profesor {handle}");
    insert_user(db, email, &first_name, UserRole::Teacher, "unused").await
}

pub async fn insert_student(db: &DatabaseConnection, email: &str, first_name: &str) -> users::Model {
    insert_user(db, email, first_name, UserRole::Student, "unused").await
}

pub async fn insert_course(db: &DatabaseConnection, teacher_id: i32, is_paid: bool) -> courses::Model {
    let now = Utc::now();
    courses::ActiveModel {
        title: Set(if is_paid { "Excel avanzado" } else { "Excel básico" }.to_string()),
        description: Set(String::new()),
        thumbnail: Set(None),
        teacher_id: Set(teacher_id),
        is_paid: Set(is_paid),
        price_cents: Set(if is_paid { 4990 } else { 0 }),
        is_published: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert course")
}

pub async fn insert_lesson(db: &DatabaseConnection, course_id: i32, order: i32) -> lessons::Model {
    let now = Utc::now();
    lessons::ActiveModel {
        course_id: Set(course_id),
        title: Set(format!("Lección {order}")),
        description: Set(String::new()),
        order: Set(order),
        youtube_video_id: Set(None),
        video_duration: Set(600),
        pdf_files: Set(DocumentUrls::default()),
        docx_files: Set(DocumentUrls::default()),
        xlsx_files: Set(DocumentUrls::default()),
        pptx_files: Set(DocumentUrls::default()),
        audio_file: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert lesson")
}

pub fn auth(user: &users::Model) -> AuthUser {
    AuthUser {
        id: user.id,
        role: user.role.clone(),
    }
}
