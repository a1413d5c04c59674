use crate::entities::{UserRole, email_verification_entity as verifications, user_entity as users};
use crate::error::{AppError, AppResult, unique_violation_detail};
use crate::external::{EmailMessage, SharedEmailSender};
use crate::models::*;
use crate::services::build_auth_response;
use crate::utils::{
    FullName, JwtService, SharedClock, generate_fresh_code, generate_six_digit_code,
    hash_password, normalize_email, validate_email, validate_password,
};
use chrono::Duration;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};

/// Minimum gap between two sends of a pending registration code.
pub const RESEND_COOLDOWN_SECS: i64 = 60;

const EMAIL_TAKEN: &str = "Email is already registered";
const IDENTITY_TAKEN: &str = "A user with this full name is already registered";

/// Email-code verification ledger for new student accounts.
///
/// The registration payload is staged on the verification record and only
/// promoted into `users` once the emailed code is confirmed.
#[derive(Clone)]
pub struct RegistrationService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    email_sender: SharedEmailSender,
    clock: SharedClock,
}

impl RegistrationService {
    pub fn new(
        pool: DatabaseConnection,
        jwt_service: JwtService,
        email_sender: SharedEmailSender,
        clock: SharedClock,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            email_sender,
            clock,
        }
    }

    pub async fn request_code(&self, request: RequestCodeRequest) -> AppResult<()> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        if request.first_name.trim().is_empty()
            || request.last_name.trim().is_empty()
            || request.second_last_name.trim().is_empty()
        {
            return Err(AppError::ValidationError(
                "First name, last name and second last name are required".to_string(),
            ));
        }
        validate_password(&request.password)?;

        let name = FullName::new(
            &request.first_name,
            request.middle_name.as_deref().unwrap_or_default(),
            &request.last_name,
            &request.second_last_name,
        );
        let password_hash = hash_password(&request.password)?;
        let phone = request.phone.unwrap_or_default().trim().to_string();
        let code = generate_six_digit_code();
        let now = self.clock.now();

        let txn = self.pool.begin().await?;

        let email_taken = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .count(&txn)
            .await?
            > 0;
        if email_taken {
            return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
        }
        if identity_taken(&txn, &name).await? {
            return Err(AppError::Conflict(IDENTITY_TAKEN.to_string()));
        }

        let staged = verifications::ActiveModel {
            email: Set(email.clone()),
            code: Set(code.clone()),
            created_at: Set(now),
            last_sent_at: Set(now),
            is_verified: Set(false),
            first_name: Set(name.first_name),
            middle_name: Set(name.middle_name),
            last_name: Set(name.last_name),
            second_last_name: Set(name.second_last_name),
            password_hash: Set(password_hash),
            phone: Set(phone),
            ..Default::default()
        };
        verifications::Entity::insert(staged)
            .on_conflict(
                OnConflict::column(verifications::Column::Email)
                    .update_columns([
                        verifications::Column::Code,
                        verifications::Column::CreatedAt,
                        verifications::Column::LastSentAt,
                        verifications::Column::IsVerified,
                        verifications::Column::FirstName,
                        verifications::Column::MiddleName,
                        verifications::Column::LastName,
                        verifications::Column::SecondLastName,
                        verifications::Column::PasswordHash,
                        verifications::Column::Phone,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        log::info!("Verification code issued for {email}");
        self.email_sender
            .send(&EmailMessage::verification(&email, &code))
            .await
    }

    pub async fn resend_code(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let now = self.clock.now();

        let txn = self.pool.begin().await?;
        let record = find_pending(&txn, &email).await?;

        let elapsed = now - record.last_sent_at;
        if elapsed < Duration::seconds(RESEND_COOLDOWN_SECS) {
            let wait = RESEND_COOLDOWN_SECS - elapsed.num_seconds();
            return Err(AppError::RateLimited(format!(
                "Please wait {wait} seconds before requesting a new code"
            )));
        }

        let code = generate_fresh_code(&record.code);
        // Guarded on the old code so two concurrent resends cannot both win.
        let updated = verifications::Entity::update_many()
            .col_expr(verifications::Column::Code, Expr::value(code.clone()))
            .col_expr(verifications::Column::LastSentAt, Expr::value(now))
            .filter(verifications::Column::Id.eq(record.id))
            .filter(verifications::Column::Code.eq(&record.code))
            .filter(verifications::Column::IsVerified.eq(false))
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            return Err(AppError::RateLimited(
                "A new code was just sent, please check your inbox".to_string(),
            ));
        }
        txn.commit().await?;

        log::info!("Verification code re-sent for {email}");
        self.email_sender
            .send(&EmailMessage::verification(&email, &code))
            .await
    }

    /// Matches the code and materialises the staged user in one transaction.
    pub async fn confirm_code(&self, email: &str, code: &str) -> AppResult<AuthResponse> {
        let email = normalize_email(email);
        let now = self.clock.now();

        let txn = self.pool.begin().await?;
        let record = find_pending(&txn, &email).await?;

        if record.code != code.trim() {
            return Err(AppError::ValidationError(
                "Invalid verification code".to_string(),
            ));
        }

        let claimed = verifications::Entity::update_many()
            .col_expr(verifications::Column::IsVerified, Expr::value(true))
            .filter(verifications::Column::Id.eq(record.id))
            .filter(verifications::Column::IsVerified.eq(false))
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::NotFound(
                "No pending verification for this email".to_string(),
            ));
        }

        let name = FullName::new(
            &record.first_name,
            &record.middle_name,
            &record.last_name,
            &record.second_last_name,
        );
        // Another pending registration with the same name may have confirmed first.
        if identity_taken(&txn, &name).await? {
            return Err(AppError::Conflict(IDENTITY_TAKEN.to_string()));
        }
        let username = available_username(&txn, &name.display_name()).await?;

        let user = users::ActiveModel {
            email: Set(email.clone()),
            username: Set(username),
            password_hash: Set(record.password_hash),
            first_name: Set(name.first_name),
            middle_name: Set(name.middle_name),
            last_name: Set(name.last_name),
            second_last_name: Set(name.second_last_name),
            role: Set(UserRole::Student),
            phone: Set(record.phone),
            avatar: Set(None),
            yape_qr: Set(None),
            plin_qr: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(registration_conflict)?;

        txn.commit().await?;

        log::info!("User {} registered with email {email}", user.id);
        build_auth_response(&self.jwt_service, user)
    }
}

async fn find_pending<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<verifications::Model> {
    verifications::Entity::find()
        .filter(verifications::Column::Email.eq(email))
        .filter(verifications::Column::IsVerified.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No pending verification for this email".to_string()))
}

async fn identity_taken<C: ConnectionTrait>(db: &C, name: &FullName) -> AppResult<bool> {
    Ok(users::Entity::find()
        .filter(users::Column::FirstName.eq(&name.first_name))
        .filter(users::Column::MiddleName.eq(&name.middle_name))
        .filter(users::Column::LastName.eq(&name.last_name))
        .filter(users::Column::SecondLastName.eq(&name.second_last_name))
        .count(db)
        .await?
        > 0)
}

/// Names the unique constraint that rejected a racing user insert.
fn registration_conflict(err: DbErr) -> AppError {
    match unique_violation_detail(&err) {
        Some(detail) if detail.contains("email") => AppError::Conflict(EMAIL_TAKEN.to_string()),
        Some(detail) if detail.contains("full_name") || detail.contains("first_name") => {
            AppError::Conflict(IDENTITY_TAKEN.to_string())
        }
        Some(_) => AppError::Conflict(
            "Another registration completed at the same time, please try again".to_string(),
        ),
        None => AppError::DatabaseError(err),
    }
}

/// Usernames are display names; a numeric suffix separates namesakes.
async fn available_username<C: ConnectionTrait>(db: &C, base: &str) -> AppResult<String> {
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while users::Entity::find()
        .filter(users::Column::Username.eq(&candidate))
        .count(db)
        .await?
        > 0
    {
        candidate = format!("{base} {suffix}");
        suffix += 1;
    }
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    async fn memory_db() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn user(email: &str, username: &str, first_name: &str) -> users::ActiveModel {
        let now = chrono::Utc::now();
        users::ActiveModel {
            email: Set(email.to_string()),
            username: Set(username.to_string()),
            password_hash: Set("unused".to_string()),
            first_name: Set(first_name.to_string()),
            middle_name: Set(String::new()),
            last_name: Set("Quispe".to_string()),
            second_last_name: Set(String::new()),
            role: Set(UserRole::Student),
            phone: Set(String::new()),
            avatar: Set(None),
            yape_qr: Set(None),
            plin_qr: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
    }

    fn conflict_message(err: AppError) -> String {
        match err {
            AppError::Conflict(msg) => msg,
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registration_conflict_names_the_constraint() {
        let db = memory_db().await;
        user("ana@example.com", "Ana Quispe", "Ana").insert(&db).await.unwrap();

        let same_email = user("ana@example.com", "Luis Quispe", "Luis").insert(&db).await.unwrap_err();
        assert_eq!(conflict_message(registration_conflict(same_email)), EMAIL_TAKEN);

        let same_name = user("ana2@example.com", "Ana Quispe 2", "Ana").insert(&db).await.unwrap_err();
        assert_eq!(conflict_message(registration_conflict(same_name)), IDENTITY_TAKEN);

        let same_username = user("luis@example.com", "Ana Quispe", "Luis").insert(&db).await.unwrap_err();
        let msg = conflict_message(registration_conflict(same_username));
        assert_ne!(msg, EMAIL_TAKEN);
        assert_ne!(msg, IDENTITY_TAKEN);
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = registration_conflict(DbErr::RecordNotFound("users".to_string()));
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
