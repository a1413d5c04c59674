use crate::entities::{password_reset_entity as resets, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::external::{EmailMessage, SharedEmailSender};
use crate::utils::{
    SharedClock, generate_six_digit_code, hash_password, normalize_email, validate_password,
};
use chrono::Duration;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// Reset codes are accepted for ten minutes after creation.
pub const RESET_CODE_TTL_SECS: i64 = 600;

#[derive(Clone)]
pub struct PasswordResetService {
    pool: DatabaseConnection,
    email_sender: SharedEmailSender,
    clock: SharedClock,
}

impl PasswordResetService {
    pub fn new(pool: DatabaseConnection, email_sender: SharedEmailSender, clock: SharedClock) -> Self {
        Self {
            pool,
            email_sender,
            clock,
        }
    }

    /// Replaces every live code for the email with a fresh one and mails it.
    ///
    /// The record is committed before delivery, so a failed send still
    /// leaves a usable code behind; the caller sees `ExternalApiError`.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No account is registered with this email".to_string())
            })?;

        let code = generate_six_digit_code();
        let now = self.clock.now();

        let txn = self.pool.begin().await?;
        let removed = resets::Entity::delete_many()
            .filter(resets::Column::Email.eq(&email))
            .filter(resets::Column::IsUsed.eq(false))
            .exec(&txn)
            .await?;
        resets::ActiveModel {
            email: Set(email.clone()),
            code: Set(code.clone()),
            created_at: Set(now),
            is_used: Set(false),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            AppError::from_db_unique(e, "A reset for this email is already in progress, try again")
        })?;
        txn.commit().await?;

        log::info!(
            "Password reset code issued for {email} ({} superseded)",
            removed.rows_affected
        );
        self.email_sender
            .send(&EmailMessage::password_reset(&email, &code, &user.first_name))
            .await
    }

    pub async fn confirm_reset(&self, email: &str, code: &str, new_password: &str) -> AppResult<()> {
        validate_password(new_password)?;
        let email = normalize_email(email);
        let now = self.clock.now();

        let txn = self.pool.begin().await?;

        // Newest first: older rows can survive when an earlier send failed mid-way.
        let record = resets::Entity::find()
            .filter(resets::Column::Email.eq(&email))
            .filter(resets::Column::Code.eq(code.trim()))
            .filter(resets::Column::IsUsed.eq(false))
            .order_by_desc(resets::Column::CreatedAt)
            .order_by_desc(resets::Column::Id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::ValidationError("Invalid reset code".to_string()))?;

        if now - record.created_at > Duration::seconds(RESET_CODE_TTL_SECS) {
            return Err(AppError::Expired("Reset code has expired".to_string()));
        }

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let consumed = resets::Entity::update_many()
            .col_expr(resets::Column::IsUsed, Expr::value(true))
            .filter(resets::Column::Id.eq(record.id))
            .filter(resets::Column::IsUsed.eq(false))
            .exec(&txn)
            .await?;
        if consumed.rows_affected == 0 {
            return Err(AppError::ValidationError("Invalid reset code".to_string()));
        }

        let user_id = user.id;
        let mut model = user.into_active_model();
        model.password_hash = Set(hash_password(new_password)?);
        model.updated_at = Set(now);
        model.update(&txn).await?;

        txn.commit().await?;
        log::info!("Password reset completed for user {user_id}");
        Ok(())
    }
}
