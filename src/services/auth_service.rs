use crate::entities::{course_entity as courses, enrollment_entity as enrollments, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{JwtService, SharedClock, normalize_email, normalize_second_last_name, verify_password};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::collections::HashMap;

/// Builds the login/registration payload: public profile plus a fresh token pair.
pub fn build_auth_response(jwt_service: &JwtService, user: users::Model) -> AppResult<AuthResponse> {
    let tokens = jwt_service.issue(user.id, &user.role)?;
    Ok(AuthResponse {
        user: UserResponse::from(user),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: jwt_service.get_access_token_expires_in(),
    })
}

/// Applies a profile patch to an active model. Blank required names are rejected.
pub(crate) fn apply_profile_patch(
    model: &mut users::ActiveModel,
    patch: &UpdateProfileRequest,
) -> AppResult<()> {
    fn required(field: &str, value: &str) -> AppResult<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::ValidationError(format!("{field} cannot be empty")));
        }
        Ok(trimmed.to_string())
    }

    if let Some(v) = &patch.first_name {
        model.first_name = Set(required("first_name", v)?);
    }
    if let Some(v) = &patch.middle_name {
        model.middle_name = Set(v.trim().to_string());
    }
    if let Some(v) = &patch.last_name {
        model.last_name = Set(required("last_name", v)?);
    }
    if let Some(v) = &patch.second_last_name {
        model.second_last_name = Set(normalize_second_last_name(v));
    }
    if let Some(v) = &patch.phone {
        model.phone = Set(v.trim().to_string());
    }
    if let Some(v) = &patch.avatar {
        model.avatar = Set(non_blank(v));
    }
    if let Some(v) = &patch.yape_qr {
        model.yape_qr = Set(non_blank(v));
    }
    if let Some(v) = &patch.plin_qr {
        model.plin_qr = Set(non_blank(v));
    }
    Ok(())
}

/// An empty string clears an optional media reference.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    jwt_service: JwtService,
    clock: SharedClock,
}

impl AuthService {
    pub fn new(pool: DatabaseConnection, jwt_service: JwtService, clock: SharedClock) -> Self {
        Self {
            pool,
            jwt_service,
            clock,
        }
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        let invalid = || AppError::AuthError("Invalid email or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .one(&self.pool)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        log::info!("User {} logged in", user.id);
        build_auth_response(&self.jwt_service, user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = users::Entity::find_by_id(claims.user_id()?)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        // Role is re-read so a role change takes effect on the next refresh.
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.role)?;

        Ok(RefreshResponse {
            access_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<ProfileResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let approved = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(user_id))
            .filter(enrollments::Column::IsApproved.eq(true))
            .order_by_desc(enrollments::Column::ApprovedAt)
            .all(&self.pool)
            .await?;

        let course_ids: Vec<i32> = approved.iter().map(|e| e.course_id).collect();
        let course_map: HashMap<i32, courses::Model> = courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let approved_enrollments: Vec<ProfileEnrollment> = approved
            .into_iter()
            .filter_map(|e| {
                let course = course_map.get(&e.course_id)?;
                Some(ProfileEnrollment {
                    enrollment_id: e.id,
                    course_id: course.id,
                    course_title: course.title.clone(),
                    is_paid: course.is_paid,
                    approved_at: e.approved_at,
                })
            })
            .collect();

        Ok(ProfileResponse {
            user: UserResponse::from(user),
            enrolled_courses_count: approved_enrollments.len() as u64,
            approved_enrollments,
        })
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        request: UpdateProfileRequest,
    ) -> AppResult<ProfileResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut model = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .into_active_model();
        apply_profile_patch(&mut model, &request)?;
        model.updated_at = Set(self.clock.now());
        model
            .update(&self.pool)
            .await
            .map_err(|e| AppError::from_db_unique(e, "A user with this full name is already registered"))?;

        self.get_profile(user_id).await
    }
}
