use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::apply_profile_patch;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Teacher-only user administration.
#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn list_users(
        &self,
        admin: &AuthUser,
        query: UserListQuery,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        admin.require_teacher()?;
        let params = PaginationParams {
            page: query.page,
            page_size: query.page_size,
        };

        let mut select = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }

        let total = select.clone().count(&self.pool).await?;
        let items = select
            .limit(params.page_size())
            .offset(params.offset())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(UserResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn get_user(&self, admin: &AuthUser, user_id: i32) -> AppResult<UserResponse> {
        admin.require_teacher()?;
        Ok(UserResponse::from(self.find(user_id).await?))
    }

    pub async fn update_user(
        &self,
        admin: &AuthUser,
        user_id: i32,
        request: AdminUpdateUserRequest,
    ) -> AppResult<UserResponse> {
        admin.require_teacher()?;
        if request.profile.is_empty() && request.role.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut model = self.find(user_id).await?.into_active_model();
        apply_profile_patch(&mut model, &request.profile)?;
        if let Some(role) = request.role {
            model.role = Set(role);
        }
        model.updated_at = Set(self.clock.now());
        let user = model
            .update(&self.pool)
            .await
            .map_err(|e| AppError::from_db_unique(e, "A user with this full name is already registered"))?;

        log::info!("User {user_id} updated by teacher {}", admin.id);
        Ok(UserResponse::from(user))
    }

    pub async fn delete_user(&self, admin: &AuthUser, user_id: i32) -> AppResult<()> {
        admin.require_teacher()?;
        if admin.id == user_id {
            return Err(AppError::ValidationError(
                "You cannot delete your own account".to_string(),
            ));
        }
        let user = self.find(user_id).await?;
        user.delete(&self.pool).await?;
        log::info!("User {user_id} deleted by teacher {}", admin.id);
        Ok(())
    }

    async fn find(&self, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
