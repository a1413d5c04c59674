use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(UserListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Paginated users", body = PaginatedUsers),
        (status = 403, description = "Teachers only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    user: AuthUser,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    match user_service.list_users(&user, query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Teachers only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match user_service.get_user(&user, path.into_inner()).await {
        Ok(found) => Ok(HttpResponse::Ok().json(ApiResponse::success(found))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    request_body = AdminUpdateUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Teachers only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<AdminUpdateUserRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_user(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(updated))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Teachers only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match user_service.delete_user(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::get().to(list_users))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user)),
    );
}
