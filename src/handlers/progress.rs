use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::ProgressService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/progress",
    tag = "progress",
    params(ProgressQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Progress rows visible to the caller", body = [ProgressResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_progress(
    progress_service: web::Data<ProgressService>,
    user: AuthUser,
    query: web::Query<ProgressQuery>,
) -> Result<HttpResponse> {
    match progress_service.list_progress(&user, query.enrollment_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/progress",
    tag = "progress",
    request_body = RecordProgressRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Progress stored", body = ProgressResponse),
        (status = 403, description = "No approved enrollment for the lesson's course"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn record_progress(
    progress_service: web::Data<ProgressService>,
    user: AuthUser,
    request: web::Json<RecordProgressRequest>,
) -> Result<HttpResponse> {
    match progress_service
        .record_progress(&user, request.into_inner())
        .await
    {
        Ok(progress) => Ok(HttpResponse::Ok().json(ApiResponse::success(progress))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn progress_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/progress")
            .route("", web::get().to(list_progress))
            .route("", web::post().to(record_progress)),
    );
}
