use crate::external::{MediaKind, StoredMedia};
use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::UploadService;
use actix_web::{HttpResponse, ResponseError, Result, web};

/// Lesson videos are the largest uploads.
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    params(UploadQuery),
    request_body(content = String, content_type = "application/octet-stream", description = "Raw file bytes"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "File stored", body = StoredMedia),
        (status = 400, description = "Empty file or unsupported image format"),
        (status = 502, description = "Media host failure")
    )
)]
pub async fn upload_file(
    upload_service: web::Data<UploadService>,
    _user: AuthUser,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let kind = MediaKind::from_param(query.kind.as_deref().unwrap_or("document"));
    match upload_service
        .upload(body.to_vec(), &query.filename, kind)
        .await
    {
        Ok(stored) => Ok(HttpResponse::Ok().json(ApiResponse::success(stored))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn upload_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/upload")
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .route(web::post().to(upload_file)),
    );
}
