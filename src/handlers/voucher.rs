use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::VoucherService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/vouchers",
    tag = "vouchers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Vouchers visible to the caller, newest first", body = [VoucherResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_vouchers(
    voucher_service: web::Data<VoucherService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match voucher_service.list_vouchers(&user).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/vouchers",
    tag = "vouchers",
    request_body = SubmitVoucherRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Voucher submitted for review", body = VoucherResponse),
        (status = 403, description = "Only students can submit vouchers"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn submit_voucher(
    voucher_service: web::Data<VoucherService>,
    user: AuthUser,
    request: web::Json<SubmitVoucherRequest>,
) -> Result<HttpResponse> {
    match voucher_service.submit(&user, request.into_inner()).await {
        Ok(voucher) => Ok(HttpResponse::Created().json(ApiResponse::success(voucher))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/approve",
    tag = "vouchers",
    params(("id" = i32, Path, description = "Voucher id")),
    request_body = ReviewVoucherRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Voucher approved and enrollment granted", body = VoucherResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Voucher was already rejected")
    )
)]
pub async fn approve_voucher(
    voucher_service: web::Data<VoucherService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: Option<web::Json<ReviewVoucherRequest>>,
) -> Result<HttpResponse> {
    let notes = request.and_then(|r| r.into_inner().notes);
    match voucher_service.approve(&user, path.into_inner(), notes).await {
        Ok(voucher) => Ok(HttpResponse::Ok().json(ApiResponse::success(voucher))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/reject",
    tag = "vouchers",
    params(("id" = i32, Path, description = "Voucher id")),
    request_body = ReviewVoucherRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Voucher rejected", body = VoucherResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Voucher not found"),
        (status = 409, description = "Voucher was already approved")
    )
)]
pub async fn reject_voucher(
    voucher_service: web::Data<VoucherService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: Option<web::Json<ReviewVoucherRequest>>,
) -> Result<HttpResponse> {
    let notes = request.and_then(|r| r.into_inner().notes);
    match voucher_service.reject(&user, path.into_inner(), notes).await {
        Ok(voucher) => Ok(HttpResponse::Ok().json(ApiResponse::success(voucher))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/vouchers/{id}/seen",
    tag = "vouchers",
    params(("id" = i32, Path, description = "Voucher id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notification dismissed", body = VoucherResponse),
        (status = 403, description = "Not the submitter"),
        (status = 404, description = "Voucher not found")
    )
)]
pub async fn mark_voucher_seen(
    voucher_service: web::Data<VoucherService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match voucher_service.mark_seen(&user, path.into_inner()).await {
        Ok(voucher) => Ok(HttpResponse::Ok().json(ApiResponse::success(voucher))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn voucher_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vouchers")
            .route("", web::get().to(list_vouchers))
            .route("", web::post().to(submit_voucher))
            .route("/{id}/approve", web::post().to(approve_voucher))
            .route("/{id}/reject", web::post().to(reject_voucher))
            .route("/{id}/seen", web::post().to(mark_voucher_seen)),
    );
}
