use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::EnrollmentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/enrollments",
    tag = "enrollments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollments visible to the caller", body = [EnrollmentResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_enrollments(
    enrollment_service: web::Data<EnrollmentService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match enrollment_service.list_enrollments(&user).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/enrollments",
    tag = "enrollments",
    request_body = EnrollRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Enrolled; approved at once for free courses", body = EnrollResponse),
        (status = 200, description = "Already enrolled, existing enrollment returned", body = EnrollResponse),
        (status = 403, description = "Only students can enroll"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn enroll(
    enrollment_service: web::Data<EnrollmentService>,
    user: AuthUser,
    request: web::Json<EnrollRequest>,
) -> Result<HttpResponse> {
    match enrollment_service.enroll(&user, request.course_id).await {
        Ok(outcome) if outcome.already_enrolled => Ok(HttpResponse::Ok().json(
            ApiResponse::success_with_message(outcome, "You are already enrolled in this course"),
        )),
        Ok(outcome) => Ok(HttpResponse::Created().json(ApiResponse::success(outcome))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/approve",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Enrollment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment approved", body = EnrollmentResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn approve_enrollment(
    enrollment_service: web::Data<EnrollmentService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match enrollment_service.approve(&user, path.into_inner()).await {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(enrollment))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/enrollments/{id}/reject",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Enrollment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrollment reverted to pending", body = EnrollmentResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn reject_enrollment(
    enrollment_service: web::Data<EnrollmentService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match enrollment_service.reject(&user, path.into_inner()).await {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(enrollment))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/enrollments/{id}/progress",
    tag = "enrollments",
    params(("id" = i32, Path, description = "Enrollment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Completed share of the course, two decimals"),
        (status = 403, description = "Neither the student nor the course owner"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn enrollment_progress(
    enrollment_service: web::Data<EnrollmentService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let enrollment_id = path.into_inner();
    match enrollment_service
        .progress_percentage(&user, enrollment_id)
        .await
    {
        Ok(percentage) => Ok(HttpResponse::Ok().json(ApiResponse::success(json!({
            "enrollment_id": enrollment_id,
            "progress_percentage": percentage
        })))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn enrollment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/enrollments")
            .route("", web::get().to(list_enrollments))
            .route("", web::post().to(enroll))
            .route("/{id}/approve", web::post().to(approve_enrollment))
            .route("/{id}/reject", web::post().to(reject_enrollment))
            .route("/{id}/progress", web::get().to(enrollment_progress)),
    );
}
