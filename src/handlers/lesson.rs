use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::LessonService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/lessons",
    tag = "lessons",
    params(LessonListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lessons ordered by position", body = [LessonResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_lessons(
    lesson_service: web::Data<LessonService>,
    user: AuthUser,
    query: web::Query<LessonListQuery>,
) -> Result<HttpResponse> {
    match lesson_service.list_lessons(&user, query.course_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    tag = "lessons",
    params(("id" = i32, Path, description = "Lesson id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lesson with the viewer's progress", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn get_lesson(
    lesson_service: web::Data<LessonService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match lesson_service.get_lesson(&user, path.into_inner()).await {
        Ok(lesson) => Ok(HttpResponse::Ok().json(ApiResponse::success(lesson))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/lessons",
    tag = "lessons",
    request_body = CreateLessonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 403, description = "Not the course owner")
    )
)]
pub async fn create_lesson(
    lesson_service: web::Data<LessonService>,
    user: AuthUser,
    request: web::Json<CreateLessonRequest>,
) -> Result<HttpResponse> {
    match lesson_service.create_lesson(&user, request.into_inner()).await {
        Ok(lesson) => Ok(HttpResponse::Created().json(ApiResponse::success(lesson))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/lessons/{id}",
    tag = "lessons",
    params(("id" = i32, Path, description = "Lesson id")),
    request_body = UpdateLessonRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn update_lesson(
    lesson_service: web::Data<LessonService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateLessonRequest>,
) -> Result<HttpResponse> {
    match lesson_service
        .update_lesson(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(lesson) => Ok(HttpResponse::Ok().json(ApiResponse::success(lesson))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/lessons/{id}",
    tag = "lessons",
    params(("id" = i32, Path, description = "Lesson id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 403, description = "Not the course owner"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn delete_lesson(
    lesson_service: web::Data<LessonService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match lesson_service.delete_lesson(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Lesson deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn lesson_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/lessons")
            .route("", web::get().to(list_lessons))
            .route("", web::post().to(create_lesson))
            .route("/{id}", web::get().to(get_lesson))
            .route("/{id}", web::put().to(update_lesson))
            .route("/{id}", web::delete().to(delete_lesson)),
    );
}
