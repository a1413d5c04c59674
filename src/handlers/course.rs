use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::CourseService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/courses",
    tag = "courses",
    responses(
        (status = 200, description = "Published courses, or the teacher's own", body = [CourseSummary])
    )
)]
pub async fn list_courses(
    course_service: web::Data<CourseService>,
    viewer: Option<AuthUser>,
) -> Result<HttpResponse> {
    match course_service.list_courses(viewer.as_ref()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/courses/my",
    tag = "courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owned courses (teacher) or approved courses (student)", body = [CourseSummary]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_courses(
    course_service: web::Data<CourseService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match course_service.my_courses(&user).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with lessons and the viewer's status", body = CourseDetail),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    course_service: web::Data<CourseService>,
    viewer: Option<AuthUser>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match course_service
        .get_course(viewer.as_ref(), path.into_inner())
        .await
    {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(detail))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Course created", body = CourseSummary),
        (status = 403, description = "Only teachers can create courses")
    )
)]
pub async fn create_course(
    course_service: web::Data<CourseService>,
    user: AuthUser,
    request: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse> {
    match course_service.create_course(&user, request.into_inner()).await {
        Ok(course) => Ok(HttpResponse::Created().json(ApiResponse::success(course))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course updated", body = CourseSummary),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    course_service: web::Data<CourseService>,
    user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse> {
    match course_service
        .update_course(&user, path.into_inner(), request.into_inner())
        .await
    {
        Ok(course) => Ok(HttpResponse::Ok().json(ApiResponse::success(course))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    tag = "courses",
    params(("id" = i32, Path, description = "Course id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Course and its lessons deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    course_service: web::Data<CourseService>,
    user: AuthUser,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    match course_service.delete_course(&user, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Course deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn course_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/courses")
            .route("", web::get().to(list_courses))
            .route("", web::post().to(create_course))
            .route("/my", web::get().to(my_courses))
            .route("/{id}", web::get().to(get_course))
            .route("/{id}", web::put().to(update_course))
            .route("/{id}", web::delete().to(delete_course)),
    );
}
