use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{UserRole, VoucherStatus};
use crate::external::{MediaKind, StoredMedia};
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::request_code,
        handlers::auth::resend_code,
        handlers::auth::confirm_code,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::request_password_reset,
        handlers::auth::confirm_password_reset,
        handlers::auth::get_profile,
        handlers::auth::update_profile,
        handlers::course::list_courses,
        handlers::course::my_courses,
        handlers::course::get_course,
        handlers::course::create_course,
        handlers::course::update_course,
        handlers::course::delete_course,
        handlers::lesson::list_lessons,
        handlers::lesson::get_lesson,
        handlers::lesson::create_lesson,
        handlers::lesson::update_lesson,
        handlers::lesson::delete_lesson,
        handlers::enrollment::list_enrollments,
        handlers::enrollment::enroll,
        handlers::enrollment::approve_enrollment,
        handlers::enrollment::reject_enrollment,
        handlers::enrollment::enrollment_progress,
        handlers::voucher::list_vouchers,
        handlers::voucher::submit_voucher,
        handlers::voucher::approve_voucher,
        handlers::voucher::reject_voucher,
        handlers::voucher::mark_voucher_seen,
        handlers::progress::list_progress,
        handlers::progress::record_progress,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::upload::upload_file,
    ),
    components(
        schemas(
            ApiError,
            UserRole,
            VoucherStatus,
            MediaKind,
            StoredMedia,
            RequestCodeRequest,
            ResendCodeRequest,
            ConfirmCodeRequest,
            LoginRequest,
            RefreshTokenRequest,
            PasswordResetRequest,
            PasswordResetConfirmRequest,
            AuthResponse,
            RefreshResponse,
            UserResponse,
            ProfileResponse,
            ProfileEnrollment,
            UpdateProfileRequest,
            AdminUpdateUserRequest,
            PaginatedUsers,
            CreateCourseRequest,
            UpdateCourseRequest,
            CourseSummary,
            CourseDetail,
            EnrollmentStatus,
            CreateLessonRequest,
            UpdateLessonRequest,
            LessonResponse,
            EnrollRequest,
            EnrollmentResponse,
            EnrollResponse,
            SubmitVoucherRequest,
            ReviewVoucherRequest,
            VoucherResponse,
            RecordProgressRequest,
            ProgressResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, password reset and profile"),
        (name = "courses", description = "Course catalogue"),
        (name = "lessons", description = "Course lessons"),
        (name = "enrollments", description = "Course access grants"),
        (name = "vouchers", description = "Manual payment vouchers"),
        (name = "progress", description = "Lesson watch progress"),
        (name = "users", description = "User administration (teachers)"),
        (name = "upload", description = "Media upload"),
    ),
    info(
        title = "Aula Click API",
        version = "1.0.0",
        description = "REST API for the Aula Click course platform"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_routes() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register/request-code",
            "/api/auth/password-reset/confirm",
            "/api/enrollments",
            "/api/vouchers/{id}/approve",
            "/api/progress",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
