use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::{AuthService, PasswordResetService, RegistrationService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/auth/register/request-code",
    tag = "auth",
    request_body = RequestCodeRequest,
    responses(
        (status = 200, description = "Verification code sent"),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email or full name already registered"),
        (status = 502, description = "Email delivery failed")
    )
)]
pub async fn request_code(
    registration_service: web::Data<RegistrationService>,
    request: web::Json<RequestCodeRequest>,
) -> Result<HttpResponse> {
    match registration_service.request_code(request.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Verification code sent to your email",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register/resend-code",
    tag = "auth",
    request_body = ResendCodeRequest,
    responses(
        (status = 200, description = "Verification code re-sent"),
        (status = 404, description = "No pending registration"),
        (status = 429, description = "Cooldown still active")
    )
)]
pub async fn resend_code(
    registration_service: web::Data<RegistrationService>,
    request: web::Json<ResendCodeRequest>,
) -> Result<HttpResponse> {
    match registration_service.resend_code(&request.email).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("A new code was sent"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register/confirm",
    tag = "auth",
    request_body = ConfirmCodeRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Wrong code"),
        (status = 404, description = "No pending registration")
    )
)]
pub async fn confirm_code(
    registration_service: web::Data<RegistrationService>,
    request: web::Json<ConfirmCodeRequest>,
) -> Result<HttpResponse> {
    match registration_service
        .confirm_code(&request.email, &request.code)
        .await
    {
        Ok(response) => Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
            response,
            "Registration completed",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh_token(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(&request.refresh).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/request",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset code sent"),
        (status = 404, description = "No account with this email"),
        (status = 502, description = "Email delivery failed")
    )
)]
pub async fn request_password_reset(
    password_reset_service: web::Data<PasswordResetService>,
    request: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse> {
    match password_reset_service.request_reset(&request.email).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "A reset code was sent to your email",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/password-reset/confirm",
    tag = "auth",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Wrong code or weak password"),
        (status = 410, description = "Code expired")
    )
)]
pub async fn confirm_password_reset(
    password_reset_service: web::Data<PasswordResetService>,
    request: web::Json<PasswordResetConfirmRequest>,
) -> Result<HttpResponse> {
    match password_reset_service
        .confirm_reset(&request.email, &request.code, &request.new_password)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Password updated, you can now log in",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user's profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_profile(
    auth_service: web::Data<AuthService>,
    user: AuthUser,
) -> Result<HttpResponse> {
    match auth_service.get_profile(user.id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(ApiResponse::success(profile))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    request_body = UpdateProfileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile(
    auth_service: web::Data<AuthService>,
    user: AuthUser,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    match auth_service.update_profile(user.id, request.into_inner()).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(ApiResponse::success(profile))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register/request-code", web::post().to(request_code))
            .route("/register/resend-code", web::post().to(resend_code))
            .route("/register/confirm", web::post().to(confirm_code))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh_token))
            .route("/password-reset/request", web::post().to(request_password_reset))
            .route("/password-reset/confirm", web::post().to(confirm_password_reset))
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile)),
    );
}
