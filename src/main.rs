use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;
use std::sync::Arc;

use aula_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{CloudinaryService, SharedMediaStore, email_sender_from_config},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::{JwtService, system_clock},
};

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    log::error!("{context}: {err}");
    std::io::Error::other(format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().map_err(|e| startup_error("Failed to load configuration", e))?;

    let pool = create_pool(&config.database)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| startup_error("Failed to run database migrations", e))?;

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let clock = system_clock();

    let email_sender = email_sender_from_config(&config.email)
        .map_err(|e| startup_error("Failed to set up email delivery", e))?;
    let cloudinary = CloudinaryService::new(config.media.clone())
        .map_err(|e| startup_error("Failed to set up media storage", e))?;
    if !cloudinary.is_configured() {
        log::warn!("Cloudinary credentials not set, uploads will fail");
    }
    let media_store: SharedMediaStore = Arc::new(cloudinary);

    let registration_service = RegistrationService::new(
        pool.clone(),
        jwt_service.clone(),
        email_sender.clone(),
        clock.clone(),
    );
    let password_reset_service =
        PasswordResetService::new(pool.clone(), email_sender.clone(), clock.clone());
    let auth_service = AuthService::new(pool.clone(), jwt_service.clone(), clock.clone());
    let course_service = CourseService::new(pool.clone(), clock.clone());
    let lesson_service = LessonService::new(pool.clone(), clock.clone());
    let enrollment_service = EnrollmentService::new(pool.clone(), clock.clone());
    let voucher_service = VoucherService::new(pool.clone(), clock.clone());
    let progress_service = ProgressService::new(pool.clone(), clock.clone());
    let user_service = UserService::new(pool.clone(), clock.clone());
    let upload_service = UploadService::new(media_store);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .wrap(Logger::default())
            .app_data(web::Data::new(registration_service.clone()))
            .app_data(web::Data::new(password_reset_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(course_service.clone()))
            .app_data(web::Data::new(lesson_service.clone()))
            .app_data(web::Data::new(enrollment_service.clone()))
            .app_data(web::Data::new(voucher_service.clone()))
            .app_data(web::Data::new(progress_service.clone()))
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(upload_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::auth_config)
                    .configure(handlers::course_config)
                    .configure(handlers::lesson_config)
                    .configure(handlers::enrollment_config)
                    .configure(handlers::voucher_config)
                    .configure(handlers::progress_config)
                    .configure(handlers::user_config)
                    .configure(handlers::upload_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
