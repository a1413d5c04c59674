use actix_cors::Cors;

pub fn create_cors() -> Cors {
    Cors::default()
        // The client app is served from several preview domains.
        .allowed_origin_fn(|_, _req_head| true)
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allow_any_header()
        .expose_headers(vec!["content-disposition"])
        .supports_credentials()
        .max_age(3600)
}
