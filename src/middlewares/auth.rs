use crate::error::AppError;
use crate::middlewares::AuthUser;
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    /// Readable anonymously with GET; a valid token still personalises the response.
    public_get_prefixes: Vec<&'static str>,
    /// Under a public prefix but still authenticated.
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec!["/swagger-ui", "/swagger-ui/", "/api-docs/openapi.json"],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/auth/"],
            public_get_prefixes: vec!["/api/courses"],
            excluded_paths: vec!["/api/auth/profile", "/api/courses/my"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        if *method == Method::GET
            && self
                .public_get_prefixes
                .iter()
                .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Decodes the bearer token once per request and stores the resulting
/// [`AuthUser`] in the request extensions. Protected paths are rejected with
/// 401 when the token is missing or invalid.
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let is_public = self.public_paths.is_public(req.method(), req.path());

        let verified = bearer_token(&req).map(|token| {
            self.jwt_service
                .verify_access_token(token)
                .and_then(|claims| AuthUser::from_claims(&claims))
        });

        match verified {
            Some(Ok(user)) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            // A stale token must not lock anyone out of public pages.
            _ if is_public => Box::pin(self.service.call(req)),
            Some(Err(_)) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/api/auth/login"));
        assert!(paths.is_public(&Method::POST, "/api/auth/register/request-code"));
        assert!(!paths.is_public(&Method::GET, "/api/auth/profile"));
        assert!(paths.is_public(&Method::GET, "/api/courses"));
        assert!(paths.is_public(&Method::GET, "/api/courses/7"));
        assert!(!paths.is_public(&Method::GET, "/api/courses/my"));
        assert!(!paths.is_public(&Method::POST, "/api/courses"));
        assert!(!paths.is_public(&Method::GET, "/api/enrollments"));
        assert!(paths.is_public(&Method::GET, "/swagger-ui/index.html"));
    }
}
