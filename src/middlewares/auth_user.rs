use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::Claims;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{Ready, ready};

/// Authenticated caller, resolved once per request by `AuthMiddleware`.
///
/// Take `AuthUser` in a handler to require a login, or `Option<AuthUser>`
/// where anonymous access is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub role: UserRole,
}

impl AuthUser {
    pub fn from_claims(claims: &Claims) -> AppResult<Self> {
        Ok(Self {
            id: claims.user_id()?,
            role: claims.role.clone(),
        })
    }

    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }

    pub fn require_teacher(&self) -> AppResult<()> {
        if self.is_teacher() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Only teachers can perform this action".to_string()))
        }
    }

    pub fn require_student(&self) -> AppResult<()> {
        if self.role == UserRole::Student {
            Ok(())
        } else {
            Err(AppError::Forbidden("Only students can perform this action".to_string()))
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(AppError::AuthError("Authentication required".to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_role_checks() {
        let teacher = AuthUser { id: 1, role: UserRole::Teacher };
        let student = AuthUser { id: 2, role: UserRole::Student };

        assert!(teacher.require_teacher().is_ok());
        assert!(matches!(teacher.require_student(), Err(AppError::Forbidden(_))));
        assert!(student.require_student().is_ok());
        assert!(matches!(student.require_teacher(), Err(AppError::Forbidden(_))));
    }

    #[actix_web::test]
    async fn test_extractor_reads_extensions() {
        let req = TestRequest::default().to_http_request();
        assert!(AuthUser::extract(&req).await.is_err());

        req.extensions_mut().insert(AuthUser { id: 5, role: UserRole::Student });
        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.id, 5);
    }
}
