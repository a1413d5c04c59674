use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i32> {
        self.sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn generate_token(
        &self,
        user_id: i32,
        role: &UserRole,
        token_type: &str,
        expires_in: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, user_id: i32, role: &UserRole) -> AppResult<String> {
        self.generate_token(user_id, role, ACCESS_TOKEN, self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user_id: i32, role: &UserRole) -> AppResult<String> {
        self.generate_token(user_id, role, REFRESH_TOKEN, self.refresh_token_expires_in)
    }

    /// Issues the access/refresh pair handed out at login and registration.
    pub fn issue(&self, user_id: i32, role: &UserRole) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user_id, role)?,
            refresh_token: self.generate_refresh_token(user_id, role)?,
        })
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != ACCESS_TOKEN {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != REFRESH_TOKEN {
            return Err(AppError::AuthError("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let jwt = service();
        let pair = jwt.issue(42, &UserRole::Teacher).unwrap();

        let access = jwt.verify_access_token(&pair.access_token).unwrap();
        assert_eq!(access.user_id().unwrap(), 42);
        assert_eq!(access.role, UserRole::Teacher);

        let refresh = jwt.verify_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(refresh.token_type, REFRESH_TOKEN);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let jwt = service();
        let pair = jwt.issue(1, &UserRole::Student).unwrap();
        assert!(jwt.verify_access_token(&pair.refresh_token).is_err());
        assert!(jwt.verify_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = service().generate_access_token(1, &UserRole::Student).unwrap();
        let other = JwtService::new("another-secret", 3600, 7200);
        assert!(other.verify_access_token(&token).is_err());
    }
}
