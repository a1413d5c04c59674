use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// Length rules plus the "not entirely numeric" rule applied at registration and reset.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if !(8..=128).contains(&length) {
        return Err(AppError::ValidationError(
            "Password must be between 8 and 128 characters".to_string(),
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Password cannot be entirely numeric".to_string(),
        ));
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("clave-segura").is_ok());
        assert!(validate_password("Password123").is_ok());
        assert!(validate_password("short1").is_err()); // too short
        assert!(validate_password("12345678").is_err()); // numeric only
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accented = "ñ".repeat(100);
        assert_eq!(accented.len(), 200);
        assert!(validate_password(&accented).is_ok());
        assert!(validate_password(&"ñ".repeat(128)).is_ok());
        assert!(validate_password(&"ñ".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }
}
