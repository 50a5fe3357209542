use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// 按顺序检查，返回第一个不满足的规则
pub fn validate_password(password: &str) -> AppResult<()> {
    let rules: [(bool, String); 6] = [
        (!password.is_empty(), "Password is required".to_string()),
        (
            password.chars().count() >= MIN_PASSWORD_LENGTH,
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters long"),
        ),
        (
            password.len() <= MAX_PASSWORD_LENGTH,
            format!("Password must be at most {MAX_PASSWORD_LENGTH} characters long"),
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter (A-Z)".to_string(),
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter (a-z)".to_string(),
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one number (0-9)".to_string(),
        ),
    ];

    if let Some((_, message)) = rules.into_iter().find(|(ok, _)| !ok) {
        return Err(AppError::ValidationError(message));
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(AppError::ValidationError(
            "Password must contain at least one special character (!@#$%^&*)".to_string(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hashed: &str) -> AppResult<bool> {
    verify(password, hashed)
        .map_err(|e| AppError::InternalError(format!("Failed to verify password: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(password: &str) -> String {
        match validate_password(password) {
            Err(AppError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123!").is_ok());
        assert_eq!(message(""), "Password is required");
        assert!(message("Pa1!").contains("at least 8"));
        assert!(message("password123!").contains("uppercase"));
        assert!(message("PASSWORD123!").contains("lowercase"));
        assert!(message("Password!!").contains("number"));
        assert!(message("Password123").contains("special character"));
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123!";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword1!", &hashed).unwrap());
    }
}
