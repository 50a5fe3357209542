use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").expect("valid username regex"));

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::ValidationError("Invalid email format".to_string()));
    }
    Ok(())
}

/// 用户名：3-50 位字母、数字、下划线、点或横线
pub fn validate_username(username: &str) -> AppResult<()> {
    if !USERNAME_RE.is_match(username) {
        return Err(AppError::ValidationError(
            "Username must be 3-50 characters of letters, digits, '_', '.' or '-'".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane@example.com").is_ok());
        assert!(validate_email("jane.doe+leads@mail.example.co").is_ok());
        assert!(validate_email("jane@").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("jane").is_ok());
        assert!(validate_username("jane_doe-1").is_ok());
        assert!(validate_username("ja").is_err());
        assert!(validate_username("jane doe").is_err());
        assert!(validate_username("jane@example.com").is_err());
    }
}
