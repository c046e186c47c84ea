use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

pub const MAX_CODE_LEN: usize = 20;
pub const MAX_NAME_LEN: usize = 120;
pub const MAX_PERIOD_LEN: usize = 50;
pub const MIN_WEEKLY_HOURS: i32 = 1;
pub const MAX_WEEKLY_HOURS: i32 = 20;

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 长度：3 <= x <= 32
    if username.len() < 3 || username.len() > 32 {
        return Err("Username length must be between 3 and 32 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username must contain only letters, numbers, dots, underscores or hyphens");
    }
    Ok(())
}

/// 空邮箱视为未填写
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Ok(());
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 课程、科目、学号等代码
pub fn validate_code(field: &str, code: &str) -> Result<(), String> {
    let len = code.trim().chars().count();
    if len == 0 {
        return Err(format!("{field} must not be empty"));
    }
    if len > MAX_CODE_LEN {
        return Err(format!("{field} must be at most {MAX_CODE_LEN} characters"));
    }
    Ok(())
}

pub fn validate_name(field: &str, name: &str) -> Result<(), String> {
    validate_text(field, name, MAX_NAME_LEN)
}

pub fn validate_period(period: &str) -> Result<(), String> {
    validate_text("academic_period", period, MAX_PERIOD_LEN)
}

fn validate_text(field: &str, value: &str, max: usize) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(format!("{field} must not be empty"));
    }
    if len > max {
        return Err(format!("{field} must be at most {max} characters"));
    }
    Ok(())
}

/// 每周课时 1..=20
pub fn validate_weekly_hours(hours: i32) -> Result<(), String> {
    if !(MIN_WEEKLY_HOURS..=MAX_WEEKLY_HOURS).contains(&hours) {
        return Err(format!(
            "weekly_hours must be between {MIN_WEEKLY_HOURS} and {MAX_WEEKLY_HOURS}"
        ));
    }
    Ok(())
}

/// 分数 0.00..=5.00，最多两位小数
pub fn validate_score(score: Decimal) -> Result<(), String> {
    if score < Decimal::ZERO || score > Decimal::from(5) {
        return Err(format!("score must be between 0.00 and 5.00, got {score}"));
    }
    if score.normalize().scale() > 2 {
        return Err(format!("score must have at most two decimals, got {score}"));
    }
    Ok(())
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 密码策略：至少 8 位，包含大写、小写字母和数字，且不是常见弱密码
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    const WEAK: [&str; 6] = [
        "password1",
        "qwerty123",
        "abcd1234",
        "admin1234",
        "contrasena1",
        "estudiante1",
    ];
    if WEAK.iter().any(|weak| password.eq_ignore_ascii_case(weak)) {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        assert!(validate_score(dec("0.00")).is_ok());
        assert!(validate_score(dec("5.00")).is_ok());
        assert!(validate_score(dec("3.75")).is_ok());
        assert!(validate_score(dec("-0.01")).is_err());
        assert!(validate_score(dec("5.01")).is_err());
    }

    #[test]
    fn test_score_precision() {
        assert!(validate_score(dec("4.125")).is_err());
        // 末尾的零不计入精度
        assert!(validate_score(dec("4.5000")).is_ok());
    }

    #[test]
    fn test_weekly_hours_range() {
        assert!(validate_weekly_hours(1).is_ok());
        assert!(validate_weekly_hours(20).is_ok());
        assert!(validate_weekly_hours(0).is_err());
        assert!(validate_weekly_hours(21).is_err());
    }

    #[test]
    fn test_code_and_name_lengths() {
        assert!(validate_code("code", "MATH101").is_ok());
        assert!(validate_code("code", "   ").is_err());
        assert!(validate_code("code", &"X".repeat(21)).is_err());
        assert!(validate_name("name", &"n".repeat(120)).is_ok());
        assert!(validate_name("name", &"n".repeat(121)).is_err());
    }

    #[test]
    fn test_username_and_email() {
        assert!(validate_username("ana.gomez").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("ana gomez").is_err());
        assert!(validate_email("").is_ok());
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("ana@").is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Secreto2024").is_valid);
        let result = validate_password("abcd1234");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one uppercase letter")
        );
        assert!(!validate_password("Password1").is_valid);
        assert!(validate_password_simple("Ab1").is_err());
    }
}
