//! 统一错误处理模块
//!
//! 使用宏生成错误枚举，每个变体带有稳定的错误代码和类型名称。

use std::fmt;

use sea_orm::SqlErr;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法
/// - error_type() 方法
/// - message() 方法
/// - snake_case 构造函数
macro_rules! define_academic_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AcademicError {
            $($variant(String),)*
        }

        impl AcademicError {
            /// 错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(AcademicError::$variant(_) => $code,)*
                }
            }

            /// 错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(AcademicError::$variant(_) => $type_name,)*
                }
            }

            /// 错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(AcademicError::$variant(msg) => msg,)*
                }
            }
        }

        paste::paste! {
            impl AcademicError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        AcademicError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_academic_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Export("E006", "Export Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    Duplicate("E010", "Duplicate Record"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Forbidden("E013", "Forbidden"),
    Notification("E014", "Notification Error"),
}

impl AcademicError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            AcademicError::Forbidden(_) => 403,
            AcademicError::NotFound(_) => 404,
            AcademicError::Duplicate(_) => 409,
            AcademicError::Validation(_) | AcademicError::DateParse(_) => 400,
            AcademicError::Authentication(_) => 401,
            _ => 500,
        }
    }

    /// 是否为调用方可恢复的业务错误
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// 数据库错误转换，带上下文描述
    ///
    /// 唯一约束冲突转为 Duplicate，外键保护转为 Validation。
    pub fn from_db(context: &str, err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                AcademicError::Duplicate(format!("{context}: duplicate record ({detail})"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AcademicError::Validation(
                format!("{context}: record is still referenced ({detail})"),
            ),
            _ => AcademicError::DatabaseOperation(format!("{context}: {err}")),
        }
    }
}

impl fmt::Display for AcademicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for AcademicError {}

impl From<sea_orm::DbErr> for AcademicError {
    fn from(err: sea_orm::DbErr) -> Self {
        AcademicError::from_db("Database error", err)
    }
}

impl From<std::io::Error> for AcademicError {
    fn from(err: std::io::Error) -> Self {
        AcademicError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for AcademicError {
    fn from(err: serde_json::Error) -> Self {
        AcademicError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for AcademicError {
    fn from(err: chrono::ParseError) -> Self {
        AcademicError::DateParse(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AcademicError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AcademicError::Export(err.to_string())
    }
}

impl From<csv::Error> for AcademicError {
    fn from(err: csv::Error) -> Self {
        AcademicError::Export(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AcademicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AcademicError::cache_connection("test").code(), "E001");
        assert_eq!(AcademicError::database_config("test").code(), "E003");
        assert_eq!(AcademicError::validation("test").code(), "E007");
        assert_eq!(AcademicError::duplicate("test").code(), "E010");
        assert_eq!(AcademicError::forbidden("test").code(), "E013");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            AcademicError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            AcademicError::duplicate("test").error_type(),
            "Duplicate Record"
        );
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(AcademicError::forbidden("x").http_status(), 403);
        assert_eq!(AcademicError::not_found("x").http_status(), 404);
        assert_eq!(AcademicError::duplicate("x").http_status(), 409);
        assert_eq!(AcademicError::validation("x").http_status(), 400);
        assert_eq!(AcademicError::authentication("x").http_status(), 401);
        assert_eq!(AcademicError::database_operation("x").http_status(), 500);
        assert!(!AcademicError::notification("smtp down").is_client_error());
    }

    #[test]
    fn test_db_error_passthrough() {
        let err = AcademicError::from_db(
            "Failed to load course",
            sea_orm::DbErr::Custom("boom".to_string()),
        );
        assert_eq!(err.code(), "E005");
        assert!(err.message().contains("Failed to load course"));
    }

    #[test]
    fn test_format_simple() {
        let err = AcademicError::validation("score out of range");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("score out of range"));
    }
}
