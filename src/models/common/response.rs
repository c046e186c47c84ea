use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::AcademicError;
use crate::models::{ErrorCode, ResourceCodes};

// 统一的API响应结构
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "api.ts")]
pub struct ApiResponse<T: TS> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: TS> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: Some(data),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Success as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn error_empty(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code as i32,
            message: message.into(),
            data: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// 业务错误转为 HTTP 响应
///
/// 同一类错误在所有实体上使用相同的响应结构，只有错误码不同。
pub fn error_response(err: &AcademicError, codes: ResourceCodes) -> HttpResponse {
    let code = match err {
        AcademicError::Forbidden(_) => codes.forbidden,
        AcademicError::NotFound(_) => codes.not_found,
        AcademicError::Duplicate(_) => codes.duplicate,
        AcademicError::Validation(_) | AcademicError::DateParse(_) => ErrorCode::BadRequest,
        AcademicError::Authentication(_) => ErrorCode::Unauthorized,
        AcademicError::Export(_) => ErrorCode::ExportFailed,
        _ => ErrorCode::InternalServerError,
    };

    if !err.is_client_error() {
        tracing::error!("{}", err);
    }

    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ApiResponse::error_empty(code, err.message()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_shape_is_uniform() {
        let err = AcademicError::forbidden("not allowed");
        let course = error_response(&err, ResourceCodes::COURSE);
        let grade = error_response(&err, ResourceCodes::GRADE);
        assert_eq!(course.status(), StatusCode::FORBIDDEN);
        assert_eq!(grade.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = AcademicError::duplicate("enrollment exists");
        let resp = error_response(&err, ResourceCodes::ENROLLMENT);
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AcademicError::not_found("missing");
        let resp = error_response(&err, ResourceCodes::SUBJECT);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
