pub mod attendance;
pub mod auth;
pub mod common;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod grades;
pub mod reports;
pub mod subjects;
pub mod users;

pub use common::{ApiResponse, PaginatedResponse, PaginationInfo, PaginationQuery, error_response};

use std::time::SystemTime;

/// 服务启动时间，注入到 app_data 中
#[derive(Debug, Clone, Copy)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
    pub start_system_time: SystemTime,
}

impl Default for AppStartTime {
    fn default() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
            start_system_time: SystemTime::now(),
        }
    }
}

/// 接口业务错误码
///
/// 0 表示成功，1xxx 通用，2xxx 认证与用户，3xxx 以后按实体划分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,
    ExportFailed = 1501,

    // 认证
    AuthFailed = 2000,
    AccountInactive = 2001,

    // 用户
    UserNotFound = 2100,
    UserAlreadyExists = 2101,
    UserNameInvalid = 2102,
    UserEmailInvalid = 2103,
    UserPasswordInvalid = 2104,
    CanNotDeleteCurrentUser = 2105,
    ProfileNotFound = 2106,

    // 课程
    CourseNotFound = 3000,
    CourseAlreadyExists = 3001,
    CoursePermissionDenied = 3002,
    CourseInUse = 3003,

    // 科目
    SubjectNotFound = 3100,
    SubjectAlreadyExists = 3101,
    SubjectPermissionDenied = 3102,

    // 选课
    EnrollmentNotFound = 3200,
    EnrollmentAlreadyExists = 3201,
    EnrollmentPermissionDenied = 3202,

    // 成绩
    GradeNotFound = 3300,
    GradePermissionDenied = 3301,
    GradeScoreInvalid = 3302,

    // 考勤
    AttendanceNotFound = 3400,
    AttendanceAlreadyExists = 3401,
    AttendancePermissionDenied = 3402,
}

/// 资源对应的错误码集合，统一 NotFound / Forbidden / Duplicate 的响应
#[derive(Debug, Clone, Copy)]
pub struct ResourceCodes {
    pub not_found: ErrorCode,
    pub forbidden: ErrorCode,
    pub duplicate: ErrorCode,
}

impl ResourceCodes {
    pub const COURSE: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::CourseNotFound,
        forbidden: ErrorCode::CoursePermissionDenied,
        duplicate: ErrorCode::CourseAlreadyExists,
    };
    pub const SUBJECT: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::SubjectNotFound,
        forbidden: ErrorCode::SubjectPermissionDenied,
        duplicate: ErrorCode::SubjectAlreadyExists,
    };
    pub const ENROLLMENT: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::EnrollmentNotFound,
        forbidden: ErrorCode::EnrollmentPermissionDenied,
        duplicate: ErrorCode::EnrollmentAlreadyExists,
    };
    pub const GRADE: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::GradeNotFound,
        forbidden: ErrorCode::GradePermissionDenied,
        duplicate: ErrorCode::Conflict,
    };
    pub const ATTENDANCE: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::AttendanceNotFound,
        forbidden: ErrorCode::AttendancePermissionDenied,
        duplicate: ErrorCode::AttendanceAlreadyExists,
    };
    pub const USER: ResourceCodes = ResourceCodes {
        not_found: ErrorCode::UserNotFound,
        forbidden: ErrorCode::Forbidden,
        duplicate: ErrorCode::UserAlreadyExists,
    };
}
