pub mod attendance;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod facts;
pub mod grades;
pub mod reports;
pub mod search;
pub mod subjects;
pub mod users;

pub use attendance::AttendanceService;
pub use auth::AuthService;
pub use courses::CourseService;
pub use dashboard::DashboardService;
pub use enrollments::EnrollmentService;
pub use grades::GradeService;
pub use reports::ReportService;
pub use search::SearchService;
pub use subjects::SubjectService;
pub use users::UserService;

use actix_web::{HttpRequest, HttpResponse};

use crate::middlewares::RequireJWT;
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};

/// 当前登录用户，缺失时给出 401 响应
pub(crate) fn current_user(request: &HttpRequest) -> Result<User, HttpResponse> {
    RequireJWT::extract_user_claims(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user",
        ))
    })
}
