pub mod attendance;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod grades;
pub mod reports;
pub mod subjects;
pub mod users;

pub use attendance::configure_attendance_routes;
pub use auth::configure_auth_routes;
pub use courses::configure_courses_routes;
pub use dashboard::configure_dashboard_routes;
pub use enrollments::configure_enrollments_routes;
pub use grades::configure_grades_routes;
pub use reports::configure_reports_routes;
pub use subjects::configure_subjects_routes;
pub use users::configure_user_routes;

use actix_web::web;

/// 注册全部接口
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_courses_routes)
        .configure(configure_subjects_routes)
        .configure(configure_enrollments_routes)
        .configure(configure_grades_routes)
        .configure(configure_attendance_routes)
        .configure(configure_dashboard_routes)
        .configure(configure_reports_routes);
}
