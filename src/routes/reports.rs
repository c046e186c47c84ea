use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reports::requests::{
    AttendanceExportParams, AveragesParams, ExportParams, GradeExportParams,
};
use crate::services::ReportService;
use crate::utils::{SafeCourseIdI64, SafeStudentIdI64};

// 懒加载的全局 REPORT_SERVICE 实例
static REPORT_SERVICE: Lazy<ReportService> = Lazy::new(ReportService::new_lazy);

pub async fn averages(
    req: HttpRequest,
    query: web::Query<AveragesParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.averages(&req, query.into_inner()).await
}

pub async fn own_transcript(
    req: HttpRequest,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .transcript(&req, None, query.into_inner())
        .await
}

pub async fn student_transcript(
    req: HttpRequest,
    student_id: SafeStudentIdI64,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .transcript(&req, Some(student_id.0), query.into_inner())
        .await
}

pub async fn course_roll(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .course_roll(&req, course_id.0, query.into_inner())
        .await
}

pub async fn course_roster(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
    query: web::Query<ExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .course_roster(&req, course_id.0, query.into_inner())
        .await
}

pub async fn export_grades(
    req: HttpRequest,
    query: web::Query<GradeExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE.export_grades(&req, query.into_inner()).await
}

pub async fn export_attendance(
    req: HttpRequest,
    query: web::Query<AttendanceExportParams>,
) -> ActixResult<HttpResponse> {
    REPORT_SERVICE
        .export_attendance(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_reports_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/reports")
            .wrap(middlewares::RequireJWT)
            .route("/averages", web::get().to(averages))
            .service(
                // 文件导出按用户限流
                web::scope("")
                    .wrap(middlewares::RateLimit::export())
                    .route("/transcript", web::get().to(own_transcript))
                    .route("/transcript/{student_id}", web::get().to(student_transcript))
                    .route("/courses/{course_id}/roll", web::get().to(course_roll))
                    .route("/courses/{course_id}/roster", web::get().to(course_roster))
                    .route("/grades", web::get().to(export_grades))
                    .route("/attendance", web::get().to(export_attendance)),
            ),
    );
}
