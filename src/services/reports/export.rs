use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, render_download};
use crate::access::{Actor, EntityKind, visible_scope};
use crate::aggregation::{attendance_export_rows, grade_export_rows};
use crate::errors::Result;
use crate::models::reports::requests::{AttendanceExportParams, GradeExportParams};
use crate::models::{ResourceCodes, error_response};
use crate::render::{attendance_sheet, grades_sheet};
use crate::services::current_user;

pub async fn export_grades(
    service: &ReportService,
    request: &HttpRequest,
    params: GradeExportParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Grade);

    let result: Result<HttpResponse> = async {
        let records = storage
            .list_grade_records(&scope, None, params.course_id)
            .await?;
        let rows = grade_export_rows(&records, params.course_id, params.subject_id);
        render_download(&grades_sheet(&rows), params.format, "calificaciones")
    }
    .await;

    Ok(result.unwrap_or_else(|e| error_response(&e, ResourceCodes::GRADE)))
}

pub async fn export_attendance(
    service: &ReportService,
    request: &HttpRequest,
    params: AttendanceExportParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Attendance);

    let result: Result<HttpResponse> = async {
        let records = storage
            .list_attendance_records(&scope, params.from, params.to)
            .await?;
        let rows = attendance_export_rows(&records, params.from, params.to);
        render_download(&attendance_sheet(&rows), params.format, "asistencias")
    }
    .await;

    Ok(result.unwrap_or_else(|e| error_response(&e, ResourceCodes::ATTENDANCE)))
}
