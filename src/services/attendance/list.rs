use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AttendanceService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::models::attendance::requests::AttendanceListParams;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;

pub async fn list_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    query: AttendanceListParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let scope = visible_scope(&Actor::from(&user), EntityKind::Attendance);

    match storage.list_attendance_with_pagination(&scope, query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ATTENDANCE)),
    }
}
