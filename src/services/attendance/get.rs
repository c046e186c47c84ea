use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AttendanceService, load_attendance};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::Result;
use crate::models::attendance::entities::Attendance;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::attendance_facts;
use crate::storage::Storage;

pub async fn get_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match find_attendance(storage.as_ref(), &Actor::from(&user), attendance_id).await {
        Ok(attendance) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            attendance,
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ATTENDANCE)),
    }
}

async fn find_attendance(
    storage: &dyn Storage,
    actor: &Actor,
    attendance_id: i64,
) -> Result<Attendance> {
    let attendance = load_attendance(storage, attendance_id).await?;
    let facts = attendance_facts(storage, &attendance).await?;
    authorize(actor, EntityKind::Attendance, Action::Read, &facts)?;
    Ok(attendance)
}
