use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AttendanceService, load_attendance};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::attendance_facts;
use crate::storage::Storage;

pub async fn delete_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match delete(storage.as_ref(), &Actor::from(&user), attendance_id).await {
        Ok(()) => {
            info!("Attendance {} deleted by user {}", attendance_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Attendance deleted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::ATTENDANCE)),
    }
}

async fn delete(storage: &dyn Storage, actor: &Actor, attendance_id: i64) -> Result<()> {
    let attendance = load_attendance(storage, attendance_id).await?;
    let facts = attendance_facts(storage, &attendance).await?;
    authorize(actor, EntityKind::Attendance, Action::Write, &facts)?;

    if storage.delete_attendance(attendance_id).await? {
        Ok(())
    } else {
        Err(AcademicError::not_found(format!("Attendance {attendance_id} not found")))
    }
}
