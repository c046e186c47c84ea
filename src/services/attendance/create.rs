use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AttendanceService, ensure_subject_writable, ensure_unique_mark};
use crate::access::{Actor, EntityKind, authorize_create};
use crate::errors::Result;
use crate::models::attendance::{entities::Attendance, requests::CreateAttendanceRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{ensure_student_pickable, load_active_student};
use crate::storage::Storage;

pub async fn create_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_data: CreateAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match create(storage.as_ref(), &Actor::from(&user), attendance_data).await {
        Ok(attendance) => {
            info!(
                "Attendance {} recorded for student {} by user {}",
                attendance.id, attendance.student_id, user.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                attendance,
                "Attendance created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::ATTENDANCE)),
    }
}

async fn create(
    storage: &dyn Storage,
    actor: &Actor,
    mut data: CreateAttendanceRequest,
) -> Result<Attendance> {
    authorize_create(actor, EntityKind::Attendance)?;
    data.notes = data.notes.trim().to_string();

    ensure_subject_writable(storage, actor, data.subject_id).await?;
    load_active_student(storage, data.student_id).await?;
    ensure_student_pickable(storage, actor, data.student_id).await?;

    let date = *data
        .date
        .get_or_insert_with(|| chrono::Utc::now().date_naive());
    ensure_unique_mark(storage, data.student_id, data.subject_id, date, None).await?;

    storage.create_attendance(data).await
}
