use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AttendanceService, ensure_subject_writable, ensure_unique_mark, load_attendance};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::attendance::{entities::Attendance, requests::UpdateAttendanceRequest};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{attendance_facts, ensure_student_pickable, load_active_student};
use crate::storage::Storage;

pub async fn update_attendance(
    service: &AttendanceService,
    request: &HttpRequest,
    attendance_id: i64,
    update_data: UpdateAttendanceRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match update(storage.as_ref(), &Actor::from(&user), attendance_id, update_data).await {
        Ok(attendance) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            attendance,
            "Attendance updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ATTENDANCE)),
    }
}

async fn update(
    storage: &dyn Storage,
    actor: &Actor,
    attendance_id: i64,
    mut data: UpdateAttendanceRequest,
) -> Result<Attendance> {
    let attendance = load_attendance(storage, attendance_id).await?;
    let facts = attendance_facts(storage, &attendance).await?;
    authorize(actor, EntityKind::Attendance, Action::Write, &facts)?;
    data.notes = data.notes.map(|s| s.trim().to_string());

    let student_id = data.student_id.unwrap_or(attendance.student_id);
    let subject_id = data.subject_id.unwrap_or(attendance.subject_id);
    let date = data.date.unwrap_or(attendance.date);

    if subject_id != attendance.subject_id {
        ensure_subject_writable(storage, actor, subject_id).await?;
    }
    if student_id != attendance.student_id {
        load_active_student(storage, student_id).await?;
        ensure_student_pickable(storage, actor, student_id).await?;
    }
    ensure_unique_mark(storage, student_id, subject_id, date, Some(attendance_id)).await?;

    storage
        .update_attendance(attendance_id, data)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Attendance {attendance_id} not found")))
}
