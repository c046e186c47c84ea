use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::errors::{AcademicError, Result};
use crate::models::users::requests::{UpdateStudentProfileRequest, UpdateTeacherProfileRequest};
use crate::models::{ApiResponse, ErrorCode, ResourceCodes, error_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_code, validate_name};

const PHONE_MAX_LEN: usize = 20;

pub async fn update_student_profile(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateStudentProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update_data.student_code = update_data.student_code.map(|s| s.trim().to_string());
    update_data.program = update_data.program.map(|s| s.trim().to_string());

    let storage = service.get_storage(request);

    if let Err(e) = check_student_profile(storage.as_ref(), user_id, &update_data).await {
        return Ok(error_response(&e, ResourceCodes::USER));
    }

    match storage.update_student_profile(user_id, update_data).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            profile,
            "Student profile updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProfileNotFound,
            "Student profile not found",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}

async fn check_student_profile(
    storage: &dyn Storage,
    user_id: i64,
    update: &UpdateStudentProfileRequest,
) -> Result<()> {
    if let Some(ref program) = update.program {
        validate_name("program", program).map_err(AcademicError::validation)?;
    }
    if let Some(ref code) = update.student_code {
        validate_code("student_code", code).map_err(AcademicError::validation)?;
        if storage.student_code_taken(code, Some(user_id)).await? {
            return Err(AcademicError::duplicate(format!(
                "Student code {code} already exists"
            )));
        }
    }
    Ok(())
}

pub async fn update_teacher_profile(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateTeacherProfileRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    update_data.speciality = update_data.speciality.map(|s| s.trim().to_string());
    update_data.phone = update_data.phone.map(|s| s.trim().to_string());

    if let Some(ref phone) = update_data.phone
        && phone.chars().count() > PHONE_MAX_LEN
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::BadRequest,
            format!("phone must be at most {PHONE_MAX_LEN} characters"),
        )));
    }

    let storage = service.get_storage(request);

    match storage.update_teacher_profile(user_id, update_data).await {
        Ok(Some(profile)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            profile,
            "Teacher profile updated successfully",
        ))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::ProfileNotFound,
            "Teacher profile not found",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::USER)),
    }
}
