use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{EnrollmentService, load_enrollment};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::Result;
use crate::models::enrollments::entities::Enrollment;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::enrollment_facts;
use crate::storage::Storage;

pub async fn get_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match find_enrollment(storage.as_ref(), &Actor::from(&user), enrollment_id).await {
        Ok(enrollment) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            enrollment,
            "Enrollment retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::ENROLLMENT)),
    }
}

async fn find_enrollment(
    storage: &dyn Storage,
    actor: &Actor,
    enrollment_id: i64,
) -> Result<Enrollment> {
    let enrollment = load_enrollment(storage, enrollment_id).await?;
    let facts = enrollment_facts(storage, &enrollment).await?;
    authorize(actor, EntityKind::Enrollment, Action::Read, &facts)?;
    Ok(enrollment)
}
