use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{EnrollmentService, load_enrollment};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::enrollment_facts;
use crate::storage::Storage;

pub async fn delete_enrollment(
    service: &EnrollmentService,
    request: &HttpRequest,
    enrollment_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match delete(storage.as_ref(), &Actor::from(&user), enrollment_id).await {
        Ok(()) => {
            info!("Enrollment {} deleted by user {}", enrollment_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Enrollment deleted successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::ENROLLMENT)),
    }
}

async fn delete(storage: &dyn Storage, actor: &Actor, enrollment_id: i64) -> Result<()> {
    let enrollment = load_enrollment(storage, enrollment_id).await?;
    let facts = enrollment_facts(storage, &enrollment).await?;
    authorize(actor, EntityKind::Enrollment, Action::Write, &facts)?;

    if storage.delete_enrollment(enrollment_id).await? {
        Ok(())
    } else {
        Err(AcademicError::not_found(format!("Enrollment {enrollment_id} not found")))
    }
}
