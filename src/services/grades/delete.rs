use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, load_grade};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::grade_facts;
use crate::storage::Storage;

pub async fn delete_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match delete(storage.as_ref(), &Actor::from(&user), grade_id).await {
        Ok(()) => {
            info!("Grade {} deleted by user {}", grade_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Grade deleted successfully")))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

async fn delete(storage: &dyn Storage, actor: &Actor, grade_id: i64) -> Result<()> {
    let grade = load_grade(storage, grade_id).await?;
    let facts = grade_facts(storage, &grade).await?;
    authorize(actor, EntityKind::Grade, Action::Write, &facts)?;

    if storage.delete_grade(grade_id).await? {
        Ok(())
    } else {
        Err(AcademicError::not_found(format!("Grade {grade_id} not found")))
    }
}
