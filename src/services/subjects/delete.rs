use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubjectService;
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::{AcademicError, Result};
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{load_subject, subject_facts};
use crate::storage::Storage;

pub async fn delete_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match delete(storage.as_ref(), &Actor::from(&user), subject_id).await {
        Ok(()) => {
            info!("Subject {} deleted by user {}", subject_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Subject deleted successfully")))
        }
        Err(e) => Ok(error_response(&e, ResourceCodes::SUBJECT)),
    }
}

async fn delete(storage: &dyn Storage, actor: &Actor, subject_id: i64) -> Result<()> {
    let subject = load_subject(storage, subject_id).await?;
    let facts = subject_facts(storage, actor, &subject).await?;
    authorize(actor, EntityKind::Subject, Action::Write, &facts)?;

    if storage.delete_subject(subject_id).await? {
        Ok(())
    } else {
        Err(AcademicError::not_found(format!("Subject {subject_id} not found")))
    }
}
