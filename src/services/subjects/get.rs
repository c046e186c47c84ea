use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubjectService;
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::Result;
use crate::models::subjects::entities::Subject;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::{load_subject, subject_facts};
use crate::storage::Storage;

pub async fn get_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match find_subject(storage.as_ref(), &Actor::from(&user), subject_id).await {
        Ok(subject) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            subject,
            "Subject retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::SUBJECT)),
    }
}

async fn find_subject(storage: &dyn Storage, actor: &Actor, subject_id: i64) -> Result<Subject> {
    let subject = load_subject(storage, subject_id).await?;
    let facts = subject_facts(storage, actor, &subject).await?;
    authorize(actor, EntityKind::Subject, Action::Read, &facts)?;
    Ok(subject)
}
