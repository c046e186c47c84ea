use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GradeService, load_grade};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::errors::Result;
use crate::models::grades::entities::Grade;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::services::facts::grade_facts;
use crate::storage::Storage;

pub async fn get_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match find_grade(storage.as_ref(), &Actor::from(&user), grade_id).await {
        Ok(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            grade,
            "Grade retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

async fn find_grade(storage: &dyn Storage, actor: &Actor, grade_id: i64) -> Result<Grade> {
    let grade = load_grade(storage, grade_id).await?;
    let facts = grade_facts(storage, &grade).await?;
    authorize(actor, EntityKind::Grade, Action::Read, &facts)?;
    Ok(grade)
}
