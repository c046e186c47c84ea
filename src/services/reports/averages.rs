use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ReportService;
use crate::access::{Actor, EntityKind, aggregation_scope, visible_scope};
use crate::aggregation::subject_averages;
use crate::errors::Result;
use crate::models::reports::requests::AveragesParams;
use crate::models::reports::responses::AveragesPanelResponse;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::storage::Storage;

pub async fn averages_panel(
    service: &ReportService,
    request: &HttpRequest,
    params: AveragesParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match build_panel(storage.as_ref(), &Actor::from(&user), params).await {
        Ok(panel) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            panel,
            "Averages retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

async fn build_panel(
    storage: &dyn Storage,
    actor: &Actor,
    params: AveragesParams,
) -> Result<AveragesPanelResponse> {
    let period = params
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let subjects = storage
        .list_subject_refs(
            &visible_scope(actor, EntityKind::Subject),
            params.course_id,
            period,
        )
        .await?;
    let grades = storage
        .list_scored_grades(&aggregation_scope(actor, EntityKind::Grade))
        .await?;
    let courses = storage
        .list_courses(&visible_scope(actor, EntityKind::Course), None)
        .await?;

    Ok(AveragesPanelResponse {
        averages: subject_averages(&subjects, &grades),
        courses,
    })
}
