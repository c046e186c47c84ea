use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, render_download};
use crate::access::{Action, Actor, EntityKind, authorize};
use crate::aggregation::roster_rows;
use crate::errors::Result;
use crate::models::courses::entities::Course;
use crate::models::reports::requests::ExportParams;
use crate::models::reports::responses::RosterRow;
use crate::models::{ResourceCodes, error_response};
use crate::render::roster_sheet;
use crate::services::current_user;
use crate::services::facts::{course_facts, load_course};
use crate::storage::Storage;

pub async fn export_roster(
    service: &ReportService,
    request: &HttpRequest,
    course_id: i64,
    params: ExportParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let result: Result<HttpResponse> = async {
        let (course, rows) = build_roster(storage.as_ref(), &Actor::from(&user), course_id).await?;
        render_download(
            &roster_sheet(&course.code, &rows),
            params.format,
            &format!("estudiantes_{}", course.code),
        )
    }
    .await;

    Ok(result.unwrap_or_else(|e| error_response(&e, ResourceCodes::COURSE)))
}

async fn build_roster(
    storage: &dyn Storage,
    actor: &Actor,
    course_id: i64,
) -> Result<(Course, Vec<RosterRow>)> {
    let course = load_course(storage, course_id).await?;
    let facts = course_facts(storage, actor, &course).await?;
    authorize(actor, EntityKind::Course, Action::Read, &facts)?;

    let students = storage.list_course_roster(course_id).await?;
    Ok((course, roster_rows(&students)))
}
