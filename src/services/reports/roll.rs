use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, render_download};
use crate::access::{Action, Actor, EntityKind, Scope, authorize};
use crate::aggregation::course_roll;
use crate::errors::{AcademicError, Result};
use crate::models::reports::requests::ExportParams;
use crate::models::reports::responses::CourseRoll;
use crate::models::users::entities::UserRole;
use crate::models::{ResourceCodes, error_response};
use crate::render::roll_sheet;
use crate::services::current_user;
use crate::services::facts::{course_facts, load_course};
use crate::storage::Storage;

pub async fn export_course_roll(
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
        let roll = build_roll(storage.as_ref(), &Actor::from(&user), course_id).await?;
        render_download(
            &roll_sheet(&roll),
            params.format,
            &format!("acta_{}", roll.course_code),
        )
    }
    .await;

    Ok(result.unwrap_or_else(|e| error_response(&e, ResourceCodes::COURSE)))
}

/// 学生不能导出课程总表
pub(crate) async fn build_roll(storage: &dyn Storage, actor: &Actor, course_id: i64) -> Result<CourseRoll> {
    let course = load_course(storage, course_id).await?;
    if actor.role == UserRole::Student {
        tracing::info!(user_id = actor.id, course_id, "course roll denied to student");
        return Err(AcademicError::forbidden(
            "You do not have permission to export this course roll",
        ));
    }
    let facts = course_facts(storage, actor, &course).await?;
    authorize(actor, EntityKind::Course, Action::Read, &facts)?;

    let records = storage
        .list_grade_records(&Scope::All, None, Some(course_id))
        .await?;
    Ok(course_roll(&course, &records))
}
