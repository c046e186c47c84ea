use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReportService, render_download};
use crate::access::{Actor, Scope};
use crate::aggregation::transcript;
use crate::errors::{AcademicError, Result};
use crate::models::reports::requests::ExportParams;
use crate::models::reports::responses::Transcript;
use crate::models::users::entities::UserRole;
use crate::models::{ResourceCodes, error_response};
use crate::render::transcript_sheet;
use crate::services::current_user;
use crate::services::facts::load_user;
use crate::storage::Storage;

pub async fn export_transcript(
    service: &ReportService,
    request: &HttpRequest,
    student_id: Option<i64>,
    params: ExportParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);
    let actor = Actor::from(&user);

    let result: Result<HttpResponse> = async {
        let student_id = resolve_student(&actor, student_id)?;
        let report = build_transcript(storage.as_ref(), &actor, student_id).await?;
        render_download(
            &transcript_sheet(&report),
            params.format,
            &format!("boletin_{}", report.username),
        )
    }
    .await;

    Ok(result.unwrap_or_else(|e| error_response(&e, ResourceCodes::USER)))
}

/// 未指定学生时只有学生本人可以使用
fn resolve_student(actor: &Actor, student_id: Option<i64>) -> Result<i64> {
    match (student_id, actor.role) {
        (Some(id), _) => Ok(id),
        (None, UserRole::Student) => Ok(actor.id),
        (None, _) => Err(AcademicError::validation(
            "student_id is required for non-student users",
        )),
    }
}

/// 管理员任意学生；教师仅限选了自己课程的学生；学生仅限本人
async fn ensure_can_view(storage: &dyn Storage, actor: &Actor, student_id: i64) -> Result<()> {
    let allowed = match actor.role {
        UserRole::Admin => true,
        UserRole::Student => actor.id == student_id,
        UserRole::Teacher => storage
            .student_course_teachers(student_id)
            .await?
            .contains(&actor.id),
    };
    if allowed {
        Ok(())
    } else {
        tracing::info!(
            user_id = actor.id,
            role = %actor.role,
            student_id,
            "transcript access denied"
        );
        Err(AcademicError::forbidden(
            "You do not have permission to view this transcript",
        ))
    }
}

pub(crate) async fn build_transcript(
    storage: &dyn Storage,
    actor: &Actor,
    student_id: i64,
) -> Result<Transcript> {
    let student = storage
        .get_roster_student(student_id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Student {student_id} not found")))?;
    ensure_can_view(storage, actor, student_id).await?;

    let account = load_user(storage, student_id).await?;
    let records = storage
        .list_grade_records(&Scope::All, Some(student_id), None)
        .await?;
    Ok(transcript(&student, &account.username, &records))
}
