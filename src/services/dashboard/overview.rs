use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::DashboardService;
use crate::access::{Actor, EntityKind, aggregation_scope, visible_scope};
use crate::aggregation::{monthly_attendance, subject_averages};
use crate::errors::Result;
use crate::models::dashboard::{DashboardCounts, DashboardResponse};
use crate::models::reports::responses::ChartSeries;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::storage::Storage;

pub async fn get_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match build_dashboard(storage.as_ref(), &Actor::from(&user)).await {
        Ok(dashboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            dashboard,
            "Dashboard retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::GRADE)),
    }
}

/// 三种角色使用同一套计算，差别只在可见范围
pub(crate) async fn build_dashboard(storage: &dyn Storage, actor: &Actor) -> Result<DashboardResponse> {
    let subject_scope = visible_scope(actor, EntityKind::Subject);

    let counts = DashboardCounts {
        students: storage
            .count_students(&visible_scope(actor, EntityKind::Student))
            .await?,
        courses: storage
            .count_courses(&visible_scope(actor, EntityKind::Course))
            .await?,
        subjects: storage.count_subjects(&subject_scope).await?,
    };

    let subjects = storage.list_subject_refs(&subject_scope, None, None).await?;
    let grades = storage
        .list_scored_grades(&aggregation_scope(actor, EntityKind::Grade))
        .await?;
    let averages = subject_averages(&subjects, &grades);

    let marks = storage
        .list_attendance_marks(&aggregation_scope(actor, EntityKind::Attendance))
        .await?;
    let rates = monthly_attendance(&marks);

    Ok(DashboardResponse {
        role: actor.role,
        counts,
        subject_averages: ChartSeries::from(averages.as_slice()),
        attendance_rates: ChartSeries::from(rates.as_slice()),
    })
}
