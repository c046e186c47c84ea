use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SearchService;
use crate::access::{Actor, EntityKind, visible_scope};
use crate::errors::Result;
use crate::models::reports::requests::SearchParams;
use crate::models::reports::responses::SearchResponse;
use crate::models::{ApiResponse, ResourceCodes, error_response};
use crate::services::current_user;
use crate::storage::Storage;

pub async fn search(
    service: &SearchService,
    request: &HttpRequest,
    params: SearchParams,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match run_search(storage.as_ref(), &Actor::from(&user), params.query.trim()).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            results,
            "Search completed",
        ))),
        Err(e) => Ok(error_response(&e, ResourceCodes::COURSE)),
    }
}

/// 空关键字不查询
async fn run_search(storage: &dyn Storage, actor: &Actor, term: &str) -> Result<SearchResponse> {
    if term.is_empty() {
        return Ok(SearchResponse {
            students: Vec::new(),
            courses: Vec::new(),
        });
    }

    let students = storage
        .list_students(&visible_scope(actor, EntityKind::Student), Some(term))
        .await?;
    let courses = storage
        .list_courses(&visible_scope(actor, EntityKind::Course), Some(term))
        .await?;
    Ok(SearchResponse { students, courses })
}
