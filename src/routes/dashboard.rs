use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::reports::requests::SearchParams;
use crate::services::{DashboardService, SearchService};

static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);
static SEARCH_SERVICE: Lazy<SearchService> = Lazy::new(SearchService::new_lazy);

pub async fn get_dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.get_dashboard(&req).await
}

pub async fn search(
    req: HttpRequest,
    query: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    SEARCH_SERVICE.search(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_dashboard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboard")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(get_dashboard)),
    );
    cfg.service(
        web::scope("/api/v1/search")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(search)),
    );
}
