pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::reports::requests::SearchParams;
use crate::storage::Storage;

pub struct SearchService {
    storage: Option<Arc<dyn Storage>>,
}

impl SearchService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    // 学生与课程的关键字搜索
    pub async fn search(
        &self,
        request: &HttpRequest,
        params: SearchParams,
    ) -> ActixResult<HttpResponse> {
        query::search(self, request, params).await
    }
}
