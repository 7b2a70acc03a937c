pub mod assignments;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::assignments::requests::StudentAssignmentsQuery;
use crate::storage::Storage;

pub struct StudentService {
    storage: Option<Arc<dyn Storage>>,
}

impl StudentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn get_student_assignments(
        &self,
        request: &HttpRequest,
        query: StudentAssignmentsQuery,
    ) -> ActixResult<HttpResponse> {
        assignments::get_student_assignments(self, request, query).await
    }
}
