use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::errors::Result;
use crate::models::ApiResponse;
use crate::models::assignments::requests::{CreateAssignmentRequest, NewAssignment};
use crate::models::assignments::responses::AssignmentSummary;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    req: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    let summary = create_section_assignment(&storage, &caller, req)
        .await
        .map_err(|e| log_failure("Create assignment", &caller, e))?;

    Ok(HttpResponse::Created().json(ApiResponse::success(summary, "作业创建成功")))
}

pub(crate) async fn create_section_assignment(
    storage: &Arc<dyn Storage>,
    caller: &User,
    req: CreateAssignmentRequest,
) -> Result<AssignmentSummary> {
    let section = policy::load_section(storage, req.section_no).await?;
    policy::ensure_section_instructor(caller, &section)?;
    let title = policy::validate_title(&req.title)?;
    policy::ensure_due_date_in_term(req.due_date, &section.term)?;

    let assignment = storage
        .create_assignment(NewAssignment {
            section_no: section.section_no,
            title,
            due_date: req.due_date,
        })
        .await?;

    info!(
        "Assignment {} created in section {} by {}",
        assignment.id, section.section_no, caller.email
    );

    Ok(AssignmentSummary::from_parts(assignment, &section))
}
