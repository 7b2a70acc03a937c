use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::errors::{GradebookError, Result};
use crate::models::ApiResponse;
use crate::models::assignments::requests::UpdateAssignmentRequest;
use crate::models::assignments::responses::AssignmentSummary;
use crate::models::users::entities::User;
use crate::services::{current_user, log_failure, policy};
use crate::storage::Storage;

pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    req: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let caller = current_user(request)?;

    let summary = update_section_assignment(&storage, &caller, req)
        .await
        .map_err(|e| log_failure("Update assignment", &caller, e))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "作业更新成功")))
}

/// 只修改标题与截止日期，所属课程班保持不变
pub(crate) async fn update_section_assignment(
    storage: &Arc<dyn Storage>,
    caller: &User,
    req: UpdateAssignmentRequest,
) -> Result<AssignmentSummary> {
    let (existing, section) = policy::load_owned_assignment(storage, caller, req.id).await?;
    let title = policy::validate_title(&req.title)?;
    policy::ensure_due_date_in_term(req.due_date, &section.term)?;

    let updated = storage
        .update_assignment(existing.id, title, req.due_date)
        .await?
        .ok_or_else(|| GradebookError::not_found(format!("Assignment not found: {}", req.id)))?;

    info!(
        "Assignment {} updated by {} (due {} -> {})",
        updated.id, caller.email, existing.due_date, updated.due_date
    );

    Ok(AssignmentSummary::from_parts(updated, &section))
}
