use chrono::NaiveDate;
use serde::Deserialize;
use ts_rs::TS;

/// 创建作业请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    pub due_date: NaiveDate, // ISO 8601 日期，如 "2024-03-01"
    pub section_no: i64,
}

/// 更新作业请求，只允许修改标题与截止日期
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub id: i64,
    pub title: String,
    pub due_date: NaiveDate,
}

/// 学生作业查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct StudentAssignmentsQuery {
    pub student_id: i64,
    pub year: i32,
    pub semester: String,
}

// 用于存储层的内部参数
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub section_no: i64,
    pub title: String,
    pub due_date: NaiveDate,
}
