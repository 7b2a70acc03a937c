use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "assignment.ts")]
pub struct Assignment {
    // 唯一 ID
    pub id: i64,
    // 作业标题
    pub title: String,
    // 截止日期（无时间部分）
    pub due_date: NaiveDate,
    // 所属课程班，创建后不可变
    pub section_no: i64,
}
