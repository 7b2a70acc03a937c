use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩：一条选课记录对一份作业的得分，score 为空表示尚未评分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct Grade {
    pub id: i64,
    pub enrollment_id: i64,
    pub assignment_id: i64,
    pub score: Option<f64>,
}
