pub mod assignments;
pub mod common;
pub mod grades;
pub mod sections;
pub mod users;

pub use common::{ApiResponse, ErrorCode};

// 记录程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
