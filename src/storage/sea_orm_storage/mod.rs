//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod grades;
mod sections;
mod users;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        } else {
            Self::connect_generic(&db_url, config.database.pool_size, config.database.timeout)
                .await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(storage)
    }

    /// 使用已建立的连接创建实例，并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| GradebookError::database_operation(format!("数据库迁移失败: {e}")))?;

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| GradebookError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, pool_size: u32, timeout: u64) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(timeout))
            .acquire_timeout(Duration::from_secs(timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| GradebookError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(GradebookError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    assignments::{entities::Assignment, requests::NewAssignment},
    grades::entities::Grade,
    sections::entities::{EnrolledStudent, Enrollment, Section},
    users::entities::User,
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    // 课程班模块
    async fn get_section_by_no(&self, section_no: i64) -> Result<Option<Section>> {
        self.get_section_by_no_impl(section_no).await
    }

    async fn get_enrollment_by_id(&self, enrollment_id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(enrollment_id).await
    }

    async fn get_enrollment_by_student_and_section(
        &self,
        student_id: i64,
        section_no: i64,
    ) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_student_and_section_impl(student_id, section_no)
            .await
    }

    async fn list_enrollments_by_section(&self, section_no: i64) -> Result<Vec<EnrolledStudent>> {
        self.list_enrollments_by_section_impl(section_no).await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, assignment_id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(assignment_id).await
    }

    async fn list_assignments_by_section(&self, section_no: i64) -> Result<Vec<Assignment>> {
        self.list_assignments_by_section_impl(section_no).await
    }

    async fn list_assignments_for_student(
        &self,
        student_id: i64,
        year: i32,
        semester: &str,
    ) -> Result<Vec<Assignment>> {
        self.list_assignments_for_student_impl(student_id, year, semester)
            .await
    }

    async fn update_assignment(
        &self,
        assignment_id: i64,
        title: String,
        due_date: NaiveDate,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(assignment_id, title, due_date)
            .await
    }

    async fn delete_assignment(&self, assignment_id: i64) -> Result<bool> {
        self.delete_assignment_impl(assignment_id).await
    }

    // 成绩模块
    async fn get_grade_by_id(&self, grade_id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(grade_id).await
    }

    async fn get_or_create_grade(&self, enrollment_id: i64, assignment_id: i64) -> Result<Grade> {
        self.get_or_create_grade_impl(enrollment_id, assignment_id)
            .await
    }

    async fn update_grade_scores(&self, scores: Vec<(i64, Option<f64>)>) -> Result<()> {
        self.update_grade_scores_impl(scores).await
    }
}
