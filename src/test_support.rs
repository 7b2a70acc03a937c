//! 测试夹具：内存 SQLite 数据库与基础数据构造

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlxSqliteConnector,
};

use crate::entity::grades::Column as GradeColumn;
use crate::entity::prelude::*;
use crate::models::users::entities::{User, UserType};
use crate::storage::Storage;
use crate::storage::sea_orm_storage::SeaOrmStorage;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// 临时目录下不重名的数据库文件路径
pub fn scratch_db_path(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("gradebook-{tag}-{}-{nanos}.db", std::process::id()))
}

/// 删除数据库文件及 WAL 附属文件
pub fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(name));
    }
}

pub struct TestDb {
    pub storage: Arc<dyn Storage>,
    pub db: DatabaseConnection,
}

impl TestDb {
    /// 单连接的内存数据库，连接关闭即丢失，因此不允许空闲回收
    pub async fn new() -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        Self::connect(options, 1).await
    }

    /// 基于临时文件的 WAL 数据库，多个连接可以真正并发地访问
    pub async fn file_backed(path: &Path, connections: u32) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));
        Self::connect(options, connections).await
    }

    async fn connect(options: SqliteConnectOptions, connections: u32) -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(connections)
            .min_connections(connections)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .unwrap();

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);
        let storage = SeaOrmStorage::from_connection(db.clone()).await.unwrap();

        Self {
            storage: Arc::new(storage),
            db,
        }
    }

    pub async fn user(&self, email: &str, name: &str, user_type: UserType) -> User {
        UserActiveModel {
            email: Set(email.to_string()),
            name: Set(name.to_string()),
            user_type: Set(user_type.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .into_user()
    }

    pub async fn term(&self, year: i32, semester: &str, start: NaiveDate, end: NaiveDate) -> i64 {
        TermActiveModel {
            year: Set(year),
            semester: Set(semester.to_string()),
            start_date: Set(start),
            end_date: Set(end),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }

    pub async fn section(
        &self,
        section_no: i64,
        sec_id: i32,
        course_id: &str,
        term_id: i64,
        instructor_email: &str,
    ) {
        SectionActiveModel {
            section_no: Set(section_no),
            sec_id: Set(sec_id),
            course_id: Set(course_id.to_string()),
            term_id: Set(term_id),
            instructor_email: Set(instructor_email.to_string()),
        }
        .insert(&self.db)
        .await
        .unwrap();
    }

    pub async fn enroll(&self, student_id: i64, section_no: i64) -> i64 {
        EnrollmentActiveModel {
            student_id: Set(student_id),
            section_no: Set(section_no),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
        .id
    }

    pub async fn grade_count(&self, assignment_id: i64) -> u64 {
        Grades::find()
            .filter(GradeColumn::AssignmentId.eq(assignment_id))
            .count(&self.db)
            .await
            .unwrap()
    }
}

/// 常用场景：课程班 100，教师 prof@x.edu，学期 2024 Spring [2024-01-01, 2024-05-01]
pub struct Spring2024 {
    pub db: TestDb,
    pub instructor: User,
}

impl Spring2024 {
    pub const SECTION_NO: i64 = 100;

    pub async fn new() -> Self {
        Self::seed(TestDb::new().await).await
    }

    pub async fn seed(db: TestDb) -> Self {
        let instructor = db
            .user("prof@x.edu", "Prof Ada", UserType::Instructor)
            .await;
        let term_id = db
            .term(2024, "Spring", date(2024, 1, 1), date(2024, 5, 1))
            .await;
        db.section(Self::SECTION_NO, 1, "cst363", term_id, "prof@x.edu")
            .await;

        Self { db, instructor }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.db.storage
    }

    pub async fn student(&self, email: &str, name: &str) -> (User, i64) {
        let student = self.db.user(email, name, UserType::Student).await;
        let enrollment_id = self.db.enroll(student.id, Self::SECTION_NO).await;
        (student, enrollment_id)
    }
}
