//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod attendance;
mod courses;
mod enrollments;
mod grades;
mod profiles;
mod reports;
pub(crate) mod scope;
mod subjects;
mod users;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::{AcademicError, Result};
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
    /// 按全局配置创建存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        Self::connect(&config.database.url, &config.database).await
    }

    /// 按给定 URL 连接并迁移，其余参数取默认值
    pub async fn connect_with_url(url: &str) -> Result<Self> {
        Self::connect(url, &DatabaseConfig::default()).await
    }

    async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let db_url = Self::build_database_url(url)?;

        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Migrator::up(&db, None)
            .await
            .map_err(|e| AcademicError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    ///
    /// 内存数据库每个连接各自独立，只能使用单连接且不能回收。
    async fn connect_sqlite(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| AcademicError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            opt = opt
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .pragma("cache_size", "-64000")
                .pragma("temp_store", "memory")
                .pragma("wal_autocheckpoint", "1000");
            SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .min_connections(1)
                .test_before_acquire(true)
                .idle_timeout(Duration::from_secs(300))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.timeout))
            .connect_with(opt)
            .await
            .map_err(|e| AcademicError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.timeout))
            .acquire_timeout(Duration::from_secs(config.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| AcademicError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 推断数据库类型
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url == ":memory:" {
            Ok("sqlite::memory:".to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(AcademicError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::access::Scope;
use crate::models::{
    PaginatedResponse,
    attendance::{
        entities::Attendance,
        requests::{AttendanceListParams, CreateAttendanceRequest, UpdateAttendanceRequest},
    },
    courses::{
        entities::Course,
        requests::{CourseListParams, CreateCourseRequest, UpdateCourseRequest},
    },
    enrollments::{
        entities::Enrollment,
        requests::{CreateEnrollmentRequest, EnrollmentListParams, UpdateEnrollmentRequest},
    },
    grades::{
        entities::Grade,
        requests::{CreateGradeRequest, GradeListParams, UpdateGradeRequest},
    },
    reports::entities::{
        AttendanceMark, AttendanceRecord, GradeRecord, RosterStudent, ScoredGrade, SubjectRef,
    },
    subjects::{
        entities::Subject,
        requests::{CreateSubjectRequest, SubjectListParams, UpdateSubjectRequest},
    },
    users::{
        entities::{Profile, StudentProfile, TeacherProfile, User},
        requests::{
            CreateUserRequest, UpdateStudentProfileRequest, UpdateTeacherProfileRequest,
            UpdateUserRequest, UserListParams,
        },
        responses::{StudentOption, UserListResponse},
    },
};
use crate::storage::Storage;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<(User, Option<Profile>)> {
        self.create_user_impl(user, password_hash).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_by_username_or_email_impl(identifier).await
    }

    async fn username_taken(&self, username: &str) -> Result<bool> {
        self.username_taken_impl(username).await
    }

    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(query).await
    }

    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>> {
        self.update_user_impl(id, update).await
    }

    async fn update_user_password(&self, id: i64, password_hash: String) -> Result<bool> {
        self.update_user_password_impl(id, password_hash).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn delete_user(&self, id: i64) -> Result<bool> {
        self.delete_user_impl(id).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 档案模块
    async fn get_profile(&self, user: &User) -> Result<Option<Profile>> {
        self.get_profile_impl(user).await
    }

    async fn update_student_profile(
        &self,
        user_id: i64,
        update: UpdateStudentProfileRequest,
    ) -> Result<Option<StudentProfile>> {
        self.update_student_profile_impl(user_id, update).await
    }

    async fn update_teacher_profile(
        &self,
        user_id: i64,
        update: UpdateTeacherProfileRequest,
    ) -> Result<Option<TeacherProfile>> {
        self.update_teacher_profile_impl(user_id, update).await
    }

    async fn student_code_taken(&self, code: &str, exclude_user_id: Option<i64>) -> Result<bool> {
        self.student_code_taken_impl(code, exclude_user_id).await
    }

    // 学生名单
    async fn list_students(&self, scope: &Scope, search: Option<&str>) -> Result<Vec<StudentOption>> {
        self.list_students_impl(scope, search).await
    }

    async fn count_students(&self, scope: &Scope) -> Result<u64> {
        self.count_students_impl(scope).await
    }

    async fn student_course_teachers(&self, student_id: i64) -> Result<Vec<i64>> {
        self.student_course_teachers_impl(student_id).await
    }

    async fn get_roster_student(&self, student_id: i64) -> Result<Option<RosterStudent>> {
        self.get_roster_student_impl(student_id).await
    }

    async fn list_course_roster(&self, course_id: i64) -> Result<Vec<RosterStudent>> {
        self.list_course_roster_impl(course_id).await
    }

    // 课程模块
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course> {
        self.create_course_impl(course).await
    }

    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.get_course_by_id_impl(id).await
    }

    async fn list_courses_with_pagination(
        &self,
        scope: &Scope,
        query: CourseListParams,
    ) -> Result<PaginatedResponse<Course>> {
        self.list_courses_with_pagination_impl(scope, query).await
    }

    async fn list_courses(&self, scope: &Scope, search: Option<&str>) -> Result<Vec<Course>> {
        self.list_courses_impl(scope, search).await
    }

    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>> {
        self.update_course_impl(id, update).await
    }

    async fn delete_course(&self, id: i64) -> Result<bool> {
        self.delete_course_impl(id).await
    }

    async fn course_code_taken(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.course_code_taken_impl(code, exclude_id).await
    }

    async fn count_courses(&self, scope: &Scope) -> Result<u64> {
        self.count_courses_impl(scope).await
    }

    // 科目模块
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject> {
        self.create_subject_impl(subject).await
    }

    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>> {
        self.get_subject_by_id_impl(id).await
    }

    async fn list_subjects_with_pagination(
        &self,
        scope: &Scope,
        query: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>> {
        self.list_subjects_with_pagination_impl(scope, query).await
    }

    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>> {
        self.update_subject_impl(id, update).await
    }

    async fn delete_subject(&self, id: i64) -> Result<bool> {
        self.delete_subject_impl(id).await
    }

    async fn subject_code_taken(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        self.subject_code_taken_impl(code, exclude_id).await
    }

    async fn count_subjects(&self, scope: &Scope) -> Result<u64> {
        self.count_subjects_impl(scope).await
    }

    async fn list_subject_refs(
        &self,
        scope: &Scope,
        course_id: Option<i64>,
        period: Option<&str>,
    ) -> Result<Vec<SubjectRef>> {
        self.list_subject_refs_impl(scope, course_id, period).await
    }

    // 选课模块
    async fn create_enrollment(&self, enrollment: CreateEnrollmentRequest) -> Result<Enrollment> {
        self.create_enrollment_impl(enrollment).await
    }

    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        self.get_enrollment_by_id_impl(id).await
    }

    async fn list_enrollments_with_pagination(
        &self,
        scope: &Scope,
        query: EnrollmentListParams,
    ) -> Result<PaginatedResponse<Enrollment>> {
        self.list_enrollments_with_pagination_impl(scope, query)
            .await
    }

    async fn update_enrollment(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>> {
        self.update_enrollment_impl(id, update).await
    }

    async fn delete_enrollment(&self, id: i64) -> Result<bool> {
        self.delete_enrollment_impl(id).await
    }

    async fn enrollment_exists(
        &self,
        student_id: i64,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        self.enrollment_exists_impl(student_id, course_id, exclude_id)
            .await
    }

    async fn is_enrolled(&self, student_id: i64, course_id: i64) -> Result<bool> {
        self.enrollment_exists_impl(student_id, course_id, None)
            .await
    }

    // 成绩模块
    async fn create_grade(
        &self,
        grade: CreateGradeRequest,
        created_by: Option<i64>,
    ) -> Result<Grade> {
        self.create_grade_impl(grade, created_by).await
    }

    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>> {
        self.get_grade_by_id_impl(id).await
    }

    async fn list_grades_with_pagination(
        &self,
        scope: &Scope,
        query: GradeListParams,
    ) -> Result<PaginatedResponse<Grade>> {
        self.list_grades_with_pagination_impl(scope, query).await
    }

    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>> {
        self.update_grade_impl(id, update).await
    }

    async fn delete_grade(&self, id: i64) -> Result<bool> {
        self.delete_grade_impl(id).await
    }

    async fn list_scored_grades(&self, scope: &Scope) -> Result<Vec<ScoredGrade>> {
        self.list_scored_grades_impl(scope).await
    }

    async fn list_grade_records(
        &self,
        scope: &Scope,
        student_id: Option<i64>,
        course_id: Option<i64>,
    ) -> Result<Vec<GradeRecord>> {
        self.list_grade_records_impl(scope, student_id, course_id)
            .await
    }

    // 考勤模块
    async fn create_attendance(&self, attendance: CreateAttendanceRequest) -> Result<Attendance> {
        self.create_attendance_impl(attendance).await
    }

    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<Attendance>> {
        self.get_attendance_by_id_impl(id).await
    }

    async fn list_attendance_with_pagination(
        &self,
        scope: &Scope,
        query: AttendanceListParams,
    ) -> Result<PaginatedResponse<Attendance>> {
        self.list_attendance_with_pagination_impl(scope, query)
            .await
    }

    async fn update_attendance(
        &self,
        id: i64,
        update: UpdateAttendanceRequest,
    ) -> Result<Option<Attendance>> {
        self.update_attendance_impl(id, update).await
    }

    async fn delete_attendance(&self, id: i64) -> Result<bool> {
        self.delete_attendance_impl(id).await
    }

    async fn attendance_exists(
        &self,
        student_id: i64,
        subject_id: i64,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        self.attendance_exists_impl(student_id, subject_id, date, exclude_id)
            .await
    }

    async fn list_attendance_marks(&self, scope: &Scope) -> Result<Vec<AttendanceMark>> {
        self.list_attendance_marks_impl(scope).await
    }

    async fn list_attendance_records(
        &self,
        scope: &Scope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>> {
        self.list_attendance_records_impl(scope, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_inference() {
        assert_eq!(
            SeaOrmStorage::build_database_url("academic.db").unwrap(),
            "sqlite://academic.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url(":memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(SeaOrmStorage::build_database_url("postgres://u@h/db").is_ok());
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }
}
