use chrono::NaiveDate;
use std::sync::Arc;

use crate::access::Scope;
use crate::errors::Result;
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

pub mod sea_orm_storage;

/// 存储接口
///
/// 列表类操作接收可见范围 [`Scope`]，由实现翻译为查询条件；存储层本身不判断角色。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户，并按角色创建档案
    async fn create_user(
        &self,
        user: CreateUserRequest,
        password_hash: String,
    ) -> Result<(User, Option<Profile>)>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名或邮箱获取用户信息
    async fn get_user_by_username_or_email(&self, identifier: &str) -> Result<Option<User>>;
    // 用户名是否已被占用
    async fn username_taken(&self, username: &str) -> Result<bool>;
    // 列出用户（按用户名排序）
    async fn list_users_with_pagination(&self, query: UserListParams) -> Result<UserListResponse>;
    // 更新用户信息
    async fn update_user(&self, id: i64, update: UpdateUserRequest) -> Result<Option<User>>;
    // 更新用户密码
    async fn update_user_password(&self, id: i64, password_hash: String) -> Result<bool>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 删除用户
    async fn delete_user(&self, id: i64) -> Result<bool>;
    // 用户总数
    async fn count_users(&self) -> Result<u64>;
    // 获取用户档案
    async fn get_profile(&self, user: &User) -> Result<Option<Profile>>;
    // 更新学生档案
    async fn update_student_profile(
        &self,
        user_id: i64,
        update: UpdateStudentProfileRequest,
    ) -> Result<Option<StudentProfile>>;
    // 更新教师档案
    async fn update_teacher_profile(
        &self,
        user_id: i64,
        update: UpdateTeacherProfileRequest,
    ) -> Result<Option<TeacherProfile>>;
    // 学生学号是否已被占用
    async fn student_code_taken(&self, code: &str, exclude_user_id: Option<i64>) -> Result<bool>;

    /// 学生名单
    // 范围内的学生（选择器、搜索）
    async fn list_students(&self, scope: &Scope, search: Option<&str>) -> Result<Vec<StudentOption>>;
    // 范围内的学生数量
    async fn count_students(&self, scope: &Scope) -> Result<u64>;
    // 学生所选课程的负责教师
    async fn student_course_teachers(&self, student_id: i64) -> Result<Vec<i64>>;
    // 报表用的学生信息
    async fn get_roster_student(&self, student_id: i64) -> Result<Option<RosterStudent>>;
    // 课程的选课学生
    async fn list_course_roster(&self, course_id: i64) -> Result<Vec<RosterStudent>>;

    /// 课程管理方法
    async fn create_course(&self, course: CreateCourseRequest) -> Result<Course>;
    async fn get_course_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list_courses_with_pagination(
        &self,
        scope: &Scope,
        query: CourseListParams,
    ) -> Result<PaginatedResponse<Course>>;
    // 范围内全部课程，可按名称或代码搜索
    async fn list_courses(&self, scope: &Scope, search: Option<&str>) -> Result<Vec<Course>>;
    async fn update_course(&self, id: i64, update: UpdateCourseRequest) -> Result<Option<Course>>;
    async fn delete_course(&self, id: i64) -> Result<bool>;
    async fn course_code_taken(&self, code: &str, exclude_id: Option<i64>) -> Result<bool>;
    async fn count_courses(&self, scope: &Scope) -> Result<u64>;

    /// 科目管理方法
    async fn create_subject(&self, subject: CreateSubjectRequest) -> Result<Subject>;
    async fn get_subject_by_id(&self, id: i64) -> Result<Option<Subject>>;
    async fn list_subjects_with_pagination(
        &self,
        scope: &Scope,
        query: SubjectListParams,
    ) -> Result<PaginatedResponse<Subject>>;
    async fn update_subject(
        &self,
        id: i64,
        update: UpdateSubjectRequest,
    ) -> Result<Option<Subject>>;
    async fn delete_subject(&self, id: i64) -> Result<bool>;
    async fn subject_code_taken(&self, code: &str, exclude_id: Option<i64>) -> Result<bool>;
    async fn count_subjects(&self, scope: &Scope) -> Result<u64>;
    // 平均分计算用的科目，可按课程和学期过滤
    async fn list_subject_refs(
        &self,
        scope: &Scope,
        course_id: Option<i64>,
        period: Option<&str>,
    ) -> Result<Vec<SubjectRef>>;

    /// 选课管理方法
    async fn create_enrollment(&self, enrollment: CreateEnrollmentRequest) -> Result<Enrollment>;
    async fn get_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    async fn list_enrollments_with_pagination(
        &self,
        scope: &Scope,
        query: EnrollmentListParams,
    ) -> Result<PaginatedResponse<Enrollment>>;
    async fn update_enrollment(
        &self,
        id: i64,
        update: UpdateEnrollmentRequest,
    ) -> Result<Option<Enrollment>>;
    async fn delete_enrollment(&self, id: i64) -> Result<bool>;
    async fn enrollment_exists(
        &self,
        student_id: i64,
        course_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool>;

    /// 成绩管理方法
    async fn create_grade(&self, grade: CreateGradeRequest, created_by: Option<i64>)
    -> Result<Grade>;
    async fn get_grade_by_id(&self, id: i64) -> Result<Option<Grade>>;
    async fn list_grades_with_pagination(
        &self,
        scope: &Scope,
        query: GradeListParams,
    ) -> Result<PaginatedResponse<Grade>>;
    async fn update_grade(&self, id: i64, update: UpdateGradeRequest) -> Result<Option<Grade>>;
    async fn delete_grade(&self, id: i64) -> Result<bool>;
    // 范围内成绩的分数
    async fn list_scored_grades(&self, scope: &Scope) -> Result<Vec<ScoredGrade>>;
    // 范围内成绩的完整记录，可限定学生或课程
    async fn list_grade_records(
        &self,
        scope: &Scope,
        student_id: Option<i64>,
        course_id: Option<i64>,
    ) -> Result<Vec<GradeRecord>>;

    /// 考勤管理方法
    async fn create_attendance(&self, attendance: CreateAttendanceRequest) -> Result<Attendance>;
    async fn get_attendance_by_id(&self, id: i64) -> Result<Option<Attendance>>;
    async fn list_attendance_with_pagination(
        &self,
        scope: &Scope,
        query: AttendanceListParams,
    ) -> Result<PaginatedResponse<Attendance>>;
    async fn update_attendance(
        &self,
        id: i64,
        update: UpdateAttendanceRequest,
    ) -> Result<Option<Attendance>>;
    async fn delete_attendance(&self, id: i64) -> Result<bool>;
    async fn attendance_exists(
        &self,
        student_id: i64,
        subject_id: i64,
        date: NaiveDate,
        exclude_id: Option<i64>,
    ) -> Result<bool>;
    async fn list_attendance_marks(&self, scope: &Scope) -> Result<Vec<AttendanceMark>>;
    async fn list_attendance_records(
        &self,
        scope: &Scope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>>;

    // 学生是否选了该课程
    async fn is_enrolled(&self, student_id: i64, course_id: i64) -> Result<bool>;
}

/// 按配置创建存储实例并执行迁移
pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
