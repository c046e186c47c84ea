//! 可见范围解析
//!
//! 根据用户角色与实体类型给出查询范围，并对单条记录做读写授权。
//! 纯函数，不访问存储也不读取配置；存储层把 [`Scope`] 翻译为 SQL 条件。

use crate::errors::{AcademicError, Result};
use crate::models::users::entities::{User, UserRole};

/// 受范围约束的实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Course,
    Subject,
    Enrollment,
    Grade,
    Attendance,
    /// 学生名单（教师的选择器）
    Student,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Course => "course",
            EntityKind::Subject => "subject",
            EntityKind::Enrollment => "enrollment",
            EntityKind::Grade => "grade",
            EntityKind::Attendance => "attendance",
            EntityKind::Student => "student",
        };
        write!(f, "{name}")
    }
}

/// 查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// 全部记录
    All,
    /// 该教师负责课程下的记录
    TaughtBy(i64),
    /// 该学生已选课程下的记录
    EnrolledStudent(i64),
    /// 属于该学生本人的记录
    OwnedBy(i64),
}

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// 发起请求的用户，只保留授权需要的身份信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: i64, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

/// 单条记录的授权事实，由存储层查询得到
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFacts {
    /// 记录所属课程的负责教师；学生名单记录为其所选全部课程的教师
    pub teacher_ids: Vec<i64>,
    /// 记录归属的学生
    pub owner_id: Option<i64>,
    /// 当前用户是否选了记录所属课程
    pub viewer_enrolled: bool,
    /// 成绩的录入教师
    pub created_by: Option<i64>,
}

impl RecordFacts {
    /// 课程内记录（科目、选课、成绩、考勤）的事实
    pub fn in_course(teacher_id: i64) -> Self {
        Self {
            teacher_ids: vec![teacher_id],
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, student_id: i64) -> Self {
        self.owner_id = Some(student_id);
        self
    }

    pub fn with_viewer_enrolled(mut self, enrolled: bool) -> Self {
        self.viewer_enrolled = enrolled;
        self
    }

    pub fn created_by(mut self, creator: Option<i64>) -> Self {
        self.created_by = creator;
        self
    }
}

impl Scope {
    /// 单条记录是否落在范围内
    pub fn admits(&self, facts: &RecordFacts) -> bool {
        match self {
            Scope::All => true,
            Scope::TaughtBy(teacher_id) => facts.teacher_ids.contains(teacher_id),
            Scope::EnrolledStudent(_) => facts.viewer_enrolled,
            Scope::OwnedBy(student_id) => facts.owner_id == Some(*student_id),
        }
    }
}

/// 用户对某类实体的可见范围
pub fn visible_scope(actor: &Actor, kind: EntityKind) -> Scope {
    match actor.role {
        UserRole::Admin => Scope::All,
        UserRole::Teacher => Scope::TaughtBy(actor.id),
        UserRole::Student => match kind {
            EntityKind::Course | EntityKind::Subject => Scope::EnrolledStudent(actor.id),
            EntityKind::Enrollment
            | EntityKind::Grade
            | EntityKind::Attendance
            | EntityKind::Student => Scope::OwnedBy(actor.id),
        },
    }
}

/// 统计图表的输入范围
///
/// 平均分和出勤率按可见科目整体计算。学生看到的是所选科目全部成绩的统计，
/// 而成绩、考勤列表仍然只含本人记录。
pub fn aggregation_scope(actor: &Actor, kind: EntityKind) -> Scope {
    match (actor.role, kind) {
        (UserRole::Student, EntityKind::Grade | EntityKind::Attendance) => {
            visible_scope(actor, EntityKind::Subject)
        }
        _ => visible_scope(actor, kind),
    }
}

/// 角色是否可以创建该类实体（不含具体课程的归属检查）
pub fn can_create(actor: &Actor, kind: EntityKind) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Teacher => !matches!(kind, EntityKind::Course | EntityKind::Student),
        UserRole::Student => false,
    }
}

/// 是否允许对单条记录执行操作
pub fn is_authorized(actor: &Actor, kind: EntityKind, action: Action, facts: &RecordFacts) -> bool {
    let is_creator = kind == EntityKind::Grade
        && actor.role == UserRole::Teacher
        && facts.created_by == Some(actor.id);

    match action {
        Action::Read => visible_scope(actor, kind).admits(facts) || is_creator,
        Action::Write => match actor.role {
            UserRole::Admin => true,
            UserRole::Student => false,
            UserRole::Teacher => match kind {
                EntityKind::Course | EntityKind::Student => false,
                EntityKind::Subject | EntityKind::Enrollment | EntityKind::Attendance => {
                    facts.teacher_ids.contains(&actor.id)
                }
                EntityKind::Grade => facts.teacher_ids.contains(&actor.id) || is_creator,
            },
        },
    }
}

/// 授权检查，失败时返回 Forbidden
pub fn authorize(
    actor: &Actor,
    kind: EntityKind,
    action: Action,
    facts: &RecordFacts,
) -> Result<()> {
    if is_authorized(actor, kind, action, facts) {
        Ok(())
    } else {
        tracing::info!(
            user_id = actor.id,
            role = %actor.role,
            entity = %kind,
            action = ?action,
            "access denied"
        );
        Err(AcademicError::forbidden(format!(
            "You do not have permission to access this {kind}"
        )))
    }
}

/// 创建权限检查，失败时返回 Forbidden
pub fn authorize_create(actor: &Actor, kind: EntityKind) -> Result<()> {
    if can_create(actor, kind) {
        Ok(())
    } else {
        tracing::info!(
            user_id = actor.id,
            role = %actor.role,
            entity = %kind,
            "create denied"
        );
        Err(AcademicError::forbidden(format!(
            "You do not have permission to create a {kind}"
        )))
    }
}

/// 新成绩的录入人：教师为本人，管理员留空
pub fn grade_creator(actor: &Actor) -> Option<i64> {
    match actor.role {
        UserRole::Teacher => Some(actor.id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Actor = Actor {
        id: 1,
        role: UserRole::Admin,
    };
    const T1: Actor = Actor {
        id: 10,
        role: UserRole::Teacher,
    };
    const T2: Actor = Actor {
        id: 11,
        role: UserRole::Teacher,
    };
    const S1: Actor = Actor {
        id: 20,
        role: UserRole::Student,
    };
    const S2: Actor = Actor {
        id: 21,
        role: UserRole::Student,
    };

    const KINDS: [EntityKind; 6] = [
        EntityKind::Course,
        EntityKind::Subject,
        EntityKind::Enrollment,
        EntityKind::Grade,
        EntityKind::Attendance,
        EntityKind::Student,
    ];

    #[test]
    fn test_admin_sees_everything() {
        for kind in KINDS {
            assert_eq!(visible_scope(&ADMIN, kind), Scope::All);
        }
    }

    #[test]
    fn test_teacher_scope_is_own_courses() {
        for kind in KINDS {
            assert_eq!(visible_scope(&T1, kind), Scope::TaughtBy(10));
        }
    }

    #[test]
    fn test_student_scope_per_kind() {
        assert_eq!(
            visible_scope(&S1, EntityKind::Course),
            Scope::EnrolledStudent(20)
        );
        assert_eq!(
            visible_scope(&S1, EntityKind::Subject),
            Scope::EnrolledStudent(20)
        );
        assert_eq!(visible_scope(&S1, EntityKind::Enrollment), Scope::OwnedBy(20));
        assert_eq!(visible_scope(&S1, EntityKind::Grade), Scope::OwnedBy(20));
        assert_eq!(visible_scope(&S1, EntityKind::Attendance), Scope::OwnedBy(20));
    }

    #[test]
    fn test_aggregation_scope_widens_student_to_subjects() {
        assert_eq!(
            aggregation_scope(&S1, EntityKind::Grade),
            Scope::EnrolledStudent(20)
        );
        assert_eq!(
            aggregation_scope(&S1, EntityKind::Attendance),
            Scope::EnrolledStudent(20)
        );
        assert_eq!(aggregation_scope(&T1, EntityKind::Grade), Scope::TaughtBy(10));
        assert_eq!(aggregation_scope(&ADMIN, EntityKind::Attendance), Scope::All);
    }

    #[test]
    fn test_teacher_reads_course_iff_responsible() {
        let own = RecordFacts::in_course(10);
        let other = RecordFacts::in_course(11);
        assert!(is_authorized(&T1, EntityKind::Course, Action::Read, &own));
        assert!(!is_authorized(&T1, EntityKind::Course, Action::Read, &other));
        assert!(is_authorized(&T2, EntityKind::Course, Action::Read, &other));
    }

    #[test]
    fn test_student_reads_course_iff_enrolled() {
        let enrolled = RecordFacts::in_course(10).with_viewer_enrolled(true);
        let not_enrolled = RecordFacts::in_course(10);
        assert!(is_authorized(&S1, EntityKind::Course, Action::Read, &enrolled));
        assert!(!is_authorized(&S1, EntityKind::Course, Action::Read, &not_enrolled));
    }

    #[test]
    fn test_student_reads_only_own_grades() {
        let mine = RecordFacts::in_course(10).owned_by(20);
        assert!(is_authorized(&S1, EntityKind::Grade, Action::Read, &mine));
        assert!(!is_authorized(&S2, EntityKind::Grade, Action::Read, &mine));
    }

    #[test]
    fn test_student_never_writes_grades_or_attendance() {
        let mine = RecordFacts::in_course(10).owned_by(20).with_viewer_enrolled(true);
        for kind in [EntityKind::Grade, EntityKind::Attendance] {
            assert!(!is_authorized(&S1, kind, Action::Write, &mine));
            assert!(!can_create(&S1, kind));
        }
    }

    #[test]
    fn test_teacher_grade_access_by_course_or_creator() {
        let foreign = RecordFacts::in_course(11).owned_by(20);
        assert!(!is_authorized(&T1, EntityKind::Grade, Action::Read, &foreign));
        assert!(!is_authorized(&T1, EntityKind::Grade, Action::Write, &foreign));

        let created = foreign.clone().created_by(Some(10));
        assert!(is_authorized(&T1, EntityKind::Grade, Action::Read, &created));
        assert!(is_authorized(&T1, EntityKind::Grade, Action::Write, &created));
    }

    #[test]
    fn test_creator_exception_only_for_grades() {
        let facts = RecordFacts::in_course(11).created_by(Some(10));
        assert!(!is_authorized(&T1, EntityKind::Attendance, Action::Write, &facts));
        assert!(!is_authorized(&T1, EntityKind::Subject, Action::Write, &facts));
    }

    #[test]
    fn test_course_writes_are_admin_only() {
        let own = RecordFacts::in_course(10);
        assert!(is_authorized(&ADMIN, EntityKind::Course, Action::Write, &own));
        assert!(!is_authorized(&T1, EntityKind::Course, Action::Write, &own));
        assert!(can_create(&ADMIN, EntityKind::Course));
        assert!(!can_create(&T1, EntityKind::Course));
    }

    #[test]
    fn test_teacher_writes_subject_only_under_own_course() {
        assert!(is_authorized(
            &T1,
            EntityKind::Subject,
            Action::Write,
            &RecordFacts::in_course(10)
        ));
        assert!(!is_authorized(
            &T1,
            EntityKind::Subject,
            Action::Write,
            &RecordFacts::in_course(11)
        ));
        assert!(can_create(&T1, EntityKind::Subject));
        assert!(can_create(&T1, EntityKind::Enrollment));
    }

    #[test]
    fn test_teacher_roster_covers_students_of_own_courses() {
        let student = RecordFacts {
            teacher_ids: vec![11, 10],
            owner_id: Some(20),
            ..RecordFacts::default()
        };
        assert!(is_authorized(&T1, EntityKind::Student, Action::Read, &student));
        let unrelated = RecordFacts {
            teacher_ids: vec![11],
            owner_id: Some(21),
            ..RecordFacts::default()
        };
        assert!(!is_authorized(&T1, EntityKind::Student, Action::Read, &unrelated));
        assert!(is_authorized(&S2, EntityKind::Student, Action::Read, &unrelated));
    }

    #[test]
    fn test_all_admits_empty_facts() {
        assert!(Scope::All.admits(&RecordFacts::default()));
        assert!(!Scope::OwnedBy(20).admits(&RecordFacts::default()));
    }

    #[test]
    fn test_forbidden_error_kind() {
        let err = authorize(
            &S1,
            EntityKind::Attendance,
            Action::Write,
            &RecordFacts::default(),
        )
        .unwrap_err();
        assert_eq!(err.http_status(), 403);
        assert!(authorize_create(&T1, EntityKind::Course).is_err());
    }

    #[test]
    fn test_grade_creator() {
        assert_eq!(grade_creator(&T1), Some(10));
        assert_eq!(grade_creator(&ADMIN), None);
    }
}
