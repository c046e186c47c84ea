//! 单条记录的授权事实
//!
//! 先按 id 取记录（不存在即 NotFound），再沿记录所属的科目、课程取出授权需要的事实。

use crate::access::{Actor, RecordFacts};
use crate::errors::{AcademicError, Result};
use crate::models::attendance::entities::Attendance;
use crate::models::courses::entities::Course;
use crate::models::enrollments::entities::Enrollment;
use crate::models::grades::entities::Grade;
use crate::models::subjects::entities::Subject;
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub async fn load_course(storage: &dyn Storage, id: i64) -> Result<Course> {
    storage
        .get_course_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Course {id} not found")))
}

pub async fn load_subject(storage: &dyn Storage, id: i64) -> Result<Subject> {
    storage
        .get_subject_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("Subject {id} not found")))
}

pub async fn load_user(storage: &dyn Storage, id: i64) -> Result<User> {
    storage
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::not_found(format!("User {id} not found")))
}

/// 写入时引用的课程，不存在属于输入错误
pub async fn referenced_course(storage: &dyn Storage, id: i64) -> Result<Course> {
    storage
        .get_course_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::validation(format!("Course {id} does not exist")))
}

pub async fn referenced_subject(storage: &dyn Storage, id: i64) -> Result<Subject> {
    storage
        .get_subject_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::validation(format!("Subject {id} does not exist")))
}

/// 选课、成绩、考勤引用的学生必须是启用的学生账号
pub async fn load_active_student(storage: &dyn Storage, id: i64) -> Result<User> {
    let user = storage
        .get_user_by_id(id)
        .await?
        .ok_or_else(|| AcademicError::validation(format!("Student {id} does not exist")))?;
    if user.role != UserRole::Student || !user.is_active {
        return Err(AcademicError::validation(format!(
            "User {id} is not an active student"
        )));
    }
    Ok(user)
}

/// 学生查看课程时需要知道自己是否选了该课程
async fn viewer_enrolled(storage: &dyn Storage, actor: &Actor, course_id: i64) -> Result<bool> {
    if actor.role == UserRole::Student {
        storage.is_enrolled(actor.id, course_id).await
    } else {
        Ok(false)
    }
}

pub async fn course_facts(storage: &dyn Storage, actor: &Actor, course: &Course) -> Result<RecordFacts> {
    Ok(RecordFacts::in_course(course.teacher_id)
        .with_viewer_enrolled(viewer_enrolled(storage, actor, course.id).await?))
}

pub async fn subject_facts(
    storage: &dyn Storage,
    actor: &Actor,
    subject: &Subject,
) -> Result<RecordFacts> {
    let course = load_course(storage, subject.course_id).await?;
    course_facts(storage, actor, &course).await
}

pub async fn enrollment_facts(storage: &dyn Storage, enrollment: &Enrollment) -> Result<RecordFacts> {
    let course = load_course(storage, enrollment.course_id).await?;
    Ok(RecordFacts::in_course(course.teacher_id).owned_by(enrollment.student_id))
}

pub async fn grade_facts(storage: &dyn Storage, grade: &Grade) -> Result<RecordFacts> {
    let subject = load_subject(storage, grade.subject_id).await?;
    let course = load_course(storage, subject.course_id).await?;
    Ok(RecordFacts::in_course(course.teacher_id)
        .owned_by(grade.student_id)
        .created_by(grade.created_by))
}

pub async fn attendance_facts(storage: &dyn Storage, attendance: &Attendance) -> Result<RecordFacts> {
    let subject = load_subject(storage, attendance.subject_id).await?;
    let course = load_course(storage, subject.course_id).await?;
    Ok(RecordFacts::in_course(course.teacher_id).owned_by(attendance.student_id))
}

/// 教师只能选择自己课程中的学生
pub async fn ensure_student_pickable(
    storage: &dyn Storage,
    actor: &Actor,
    student_id: i64,
) -> Result<()> {
    if actor.role != UserRole::Teacher {
        return Ok(());
    }
    if storage
        .student_course_teachers(student_id)
        .await?
        .contains(&actor.id)
    {
        Ok(())
    } else {
        tracing::info!(
            user_id = actor.id,
            student_id,
            "student is not enrolled in any course of this teacher"
        );
        Err(AcademicError::forbidden(
            "You do not have permission to record data for this student",
        ))
    }
}
