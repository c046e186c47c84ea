use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use rust_academic_records::access::{Actor, EntityKind, Scope, visible_scope};
use rust_academic_records::models::PaginationQuery;
use rust_academic_records::models::attendance::entities::AttendanceStatus;
use rust_academic_records::models::attendance::requests::CreateAttendanceRequest;
use rust_academic_records::models::courses::entities::Course;
use rust_academic_records::models::courses::requests::{
    CourseListParams, CreateCourseRequest, UpdateCourseRequest,
};
use rust_academic_records::models::enrollments::requests::CreateEnrollmentRequest;
use rust_academic_records::models::grades::entities::{EvaluationKind, Grade};
use rust_academic_records::models::grades::requests::{CreateGradeRequest, GradeListParams};
use rust_academic_records::models::subjects::entities::Subject;
use rust_academic_records::models::subjects::requests::{CreateSubjectRequest, SubjectListParams};
use rust_academic_records::models::users::entities::{Profile, User, UserRole};
use rust_academic_records::models::users::requests::CreateUserRequest;
use rust_academic_records::storage::Storage;
use rust_academic_records::storage::sea_orm_storage::SeaOrmStorage;

async fn storage() -> SeaOrmStorage {
    SeaOrmStorage::connect_with_url("sqlite::memory:")
        .await
        .expect("in-memory database")
}

async fn user(storage: &SeaOrmStorage, username: &str, role: UserRole) -> User {
    let (user, _) = storage
        .create_user(
            CreateUserRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: String::new(),
                first_name: username.to_string(),
                last_name: "Test".to_string(),
                role,
            },
            "hash".to_string(),
        )
        .await
        .unwrap();
    user
}

async fn course(storage: &SeaOrmStorage, code: &str, teacher: &User) -> Course {
    storage
        .create_course(CreateCourseRequest {
            code: code.to_string(),
            name: format!("Course {code}"),
            academic_period: "2024-1".to_string(),
            teacher_id: teacher.id,
        })
        .await
        .unwrap()
}

async fn subject(storage: &SeaOrmStorage, code: &str, course: &Course) -> Subject {
    storage
        .create_subject(CreateSubjectRequest {
            code: code.to_string(),
            name: format!("Subject {code}"),
            course_id: course.id,
            weekly_hours: 4,
        })
        .await
        .unwrap()
}

async fn enroll(storage: &SeaOrmStorage, student: &User, course: &Course) {
    storage
        .create_enrollment(CreateEnrollmentRequest {
            student_id: student.id,
            course_id: course.id,
            enrolled_on: None,
        })
        .await
        .unwrap();
}

async fn grade(
    storage: &SeaOrmStorage,
    student: &User,
    subject: &Subject,
    score: &str,
    created_by: Option<i64>,
) -> Grade {
    storage
        .create_grade(
            CreateGradeRequest {
                student_id: student.id,
                subject_id: subject.id,
                score: Decimal::from_str(score).unwrap(),
                kind: EvaluationKind::Midterm,
                date: NaiveDate::from_ymd_opt(2024, 3, 1),
                notes: String::new(),
            },
            created_by,
        )
        .await
        .unwrap()
}

fn page() -> PaginationQuery {
    PaginationQuery::default()
}

#[tokio::test]
async fn test_student_gets_profile_on_create() {
    let storage = storage().await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let profile = storage.get_profile(&student).await.unwrap();
    match profile {
        Some(Profile::Student(p)) => assert_eq!(p.student_code, format!("AUTO-{}", student.id)),
        other => panic!("unexpected profile: {other:?}"),
    }

    let admin = user(&storage, "root", UserRole::Admin).await;
    assert!(storage.get_profile(&admin).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_course_code_is_rejected() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    course(&storage, "MATH101", &teacher).await;

    assert!(storage.course_code_taken("MATH101", None).await.unwrap());
    let err = storage
        .create_course(CreateCourseRequest {
            code: "MATH101".to_string(),
            name: "Again".to_string(),
            academic_period: "2024-1".to_string(),
            teacher_id: teacher.id,
        })
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn test_enrollment_pair_is_unique() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &teacher).await;
    enroll(&storage, &student, &math).await;

    assert!(
        storage
            .enrollment_exists(student.id, math.id, None)
            .await
            .unwrap()
    );
    let err = storage
        .create_enrollment(CreateEnrollmentRequest {
            student_id: student.id,
            course_id: math.id,
            enrolled_on: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn test_attendance_is_unique_per_day() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &teacher).await;
    let algebra = subject(&storage, "ALG", &math).await;
    let day = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

    let mark = CreateAttendanceRequest {
        student_id: student.id,
        subject_id: algebra.id,
        date: Some(day),
        status: AttendanceStatus::Present,
        notes: String::new(),
    };
    storage.create_attendance(mark.clone()).await.unwrap();

    assert!(
        storage
            .attendance_exists(student.id, algebra.id, day, None)
            .await
            .unwrap()
    );
    assert!(storage.create_attendance(mark).await.is_err());
}

#[tokio::test]
async fn test_scopes_limit_lists() {
    let storage = storage().await;
    let t1 = user(&storage, "tina", UserRole::Teacher).await;
    let t2 = user(&storage, "tomas", UserRole::Teacher).await;
    let s1 = user(&storage, "ana", UserRole::Student).await;
    let s2 = user(&storage, "beto", UserRole::Student).await;

    let math = course(&storage, "MATH101", &t1).await;
    let hist = course(&storage, "HIST101", &t2).await;
    let algebra = subject(&storage, "ALG", &math).await;
    let rome = subject(&storage, "ROME", &hist).await;
    enroll(&storage, &s1, &math).await;
    enroll(&storage, &s2, &hist).await;
    grade(&storage, &s1, &algebra, "4.00", Some(t1.id)).await;
    grade(&storage, &s2, &rome, "3.00", Some(t2.id)).await;

    let courses_for = |actor: &User| {
        visible_scope(&Actor::from(actor), EntityKind::Course)
    };
    let teacher_courses = storage
        .list_courses(&courses_for(&t1), None)
        .await
        .unwrap();
    assert_eq!(teacher_courses.len(), 1);
    assert_eq!(teacher_courses[0].code, "MATH101");

    let student_courses = storage
        .list_courses(&courses_for(&s2), None)
        .await
        .unwrap();
    assert_eq!(student_courses.len(), 1);
    assert_eq!(student_courses[0].code, "HIST101");

    let all = storage
        .list_courses_with_pagination(
            &Scope::All,
            CourseListParams {
                pagination: page(),
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 2);
    assert_eq!(all.items[0].code, "HIST101");

    let subjects = storage
        .list_subjects_with_pagination(
            &visible_scope(&Actor::from(&s1), EntityKind::Subject),
            SubjectListParams {
                pagination: page(),
                course_id: None,
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(subjects.items.len(), 1);
    assert_eq!(subjects.items[0].id, algebra.id);

    let own_grades = storage
        .list_grades_with_pagination(
            &visible_scope(&Actor::from(&s1), EntityKind::Grade),
            GradeListParams {
                pagination: page(),
                subject_id: None,
                student_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(own_grades.items.len(), 1);
    assert_eq!(own_grades.items[0].student_id, s1.id);

    let pickable = storage
        .list_students(&visible_scope(&Actor::from(&t2), EntityKind::Student), None)
        .await
        .unwrap();
    assert_eq!(pickable.len(), 1);
    assert_eq!(pickable[0].id, s2.id);

    assert_eq!(storage.student_course_teachers(s1.id).await.unwrap(), vec![t1.id]);
}

#[tokio::test]
async fn test_teacher_sees_grades_they_created_elsewhere() {
    let storage = storage().await;
    let t1 = user(&storage, "tina", UserRole::Teacher).await;
    let t2 = user(&storage, "tomas", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &t1).await;
    let algebra = subject(&storage, "ALG", &math).await;
    grade(&storage, &student, &algebra, "3.50", Some(t2.id)).await;

    let grades = storage
        .list_grades_with_pagination(
            &Scope::TaughtBy(t2.id),
            GradeListParams {
                pagination: page(),
                subject_id: None,
                student_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(grades.items.len(), 1);
    assert_eq!(grades.items[0].created_by, Some(t2.id));
}

#[tokio::test]
async fn test_deleting_student_cascades_records() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &teacher).await;
    let algebra = subject(&storage, "ALG", &math).await;
    enroll(&storage, &student, &math).await;
    let g = grade(&storage, &student, &algebra, "4.50", Some(teacher.id)).await;

    assert!(storage.delete_user(student.id).await.unwrap());
    assert!(storage.get_grade_by_id(g.id).await.unwrap().is_none());
    assert!(!storage.is_enrolled(student.id, math.id).await.unwrap());
}

#[tokio::test]
async fn test_deleting_course_cascades_subjects() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &teacher).await;
    let algebra = subject(&storage, "ALG", &math).await;
    let g = grade(&storage, &student, &algebra, "4.50", None).await;

    assert!(storage.delete_course(math.id).await.unwrap());
    assert!(storage.get_subject_by_id(algebra.id).await.unwrap().is_none());
    assert!(storage.get_grade_by_id(g.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_teacher_with_courses_cannot_be_deleted() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let math = course(&storage, "MATH101", &teacher).await;

    assert!(storage.delete_user(teacher.id).await.is_err());
    assert!(storage.get_course_by_id(math.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleting_creator_keeps_grade() {
    let storage = storage().await;
    let t1 = user(&storage, "tina", UserRole::Teacher).await;
    let t2 = user(&storage, "tomas", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &t2).await;
    let algebra = subject(&storage, "ALG", &math).await;
    let g = grade(&storage, &student, &algebra, "4.00", Some(t2.id)).await;

    storage
        .update_course(
            math.id,
            UpdateCourseRequest {
                teacher_id: Some(t1.id),
                ..UpdateCourseRequest::default()
            },
        )
        .await
        .unwrap();
    assert!(storage.delete_user(t2.id).await.unwrap());

    let kept = storage.get_grade_by_id(g.id).await.unwrap().unwrap();
    assert_eq!(kept.created_by, None);
}

#[tokio::test]
async fn test_grade_records_carry_names() {
    let storage = storage().await;
    let teacher = user(&storage, "tina", UserRole::Teacher).await;
    let student = user(&storage, "ana", UserRole::Student).await;
    let math = course(&storage, "MATH101", &teacher).await;
    let algebra = subject(&storage, "ALG", &math).await;
    grade(&storage, &student, &algebra, "4.25", None).await;

    let records = storage
        .list_grade_records(&Scope::All, Some(student.id), None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].subject_name, "Subject ALG");
    assert_eq!(records[0].course_name, "Course MATH101");
    assert_eq!(records[0].score, Decimal::from_str("4.25").unwrap());
}
