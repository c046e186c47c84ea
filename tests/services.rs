use std::str::FromStr;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, test, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use rust_academic_records::models::courses::requests::CreateCourseRequest;
use rust_academic_records::models::enrollments::requests::CreateEnrollmentRequest;
use rust_academic_records::models::grades::entities::EvaluationKind;
use rust_academic_records::models::grades::requests::CreateGradeRequest;
use rust_academic_records::models::reports::requests::{AveragesParams, ExportFormat, ExportParams};
use rust_academic_records::models::subjects::requests::CreateSubjectRequest;
use rust_academic_records::models::users::entities::{User, UserRole};
use rust_academic_records::models::users::requests::CreateUserRequest;
use rust_academic_records::services::{
    CourseService, DashboardService, EnrollmentService, GradeService, ReportService,
    SubjectService,
};
use rust_academic_records::storage::Storage;
use rust_academic_records::storage::sea_orm_storage::SeaOrmStorage;

struct School {
    storage: Arc<dyn Storage>,
    admin: User,
    teacher: User,
    other_teacher: User,
    student: User,
    outsider: User,
}

async fn user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
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

async fn school() -> School {
    let storage: Arc<dyn Storage> = Arc::new(
        SeaOrmStorage::connect_with_url("sqlite::memory:")
            .await
            .unwrap(),
    );
    School {
        admin: user(&storage, "admin", UserRole::Admin).await,
        teacher: user(&storage, "tina", UserRole::Teacher).await,
        other_teacher: user(&storage, "tomas", UserRole::Teacher).await,
        student: user(&storage, "ana", UserRole::Student).await,
        outsider: user(&storage, "beto", UserRole::Student).await,
        storage,
    }
}

fn request_as(storage: &Arc<dyn Storage>, user: Option<&User>) -> HttpRequest {
    let req = test::TestRequest::default()
        .app_data(web::Data::new(storage.clone()))
        .to_http_request();
    if let Some(user) = user {
        req.extensions_mut().insert(user.clone());
    }
    req
}

async fn json_body(resp: HttpResponse) -> Value {
    let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(resp: HttpResponse) -> String {
    let bytes = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn grade_request(student: &User, subject_id: i64, score: &str) -> CreateGradeRequest {
    CreateGradeRequest {
        student_id: student.id,
        subject_id,
        score: Decimal::from_str(score).unwrap(),
        kind: EvaluationKind::Midterm,
        date: NaiveDate::from_ymd_opt(2024, 3, 1),
        notes: "  ".to_string(),
    }
}

async fn enroll(school: &School, student: &User, course_id: i64) {
    let resp = EnrollmentService::new_lazy()
        .create_enrollment(
            &request_as(&school.storage, Some(&school.admin)),
            CreateEnrollmentRequest {
                student_id: student.id,
                course_id,
                enrolled_on: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
}

/// 管理员建课并为学生选课，教师建科目，返回 (course_id, subject_id)
async fn set_up_math(school: &School) -> (i64, i64) {
    let resp = CourseService::new_lazy()
        .create_course(
            &request_as(&school.storage, Some(&school.admin)),
            CreateCourseRequest {
                code: " MATH101 ".to_string(),
                name: "Matemáticas".to_string(),
                academic_period: "2024-1".to_string(),
                teacher_id: school.teacher.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let course = json_body(resp).await;
    assert_eq!(course["data"]["code"], "MATH101");
    let course_id = course["data"]["id"].as_i64().unwrap();

    let teacher_req = request_as(&school.storage, Some(&school.teacher));
    let resp = SubjectService::new_lazy()
        .create_subject(
            &teacher_req,
            CreateSubjectRequest {
                code: "ALG".to_string(),
                name: "Álgebra".to_string(),
                course_id,
                weekly_hours: 4,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let subject_id = json_body(resp).await["data"]["id"].as_i64().unwrap();

    enroll(school, &school.student, course_id).await;

    (course_id, subject_id)
}

#[tokio::test]
async fn test_missing_user_is_unauthorized() {
    let school = school().await;
    let resp = CourseService::new_lazy()
        .get_course(&request_as(&school.storage, None), 1)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_teacher_cannot_create_course() {
    let school = school().await;
    let resp = CourseService::new_lazy()
        .create_course(
            &request_as(&school.storage, Some(&school.teacher)),
            CreateCourseRequest {
                code: "HIST101".to_string(),
                name: "Historia".to_string(),
                academic_period: "2024-1".to_string(),
                teacher_id: school.teacher.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_course_teacher_must_be_a_teacher() {
    let school = school().await;
    let resp = CourseService::new_lazy()
        .create_course(
            &request_as(&school.storage, Some(&school.admin)),
            CreateCourseRequest {
                code: "HIST101".to_string(),
                name: "Historia".to_string(),
                academic_period: "2024-1".to_string(),
                teacher_id: school.student.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_math101_transcript_end_to_end() {
    let school = school().await;
    let (_, subject_id) = set_up_math(&school).await;
    let grades = GradeService::new_lazy();
    let teacher_req = request_as(&school.storage, Some(&school.teacher));

    for score in ["4.00", "4.50"] {
        let resp = grades
            .create_grade(&teacher_req, grade_request(&school.student, subject_id, score))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_body(resp).await;
        assert_eq!(body["data"]["created_by"], school.teacher.id);
        assert_eq!(body["data"]["notes"], "");
    }

    let resp = ReportService::new_lazy()
        .transcript(
            &request_as(&school.storage, Some(&school.student)),
            None,
            ExportParams {
                format: ExportFormat::Csv,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("boletin_ana.csv"));

    let csv = text_body(resp).await;
    assert!(csv.contains("Álgebra"));
    assert!(csv.contains("Promedio general: 4.25"));
}

#[tokio::test]
async fn test_student_cannot_record_grades() {
    let school = school().await;
    let (_, subject_id) = set_up_math(&school).await;

    let resp = GradeService::new_lazy()
        .create_grade(
            &request_as(&school.storage, Some(&school.student)),
            grade_request(&school.student, subject_id, "5.00"),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_other_teacher_is_kept_out_of_course() {
    let school = school().await;
    let (course_id, subject_id) = set_up_math(&school).await;
    let other_req = request_as(&school.storage, Some(&school.other_teacher));

    let resp = SubjectService::new_lazy()
        .create_subject(
            &other_req,
            CreateSubjectRequest {
                code: "GEO".to_string(),
                name: "Geometría".to_string(),
                course_id,
                weekly_hours: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = GradeService::new_lazy()
        .create_grade(&other_req, grade_request(&school.student, subject_id, "3.00"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = CourseService::new_lazy()
        .get_course(&other_req, course_id)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_teacher_cannot_grade_unenrolled_student() {
    let school = school().await;
    let (_, subject_id) = set_up_math(&school).await;

    let resp = GradeService::new_lazy()
        .create_grade(
            &request_as(&school.storage, Some(&school.teacher)),
            grade_request(&school.outsider, subject_id, "3.00"),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_score_out_of_range_is_rejected() {
    let school = school().await;
    let (_, subject_id) = set_up_math(&school).await;

    let resp = GradeService::new_lazy()
        .create_grade(
            &request_as(&school.storage, Some(&school.teacher)),
            grade_request(&school.student, subject_id, "5.01"),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_enrollment_conflicts() {
    let school = school().await;
    let (course_id, _) = set_up_math(&school).await;

    let resp = EnrollmentService::new_lazy()
        .create_enrollment(
            &request_as(&school.storage, Some(&school.admin)),
            CreateEnrollmentRequest {
                student_id: school.student.id,
                course_id,
                enrolled_on: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_student_cannot_read_other_transcript() {
    let school = school().await;
    set_up_math(&school).await;

    let resp = ReportService::new_lazy()
        .transcript(
            &request_as(&school.storage, Some(&school.outsider)),
            Some(school.student.id),
            ExportParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_course_roll_is_closed_to_students() {
    let school = school().await;
    let (course_id, _) = set_up_math(&school).await;

    let resp = ReportService::new_lazy()
        .course_roll(
            &request_as(&school.storage, Some(&school.student)),
            course_id,
            ExportParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = ReportService::new_lazy()
        .course_roll(
            &request_as(&school.storage, Some(&school.teacher)),
            course_id,
            ExportParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_final_grade_shows_on_transcript_and_dashboard() {
    let school = school().await;
    let (_, subject_id) = set_up_math(&school).await;
    let teacher_req = request_as(&school.storage, Some(&school.teacher));

    let mut final_grade = grade_request(&school.student, subject_id, "4.50");
    final_grade.kind = EvaluationKind::Final;
    let resp = GradeService::new_lazy()
        .create_grade(&teacher_req, final_grade)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ReportService::new_lazy()
        .transcript(
            &request_as(&school.storage, Some(&school.admin)),
            Some(school.student.id),
            ExportParams {
                format: ExportFormat::Csv,
            },
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let csv = text_body(resp).await;
    assert!(csv.contains("Final"));
    assert!(csv.contains("2024-03-01"));
    assert!(csv.contains("Promedio general: 4.50"));

    let resp = DashboardService::new_lazy()
        .get_dashboard(&teacher_req)
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let chart = &body["data"]["subject_averages"];
    assert_eq!(chart["labels"][0], "Álgebra");
    assert_eq!(chart["values"][0], "4.50");
    assert_eq!(body["data"]["counts"]["courses"], 1);
    assert_eq!(body["data"]["counts"]["students"], 1);
}

#[tokio::test]
async fn test_student_sees_whole_subject_average() {
    let school = school().await;
    let (course_id, subject_id) = set_up_math(&school).await;
    enroll(&school, &school.outsider, course_id).await;

    let teacher_req = request_as(&school.storage, Some(&school.teacher));
    let grades = GradeService::new_lazy();
    for (student, score) in [(&school.student, "4.00"), (&school.outsider, "2.00")] {
        let resp = grades
            .create_grade(&teacher_req, grade_request(student, subject_id, score))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let student_req = request_as(&school.storage, Some(&school.student));
    for req in [&student_req, &teacher_req] {
        let resp = DashboardService::new_lazy()
            .get_dashboard(req)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let chart = &json_body(resp).await["data"]["subject_averages"];
        assert_eq!(chart["labels"][0], "Álgebra");
        assert_eq!(chart["values"][0], "3.00");
    }

    let resp = ReportService::new_lazy()
        .averages(&student_req, AveragesParams::default())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["data"]["averages"][0]["average"], "3.00");
    assert_eq!(body["data"]["averages"][0]["grade_count"], 2);

    // 成绩单仍然只有本人的成绩
    let resp = ReportService::new_lazy()
        .transcript(
            &student_req,
            None,
            ExportParams {
                format: ExportFormat::Csv,
            },
        )
        .await
        .unwrap();
    let csv = text_body(resp).await;
    assert!(csv.contains("Promedio general: 4.00"));
}
