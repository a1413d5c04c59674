mod common;

use aula_backend::entities::lesson_entity as lessons;
use aula_backend::error::AppError;
use aula_backend::models::{
    CreateCourseRequest, CreateLessonRequest, RecordProgressRequest, UpdateCourseRequest,
    UpdateLessonRequest,
};
use aula_backend::services::{CourseService, EnrollmentService, LessonService, ProgressService};
use aula_backend::utils::SharedClock;
use common::*;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

struct Catalog {
    db: DatabaseConnection,
    courses: CourseService,
    lessons: LessonService,
    enrollments: EnrollmentService,
    progress: ProgressService,
}

async fn catalog() -> Catalog {
    let db = setup_db().await;
    let clock: SharedClock = ManualClock::new();
    Catalog {
        courses: CourseService::new(db.clone(), clock.clone()),
        lessons: LessonService::new(db.clone(), clock.clone()),
        enrollments: EnrollmentService::new(db.clone(), clock.clone()),
        progress: ProgressService::new(db.clone(), clock),
        db,
    }
}

fn new_course(title: &str, is_paid: bool, price_cents: i64) -> CreateCourseRequest {
    CreateCourseRequest {
        title: title.to_string(),
        description: "Curso práctico".to_string(),
        thumbnail: None,
        is_paid,
        price_cents,
        is_published: None,
    }
}

fn new_lesson(course_id: i32, title: &str) -> CreateLessonRequest {
    CreateLessonRequest {
        course_id,
        title: title.to_string(),
        description: String::new(),
        order: None,
        youtube_video_id: Some("dQw4w9WgXcQ".to_string()),
        video_duration: 300,
        pdf_files: vec!["https://cdn.example.com/guia.pdf".to_string(), "  ".to_string()],
        docx_files: Vec::new(),
        xlsx_files: Vec::new(),
        pptx_files: Vec::new(),
        audio_file: None,
    }
}

#[tokio::test]
async fn teachers_manage_their_own_courses() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let other_teacher = insert_teacher(&c.db, "otro@example.com").await;
    let student = insert_student(&c.db, "ana@example.com", "Ana").await;

    let err = c
        .courses
        .create_course(&auth(&student), new_course("Excel", false, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = c
        .courses
        .create_course(&auth(&teacher), new_course("Excel", true, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let course = c
        .courses
        .create_course(&auth(&teacher), new_course("Excel", false, 999))
        .await
        .unwrap();
    assert!(course.is_published);
    assert_eq!(course.price_cents, 0);
    assert_eq!(course.teacher_name, "Profesor profe Test");

    let update = UpdateCourseRequest {
        title: Some("Excel intermedio".to_string()),
        is_paid: Some(true),
        price_cents: Some(2990),
        ..Default::default()
    };
    let err = c
        .courses
        .update_course(&auth(&other_teacher), course.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let updated = c
        .courses
        .update_course(&auth(&teacher), course.id, update)
        .await
        .unwrap();
    assert_eq!(updated.title, "Excel intermedio");
    assert!(updated.is_paid);
    assert_eq!(updated.price_cents, 2990);

    let err = c
        .courses
        .delete_course(&auth(&other_teacher), course.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn deleting_a_course_removes_its_lessons() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let course = insert_course(&c.db, teacher.id, false).await;
    insert_lesson(&c.db, course.id, 1).await;
    insert_lesson(&c.db, course.id, 2).await;

    c.courses.delete_course(&auth(&teacher), course.id).await.unwrap();
    assert_eq!(lessons::Entity::find().count(&c.db).await.unwrap(), 0);
    let err = c.courses.get_course(Some(&auth(&teacher)), course.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn unpublished_courses_are_hidden_from_everyone_but_the_owner() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let student = insert_student(&c.db, "ana@example.com", "Ana").await;
    let published = insert_course(&c.db, teacher.id, false).await;
    let mut draft = new_course("Borrador", false, 0);
    draft.is_published = Some(false);
    let draft = c.courses.create_course(&auth(&teacher), draft).await.unwrap();

    let public = c.courses.list_courses(None).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].id, published.id);
    assert_eq!(c.courses.list_courses(Some(&auth(&teacher))).await.unwrap().len(), 2);

    let err = c.courses.get_course(Some(&auth(&student)), draft.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    let err = c.courses.get_course(None, draft.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    c.courses.get_course(Some(&auth(&teacher)), draft.id).await.unwrap();

    let err = c.enrollments.enroll(&auth(&student), draft.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn course_detail_reports_enrollment_and_progress() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let ana = insert_student(&c.db, "ana@example.com", "Ana").await;
    let luis = insert_student(&c.db, "luis@example.com", "Luis").await;
    let course = insert_course(&c.db, teacher.id, true).await;
    let first = insert_lesson(&c.db, course.id, 1).await;
    insert_lesson(&c.db, course.id, 2).await;

    let anon = c.courses.get_course(None, course.id).await.unwrap();
    assert!(anon.enrollment_status.is_none());
    assert_eq!(anon.course.total_lessons, 2);
    assert_eq!(anon.lessons[0].order, 1);

    let ana_enrollment = c.enrollments.enroll(&auth(&ana), course.id).await.unwrap().enrollment;
    c.enrollments.enroll(&auth(&luis), course.id).await.unwrap();

    let pending = c.courses.get_course(Some(&auth(&ana)), course.id).await.unwrap();
    let status = pending.enrollment_status.unwrap();
    assert!(!status.is_approved);
    assert!(!pending.course.is_enrolled);
    assert_eq!(pending.course.total_students, 0);

    c.enrollments.approve(&auth(&teacher), ana_enrollment.id).await.unwrap();
    c.progress
        .record_progress(
            &auth(&ana),
            RecordProgressRequest {
                lesson_id: first.id,
                watched_duration: 600,
                is_completed: true,
            },
        )
        .await
        .unwrap();

    let detail = c.courses.get_course(Some(&auth(&ana)), course.id).await.unwrap();
    assert!(detail.course.is_enrolled);
    assert_eq!(detail.course.total_students, 1);
    assert_eq!(detail.progress_percentage, 50.0);

    let mine = c.courses.my_courses(&auth(&ana)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(c.courses.my_courses(&auth(&luis)).await.unwrap().is_empty());
    assert_eq!(c.courses.my_courses(&auth(&teacher)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn lessons_append_in_order_and_belong_to_the_course_owner() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let other_teacher = insert_teacher(&c.db, "otro@example.com").await;
    let student = insert_student(&c.db, "ana@example.com", "Ana").await;
    let course = insert_course(&c.db, teacher.id, false).await;

    let first = c
        .lessons
        .create_lesson(&auth(&teacher), new_lesson(course.id, "Introducción"))
        .await
        .unwrap();
    let second = c
        .lessons
        .create_lesson(&auth(&teacher), new_lesson(course.id, "Fórmulas"))
        .await
        .unwrap();
    assert_eq!(first.order, 1);
    assert_eq!(second.order, 2);
    assert_eq!(first.pdf_files, vec!["https://cdn.example.com/guia.pdf".to_string()]);

    let err = c
        .lessons
        .create_lesson(&auth(&other_teacher), new_lesson(course.id, "Intrusa"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    let err = c
        .lessons
        .create_lesson(&auth(&teacher), new_lesson(course.id, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let moved = c
        .lessons
        .update_lesson(
            &auth(&teacher),
            second.id,
            UpdateLessonRequest {
                order: Some(0),
                audio_file: Some("https://cdn.example.com/clase.mp3".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.audio_file.as_deref(), Some("https://cdn.example.com/clase.mp3"));

    let listed = c
        .lessons
        .list_lessons(&auth(&student), Some(course.id))
        .await
        .unwrap();
    let titles: Vec<&str> = listed.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Fórmulas", "Introducción"]);

    // Without a filter a student only sees courses they are approved in.
    assert!(c.lessons.list_lessons(&auth(&student), None).await.unwrap().is_empty());
    c.enrollments.enroll(&auth(&student), course.id).await.unwrap();
    assert_eq!(c.lessons.list_lessons(&auth(&student), None).await.unwrap().len(), 2);

    let err = c
        .lessons
        .delete_lesson(&auth(&other_teacher), first.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    c.lessons.delete_lesson(&auth(&teacher), first.id).await.unwrap();
    let err = c.lessons.get_lesson(&auth(&student), first.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn lesson_view_includes_the_students_progress() {
    let c = catalog().await;
    let teacher = insert_teacher(&c.db, "profe@example.com").await;
    let student = insert_student(&c.db, "ana@example.com", "Ana").await;
    let course = insert_course(&c.db, teacher.id, false).await;
    let lesson = insert_lesson(&c.db, course.id, 1).await;

    assert!(c.lessons.get_lesson(&auth(&student), lesson.id).await.unwrap().progress.is_none());

    c.enrollments.enroll(&auth(&student), course.id).await.unwrap();
    c.progress
        .record_progress(
            &auth(&student),
            RecordProgressRequest {
                lesson_id: lesson.id,
                watched_duration: 42,
                is_completed: false,
            },
        )
        .await
        .unwrap();

    let view = c.lessons.get_lesson(&auth(&student), lesson.id).await.unwrap();
    assert_eq!(view.progress.map(|p| p.watched_duration), Some(42));
}
