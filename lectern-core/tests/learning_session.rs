use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use lectern_core::{
    CourseCatalog, CourseNavigator, EnrollmentStore, FileStore, LessonPlayer,
    MemoryStore, PlayerEvent, TrackerSettings, VirtualClock,
};
use lectern_model::{LessonId, LessonStatus};

const CATALOG: &str = r#"[{
    "id": "em-basics",
    "title": "Emergency Basics",
    "description": "Airway, breathing, circulation.",
    "instructor": "Dr. Kowalski",
    "level": "Intermediate",
    "category": "Emergency Medicine",
    "language": "English",
    "totalLectures": 4,
    "curriculum": [
        {"id": "m1", "title": "Assessment", "lessons": [
            {"id": "m1l1", "title": "Primary survey", "duration": "10 min",
             "isPreview": true},
            {"id": "m1l2", "title": "Secondary survey", "duration": "12 min"}
        ]},
        {"id": "m2", "title": "Interventions", "lessons": [
            {"id": "m2l1", "title": "Airway", "duration": "15 min"},
            {"id": "m2l2", "title": "Circulation", "duration": "14 min"}
        ]}
    ]
}]"#;

type TestStore = EnrollmentStore<MemoryStore, VirtualClock>;

fn pointer(store: &TestStore) -> Option<String> {
    store
        .get_course_progress("em-basics")
        .and_then(|p| p.current_lesson())
        .map(|id| id.to_string())
}

#[test]
fn watching_and_advancing_through_two_modules() {
    let catalog = CourseCatalog::from_json_str(CATALOG).unwrap();
    let course = catalog.get("em-basics").unwrap();
    let settings = TrackerSettings::default();
    let clock = VirtualClock::new();
    let mut store =
        EnrollmentStore::load(MemoryStore::new(), clock.clone(), &settings);
    store.enroll(&course.id, course.total_lectures).unwrap();

    let mut navigator = CourseNavigator::enter(course, &store);
    assert_eq!(navigator.current_lesson().unwrap().id, "m1l1");

    let finished: Rc<RefCell<Vec<LessonId>>> = Rc::default();
    let sink = Rc::clone(&finished);
    let mut player =
        LessonPlayer::open(&store, course.id.clone(), "m1l1".into(), &settings)
            .with_on_complete(move |lesson_id| {
                sink.borrow_mut().push(lesson_id.clone())
            });

    let event = player.on_metadata_loaded(&mut store, 10.0, 0.0).unwrap();
    assert_eq!(event, None);
    for second in 1..=8 {
        clock.advance(Duration::from_millis(250));
        let event =
            player.on_time_update(&mut store, f64::from(second)).unwrap();
        assert_eq!(event, None, "no completion before 90% (at {second}s)");
    }

    clock.advance(Duration::from_millis(250));
    let event = player.on_time_update(&mut store, 9.0).unwrap();
    assert_eq!(
        event,
        Some(PlayerEvent::Completed {
            lesson_id: "m1l1".into()
        })
    );
    assert_eq!(player.on_ended(&mut store).unwrap(), None);
    player.close(&mut store).unwrap();

    assert_eq!(finished.borrow().as_slice(), [LessonId::from("m1l1")]);
    let progress = store.get_course_progress("em-basics").unwrap();
    assert_eq!(progress.completed_lessons(), 1);
    assert_eq!(
        store.lesson_status("em-basics", "m1l1"),
        LessonStatus::Completed
    );

    for expected in ["m1l2", "m2l1", "m2l2"] {
        assert!(navigator.next(&mut store).unwrap());
        assert_eq!(navigator.current_lesson().unwrap().id, expected);
        assert_eq!(pointer(&store).as_deref(), Some(expected));
    }

    let before = store.snapshot();
    assert!(!navigator.next(&mut store).unwrap());
    assert_eq!(navigator.current_lesson().unwrap().id, "m2l2");
    assert_eq!(store.snapshot(), before);
}

#[test]
fn previous_at_first_lesson_changes_nothing() {
    let catalog = CourseCatalog::from_json_str(CATALOG).unwrap();
    let course = catalog.get("em-basics").unwrap();
    let mut store = EnrollmentStore::load(
        MemoryStore::new(),
        VirtualClock::new(),
        &TrackerSettings::default(),
    );
    store.enroll(&course.id, 4).unwrap();

    let mut navigator = CourseNavigator::enter(course, &store);
    assert!(!navigator.previous(&mut store).unwrap());
    assert_eq!(navigator.current_lesson().unwrap().id, "m1l1");
    assert_eq!(pointer(&store), None);

    assert!(navigator.select(&mut store, "m2l1").unwrap());
    assert!(navigator.previous(&mut store).unwrap());
    assert_eq!(navigator.current_lesson().unwrap().id, "m1l2");
    assert_eq!(navigator.current_module().unwrap().id, "m1");
}

#[test]
fn session_resumes_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = CourseCatalog::from_json_str(CATALOG).unwrap();
    let course = catalog.get("em-basics").unwrap();
    let settings = TrackerSettings::default();
    let clock = VirtualClock::new();

    {
        let storage = FileStore::new(dir.path()).unwrap();
        let mut store =
            EnrollmentStore::load(storage, clock.clone(), &settings);
        store.enroll(&course.id, 4).unwrap();
        let mut navigator = CourseNavigator::enter(course, &store);
        navigator.select(&mut store, "m2l1").unwrap();

        let mut player = LessonPlayer::open(
            &store,
            course.id.clone(),
            "m2l1".into(),
            &settings,
        );
        player.on_metadata_loaded(&mut store, 900.0, 0.0).unwrap();
        clock.advance(Duration::from_secs(2));
        player.on_time_update(&mut store, 300.0).unwrap();
        clock.advance(Duration::from_millis(200));
        player.on_time_update(&mut store, 312.5).unwrap();
        assert!(player.has_pending_write());
        player.close(&mut store).unwrap();
    }

    let storage = FileStore::new(dir.path()).unwrap();
    let store = EnrollmentStore::load(storage, clock.clone(), &settings);
    let navigator = CourseNavigator::enter(course, &store);
    assert_eq!(navigator.current_lesson().unwrap().id, "m2l1");

    let player =
        LessonPlayer::open(&store, course.id.clone(), "m2l1".into(), &settings);
    assert_eq!(player.resume_position(), 312.5);
    assert_eq!(player.total_duration(), Some(900.0));
    assert!(!player.is_completed());
    assert_eq!(
        store.lesson_status("em-basics", "m2l1"),
        LessonStatus::InProgress
    );
}
