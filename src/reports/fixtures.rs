use crate::models::{ExerciseLog, Student, TestDef, TestLog};

pub fn student(id: &str, first: &str, last: &str) -> Student {
    Student {
        id: id.to_string(),
        facility_id: "f1".into(),
        group_id: None,
        username: id.to_lowercase(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        is_teacher: false,
    }
}

/// Students A, B, C already in roster order.
pub fn roster_abc() -> Vec<Student> {
    vec![
        student("A", "Ann", "Avery"),
        student("B", "Ben", "Baker"),
        student("C", "Cam", "Clark"),
    ]
}

pub fn test_def(id: &str, total_questions: i64) -> TestDef {
    TestDef {
        id: id.to_string(),
        title: format!("Test {id}"),
        exercise_ids: vec!["ex1".into(), "ex2".into()],
        total_questions,
    }
}

pub fn test_log(user: &str, test: &str, correct: i64, index: i64, complete: bool) -> TestLog {
    TestLog {
        user_id: user.to_string(),
        test_id: test.to_string(),
        total_correct: correct,
        index,
        complete,
    }
}

pub fn exercise_log(user: &str, exercise: &str, complete: bool, struggling: bool, attempts: i64) -> ExerciseLog {
    ExerciseLog {
        user_id: user.to_string(),
        exercise_id: exercise.to_string(),
        struggling,
        complete,
        attempts,
        streak_progress: if complete { 100 } else { 40 },
        points: 0,
    }
}
