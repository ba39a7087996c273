use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityGroup {
    pub id: String,
    pub facility_id: String,
    pub name: String,
}

/// A facility user as read from the roster. Coaches are filtered out before
/// any report is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub facility_id: String,
    pub group_id: Option<String>,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_teacher: bool,
}

impl Student {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub topic_id: Option<String>,
    pub h_position: i64,
    pub v_position: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    pub topic_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDef {
    pub id: String,
    pub title: String,
    pub exercise_ids: Vec<String>,
    pub total_questions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub user_id: String,
    pub exercise_id: String,
    pub struggling: bool,
    pub complete: bool,
    pub attempts: i64,
    pub streak_progress: i64,
    pub points: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryState {
    Mastered,
    Struggling,
    InProgress,
    NotAttempted,
}

impl ExerciseLog {
    /// Completion wins over struggling, which wins over plain attempts.
    pub fn mastery_state(&self) -> MasteryState {
        if self.complete {
            MasteryState::Mastered
        } else if self.struggling {
            MasteryState::Struggling
        } else if self.attempts > 0 {
            MasteryState::InProgress
        } else {
            MasteryState::NotAttempted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoLog {
    pub user_id: String,
    pub video_id: String,
    pub complete: bool,
    pub total_seconds_watched: i64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestLog {
    pub user_id: String,
    pub test_id: String,
    pub total_correct: i64,
    /// Index of the next question; `total_questions - index` remain.
    pub index: i64,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptLog {
    pub user_id: String,
    pub exercise_id: String,
    pub correct: bool,
}

/// Tagged log record placed in tabular report cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LogRecord {
    Exercise(ExerciseLog),
    Video(VideoLog),
}

impl LogRecord {
    pub fn user_id(&self) -> &str {
        match self {
            LogRecord::Exercise(l) => &l.user_id,
            LogRecord::Video(l) => &l.user_id,
        }
    }

    pub fn column_id(&self) -> &str {
        match self {
            LogRecord::Exercise(l) => &l.exercise_id,
            LogRecord::Video(l) => &l.video_id,
        }
    }
}
