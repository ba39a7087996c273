use std::collections::BTreeMap;

use serde::Serialize;

use super::matrix::{join_by_user, StudentOrdering};
use super::StudentSummary;
use crate::models::{Exercise, LogRecord, Student};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Exercise,
    Video,
}

impl ReportType {
    pub const ALL: [ReportType; 2] = [ReportType::Exercise, ReportType::Video];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "exercise" => Some(ReportType::Exercise),
            "video" => Some(ReportType::Video),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportType::Exercise => "exercise",
            ReportType::Video => "video",
        }
    }
}

/// Exactly one of topic or playlist picks the columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    Topic(String),
    Playlist(String),
}

impl ColumnSource {
    pub fn from_params(topic_id: Option<&str>, playlist_id: Option<&str>) -> Option<Self> {
        let topic_id = topic_id.filter(|s| !s.is_empty());
        let playlist_id = playlist_id.filter(|s| !s.is_empty());
        match (topic_id, playlist_id) {
            (Some(t), None) => Some(ColumnSource::Topic(t.to_string())),
            (None, Some(p)) => Some(ColumnSource::Playlist(p.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabularRow {
    pub student: StudentSummary,
    /// Column id to the student's log for that column; missing means no log.
    pub logs: BTreeMap<String, LogRecord>,
}

pub fn sort_exercises(exercises: &mut [Exercise]) {
    exercises.sort_by_key(|e| (e.h_position, e.v_position));
}

/// One row per roster student with that student's logs keyed by column.
/// Raw log fields pass through untouched.
pub fn build_rows(
    roster: Vec<Student>,
    logs: Vec<LogRecord>,
    ordering: &StudentOrdering,
) -> Vec<TabularRow> {
    join_by_user(roster, logs, ordering)
        .into_iter()
        .map(|(student, logs)| {
            let mut table = BTreeMap::new();
            for log in logs {
                table.insert(log.column_id().to_string(), log);
            }
            TabularRow {
                student: StudentSummary::from(&student),
                logs: table,
            }
        })
        .collect()
}
