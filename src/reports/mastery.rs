use std::collections::BTreeMap;

use serde::Serialize;

use super::matrix::{join_by_user, StudentOrdering};
use super::StudentSummary;
use crate::calc::ratio_display;
use crate::models::{Exercise, ExerciseLog, MasteryState, Student};

/// Streak progress is shown as this many-percent segments.
const STREAK_SEGMENT: i64 = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct MasteryCounts {
    mastered: usize,
    struggling: usize,
    progress: usize,
}

impl MasteryCounts {
    fn add(&mut self, log: &ExerciseLog) {
        match log.mastery_state() {
            MasteryState::Mastered => self.mastered += 1,
            MasteryState::Struggling => self.struggling += 1,
            MasteryState::InProgress => self.progress += 1,
            MasteryState::NotAttempted => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseMasteryStats {
    pub struggling: usize,
    pub mastered: usize,
    pub progress: usize,
    /// Percent of the roster that mastered the exercise.
    pub mastery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryCell {
    #[serde(flatten)]
    pub log: ExerciseLog,
    pub streak_segments: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRow {
    pub student: StudentSummary,
    pub exercise_logs: BTreeMap<String, MasteryCell>,
    pub progress: usize,
    pub mastered: usize,
    pub struggling: usize,
    /// Percent of the selected exercises this student mastered.
    pub mastery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryReport {
    pub exercises: Vec<Exercise>,
    pub exercise_count: usize,
    pub exercise_stats: BTreeMap<String, ExerciseMasteryStats>,
    pub students: Vec<MasteryRow>,
    pub progress: String,
    pub mastered: String,
    pub struggling: String,
}

/// Exercises picked by id from playlist entries, deduplicated, in map order.
pub fn select_exercises(candidates: Vec<Exercise>, wanted: &[String]) -> Vec<Exercise> {
    let mut out: Vec<Exercise> = Vec::new();
    for ex in candidates {
        if wanted.iter().any(|w| *w == ex.id) && !out.iter().any(|o| o.id == ex.id) {
            out.push(ex);
        }
    }
    out.sort_by_key(|e| (e.h_position, e.v_position));
    out
}

pub fn build_mastery(
    roster: Vec<Student>,
    exercises: Vec<Exercise>,
    logs: Vec<ExerciseLog>,
    ordering: &StudentOrdering,
) -> MasteryReport {
    let user_count = roster.len();
    let exercise_count = exercises.len();

    let mut per_exercise: BTreeMap<String, MasteryCounts> = exercises
        .iter()
        .map(|e| (e.id.clone(), MasteryCounts::default()))
        .collect();

    let mut students = Vec::with_capacity(user_count);
    let mut overall = MasteryCounts::default();
    for (student, logs) in join_by_user(roster, logs, ordering) {
        let mut table: BTreeMap<String, MasteryCell> = BTreeMap::new();
        for log in logs {
            if let Some(counts) = per_exercise.get_mut(&log.exercise_id) {
                counts.add(&log);
            }
            let streak_segments = log.streak_progress / STREAK_SEGMENT;
            table.insert(
                log.exercise_id.clone(),
                MasteryCell {
                    log,
                    streak_segments,
                },
            );
        }

        let mut mine = MasteryCounts::default();
        for cell in table.values() {
            mine.add(&cell.log);
            overall.add(&cell.log);
        }

        students.push(MasteryRow {
            student: StudentSummary::from(&student),
            exercise_logs: table,
            progress: mine.progress,
            mastered: mine.mastered,
            struggling: mine.struggling,
            mastery: ratio_display(mine.mastered as f64 * 100.0, exercise_count as f64),
        });
    }

    let exercise_stats = per_exercise
        .into_iter()
        .map(|(id, c)| {
            let stats = ExerciseMasteryStats {
                struggling: c.struggling,
                mastered: c.mastered,
                progress: c.progress,
                mastery: ratio_display(c.mastered as f64 * 100.0, user_count as f64),
            };
            (id, stats)
        })
        .collect();

    let cells = (exercise_count * user_count) as f64;
    MasteryReport {
        exercises,
        exercise_count,
        exercise_stats,
        students,
        progress: ratio_display(overall.progress as f64 * 100.0, cells),
        mastered: ratio_display(overall.mastered as f64 * 100.0, cells),
        struggling: ratio_display(overall.struggling as f64 * 100.0, cells),
    }
}
