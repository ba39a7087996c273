use std::collections::HashMap;

use serde::Serialize;

use super::matrix::{join_by_user, StudentOrdering};
use super::{summary_rows, Cell, CellStatus, StudentSummary, SummaryRow};
use crate::calc::{percent_display, percent_score};
use crate::models::{AttemptLog, Student, TestDef};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseColumn {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetailRow {
    pub student: StudentSummary,
    pub cells: Vec<Cell>,
    pub overall: Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDetailReport {
    pub test: TestDef,
    pub columns: Vec<ExerciseColumn>,
    pub rows: Vec<TestDetailRow>,
    pub summary: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    attempts: i64,
    correct: i64,
}

impl Tally {
    fn score(self) -> Option<f64> {
        percent_score(self.correct, self.attempts)
    }
}

fn score_cell(score: Option<f64>, title: Option<String>) -> Cell {
    match score {
        Some(s) => Cell {
            status: CellStatus::Score,
            display: percent_display(s),
            raw_score: Some(s),
            title,
        },
        None => Cell::no_data(),
    }
}

/// The test's exercise ids without duplicates, titled from `titles` when known.
pub fn exercise_columns(test: &TestDef, titles: &HashMap<String, String>) -> Vec<ExerciseColumn> {
    let mut out: Vec<ExerciseColumn> = Vec::new();
    for id in &test.exercise_ids {
        if out.iter().any(|c| c.id == *id) {
            continue;
        }
        out.push(ExerciseColumn {
            id: id.clone(),
            title: titles.get(id).cloned().unwrap_or_else(|| id.clone()),
        });
    }
    out
}

/// Per-exercise correctness inside one test, plus an overall cell per
/// student. `attempts` must already be restricted to this test's context.
pub fn build_test_detail(
    roster: Vec<Student>,
    test: TestDef,
    columns: Vec<ExerciseColumn>,
    attempts: Vec<AttemptLog>,
    ordering: &StudentOrdering,
) -> TestDetailReport {
    let mut column_scores: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    let mut rows = Vec::with_capacity(roster.len());
    for (student, attempts) in join_by_user(roster, attempts, ordering) {
        let mut per_exercise: HashMap<&str, Tally> = HashMap::new();
        for a in &attempts {
            let t = per_exercise.entry(a.exercise_id.as_str()).or_default();
            t.attempts += 1;
            if a.correct {
                t.correct += 1;
            }
        }

        let mut total = Tally::default();
        let mut cells = Vec::with_capacity(columns.len());
        for (i, col) in columns.iter().enumerate() {
            let tally = per_exercise.get(col.id.as_str()).copied().unwrap_or_default();
            total.attempts += tally.attempts;
            total.correct += tally.correct;
            let score = tally.score();
            if let Some(s) = score {
                column_scores[i].push(s);
            }
            cells.push(score_cell(score, None));
        }

        let overall_title = (total.attempts > 0)
            .then(|| format!("({}/{})", total.correct, total.attempts));
        rows.push(TestDetailRow {
            student: StudentSummary::from(&student),
            cells,
            overall: score_cell(total.score(), overall_title),
        });
    }

    TestDetailReport {
        test,
        summary: summary_rows(&column_scores),
        columns,
        rows,
    }
}
