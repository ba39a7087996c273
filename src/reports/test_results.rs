use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::matrix::{join_by_user, StudentOrdering};
use super::{statistic_cells, summary_rows, Cell, CellStatus, StudentSummary, SummaryRow, Thresholds};
use crate::calc::{percent_display, percent_score};
use crate::models::{Student, TestDef, TestLog};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRow {
    pub student: StudentSummary,
    pub cells: Vec<Cell>,
    /// Max, min, average and std dev over this student's scores.
    pub stats: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    pub columns: Vec<TestDef>,
    pub rows: Vec<TestRow>,
    pub summary: Vec<SummaryRow>,
}

/// Catalog tests that at least one of `logs` refers to, in catalog order.
pub fn attempted_tests(catalog: Vec<TestDef>, logs: &[TestLog]) -> Vec<TestDef> {
    let attempted: HashSet<&str> = logs.iter().map(|l| l.test_id.as_str()).collect();
    catalog
        .into_iter()
        .filter(|t| attempted.contains(t.id.as_str()))
        .collect()
}

fn remaining_title(n_remaining: i64) -> String {
    let noun = if n_remaining == 1 { "problem" } else { "problems" };
    format!(
        "{}: {} {} remaining",
        CellStatus::Incomplete.title(),
        n_remaining,
        noun
    )
}

/// Cell for one student's log on one test. The zero-question guard runs
/// before any division.
pub fn test_cell(test: &TestDef, log: Option<&TestLog>, thresholds: &Thresholds) -> Cell {
    let Some(log) = log else {
        return Cell {
            status: CellStatus::NotStarted,
            display: String::new(),
            raw_score: None,
            title: Some(CellStatus::NotStarted.title().to_string()),
        };
    };
    let Some(score) = percent_score(log.total_correct, test.total_questions) else {
        return Cell::no_data();
    };
    let display = format!(
        "{} ({}/{})",
        percent_display(score),
        log.total_correct,
        test.total_questions
    );
    if log.complete {
        let status = thresholds.classify(score);
        Cell {
            status,
            display,
            raw_score: Some(score),
            title: Some(status.title().to_string()),
        }
    } else {
        Cell {
            status: CellStatus::Incomplete,
            display,
            raw_score: Some(score),
            title: Some(remaining_title(test.total_questions - log.index)),
        }
    }
}

pub fn build_test_report(
    roster: Vec<Student>,
    columns: Vec<TestDef>,
    logs: Vec<TestLog>,
    thresholds: &Thresholds,
    ordering: &StudentOrdering,
) -> TestReport {
    let mut column_scores: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    let mut rows = Vec::with_capacity(roster.len());
    for (student, logs) in join_by_user(roster, logs, ordering) {
        let mut by_test: HashMap<&str, &TestLog> = HashMap::new();
        for log in &logs {
            // First log per test wins.
            by_test.entry(log.test_id.as_str()).or_insert(log);
        }

        let mut student_scores = Vec::new();
        let cells: Vec<Cell> = columns
            .iter()
            .enumerate()
            .map(|(i, test)| {
                let cell = test_cell(test, by_test.get(test.id.as_str()).copied(), thresholds);
                if let Some(score) = cell.raw_score {
                    student_scores.push(score);
                    column_scores[i].push(score);
                }
                cell
            })
            .collect();

        rows.push(TestRow {
            student: StudentSummary::from(&student),
            cells,
            stats: statistic_cells(&student_scores),
        });
    }

    let summary = summary_rows(&column_scores);
    TestReport {
        columns,
        rows,
        summary,
    }
}
