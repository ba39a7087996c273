#[cfg(test)]
pub(crate) mod fixtures;
pub mod mastery;
pub mod matrix;
pub mod plots;
pub mod tabular;
pub mod test_detail;
pub mod test_results;

use serde::{Deserialize, Serialize};

use crate::calc::{self, StatKind};
use crate::models::Student;

#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ReportError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ReportError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn db(e: rusqlite::Error) -> Self {
        Self::new("db_query_failed", e.to_string())
    }
}

/// Score bands for completed tests, persisted under `reports.thresholds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thresholds {
    pub pass_threshold: f64,
    pub borderline_threshold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pass_threshold: 80.0,
            borderline_threshold: 60.0,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<(), ReportError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.pass_threshold) || !in_range(self.borderline_threshold) {
            return Err(ReportError::new(
                "bad_params",
                "thresholds must be between 0 and 100",
            ));
        }
        if self.borderline_threshold > self.pass_threshold {
            return Err(ReportError::new(
                "bad_params",
                "borderlineThreshold must not exceed passThreshold",
            ));
        }
        Ok(())
    }

    /// Status of a completed attempt. Compares the already-rounded score.
    pub fn classify(&self, score: f64) -> CellStatus {
        if score >= self.pass_threshold {
            CellStatus::Pass
        } else if score >= self.borderline_threshold {
            CellStatus::Borderline
        } else {
            CellStatus::Fail
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CellStatus {
    #[serde(rename = "pass")]
    Pass,
    #[serde(rename = "borderline")]
    Borderline,
    #[serde(rename = "fail")]
    Fail,
    #[serde(rename = "incomplete")]
    Incomplete,
    #[serde(rename = "not started")]
    NotStarted,
    #[serde(rename = "no data")]
    NoData,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "statistic")]
    Statistic,
}

impl CellStatus {
    pub fn title(self) -> &'static str {
        match self {
            CellStatus::Pass => "Pass",
            CellStatus::Borderline => "Borderline",
            CellStatus::Fail => "Fail",
            CellStatus::Incomplete => "Incomplete",
            CellStatus::NotStarted => "Not Started",
            CellStatus::NoData => "No Data",
            CellStatus::Score => "Score",
            CellStatus::Statistic => "Statistic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub status: CellStatus,
    pub display: String,
    pub raw_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Cell {
    pub fn no_data() -> Self {
        Self {
            status: CellStatus::NoData,
            display: String::new(),
            raw_score: None,
            title: None,
        }
    }

    pub fn statistic(value: Option<f64>) -> Self {
        Self {
            status: CellStatus::Statistic,
            display: value.map(calc::percent_display).unwrap_or_default(),
            raw_score: value,
            title: None,
        }
    }
}

/// One statistic across every column of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub stat: StatKind,
    pub label: &'static str,
    pub cells: Vec<Cell>,
}

/// Builds one summary row per statistic from per-column score lists.
pub fn summary_rows(columns: &[Vec<f64>]) -> Vec<SummaryRow> {
    let per_column: Vec<Vec<(StatKind, Option<f64>)>> =
        columns.iter().map(|scores| calc::summarize(scores)).collect();
    StatKind::ALL
        .iter()
        .enumerate()
        .map(|(i, &stat)| SummaryRow {
            stat,
            label: stat.label(),
            cells: per_column
                .iter()
                .map(|stats| Cell::statistic(stats[i].1))
                .collect(),
        })
        .collect()
}

/// Per-student statistic cells, in `StatKind::ALL` order.
pub fn statistic_cells(scores: &[f64]) -> Vec<Cell> {
    calc::summarize(scores)
        .into_iter()
        .map(|(_, v)| Cell::statistic(v))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub name: String,
}

impl From<&Student> for StudentSummary {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id.clone(),
            first_name: s.first_name.clone(),
            last_name: s.last_name.clone(),
            username: s.username.clone(),
            name: s.display_name(),
        }
    }
}
