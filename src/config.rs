use std::path::PathBuf;

use clap::Parser;
use rusqlite::Connection;

use crate::db;
use crate::reports::{ReportError, Thresholds};

pub const THRESHOLDS_KEY: &str = "reports.thresholds";

/// Coach report sidecar: line-delimited JSON requests on stdin, responses on stdout.
#[derive(Debug, Clone, Parser)]
#[command(name = "coachreportd", version)]
pub struct Cli {
    /// Workspace directory to open at startup.
    #[arg(long, env = "COACHREPORTD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Tracing filter written to stderr, e.g. `info` or `coachreportd=debug`.
    #[arg(long, env = "COACHREPORTD_LOG", default_value = "info")]
    pub log_level: String,
}

/// Saved thresholds, or defaults when nothing usable is stored.
pub fn load_thresholds(conn: &Connection) -> Thresholds {
    match db::settings_get_json(conn, THRESHOLDS_KEY) {
        Ok(Some(v)) => match serde_json::from_value::<Thresholds>(v) {
            Ok(t) if t.validate().is_ok() => t,
            Ok(_) | Err(_) => {
                tracing::warn!("ignoring invalid {THRESHOLDS_KEY} setting");
                Thresholds::default()
            }
        },
        Ok(None) => Thresholds::default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read {THRESHOLDS_KEY}");
            Thresholds::default()
        }
    }
}

pub fn save_thresholds(conn: &Connection, thresholds: &Thresholds) -> Result<(), ReportError> {
    thresholds.validate()?;
    let value = serde_json::to_value(thresholds)
        .map_err(|e| ReportError::new("db_update_failed", e.to_string()))?;
    db::settings_set_json(conn, THRESHOLDS_KEY, &value)
        .map_err(|e| ReportError::new("db_update_failed", e.to_string()))
}
