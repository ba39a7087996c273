use crate::activity;
use crate::ipc::error::{err, ok, report_err};
use crate::ipc::helpers::{
    db_conn, merge, optional_str, plotting_metadata, report_scope, ReportScope,
};
use crate::ipc::types::{AppState, Request};
use crate::models::{LogRecord, Student};
use crate::reports::mastery;
use crate::reports::matrix::StudentOrdering;
use crate::reports::tabular::{self, ColumnSource, ReportType};
use crate::reports::ReportError;
use crate::store;
use rusqlite::Connection;
use serde_json::json;

fn not_found(what: &str, id: &str) -> ReportError {
    ReportError::new("not_found", format!("{what} not found")).with_details(json!({ "id": id }))
}

fn playlist_known(conn: &Connection, playlist_id: &str) -> Result<bool, ReportError> {
    Ok(store::load_playlists(conn)?
        .iter()
        .any(|p| p.id == playlist_id))
}

fn tabular_columns_and_rows(
    conn: &Connection,
    source: &ColumnSource,
    report_type: ReportType,
    roster: Vec<Student>,
) -> Result<serde_json::Value, ReportError> {
    let (kind, id, known) = match source {
        ColumnSource::Topic(id) => ("topic", id, store::topic_exists(conn, id)?),
        ColumnSource::Playlist(id) => ("playlist", id, playlist_known(conn, id)?),
    };
    if !known {
        return Err(not_found(kind, id));
    }

    let ordering = StudentOrdering::default();
    match report_type {
        ReportType::Exercise => {
            let mut exercises = match source {
                ColumnSource::Topic(id) => store::topic_exercises(conn, id)?,
                ColumnSource::Playlist(id) => store::playlist_exercises(conn, Some(id))?,
            };
            tabular::sort_exercises(&mut exercises);
            let ids: Vec<String> = exercises.iter().map(|e| e.id.clone()).collect();
            let logs = store::exercise_logs(conn, &roster, &ids)?
                .into_iter()
                .map(LogRecord::Exercise)
                .collect();
            let rows = tabular::build_rows(roster, logs, &ordering);
            Ok(json!({ "exercises": exercises, "students": rows }))
        }
        ReportType::Video => {
            let videos = match source {
                ColumnSource::Topic(id) => store::topic_videos(conn, id)?,
                ColumnSource::Playlist(id) => store::playlist_videos(conn, id)?,
            };
            let ids: Vec<String> = videos.iter().map(|v| v.id.clone()).collect();
            let logs = store::video_logs(conn, &roster, &ids)?
                .into_iter()
                .map(LogRecord::Video)
                .collect();
            let rows = tabular::build_rows(roster, logs, &ordering);
            Ok(json!({ "videos": videos, "students": rows }))
        }
    }
}

fn handle_tabular(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let (topics, playlists) = match store::load_topics(conn)
        .and_then(|t| Ok((t, store::load_playlists(conn)?)))
    {
        Ok(v) => v,
        Err(e) => return report_err(&req.id, e),
    };

    let requested = optional_str(req, "reportType");
    let base = merge(
        plotting_metadata(req, &scope),
        json!({
            "reportTypes": ReportType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
            "requestReportType": requested,
            "topics": topics,
            "playlists": playlists,
        }),
    );

    let source = ColumnSource::from_params(
        optional_str(req, "topicId").as_deref(),
        optional_str(req, "playlistId").as_deref(),
    );
    let Some(source) = source else {
        return ok(&req.id, base);
    };
    let Some(report_type) = requested.as_deref().and_then(ReportType::parse) else {
        return err(
            &req.id,
            "not_found",
            format!("Unknown report_type: {}", requested.as_deref().unwrap_or("")),
            None,
        );
    };

    let built = scope
        .roster(conn)
        .and_then(|roster| tabular_columns_and_rows(conn, &source, report_type, roster));
    match built {
        Ok(body) => {
            activity::log_coach_report_view(conn, &scope.viewer);
            ok(&req.id, merge(base, body))
        }
        Err(e) => report_err(&req.id, e),
    }
}

fn build_mastery_report(
    conn: &Connection,
    scope: &ReportScope,
    wanted: &[String],
) -> Result<mastery::MasteryReport, ReportError> {
    let roster = scope.roster(conn)?;
    let exercises = mastery::select_exercises(store::playlist_exercises(conn, None)?, wanted);
    let ids: Vec<String> = exercises.iter().map(|e| e.id.clone()).collect();
    let logs = store::exercise_logs(conn, &roster, &ids)?;
    Ok(mastery::build_mastery(
        roster,
        exercises,
        logs,
        &StudentOrdering::default(),
    ))
}

fn handle_exercise_mastery(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    let playlists = match store::load_playlists(conn).and_then(|playlists| {
        playlists
            .into_iter()
            .map(|p| -> Result<serde_json::Value, ReportError> {
                let exercises = store::playlist_exercises(conn, Some(&p.id))?;
                Ok(json!({ "id": p.id, "title": p.title, "tag": p.tag, "exercises": exercises }))
            })
            .collect::<Result<Vec<_>, ReportError>>()
    }) {
        Ok(v) => v,
        Err(e) => return report_err(&req.id, e),
    };
    let base = merge(plotting_metadata(req, &scope), json!({ "playlists": playlists }));

    let wanted: Vec<String> = optional_str(req, "playlist")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if wanted.is_empty() {
        return ok(&req.id, base);
    }

    match build_mastery_report(conn, &scope, &wanted) {
        Ok(report) => {
            tracing::debug!(
                students = report.students.len(),
                exercises = report.exercise_count,
                "built exercise mastery report"
            );
            activity::log_coach_report_view(conn, &scope.viewer);
            ok(&req.id, merge(base, json!(report)))
        }
        Err(e) => report_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.tabular" => Some(handle_tabular(state, req)),
        "reports.exerciseMastery" => Some(handle_exercise_mastery(state, req)),
        _ => None,
    }
}
