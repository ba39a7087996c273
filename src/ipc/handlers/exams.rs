use crate::calc::StatKind;
use crate::config;
use crate::ipc::error::{ok, report_err};
use crate::ipc::helpers::{
    db_conn, merge, plotting_metadata, report_scope, required_str, ReportScope,
};
use crate::ipc::types::{AppState, Request};
use crate::reports::matrix::StudentOrdering;
use crate::reports::test_detail::{self, TestDetailReport};
use crate::reports::test_results::{self, TestReport};
use crate::reports::ReportError;
use crate::store;
use rusqlite::Connection;
use serde_json::json;

fn summary_labels() -> Vec<&'static str> {
    StatKind::ALL.iter().map(|k| k.label()).collect()
}

fn build_test_report(conn: &Connection, scope: &ReportScope) -> Result<TestReport, ReportError> {
    let roster = scope.roster(conn)?;
    let logs = store::test_logs(conn, &roster)?;
    let columns = test_results::attempted_tests(store::load_tests(conn)?, &logs);
    let thresholds = config::load_thresholds(conn);
    Ok(test_results::build_test_report(
        roster,
        columns,
        logs,
        &thresholds,
        &StudentOrdering::default(),
    ))
}

fn handle_test(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match build_test_report(conn, &scope) {
        Ok(report) => {
            tracing::debug!(
                students = report.rows.len(),
                tests = report.columns.len(),
                "built test report"
            );
            let base = merge(
                plotting_metadata(req, &scope),
                json!({ "summaryStats": summary_labels() }),
            );
            ok(&req.id, merge(base, json!(report)))
        }
        Err(e) => report_err(&req.id, e),
    }
}

/// Detail report plus the `{id, title}` options for the test picker.
fn build_detail(
    conn: &Connection,
    scope: &ReportScope,
    test_id: &str,
) -> Result<(TestDetailReport, serde_json::Value), ReportError> {
    let test = store::find_test(conn, test_id)?.ok_or_else(|| {
        ReportError::new("not_found", "test not found").with_details(json!({ "testId": test_id }))
    })?;
    let roster = scope.roster(conn)?;

    let options: Vec<serde_json::Value> =
        test_results::attempted_tests(store::load_tests(conn)?, &store::test_logs(conn, &roster)?)
            .into_iter()
            .map(|t| json!({ "id": t.id, "title": t.title }))
            .collect();

    let titles = store::exercise_titles(conn, &test.exercise_ids)?;
    let columns = test_detail::exercise_columns(&test, &titles);
    let attempts = store::test_attempt_logs(conn, &roster, &test.id)?;
    let report = test_detail::build_test_detail(
        roster,
        test,
        columns,
        attempts,
        &StudentOrdering::default(),
    );
    Ok((report, json!(options)))
}

fn handle_test_detail(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let test_id = match required_str(req, "testId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };

    match build_detail(conn, &scope, &test_id) {
        Ok((report, options)) => {
            tracing::debug!(
                test_id = %test_id,
                students = report.rows.len(),
                exercises = report.columns.len(),
                "built test detail report"
            );
            let base = merge(
                plotting_metadata(req, &scope),
                json!({ "summaryStats": summary_labels(), "testOptions": options }),
            );
            ok(&req.id, merge(base, json!(report)))
        }
        Err(e) => report_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.test" => Some(handle_test(state, req)),
        "reports.testDetail" => Some(handle_test_detail(state, req)),
        _ => None,
    }
}
