use crate::config;
use crate::ipc::error::{err, ok, report_err};
use crate::ipc::helpers::db_conn;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_settings_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, json!(config::load_thresholds(conn)))
}

fn number_param(req: &Request, key: &str) -> Result<Option<f64>, serde_json::Value> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| err(&req.id, "bad_params", format!("{key} must be a number"), None)),
    }
}

fn handle_settings_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let mut thresholds = config::load_thresholds(conn);
    match number_param(req, "passThreshold") {
        Ok(Some(v)) => thresholds.pass_threshold = v,
        Ok(None) => {}
        Err(e) => return e,
    }
    match number_param(req, "borderlineThreshold") {
        Ok(Some(v)) => thresholds.borderline_threshold = v,
        Ok(None) => {}
        Err(e) => return e,
    }

    match config::save_thresholds(conn, &thresholds) {
        Ok(()) => {
            tracing::info!(
                pass = thresholds.pass_threshold,
                borderline = thresholds.borderline_threshold,
                "report thresholds updated"
            );
            ok(&req.id, json!(thresholds))
        }
        Err(e) => report_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.settings.get" => Some(handle_settings_get(state, req)),
        "reports.settings.update" => Some(handle_settings_update(state, req)),
        _ => None,
    }
}
