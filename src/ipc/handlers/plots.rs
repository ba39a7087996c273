use crate::ipc::error::{err, ok, report_err};
use crate::ipc::helpers::{db_conn, merge, optional_str, plotting_metadata, report_scope, required_str};
use crate::ipc::types::{AppState, Request};
use crate::reports::plots::{scatter_title, timeline_title};
use crate::reports::StudentSummary;
use crate::store;
use serde_json::json;

fn handle_landing(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    ok(&req.id, plotting_metadata(req, &scope))
}

fn handle_timeline(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let yaxis = optional_str(req, "yaxis").unwrap_or_default();
    ok(
        &req.id,
        merge(
            plotting_metadata(req, &scope),
            json!({ "title": timeline_title(&yaxis) }),
        ),
    )
}

fn handle_scatter(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scope = match report_scope(conn, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let xaxis = optional_str(req, "xaxis").unwrap_or_default();
    let yaxis = optional_str(req, "yaxis").unwrap_or_default();
    ok(
        &req.id,
        merge(
            plotting_metadata(req, &scope),
            json!({ "title": scatter_title(&xaxis, &yaxis) }),
        ),
    )
}

fn handle_student(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let user_id = match required_str(req, "userId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store::find_student(conn, &user_id) {
        Ok(Some(student)) => ok(
            &req.id,
            json!({
                "student": StudentSummary::from(&student),
                "facilityId": student.facility_id,
                "groupId": student.group_id,
            }),
        ),
        Ok(None) => err(
            &req.id,
            "not_found",
            "User not found.",
            Some(json!({ "userId": user_id })),
        ),
        Err(e) => report_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.landing" => Some(handle_landing(state, req)),
        "reports.timeline" => Some(handle_timeline(state, req)),
        "reports.scatter" => Some(handle_scatter(state, req)),
        "reports.student" => Some(handle_student(state, req)),
        _ => None,
    }
}
