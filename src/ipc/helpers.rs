use rusqlite::Connection;
use serde_json::json;

use crate::ipc::error::{err, report_err};
use crate::ipc::types::{AppState, Request};
use crate::models::{Facility, Student};
use crate::reports::plots::{accessible_scope, AccessScope, Viewer, ViewerHome, ViewerRole, STAT_DEFS};
use crate::reports::ReportError;
use crate::store;

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// A string param; empty strings count as absent.
pub fn optional_str(req: &Request, key: &str) -> Option<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Connection, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn parse_viewer(req: &Request) -> Result<Viewer, serde_json::Value> {
    match req.params.get("viewer") {
        None => Ok(Viewer::default()),
        Some(v) if v.is_null() => Ok(Viewer::default()),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
            err(
                &req.id,
                "bad_params",
                "viewer must be { role: superuser|teacher|student|anonymous, userId? }",
                Some(json!({ "reason": e.to_string() })),
            )
        }),
    }
}

/// Facility, group and viewer shared by every report request.
#[derive(Debug, Clone)]
pub struct ReportScope {
    pub facility: Facility,
    pub group_id: Option<String>,
    pub viewer: Viewer,
    pub access: AccessScope,
}

impl ReportScope {
    pub fn roster(&self, conn: &Connection) -> Result<Vec<Student>, ReportError> {
        store::load_roster(conn, &self.facility, self.group_id.as_deref(), &self.access)
    }
}

fn viewer_home(conn: &Connection, viewer: &Viewer) -> Result<Option<ViewerHome>, ReportError> {
    if viewer.role != ViewerRole::Student {
        return Ok(None);
    }
    let Some(user_id) = viewer.user_id.as_deref() else {
        return Ok(None);
    };
    Ok(store::find_student(conn, user_id)?.map(|s| ViewerHome {
        facility_id: s.facility_id,
        group_id: s.group_id,
    }))
}

fn resolve_facility(
    req: &Request,
    facilities: &[Facility],
    home: Option<&ViewerHome>,
) -> Result<Facility, ReportError> {
    let wanted = optional_str(req, "facilityId").or_else(|| home.map(|h| h.facility_id.clone()));
    match wanted {
        Some(id) => facilities
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| {
                ReportError::new("not_found", "facility not found")
                    .with_details(json!({ "facilityId": id }))
            }),
        None if facilities.len() == 1 => Ok(facilities[0].clone()),
        None => Err(ReportError::new("bad_params", "missing facilityId")),
    }
}

pub fn report_scope(conn: &Connection, req: &Request) -> Result<ReportScope, serde_json::Value> {
    let viewer = parse_viewer(req)?;
    let build = || -> Result<ReportScope, ReportError> {
        let facilities = store::load_facilities(conn)?;
        let groups = store::load_groups(conn)?;
        let home = viewer_home(conn, &viewer)?;
        let facility = resolve_facility(req, &facilities, home.as_ref())?;
        let access = accessible_scope(&viewer, home.as_ref(), Some(&facility), &facilities, &groups);
        Ok(ReportScope {
            facility,
            group_id: optional_str(req, "groupId"),
            viewer: viewer.clone(),
            access,
        })
    };
    build().map_err(|e| report_err(&req.id, e))
}

/// Form echo, stat definitions and selectable facilities/groups for a plot page.
pub fn plotting_metadata(req: &Request, scope: &ReportScope) -> serde_json::Value {
    json!({
        "form": {
            "facilityId": scope.facility.id,
            "groupId": scope.group_id,
            "userId": optional_str(req, "userId"),
            "xaxis": optional_str(req, "xaxis"),
            "yaxis": optional_str(req, "yaxis"),
            "topicPath": req.params.get("topicPath").cloned().unwrap_or_else(|| json!([])),
        },
        "stats": STAT_DEFS,
        "groups": scope.access.groups,
        "facilities": scope.access.facilities,
    })
}

/// Adds `extra`'s keys to a metadata object.
pub fn merge(mut base: serde_json::Value, extra: serde_json::Value) -> serde_json::Value {
    if let (Some(b), serde_json::Value::Object(e)) = (base.as_object_mut(), extra) {
        for (k, v) in e {
            b.insert(k, v);
        }
    }
    base
}
