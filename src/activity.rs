//! Records that a coach opened a report. Never blocks the report itself.

use chrono::{SecondsFormat, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::reports::plots::Viewer;

pub const COACH_REPORT_ACTIVITY: &str = "coachreport";
pub const LOGIN_ACTIVITY: &str = "login";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn record(conn: &Connection, user_id: &str) -> rusqlite::Result<()> {
    let now = now_rfc3339();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO user_activity_logs(id, user_id, activity_type, start_datetime, end_datetime)
         VALUES(?, ?, ?, ?, ?)",
        (
            Uuid::new_v4().to_string(),
            user_id,
            COACH_REPORT_ACTIVITY,
            &now,
            &now,
        ),
    )?;
    // Keeps the coach's login session alive.
    tx.execute(
        "UPDATE user_activity_logs SET end_datetime = ?
         WHERE id = (
            SELECT id FROM user_activity_logs
            WHERE user_id = ? AND activity_type = ?
            ORDER BY start_datetime DESC LIMIT 1
         )",
        (&now, user_id, LOGIN_ACTIVITY),
    )?;
    tx.commit()
}

/// Logs a coach-report view for viewers that are facility users. Failures
/// are reported through tracing and otherwise ignored.
pub fn log_coach_report_view(conn: &Connection, viewer: &Viewer) {
    let Some(user_id) = viewer.user_id.as_deref() else {
        return;
    };
    if let Err(e) = record(conn, user_id) {
        tracing::error!(user_id, error = %e, "failed to update coach report activity");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::reports::plots::ViewerRole;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn open() -> Connection {
        let dir = std::env::temp_dir().join(format!(
            "coachreportd-activity-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        let conn = db::open_db(&dir).expect("open db");
        conn.execute_batch(
            "INSERT INTO facilities(id, name) VALUES ('f1', 'North');
             INSERT INTO facility_users(id, facility_id, username, is_teacher) VALUES ('coach', 'f1', 'coach', 1);
             INSERT INTO user_activity_logs(id, user_id, activity_type, start_datetime, end_datetime)
               VALUES ('l1', 'coach', 'login', '2020-01-01T00:00:00Z', NULL);",
        )
        .expect("seed");
        conn
    }

    fn teacher(user_id: Option<&str>) -> Viewer {
        Viewer {
            role: ViewerRole::Teacher,
            user_id: user_id.map(str::to_string),
        }
    }

    #[test]
    fn view_is_recorded_and_login_extended() {
        let conn = open();
        log_coach_report_view(&conn, &teacher(Some("coach")));
        let views: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_activity_logs WHERE activity_type = 'coachreport'",
                [],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(views, 1);
        let login_end: Option<String> = conn
            .query_row(
                "SELECT end_datetime FROM user_activity_logs WHERE id = 'l1'",
                [],
                |r| r.get(0),
            )
            .expect("login row");
        assert!(login_end.is_some());
    }

    #[test]
    fn failed_login_refresh_rolls_back_the_view() {
        let conn = open();
        conn.execute_batch(
            "CREATE TRIGGER block_login_refresh BEFORE UPDATE ON user_activity_logs
             BEGIN SELECT RAISE(ABORT, 'login rows are read-only'); END;",
        )
        .expect("trigger");
        log_coach_report_view(&conn, &teacher(Some("coach")));
        let views: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_activity_logs WHERE activity_type = 'coachreport'",
                [],
                |r| r.get(0),
            )
            .expect("count");
        assert_eq!(views, 0);
        assert!(conn.is_autocommit());
    }

    #[test]
    fn failures_are_swallowed() {
        let conn = open();
        // Unknown user violates the foreign key; the call must still return.
        log_coach_report_view(&conn, &teacher(Some("ghost")));
        log_coach_report_view(&conn, &teacher(None));
        let views: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_activity_logs", [], |r| r.get(0))
            .expect("count");
        assert_eq!(views, 1);
    }
}
