#![allow(dead_code)]

use rusqlite::Connection;
use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

pub fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_coachreportd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .env_remove("COACHREPORTD_WORKSPACE")
        .spawn()
        .expect("spawn coachreportd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

pub fn read_response(reader: &mut BufReader<ChildStdout>) -> serde_json::Value {
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response");
    serde_json::from_str(line.trim()).expect("parse response json")
}

/// Sends one request and returns the whole response envelope.
pub fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let value = read_response(reader);
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

/// Sends one request, asserts success and returns `result`.
pub fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(serde_json::Value::Null)
}

pub fn error_code(resp: &serde_json::Value) -> &str {
    resp.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join("coachreports.sqlite3")
}

/// Opens the workspace database after `workspace.select` created it.
pub fn open_db(workspace: &Path) -> Connection {
    let conn = Connection::open(db_path(workspace)).expect("open db");
    conn.execute("PRAGMA foreign_keys = ON", [])
        .expect("foreign keys");
    conn
}

/// One facility `f1` with group `g1` holding Avery, Baker and Clark, an
/// ungrouped student Dale, and a coach `coach` with an open login session.
pub fn seed_school(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO facilities(id, name) VALUES ('f1', 'North');
         INSERT INTO facility_groups(id, facility_id, name) VALUES ('g1', 'f1', 'Blue');
         INSERT INTO facility_users(id, facility_id, group_id, username, first_name, last_name, is_teacher) VALUES
           ('s_clark', 'f1', 'g1', 'cclark', 'Casey', 'Clark', 0),
           ('s_avery', 'f1', 'g1', 'aavery', 'Alex', 'Avery', 0),
           ('s_baker', 'f1', 'g1', 'bbaker', 'Blair', 'Baker', 0),
           ('s_dale', 'f1', NULL, 'ddale', 'Drew', 'Dale', 0),
           ('coach', 'f1', NULL, 'coach', 'Chris', 'Coach', 1);
         INSERT INTO user_activity_logs(id, user_id, activity_type, start_datetime, end_datetime)
           VALUES ('login1', 'coach', 'login', '2024-01-01T08:00:00Z', NULL);",
    )
    .expect("seed school");
}

/// Topic `t_add` with two exercises and a video, and playlist `p1`
/// listing them.
pub fn seed_content(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO topics(id, title, sort_order) VALUES ('t_add', 'Addition', 0);
         INSERT INTO exercises(id, title, topic_id, h_position, v_position) VALUES
           ('ex_carry', 'Adding with carry', 't_add', 2, 0),
           ('ex_basic', 'Basic adding', 't_add', 1, 0);
         INSERT INTO videos(id, title, topic_id, sort_order) VALUES ('vid_intro', 'Intro to adding', 't_add', 0);
         INSERT INTO playlists(id, title, tag, sort_order) VALUES ('p1', 'Week 1', 'math', 0);
         INSERT INTO playlist_entries(playlist_id, entity_kind, entity_id, sort_order) VALUES
           ('p1', 'Exercise', 'ex_carry', 0),
           ('p1', 'Exercise', 'ex_basic', 1),
           ('p1', 'Video', 'vid_intro', 2);",
    )
    .expect("seed content");
}

/// Selects a fresh workspace and seeds it with [`seed_school`].
pub fn open_seeded_workspace(
    prefix: &str,
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
) -> PathBuf {
    let workspace = temp_dir(prefix);
    let _ = request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let conn = open_db(&workspace);
    seed_school(&conn);
    workspace
}
