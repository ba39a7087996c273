use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "coachreports.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS facilities(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS facility_groups(
            id TEXT PRIMARY KEY,
            facility_id TEXT NOT NULL,
            name TEXT NOT NULL,
            FOREIGN KEY(facility_id) REFERENCES facilities(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_facility_groups_facility ON facility_groups(facility_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS facility_users(
            id TEXT PRIMARY KEY,
            facility_id TEXT NOT NULL,
            group_id TEXT,
            username TEXT NOT NULL,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            is_teacher INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(facility_id) REFERENCES facilities(id),
            FOREIGN KEY(group_id) REFERENCES facility_groups(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_facility_users_facility ON facility_users(facility_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_facility_users_group ON facility_users(group_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS topics(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercises(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            topic_id TEXT,
            h_position INTEGER NOT NULL DEFAULT 0,
            v_position INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS videos(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            topic_id TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(topic_id) REFERENCES topics(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlists(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            tag TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS playlist_entries(
            playlist_id TEXT NOT NULL,
            entity_kind TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            PRIMARY KEY(playlist_id, entity_kind, entity_id),
            FOREIGN KEY(playlist_id) REFERENCES playlists(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tests(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            exercise_ids TEXT NOT NULL DEFAULT '[]',
            total_questions INTEGER NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS exercise_logs(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            exercise_id TEXT NOT NULL,
            struggling INTEGER NOT NULL DEFAULT 0,
            complete INTEGER NOT NULL DEFAULT 0,
            attempts INTEGER NOT NULL DEFAULT 0,
            streak_progress INTEGER NOT NULL DEFAULT 0,
            points INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES facility_users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_exercise_logs_user ON exercise_logs(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS video_logs(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            video_id TEXT NOT NULL,
            complete INTEGER NOT NULL DEFAULT 0,
            total_seconds_watched INTEGER NOT NULL DEFAULT 0,
            points INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES facility_users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_video_logs_user ON video_logs(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS test_logs(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            test_id TEXT NOT NULL,
            total_correct INTEGER NOT NULL DEFAULT 0,
            idx INTEGER NOT NULL DEFAULT 0,
            complete INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES facility_users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_test_logs_user ON test_logs(user_id)",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS attempt_logs(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            exercise_id TEXT NOT NULL,
            context_type TEXT NOT NULL DEFAULT '',
            context_id TEXT NOT NULL DEFAULT '',
            correct INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES facility_users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attempt_logs_context ON attempt_logs(context_type, context_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_activity_logs(
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            activity_type TEXT NOT NULL,
            start_datetime TEXT NOT NULL,
            end_datetime TEXT,
            FOREIGN KEY(user_id) REFERENCES facility_users(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_activity_user ON user_activity_logs(user_id, activity_type)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(conn: &Connection, key: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}
