//! Read-only access to rosters, content catalogs and activity logs.

use std::collections::HashMap;

use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension, Row};

use crate::models::{
    AttemptLog, Exercise, ExerciseLog, Facility, FacilityGroup, Playlist, Student, TestDef,
    TestLog, Topic, Video, VideoLog,
};
use crate::reports::plots::AccessScope;
use crate::reports::ReportError;

/// Context type recorded on attempts made while taking a test.
pub const TEST_CONTEXT: &str = "test";

const STUDENT_COLUMNS: &str =
    "id, facility_id, group_id, username, first_name, last_name, is_teacher";
const STUDENT_ORDER: &str = "ORDER BY last_name, first_name, username, id";

fn placeholders(n: usize) -> String {
    std::iter::repeat("?").take(n).collect::<Vec<_>>().join(",")
}

fn text_values<'a>(ids: impl IntoIterator<Item = &'a String>) -> Vec<Value> {
    ids.into_iter().map(|id| Value::Text(id.clone())).collect()
}

fn student_from_row(r: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get(0)?,
        facility_id: r.get(1)?,
        group_id: r.get(2)?,
        username: r.get(3)?,
        first_name: r.get(4)?,
        last_name: r.get(5)?,
        is_teacher: r.get::<_, i64>(6)? != 0,
    })
}

fn query_all<T, F>(conn: &Connection, sql: &str, binds: Vec<Value>, map: F) -> Result<Vec<T>, ReportError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql).map_err(ReportError::db)?;
    let rows = stmt
        .query_map(params_from_iter(binds), map)
        .and_then(|it| it.collect::<Result<Vec<_>, _>>())
        .map_err(ReportError::db)?;
    Ok(rows)
}

pub fn load_facilities(conn: &Connection) -> Result<Vec<Facility>, ReportError> {
    query_all(
        conn,
        "SELECT id, name FROM facilities ORDER BY name, id",
        Vec::new(),
        |r| {
            Ok(Facility {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        },
    )
}

pub fn load_groups(conn: &Connection) -> Result<Vec<FacilityGroup>, ReportError> {
    query_all(
        conn,
        "SELECT id, facility_id, name FROM facility_groups ORDER BY name, id",
        Vec::new(),
        |r| {
            Ok(FacilityGroup {
                id: r.get(0)?,
                facility_id: r.get(1)?,
                name: r.get(2)?,
            })
        },
    )
}

pub fn find_student(conn: &Connection, user_id: &str) -> Result<Option<Student>, ReportError> {
    conn.query_row(
        &format!("SELECT {STUDENT_COLUMNS} FROM facility_users WHERE id = ?"),
        [user_id],
        student_from_row,
    )
    .optional()
    .map_err(ReportError::db)
}

/// Non-teacher users of one group, or of the facility's visible groups plus
/// its ungrouped users, sorted by last name, first name and username.
pub fn load_roster(
    conn: &Connection,
    facility: &Facility,
    group_id: Option<&str>,
    scope: &AccessScope,
) -> Result<Vec<Student>, ReportError> {
    if let Some(group_id) = group_id {
        return query_all(
            conn,
            &format!(
                "SELECT {STUDENT_COLUMNS} FROM facility_users
                 WHERE group_id = ? AND is_teacher = 0
                 {STUDENT_ORDER}"
            ),
            vec![Value::Text(group_id.to_string())],
            student_from_row,
        );
    }

    let group_ids: Vec<String> = scope
        .groups_for(&facility.id)
        .into_iter()
        .map(|g| g.id.clone())
        .collect();
    let mut binds = text_values(&group_ids);
    binds.push(Value::Text(facility.id.clone()));
    let grouped = if group_ids.is_empty() {
        String::new()
    } else {
        format!("group_id IN ({}) OR ", placeholders(group_ids.len()))
    };
    query_all(
        conn,
        &format!(
            "SELECT {STUDENT_COLUMNS} FROM facility_users
             WHERE is_teacher = 0 AND ({grouped}(group_id IS NULL AND facility_id = ?))
             {STUDENT_ORDER}"
        ),
        binds,
        student_from_row,
    )
}

pub fn load_topics(conn: &Connection) -> Result<Vec<Topic>, ReportError> {
    query_all(
        conn,
        "SELECT id, title FROM topics ORDER BY sort_order, id",
        Vec::new(),
        |r| {
            Ok(Topic {
                id: r.get(0)?,
                title: r.get(1)?,
            })
        },
    )
}

pub fn topic_exists(conn: &Connection, topic_id: &str) -> Result<bool, ReportError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM topics WHERE id = ?", [topic_id], |r| r.get(0))
        .optional()
        .map_err(ReportError::db)?;
    Ok(found.is_some())
}

pub fn load_playlists(conn: &Connection) -> Result<Vec<Playlist>, ReportError> {
    query_all(
        conn,
        "SELECT id, title, tag FROM playlists ORDER BY sort_order, id",
        Vec::new(),
        |r| {
            Ok(Playlist {
                id: r.get(0)?,
                title: r.get(1)?,
                tag: r.get(2)?,
            })
        },
    )
}

fn exercise_from_row(r: &Row<'_>) -> rusqlite::Result<Exercise> {
    Ok(Exercise {
        id: r.get(0)?,
        title: r.get(1)?,
        topic_id: r.get(2)?,
        h_position: r.get(3)?,
        v_position: r.get(4)?,
    })
}

fn video_from_row(r: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: r.get(0)?,
        title: r.get(1)?,
        topic_id: r.get(2)?,
    })
}

pub fn topic_exercises(conn: &Connection, topic_id: &str) -> Result<Vec<Exercise>, ReportError> {
    query_all(
        conn,
        "SELECT id, title, topic_id, h_position, v_position
         FROM exercises WHERE topic_id = ?
         ORDER BY h_position, v_position, id",
        vec![Value::Text(topic_id.to_string())],
        exercise_from_row,
    )
}

pub fn topic_videos(conn: &Connection, topic_id: &str) -> Result<Vec<Video>, ReportError> {
    query_all(
        conn,
        "SELECT id, title, topic_id FROM videos WHERE topic_id = ? ORDER BY sort_order, id",
        vec![Value::Text(topic_id.to_string())],
        video_from_row,
    )
}

/// Exercise entries of one playlist, or of every playlist when `playlist_id`
/// is `None`, in playlist then entry order. Duplicates are kept.
pub fn playlist_exercises(
    conn: &Connection,
    playlist_id: Option<&str>,
) -> Result<Vec<Exercise>, ReportError> {
    let (filter, binds) = match playlist_id {
        Some(id) => ("AND pe.playlist_id = ?", vec![Value::Text(id.to_string())]),
        None => ("", Vec::new()),
    };
    query_all(
        conn,
        &format!(
            "SELECT e.id, e.title, e.topic_id, e.h_position, e.v_position
             FROM playlist_entries pe
             JOIN playlists p ON p.id = pe.playlist_id
             JOIN exercises e ON e.id = pe.entity_id
             WHERE pe.entity_kind = 'Exercise' {filter}
             ORDER BY p.sort_order, p.id, pe.sort_order"
        ),
        binds,
        exercise_from_row,
    )
}

pub fn playlist_videos(conn: &Connection, playlist_id: &str) -> Result<Vec<Video>, ReportError> {
    query_all(
        conn,
        "SELECT v.id, v.title, v.topic_id
         FROM playlist_entries pe
         JOIN videos v ON v.id = pe.entity_id
         WHERE pe.entity_kind = 'Video' AND pe.playlist_id = ?
         ORDER BY pe.sort_order",
        vec![Value::Text(playlist_id.to_string())],
        video_from_row,
    )
}

pub fn exercise_titles(conn: &Connection, ids: &[String]) -> Result<HashMap<String, String>, ReportError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let pairs = query_all(
        conn,
        &format!(
            "SELECT id, title FROM exercises WHERE id IN ({})",
            placeholders(ids.len())
        ),
        text_values(ids),
        |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
    )?;
    Ok(pairs.into_iter().collect())
}

fn test_from_row(r: &Row<'_>) -> rusqlite::Result<(String, String, String, i64)> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
}

fn parse_test((id, title, raw_ids, total_questions): (String, String, String, i64)) -> Result<TestDef, ReportError> {
    let exercise_ids: Vec<String> = serde_json::from_str(&raw_ids).map_err(|e| {
        ReportError::new(
            "db_query_failed",
            format!("test {id} has malformed exercise ids: {e}"),
        )
    })?;
    Ok(TestDef {
        id,
        title,
        exercise_ids,
        total_questions,
    })
}

pub fn load_tests(conn: &Connection) -> Result<Vec<TestDef>, ReportError> {
    query_all(
        conn,
        "SELECT id, title, exercise_ids, total_questions FROM tests ORDER BY sort_order, id",
        Vec::new(),
        test_from_row,
    )?
    .into_iter()
    .map(parse_test)
    .collect()
}

pub fn find_test(conn: &Connection, test_id: &str) -> Result<Option<TestDef>, ReportError> {
    let row = conn
        .query_row(
            "SELECT id, title, exercise_ids, total_questions FROM tests WHERE id = ?",
            [test_id],
            test_from_row,
        )
        .optional()
        .map_err(ReportError::db)?;
    row.map(parse_test).transpose()
}

fn user_ids(roster: &[Student]) -> Vec<String> {
    roster.iter().map(|s| s.id.clone()).collect()
}

/// Exercise logs of `roster` on `exercise_ids`, in roster order.
pub fn exercise_logs(
    conn: &Connection,
    roster: &[Student],
    exercise_ids: &[String],
) -> Result<Vec<ExerciseLog>, ReportError> {
    if roster.is_empty() || exercise_ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user_ids(roster);
    let mut binds = text_values(&users);
    binds.extend(text_values(exercise_ids));
    query_all(
        conn,
        &format!(
            "SELECT l.user_id, l.exercise_id, l.struggling, l.complete, l.attempts,
                    l.streak_progress, l.points
             FROM exercise_logs l
             JOIN facility_users u ON u.id = l.user_id
             WHERE l.user_id IN ({}) AND l.exercise_id IN ({})
             ORDER BY u.last_name, u.first_name, u.username, u.id, l.id",
            placeholders(users.len()),
            placeholders(exercise_ids.len())
        ),
        binds,
        |r| {
            Ok(ExerciseLog {
                user_id: r.get(0)?,
                exercise_id: r.get(1)?,
                struggling: r.get::<_, i64>(2)? != 0,
                complete: r.get::<_, i64>(3)? != 0,
                attempts: r.get(4)?,
                streak_progress: r.get(5)?,
                points: r.get(6)?,
            })
        },
    )
}

pub fn video_logs(
    conn: &Connection,
    roster: &[Student],
    video_ids: &[String],
) -> Result<Vec<VideoLog>, ReportError> {
    if roster.is_empty() || video_ids.is_empty() {
        return Ok(Vec::new());
    }
    let users = user_ids(roster);
    let mut binds = text_values(&users);
    binds.extend(text_values(video_ids));
    query_all(
        conn,
        &format!(
            "SELECT l.user_id, l.video_id, l.complete, l.total_seconds_watched, l.points
             FROM video_logs l
             JOIN facility_users u ON u.id = l.user_id
             WHERE l.user_id IN ({}) AND l.video_id IN ({})
             ORDER BY u.last_name, u.first_name, u.username, u.id, l.id",
            placeholders(users.len()),
            placeholders(video_ids.len())
        ),
        binds,
        |r| {
            Ok(VideoLog {
                user_id: r.get(0)?,
                video_id: r.get(1)?,
                complete: r.get::<_, i64>(2)? != 0,
                total_seconds_watched: r.get(3)?,
                points: r.get(4)?,
            })
        },
    )
}

pub fn test_logs(conn: &Connection, roster: &[Student]) -> Result<Vec<TestLog>, ReportError> {
    if roster.is_empty() {
        return Ok(Vec::new());
    }
    let users = user_ids(roster);
    query_all(
        conn,
        &format!(
            "SELECT l.user_id, l.test_id, l.total_correct, l.idx, l.complete
             FROM test_logs l
             JOIN facility_users u ON u.id = l.user_id
             WHERE l.user_id IN ({})
             ORDER BY u.last_name, u.first_name, u.username, u.id, l.id",
            placeholders(users.len())
        ),
        text_values(&users),
        |r| {
            Ok(TestLog {
                user_id: r.get(0)?,
                test_id: r.get(1)?,
                total_correct: r.get(2)?,
                index: r.get(3)?,
                complete: r.get::<_, i64>(4)? != 0,
            })
        },
    )
}

/// Attempts made inside `test_id` by the roster.
pub fn test_attempt_logs(
    conn: &Connection,
    roster: &[Student],
    test_id: &str,
) -> Result<Vec<AttemptLog>, ReportError> {
    if roster.is_empty() {
        return Ok(Vec::new());
    }
    let users = user_ids(roster);
    let mut binds = text_values(&users);
    binds.push(Value::Text(TEST_CONTEXT.to_string()));
    binds.push(Value::Text(test_id.to_string()));
    query_all(
        conn,
        &format!(
            "SELECT l.user_id, l.exercise_id, l.correct
             FROM attempt_logs l
             JOIN facility_users u ON u.id = l.user_id
             WHERE l.user_id IN ({}) AND l.context_type = ? AND l.context_id = ?
             ORDER BY u.last_name, u.first_name, u.username, u.id, l.id",
            placeholders(users.len())
        ),
        binds,
        |r| {
            Ok(AttemptLog {
                user_id: r.get(0)?,
                exercise_id: r.get(1)?,
                correct: r.get::<_, i64>(2)? != 0,
            })
        },
    )
}
