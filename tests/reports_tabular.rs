mod test_support;

use serde_json::json;
use test_support::{
    error_code, open_db, open_seeded_workspace, request, request_ok, seed_content, spawn_sidecar,
};

#[test]
fn tabular_without_column_source_returns_metadata_only() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_seeded_workspace("coachreportd-tabular-meta", &mut stdin, &mut reader);
    seed_content(&open_db(&workspace));

    let meta = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.tabular",
        json!({ "facilityId": "f1", "reportType": "exercise" }),
    );
    assert_eq!(meta["reportTypes"], json!(["exercise", "video"]));
    assert_eq!(meta["topics"][0]["id"], json!("t_add"));
    assert_eq!(meta["playlists"][0]["id"], json!("p1"));
    assert!(meta.get("students").is_none());

    // Both sources at once is also metadata only.
    let both = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.tabular",
        json!({ "facilityId": "f1", "reportType": "exercise", "topicId": "t_add", "playlistId": "p1" }),
    );
    assert!(both.get("students").is_none());

    let bad_type = request(
        &mut stdin,
        &mut reader,
        "3",
        "reports.tabular",
        json!({ "facilityId": "f1", "reportType": "quiz", "topicId": "t_add" }),
    );
    assert_eq!(error_code(&bad_type), "not_found");

    let missing_type = request(
        &mut stdin,
        &mut reader,
        "4",
        "reports.tabular",
        json!({ "facilityId": "f1", "topicId": "t_add" }),
    );
    assert_eq!(error_code(&missing_type), "not_found");

    let unknown_topic = request(
        &mut stdin,
        &mut reader,
        "5",
        "reports.tabular",
        json!({ "facilityId": "f1", "reportType": "exercise", "topicId": "t_nope" }),
    );
    assert_eq!(error_code(&unknown_topic), "not_found");

    let _ = child.kill();
}

#[test]
fn exercise_report_by_topic_keys_logs_by_exercise() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_seeded_workspace("coachreportd-tabular-ex", &mut stdin, &mut reader);
    let conn = open_db(&workspace);
    seed_content(&conn);
    conn.execute_batch(
        "INSERT INTO exercise_logs(user_id, exercise_id, struggling, complete, attempts, streak_progress, points) VALUES
           ('s_clark', 'ex_carry', 1, 0, 9, 20, 45),
           ('s_avery', 'ex_basic', 0, 1, 12, 100, 300),
           ('coach', 'ex_basic', 0, 1, 10, 100, 300);",
    )
    .expect("seed logs");

    let report = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.tabular",
        json!({
            "facilityId": "f1",
            "reportType": "exercise",
            "topicId": "t_add",
            "viewer": { "role": "teacher", "userId": "coach" }
        }),
    );

    let exercise_ids: Vec<&str> = report["exercises"]
        .as_array()
        .expect("exercises")
        .iter()
        .filter_map(|e| e["id"].as_str())
        .collect();
    assert_eq!(exercise_ids, vec!["ex_basic", "ex_carry"]);

    let students = report["students"].as_array().expect("students");
    let usernames: Vec<&str> = students
        .iter()
        .filter_map(|s| s["student"]["username"].as_str())
        .collect();
    assert_eq!(usernames, vec!["aavery", "bbaker", "cclark", "ddale"]);

    let avery = &students[0]["logs"]["ex_basic"];
    assert_eq!(avery["kind"], json!("exercise"));
    assert_eq!(avery["complete"], json!(true));
    assert_eq!(avery["points"], json!(300));
    assert!(students[1]["logs"].as_object().expect("logs").is_empty());
    assert_eq!(students[2]["logs"]["ex_carry"]["struggling"], json!(true));

    let views: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM user_activity_logs WHERE user_id = 'coach' AND activity_type = 'coachreport'",
            [],
            |r| r.get(0),
        )
        .expect("count views");
    assert_eq!(views, 1);
    let login_end: Option<String> = conn
        .query_row(
            "SELECT end_datetime FROM user_activity_logs WHERE id = 'login1'",
            [],
            |r| r.get(0),
        )
        .expect("login row");
    assert!(login_end.is_some());

    let _ = child.kill();
}

#[test]
fn video_report_by_playlist_uses_video_logs() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let workspace = open_seeded_workspace("coachreportd-tabular-vid", &mut stdin, &mut reader);
    let conn = open_db(&workspace);
    seed_content(&conn);
    conn.execute_batch(
        "INSERT INTO video_logs(user_id, video_id, complete, total_seconds_watched, points) VALUES
           ('s_baker', 'vid_intro', 1, 340, 750);",
    )
    .expect("seed logs");

    let report = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.tabular",
        json!({ "facilityId": "f1", "groupId": "g1", "reportType": "Video", "playlistId": "p1" }),
    );
    assert_eq!(report["videos"][0]["id"], json!("vid_intro"));
    assert!(report.get("exercises").is_none());

    let students = report["students"].as_array().expect("students");
    assert_eq!(students.len(), 3);
    let baker = &students[1]["logs"]["vid_intro"];
    assert_eq!(baker["kind"], json!("video"));
    assert_eq!(baker["totalSecondsWatched"], json!(340));

    let _ = child.kill();
}
