mod test_support;

use serde_json::json;
use std::io::BufReader;
use std::process::{Command, Stdio};
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn thresholds_default_update_and_validate() {
    let workspace = temp_dir("coachreportd-settings");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let defaults = request_ok(&mut stdin, &mut reader, "2", "reports.settings.get", json!({}));
    assert_eq!(defaults, json!({ "passThreshold": 80.0, "borderlineThreshold": 60.0 }));

    // Omitted fields keep their current value.
    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "reports.settings.update",
        json!({ "passThreshold": 90 }),
    );
    assert_eq!(updated, json!({ "passThreshold": 90.0, "borderlineThreshold": 60.0 }));

    let inverted = request(
        &mut stdin,
        &mut reader,
        "4",
        "reports.settings.update",
        json!({ "borderlineThreshold": 95 }),
    );
    assert_eq!(error_code(&inverted), "bad_params");

    let out_of_range = request(
        &mut stdin,
        &mut reader,
        "5",
        "reports.settings.update",
        json!({ "passThreshold": 120 }),
    );
    assert_eq!(error_code(&out_of_range), "bad_params");

    let not_a_number = request(
        &mut stdin,
        &mut reader,
        "6",
        "reports.settings.update",
        json!({ "passThreshold": "high" }),
    );
    assert_eq!(error_code(&not_a_number), "bad_params");

    let after = request_ok(&mut stdin, &mut reader, "7", "reports.settings.get", json!({}));
    assert_eq!(after["passThreshold"], json!(90.0));

    let _ = child.kill();
}

#[test]
fn startup_workspace_flag_reopens_saved_thresholds() {
    let workspace = temp_dir("coachreportd-settings-restart");
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "1",
            "workspace.select",
            json!({ "path": workspace.to_string_lossy() }),
        );
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            "2",
            "reports.settings.update",
            json!({ "passThreshold": 70, "borderlineThreshold": 50 }),
        );
        let _ = child.kill();
        let _ = child.wait();
    }

    let mut child = Command::new(env!("CARGO_BIN_EXE_coachreportd"))
        .arg("--workspace")
        .arg(&workspace)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn coachreportd");
    let mut stdin = child.stdin.take().expect("child stdin");
    let mut reader = BufReader::new(child.stdout.take().expect("child stdout"));

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(
        health["workspacePath"].as_str().map(str::to_string),
        Some(workspace.to_string_lossy().to_string())
    );
    let saved = request_ok(&mut stdin, &mut reader, "2", "reports.settings.get", json!({}));
    assert_eq!(saved, json!({ "passThreshold": 70.0, "borderlineThreshold": 50.0 }));

    let _ = child.kill();
}
