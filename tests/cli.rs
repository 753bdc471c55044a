use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::Value;

fn winseat() -> std::process::Command {
    let mut cmd = test_bin::get_test_bin("winseat");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn place(args: &[&str]) -> Value {
    let config = write_temp("");
    let output = winseat()
        .arg("--config")
        .arg(config.path())
        .arg("place")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn it_places_below_the_rectangle() {
    let placement = place(&[
        "--primary=attach_bottom_edge",
        "--secondary=align_left_edges",
        "--rect=100,100,50,20",
        "--size=80x40",
        "--bounds=0,0,1000,1000",
    ]);
    assert_eq!(placement["position"], serde_json::json!({ "x": 100, "y": 120 }));
    assert_eq!(placement["primary"], "attach_bottom_edge");
    assert_eq!(placement["secondary"], "align_left_edges");
}

#[test]
fn it_flips_above_when_below_does_not_fit() {
    let placement = place(&[
        "--primary=attach_bottom_edge,attach_top_edge",
        "--secondary=align_left_edges",
        "--rect=100,960,50,20",
        "--size=80x40",
        "--bounds=0,0,1000,1000",
    ]);
    assert_eq!(placement["position"], serde_json::json!({ "x": 100, "y": 920 }));
    assert_eq!(placement["primary"], "attach_top_edge");
}

#[test]
fn it_rejects_unknown_options() {
    let output = winseat()
        .args(["place", "--primary=attach_sideways", "--size=10x10"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("attach_sideways"));
}

#[test]
fn it_checks_config_files() {
    let good = write_temp("[settings]\npointer_gestures = false\n");
    let output = winseat().arg("check-config").arg(good.path()).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).ends_with(": ok\n"));

    let bad = write_temp("[settings]\nno_such_setting = 1\n");
    let output = winseat().arg("check-config").arg(bad.path()).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn it_replays_a_trace() {
    let config = write_temp("");
    let display = write_temp(
        r#"
        [[monitors]]
        geometry = { x = 0, y = 0, width = 1920, height = 1080 }

        [[windows]]
        id = 1
        surface = 10
        frame = { x = 100, y = 100, width = 400, height = 300 }
        "#,
    );
    let trace = write_temp(concat!(
        r#"{"capabilities": {"capabilities": 1}}"#,
        "\n",
        r#"{"pointer_enter": {"serial": 1, "surface": 10, "x": 5.0, "y": 6.0}}"#,
        "\n",
        r#"{"advance": 16}"#,
        "\n",
        r#"{"pointer_motion": {"time": 20, "x": 7.0, "y": 8.0}}"#,
        "\n",
    ));

    let output = winseat()
        .arg("--config")
        .arg(config.path())
        .arg("replay")
        .arg(trace.path())
        .arg("--display")
        .arg(display.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let events: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let kinds: Vec<&str> = events
        .iter()
        .map(|e| e.as_object().unwrap().keys().next().unwrap().as_str())
        .collect();
    // Core pointer and keyboard, then the pointer the capabilities announce.
    assert_eq!(kinds, vec!["device_added", "device_added", "device_added", "crossing", "motion"]);
    assert_eq!(events[4]["motion"]["coords"]["x_root"], 107.0);
}
