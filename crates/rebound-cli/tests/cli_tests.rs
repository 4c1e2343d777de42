// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn rebound() -> Command {
    Command::cargo_bin("rebound").unwrap()
}

#[test]
fn demo_prints_a_state_hash() {
    rebound()
        .args(["--steps", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("state_hash"))
        .stdout(predicate::str::contains("steps      20"));
}

#[test]
fn json_report_is_reproducible() {
    let first = rebound().args(["--steps", "30", "--json"]).output().unwrap();
    let second = rebound()
        .args(["--steps", "30", "--json", "--broad-phase", "brute-force"])
        .output()
        .unwrap();
    assert!(first.status.success());
    let a: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    let b: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    assert_eq!(a["steps"], 30);
    assert_eq!(a["state_hash"], b["state_hash"]);
    assert_eq!(a["state_hash"].as_str().unwrap().len(), 64);
}

#[test]
fn runs_a_scene_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "config": {{ "iterations": 8 }},
            "bodies": [
                {{ "name": "floor", "body_type": "static", "shapes": [ {{ "type": "plane", "normal": [0, 1, 0] }} ] }},
                {{ "name": "ball", "position": [0, 3, 0], "shapes": [ {{ "type": "sphere", "radius": 0.5 }} ] }}
            ]
        }}"#
    )
    .unwrap();
    let out = rebound()
        .arg("--scene")
        .arg(file.path())
        .args(["--steps", "120", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["stats"]["bodies"], 2);
    assert_eq!(report["stats"]["touching_contacts"], 1);
}

#[test]
fn missing_scene_file_fails() {
    rebound()
        .args(["--scene", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("read scene"));
}

#[test]
fn dumped_demo_parses_back() {
    let out = rebound().arg("--dump-demo").output().unwrap();
    assert!(out.status.success());
    let scene: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(scene["bodies"].as_array().unwrap().len() > 10);
}
