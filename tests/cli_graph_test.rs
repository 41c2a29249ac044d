//! Integration tests for `wl graph components`, `wl show`, and
//! `wl build-info`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_components_empty_snapshot() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot("snap.json", json!({"nodes": []}));

    env.wl()
        .args(["-s", snapshot.to_str().unwrap(), "graph", "components"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"component_count\":0"))
        .stdout(predicate::str::contains("\"cycle_count\":0"));
}

#[test]
fn test_components_isolated_tasks() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(
        "snap.json",
        json!({
            "nodes": [
                {"id": "n-1", "text": "One", "tags": ["task"], "props": {"status": "todo"}},
                {"id": "n-2", "text": "Two", "tags": ["task"], "props": {"status": "todo"}},
                {"id": "n-3", "text": "Three", "tags": ["task"], "props": {"status": "todo"}}
            ]
        }),
    );

    env.wl()
        .args(["-s", snapshot.to_str().unwrap(), "graph", "components"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"task_count\":3"))
        .stdout(predicate::str::contains("\"component_count\":3"))
        .stdout(predicate::str::contains("\"cycle_count\":0"));
}

#[test]
fn test_components_reports_cycle_members() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(
        "snap.json",
        json!({
            "nodes": [
                {"id": "n-a", "text": "A", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-b"]}},
                {"id": "n-b", "text": "B", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-c"]}},
                {"id": "n-c", "text": "C", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-a"]}},
                {"id": "n-d", "text": "Tail", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-a"]}}
            ]
        }),
    );

    let output = env
        .wl()
        .args(["-s", snapshot.to_str().unwrap(), "graph", "components"])
        .output()
        .expect("failed to run command");
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(parsed["task_count"], 4);
    // The three-task loop is one component, the tail its own.
    assert_eq!(parsed["component_count"], 2);
    assert_eq!(parsed["cycle_count"], 1);
    let members: Vec<&str> = parsed["cycles"][0]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(members, vec!["n-a", "n-b", "n-c"]);
}

#[test]
fn test_components_human_output() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(
        "snap.json",
        json!({
            "nodes": [
                {"id": "n-a", "text": "A", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-b"]}},
                {"id": "n-b", "text": "B", "tags": ["task"],
                 "props": {"status": "todo", "depends_on": ["n-a"]}}
            ]
        }),
    );

    env.wl()
        .args(["-s", snapshot.to_str().unwrap(), "graph", "components", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 cycle(s)"))
        .stdout(predicate::str::contains("n-a -> n-b"));
}

#[test]
fn test_show_includes_record_and_verdict() {
    let env = TestEnv::new();
    let snapshot = env.write_snapshot(
        "snap.json",
        json!({
            "nodes": [
                {"id": "n-1", "text": "Inspect me", "tags": ["task"],
                 "props": {"status": "waiting", "importance": 70,
                           "depends_on": ["n-2"]}},
                {"id": "n-2", "text": "Dep", "tags": ["task"],
                 "props": {"status": "todo"}}
            ]
        }),
    );

    env.wl()
        .args(["-s", snapshot.to_str().unwrap(), "show", "n-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"waiting\""))
        .stdout(predicate::str::contains("\"actionable\":false"))
        .stdout(predicate::str::contains("dependency-unmet"));
}

#[test]
fn test_build_info_works_without_snapshot() {
    let env = TestEnv::new();
    env.wl()
        .args(["build-info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\""));
}
