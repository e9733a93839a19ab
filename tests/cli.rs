use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PROGRAM: &str = r#"{
  "declarations": [
    {
      "kind": "Action",
      "name": "a",
      "body": {
        "components": [
          { "kind": "Declaration", "name": "x", "type": "bit<8>" },
          {
            "kind": "Assignment",
            "left": { "kind": "Path", "name": "x" },
            "right": { "kind": "Constant", "value": 3 }
          },
          {
            "kind": "Assignment",
            "left": { "kind": "Path", "name": "meta" },
            "right": { "kind": "Path", "name": "x" }
          }
        ]
      }
    }
  ]
}"#;

fn write_program(dir: &TempDir) -> std::path::PathBuf {
    let input = dir.path().join("program.json");
    fs::write(&input, PROGRAM).unwrap();
    input
}

#[test]
fn test_optimize_prints_p4() {
    let dir = TempDir::new().unwrap();
    let input = write_program(&dir);

    Command::cargo_bin("p4-midend")
        .unwrap()
        .args(["optimize", "--format", "p4"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("meta = 3;"))
        .stdout(predicate::str::contains("bit<8> x").not());
}

#[test]
fn test_optimize_without_dead_store_elimination() {
    let dir = TempDir::new().unwrap();
    let input = write_program(&dir);

    Command::cargo_bin("p4-midend")
        .unwrap()
        .args(["optimize", "--format", "p4", "--no-dead-store-elim"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("bit<8> x;"))
        .stdout(predicate::str::contains("meta = 3;"));
}

#[test]
fn test_optimize_writes_json_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_program(&dir);
    let output = dir.path().join("out.json");

    Command::cargo_bin("p4-midend")
        .unwrap()
        .arg("optimize")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("LocalCopyPropagation.propagated: 1"));

    let written = fs::read_to_string(&output).unwrap();
    let program = p4_midend::ir::Program::from_json(&written).unwrap();
    assert_eq!(program.find_action("a").unwrap().body.components.len(), 1);
}

#[test]
fn test_options_file_is_validated() {
    let dir = TempDir::new().unwrap();
    let input = write_program(&dir);
    let options = dir.path().join("options.json");
    fs::write(&options, r#"{ "max_iterations": 0 }"#).unwrap();

    Command::cargo_bin("p4-midend")
        .unwrap()
        .arg("optimize")
        .arg(&input)
        .arg("--options")
        .arg(&options)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_iterations"));
}

#[test]
fn test_dump_and_missing_input() {
    let dir = TempDir::new().unwrap();
    let input = write_program(&dir);

    Command::cargo_bin("p4-midend")
        .unwrap()
        .arg("dump")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("action a() {"))
        .stdout(predicate::str::contains("x = 3;"));

    Command::cargo_bin("p4-midend")
        .unwrap()
        .arg("dump")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure();
}
