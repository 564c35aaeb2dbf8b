// phiscan/tests/cli_integration_tests.rs
//! End-to-end tests of the `phiscan` binary.
//!
//! Every invocation clears the `PHISCAN_*` variables so a developer's
//! environment cannot change the rules, lexicon or log location under test.

use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn phiscan() -> Command {
    let mut cmd = Command::cargo_bin("phiscan").unwrap();
    cmd.env_remove("PHISCAN_CONFIG")
        .env_remove("PHISCAN_LEXICON")
        .env_remove("PHISCAN_LOG")
        .env_remove("PHISCAN_ALLOW_DEBUG_PHI")
        .env("RUST_LOG", "warn");
    cmd
}

const NOTE: &str = "DISCHARGE SUMMARY\n\nPatient: Dr. Alan Green, DOB 01/02/1990. SSN 123-45-6789.\nLives at 42 Elm Street. Sex: female\n";

#[test]
fn scan_json_reports_structured_and_recognized_phi() -> Result<()> {
    let output = phiscan().args(["scan", "--json"]).write_stdin(NOTE).output()?;
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["document"], "<stdin>");
    assert_eq!(record["binary_phi"], true);
    assert_eq!(record["recognizer"], "available");
    assert_eq!(record["grouped_entities"]["DATE"][0]["text"], "01/02/1990");
    assert_eq!(record["grouped_entities"]["SSN"][0]["score"], 1.0);
    assert_eq!(record["grouped_entities"]["PERSON"][0]["text"], "Dr. Alan Green");
    assert_eq!(record["regex_violations"]["SSN"][0]["text"], "123-45-6789");
    assert_eq!(record["input_sha256"].as_str().map(str::len), Some(64));
    Ok(())
}

#[test]
fn scan_without_recognizer_keeps_structured_matches() -> Result<()> {
    let output = phiscan()
        .args(["scan", "--json", "--no-recognizer"])
        .write_stdin(NOTE)
        .output()?;
    assert!(output.status.success());

    let record: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["recognizer"], "unavailable");
    assert!(record["grouped_entities"].get("PERSON").is_none());
    assert!(record["grouped_entities"].get("SSN").is_some());
    assert_eq!(record["ner_entities"], serde_json::json!([]));
    Ok(())
}

#[test]
fn scan_table_output_for_clean_document() {
    phiscan()
        .args(["scan", "--no-recognizer"])
        .write_stdin("follow up in two weeks")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<stdin>: no PHI"));
}

#[test]
fn scan_reads_input_file_and_appends_to_log() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("note.txt");
    let log = dir.path().join("logs").join("violations.log");
    fs::write(&input, "call 555-123-4567")?;

    for _ in 0..2 {
        phiscan()
            .args(["scan", "--no-recognizer", "-i"])
            .arg(&input)
            .arg("--log")
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains("note.txt: PHI FOUND (PHONE=1)"));
    }

    let contents = fs::read_to_string(&log)?;
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0])?;
    assert_eq!(first["document"], "note.txt");
    assert_eq!(first["grouped_entities"]["PHONE"][0]["text"], "555-123-4567");
    Ok(())
}

#[test]
fn batch_writes_one_record_per_document() -> Result<()> {
    let dir = tempdir()?;
    let docs = dir.path().join("docs");
    fs::create_dir(&docs)?;
    fs::write(docs.join("a.txt"), "SSN 123-45-6789")?;
    fs::write(docs.join("b.txt"), "nothing here")?;
    fs::write(docs.join("c.txt"), "mail jane@example.org")?;
    fs::write(docs.join("scan.pdf"), "not text")?;
    let log = dir.path().join("violations.log");

    phiscan()
        .args(["batch", "--no-recognizer", "-j", "2"])
        .arg(&docs)
        .arg("--log")
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("a.txt: PHI FOUND (SSN=1)"))
        .stdout(predicate::str::contains("b.txt: no PHI"))
        .stdout(predicate::str::contains("c.txt: PHI FOUND (EMAIL=1)"));

    let records: Vec<Value> = fs::read_to_string(&log)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 3);

    let mut names: Vec<&str> = records.iter().filter_map(|r| r["document"].as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);

    let run_ids: Vec<&Value> = records.iter().map(|r| &r["run_id"]).collect();
    assert!(run_ids.iter().all(|id| *id == run_ids[0]));
    Ok(())
}

#[test]
fn batch_on_missing_directory_fails() {
    phiscan()
        .args(["batch", "/no/such/phiscan/dir", "--log", "/tmp/phiscan-unused.log"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[error]"));
}

#[test]
fn rules_lists_default_rules() {
    phiscan()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("date"))
        .stdout(predicate::str::contains("us_ssn"))
        .stdout(predicate::str::contains("phone"))
        .stdout(predicate::str::contains("email"))
        .stdout(predicate::str::contains("overlap policy: allow"));
}

#[test]
fn custom_config_adds_a_rule() -> Result<()> {
    let dir = tempdir()?;
    let config = dir.path().join("rules.yaml");
    fs::write(
        &config,
        r#"
rules:
  - name: po_box
    label: ADDRESS
    description: "Post office boxes"
    pattern: '\bPO Box \d+\b'
"#,
    )?;

    let output = phiscan()
        .args(["scan", "--json", "--no-recognizer", "--config"])
        .arg(&config)
        .write_stdin("mail to PO Box 1234")
        .output()?;
    assert!(output.status.success());
    let record: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(record["grouped_entities"]["ADDRESS"][0]["text"], "PO Box 1234");
    Ok(())
}

#[test]
fn out_of_range_threshold_is_rejected() {
    phiscan()
        .args(["scan", "--threshold", "1.5"])
        .write_stdin("anything")
        .assert()
        .failure()
        .stderr(predicate::str::contains("threshold"));
}

#[test]
fn disabling_a_rule_removes_its_label() -> Result<()> {
    let output = phiscan()
        .args(["scan", "--json", "--no-recognizer", "--disable", "us_ssn"])
        .write_stdin("SSN 123-45-6789 on 01/02/1990")
        .output()?;
    assert!(output.status.success());
    let record: Value = serde_json::from_slice(&output.stdout)?;
    assert!(record["grouped_entities"].get("SSN").is_none());
    assert!(record["grouped_entities"].get("DATE").is_some());
    Ok(())
}
