#![allow(deprecated)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn achedit() -> Command {
    let mut cmd = Command::new(cargo_bin("achedit"));
    cmd.env_remove("ACHEDIT_LAYOUT");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name)
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn test_check_fixtures() {
    achedit()
        .arg("check")
        .arg(fixture("sample.ach"))
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 10 records"));

    achedit()
        .arg("check")
        .arg(fixture("sample.aft"))
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 4 records"));
}

#[test]
fn test_check_reports_stale_totals() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("stale.ach");
    let text = fs::read_to_string(fixture("sample.ach")).unwrap();
    fs::write(&path, text.replacen("0000010000", "0000010001", 1)).unwrap();

    achedit()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("line 5: \"Total Credit Entry Dollar Amount\""))
        .stdout(predicate::str::contains("problems found"));

    let repaired = temp.path().join("repaired.ach");
    achedit()
        .arg("recalc")
        .arg(&path)
        .arg("-o")
        .arg(&repaired)
        .assert()
        .success();
    achedit().arg("check").arg(&repaired).assert().success();
}

#[test]
fn test_new_documents() {
    let nacha = stdout_of(achedit().args(["new", "--layout", "nacha"]));
    assert_eq!(nacha.lines().count(), 10);
    assert!(nacha.lines().all(|line| line.len() == 94));

    let aft = stdout_of(achedit().arg("new").env("ACHEDIT_LAYOUT", "aft"));
    let lines: Vec<&str> = aft.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('A'));
    assert!(lines[1].starts_with("Z000000002"));
    assert!(lines.iter().all(|line| line.len() == 1464));
}

#[test]
fn test_new_then_check() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out").join("new.ach");
    achedit()
        .args(["new", "-o"])
        .arg(&path)
        .assert()
        .success();
    achedit().arg("check").arg(&path).assert().success();
}

#[test]
fn test_set_updates_totals() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("edited.ach");
    achedit()
        .arg("set")
        .arg(fixture("sample.ach"))
        .args(["3", "amount", "2500", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("amount = \"0000002500\""));

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[2][29..39], "0000002500");
    assert_eq!(&lines[4][32..44], "000000002500");
    assert_eq!(&lines[5][43..55], "000000002500");
    achedit().arg("check").arg(&path).assert().success();
}

#[test]
fn test_set_segment_field() {
    let out = stdout_of(
        achedit()
            .arg("set")
            .arg(fixture("sample.aft"))
            .args(["2", "amount", "1", "--part", "2"]),
    );
    let trailer = out.lines().nth(3).unwrap();
    // credit total follows the debit amount (14) and count (8)
    assert_eq!(&trailer[46..60], "00000000150001");
}

#[test]
fn test_set_rejections() {
    achedit()
        .arg("set")
        .arg(fixture("sample.ach"))
        .args(["5", "entry_hash", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is computed and cannot be edited"));

    achedit()
        .arg("set")
        .arg(fixture("sample.ach"))
        .args(["3", "amount", "12x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match the pattern"));

    achedit()
        .arg("set")
        .arg(fixture("sample.ach"))
        .args(["0", "amount", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line numbers start at 1"));
}

#[test]
fn test_apply_script() {
    let out = stdout_of(
        achedit()
            .arg("apply")
            .arg(fixture("sample.ach"))
            .arg(fixture("raise.script")),
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(&lines[2][29..39], "0000012500");
    assert_eq!(lines[3][54..76].trim_end(), "ROBERT JONES");
    assert_eq!(&lines[4][32..44], "000000012500");
}

#[test]
fn test_apply_reports_failures() {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("bad.script");
    fs::write(&script, "SET 3 amount = \"1\"\nSET 5 entry_hash = \"1\"\n").unwrap();
    achedit()
        .arg("apply")
        .arg(fixture("sample.ach"))
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("command 2: line 5"))
        .stderr(predicate::str::contains("Applied 1 of 2 commands"));

    fs::write(&script, "SET 3 amount \"1\"\n").unwrap();
    achedit()
        .arg("apply")
        .arg(fixture("sample.ach"))
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("script line 1"));
}

#[test]
fn test_import() {
    let out = stdout_of(
        achedit()
            .arg("import")
            .arg(fixture("sample.ach"))
            .arg(fixture("transactions.csv"))
            .args(["--batch", "2"]),
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(&lines[2][..12], "622123456789");
    assert_eq!(&lines[3][1..3], "37");
    assert_eq!(&lines[6][..10], "8200000004");

    achedit()
        .arg("import")
        .arg(fixture("sample.ach"))
        .arg(fixture("transactions.csv"))
        .args(["--batch", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1 is not a batch header"));
}

#[test]
fn test_show() {
    achedit()
        .arg("show")
        .arg(fixture("sample.ach"))
        .assert()
        .success()
        .stdout(predicate::str::contains("NACHA file, 10 records"))
        .stdout(predicate::str::contains("Entry Detail"))
        .stdout(predicate::str::contains("$100.00"))
        .stdout(predicate::str::contains("Checking Debit"));

    achedit()
        .arg("show")
        .arg(fixture("sample.aft"))
        .assert()
        .success()
        .stdout(predicate::str::contains("segment 2"))
        .stdout(predicate::str::contains("segment 3").not());

    let json = stdout_of(achedit().arg("show").arg("--json").arg(fixture("sample.ach")));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["layout"], "Nacha");
    assert_eq!(value["records"][2]["fields"]["amount"], "0000010000");
}

#[test]
fn test_undetectable_layout() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("unknown.txt");
    fs::write(&path, "hello\n").unwrap();
    achedit()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot detect the layout"));
}
