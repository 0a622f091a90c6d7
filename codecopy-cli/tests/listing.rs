use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn languages_json_lists_registry() {
    let mut cmd = cargo_bin_cmd!("codecopy");
    cmd.args(["languages", "--json"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let languages: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let ids: Vec<&str> = languages
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"rust"));
    assert!(ids.contains(&"javascript"));
}

#[test]
fn themes_marks_configured_theme() {
    let mut cmd = cargo_bin_cmd!("codecopy");
    cmd.arg("themes");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("* InspiredGitHub"));
}

#[test]
fn css_prints_container_rule() {
    let mut cmd = cargo_bin_cmd!("codecopy");
    cmd.args(["css", "InspiredGitHub"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("pre#highlighted-code-wrapper {"));
}

#[test]
fn highlight_standalone_embeds_theme_css() {
    let dir = tempdir().unwrap();
    let input_path = dir.path().join("lib.rs");
    fs::write(&input_path, "fn main() {}\n").unwrap();

    let mut cmd = cargo_bin_cmd!("codecopy");
    cmd.arg("highlight")
        .arg(input_path.as_os_str())
        .args(["--standalone", "--no-format", "--line-numbers"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("<!DOCTYPE html>"))
        .stdout(predicate::str::contains("pre#highlighted-code-wrapper {"))
        .stdout(predicate::str::contains("class=\"token comment line-number\""));
}
