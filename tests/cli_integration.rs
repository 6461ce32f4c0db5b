//! Drives the built binary against scratch projects.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_splint-patcher"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run splint-patcher")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn setup_project(config: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    if let Some(config) = config {
        fs::write(dir.path().join(".splint.edn"), config).unwrap();
    }
    fs::write(
        dir.path().join("screen.cljs"),
        "(ns my-app.screen)\n(defn width [] (str \"w-1/3\"))\n",
    )
    .unwrap();
    dir
}

fn root_arg(dir: &TempDir) -> &str {
    dir.path().to_str().unwrap()
}

#[test]
fn exclude_help() {
    let output = run(&["exclude", "--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Exclude a path from a rule"));
}

#[test]
fn exclude_creates_config() {
    let project = setup_project(None);

    let output = run(&["exclude", "lint/eq-nil", "glob:**/foo.clj", "--root", root_arg(&project)]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("create-document"));
    assert_eq!(
        fs::read_to_string(project.path().join(".splint.edn")).unwrap(),
        "{lint/eq-nil {:excludes [\"glob:**/foo.clj\"]}}\n"
    );
}

#[test]
fn exclude_dry_run_writes_nothing() {
    let original = "{lint/eq-nil {:excludes [\"a.clj\"]}}\n";
    let project = setup_project(Some(original));

    let output = run(&[
        "exclude",
        "lint/eq-nil",
        "b.clj",
        "--root",
        root_arg(&project),
        "--dry-run",
        "--diff",
    ]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("DRY RUN"));
    assert!(out.contains("+{lint/eq-nil {:excludes [\"a.clj\" \"b.clj\"]}}"));
    assert_eq!(
        fs::read_to_string(project.path().join(".splint.edn")).unwrap(),
        original
    );
}

#[test]
fn exclude_skips_duplicates_unless_allowed() {
    let original = "{lint/eq-nil {:excludes [\"a.clj\"]}}\n";
    let project = setup_project(Some(original));
    let config = project.path().join(".splint.edn");

    let output = run(&["exclude", "lint/eq-nil", "a.clj", "--root", root_arg(&project)]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("already excluded"));
    assert_eq!(fs::read_to_string(&config).unwrap(), original);

    let output = run(&[
        "exclude",
        "lint/eq-nil",
        "a.clj",
        "--root",
        root_arg(&project),
        "--allow-duplicate",
    ]);
    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&config).unwrap(),
        "{lint/eq-nil {:excludes [\"a.clj\" \"a.clj\"]}}\n"
    );
}

#[test]
fn exclude_rejects_bad_rule_key() {
    let project = setup_project(Some("{}\n"));

    let output = run(&["exclude", "lint eq", "a.clj", "--root", root_arg(&project)]);

    assert!(!output.status.success());
    assert_eq!(
        fs::read_to_string(project.path().join(".splint.edn")).unwrap(),
        "{}\n"
    );
}

#[test]
fn check_exit_codes() {
    let project = setup_project(Some("{style/eq-zero {:excludes [\"test/**\"]}}\n"));

    let present = run(&["check", "style/eq-zero", "test/**", "--root", root_arg(&project)]);
    assert!(present.status.success());
    assert!(stdout(&present).contains("EXCLUDED"));

    let absent = run(&["check", "style/eq-zero", "src/**", "--root", root_arg(&project)]);
    assert_eq!(absent.status.code(), Some(1));
    assert!(stdout(&absent).contains("NOT EXCLUDED"));
}

fn write_output(dir: &Path, contents: &str) -> String {
    let path = dir.join("splint.out");
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn annotate_prints_positions() {
    let project = setup_project(None);
    let source = project.path().join("screen.cljs");
    let input = write_output(
        project.path(),
        "{\"line\":2,\"column\":16,\"end-line\":2,\"end-column\":29,\"message\":\"Use the literal directly.\",\"rule-name\":\"lint/redundant-str-call\",\"alt\":\"\\\"w-1/3\\\"\"}\n",
    );

    let output = run(&["annotate", source.to_str().unwrap(), "--input", &input]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("screen.cljs:2:16-2:29"));
    assert!(out.contains("Use the literal directly. [lint/redundant-str-call]"));
    assert!(out.contains("Replace with: \"w-1/3\""));
}

#[test]
fn annotate_fix_rewrites_source() {
    let project = setup_project(None);
    let source = project.path().join("screen.cljs");
    let input = write_output(
        project.path(),
        "{\"line\":2,\"column\":16,\"end-line\":2,\"end-column\":29,\"alt\":\"\\\"w-1/3\\\"\"}\n",
    );

    let output = run(&["annotate", source.to_str().unwrap(), "--input", &input, "--fix"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&source).unwrap(),
        "(ns my-app.screen)\n(defn width [] \"w-1/3\")\n"
    );
}

#[test]
fn annotate_reports_crash() {
    let project = setup_project(None);
    let source = project.path().join("screen.cljs");
    let input = write_output(project.path(), "");
    let stderr = project.path().join("splint.err");
    fs::write(&stderr, "Exception in thread \"main\"\n").unwrap();

    let output = run(&[
        "annotate",
        source.to_str().unwrap(),
        "--input",
        &input,
        "--exit-code",
        "1",
        "--stderr",
        stderr.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("splint failed"));
}

#[test]
fn settings_shows_analysis_args() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.toml");
    fs::write(
        &file,
        "executable_path = \"/usr/local/bin/splint\"\nadditional_args = \"--parallel\"\n",
    )
    .unwrap();

    let output = run(&[
        "settings",
        "--file",
        file.to_str().unwrap(),
        "--source",
        "src/core.clj",
    ]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("analysis_timeout_seconds = 30"));
    assert!(out.contains("/usr/local/bin/splint src/core.clj --output json --parallel"));
}

#[test]
fn settings_rejects_zero_timeout() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("settings.toml");
    fs::write(&file, "analysis_timeout_seconds = 0\n").unwrap();

    let output = run(&["settings", "--file", file.to_str().unwrap()]);

    assert!(!output.status.success());
}

#[test]
fn exclude_over_blank_config_does_not_warn() {
    let project = setup_project(Some("  \n"));

    let output = run(&["exclude", "lint/eq-nil", "a.clj", "--root", root_arg(&project)]);

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("no closing brace"));
}

#[test]
fn exclude_over_malformed_config_warns() {
    let project = setup_project(Some("{lint/eq-nil {:enabled"));

    let output = run(&["exclude", "lint/eq-nil", "a.clj", "--root", root_arg(&project)]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no closing brace"));
}
