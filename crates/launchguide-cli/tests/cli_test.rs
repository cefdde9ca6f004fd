//! Integration tests for the `launchguide` binary.
//!
//! Each test runs the built binary with the offline provider, a temporary
//! store directory and a temporary XDG config home, so nothing touches the
//! network or the real user config.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const MINIMAL_RECORD: &str = r#"{
  "variant": "minimal",
  "productDescription": "A todo app for freelancers",
  "targetAudience": "Freelance designers",
  "businessGoal": "First 50 paying users",
  "budgetConstraints": "Under $200/month",
  "marketingKnowledge": "Beginner"
}"#;

fn launchguide(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_launchguide"))
        .args(args)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("RUST_LOG", "warn")
        .env_remove("LAUNCHGUIDE_API_KEY")
        .env_remove("LAUNCHGUIDE_BASE_URL")
        .env_remove("LAUNCHGUIDE_MODEL")
        .env_remove("LAUNCHGUIDE_STORE_DIR")
        .output()
        .expect("failed to run launchguide binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_record(dir: &Path, contents: &str) -> String {
    let path = dir.join("record.json");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn channels_lists_catalog() {
    let tmp = TempDir::new().unwrap();
    let out = launchguide(tmp.path(), &["channels"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    for name in [
        "Content Marketing",
        "SEO (Basic)",
        "Community Building (Reddit/Indie Hackers)",
        "Cold Outreach (Limited)",
        "BetaList/Product Hunt Launch",
        "Targeted Social Ads (Simple)",
    ] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
}

#[test]
fn generate_show_and_clear() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store");
    let store_arg = store.to_string_lossy().into_owned();
    let record = write_record(tmp.path(), MINIMAL_RECORD);

    let out = launchguide(
        tmp.path(),
        &[
            "--store-dir",
            &store_arg,
            "generate",
            "--offline",
            "--record",
            &record,
            "--channel",
            "Content Marketing",
            "--channel",
            "SEO (Basic)",
            "--channel",
            "Podcasts",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let content = text.find("## Content Marketing").expect("first heading");
    let seo = text.find("## SEO (Basic)").expect("second heading");
    let podcasts = text.find("## Podcasts").expect("third heading");
    assert!(content < seo && seo < podcasts, "headings out of order:\n{text}");
    assert!(text.contains("0/15 steps done"), "unexpected output:\n{text}");
    assert!(store.join("plan.json").exists());
    assert!(store.join("plan_meta.json").exists());

    let out = launchguide(tmp.path(), &["--store-dir", &store_arg, "plan", "show"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let shown = stdout(&out);
    assert!(shown.starts_with("Plan "), "unexpected output:\n{shown}");
    assert!(shown.contains("## Podcasts"));

    let out = launchguide(tmp.path(), &["--store-dir", &store_arg, "plan", "clear"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(!store.join("plan.json").exists());

    let out = launchguide(tmp.path(), &["--store-dir", &store_arg, "plan", "show"]);
    assert!(stdout(&out).contains("No plan stored"));
}

#[test]
fn generate_enforces_selection_policy() {
    let tmp = TempDir::new().unwrap();
    let store_arg = tmp.path().join("store").to_string_lossy().into_owned();
    let record = write_record(tmp.path(), MINIMAL_RECORD);

    let out = launchguide(
        tmp.path(),
        &[
            "--store-dir",
            &store_arg,
            "generate",
            "--offline",
            "--record",
            &record,
            "--channel",
            "SEO (Basic)",
        ],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("at least 3"), "stderr: {}", stderr(&out));

    let out = launchguide(
        tmp.path(),
        &[
            "--store-dir",
            &store_arg,
            "generate",
            "--offline",
            "--policy",
            "at_least_one",
            "--record",
            &record,
            "--channel",
            "SEO (Basic)",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("## SEO (Basic)"));
}

#[test]
fn generate_rejects_invalid_record() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store");
    let store_arg = store.to_string_lossy().into_owned();
    let record = write_record(
        tmp.path(),
        r#"{"variant": "extended", "email": "foo@bar", "budget": 20000}"#,
    );

    let out = launchguide(
        tmp.path(),
        &[
            "--store-dir",
            &store_arg,
            "generate",
            "--offline",
            "--policy",
            "at_least_one",
            "--record",
            &record,
            "--channel",
            "SEO (Basic)",
        ],
    );
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("email"), "stderr: {err}");
    assert!(err.contains("budget"), "stderr: {err}");
    assert!(!store.join("plan.json").exists());
}

#[test]
fn init_writes_config_once() {
    let tmp = TempDir::new().unwrap();

    let out = launchguide(tmp.path(), &["init", "--provider", "offline"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let path = tmp.path().join("config/launchguide/config.toml");
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("name = \"offline\""), "config:\n{contents}");

    let out = launchguide(tmp.path(), &["init"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--force"));

    let out = launchguide(tmp.path(), &["init", "--force", "--model", "gpt-4o"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("gpt-4o"));
}
