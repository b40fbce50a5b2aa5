use crate::common::file::write_tree;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const SITE_CONFIG: &str = r#"
backend:
  name: test-repo
  seed_dir: site
media_folder: static/uploads
collections:
  - name: posts
    label: Blog posts
    folder: _posts
    extension: md
    fields:
      - {name: title, widget: string}
      - {name: draft, widget: boolean, default: false}
      - {name: body, widget: markdown, required: false}
  - name: settings
    label: Settings
    files:
      - name: general
        file: _data/settings.json
        fields: [{name: site_title, widget: string}]
"#;

pub const FIRST_POST: &str = "---\ntitle: First post\ndraft: false\n---\nHello there\n";
pub const SETTINGS: &str = "{\n  \"site_title\": \"Folio\"\n}\n";

/// A working directory holding `config.yml` and a `site/` seed for the
/// in-memory backend
#[fixture]
pub fn site_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("config.yml"), SITE_CONFIG).expect("Failed to write config");
    write_tree(
        &dir.path().join("site"),
        &[
            ("_posts/first-post.md", FIRST_POST),
            ("_posts/notes.txt", "scratch"),
            ("_data/settings.json", SETTINGS),
            ("static/uploads/.keep", ""),
        ],
    );

    dir
}

pub fn run_folio_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("folio").expect("Failed to find folio binary");
    cmd.current_dir(dir);
    cmd.envs(vec![
        ("NO_COLOR", "1".to_string()),
        (
            "FOLIO_CREDENTIALS",
            dir.join("credentials.json").display().to_string(),
        ),
        ("GIT_AUTHOR_NAME", "fake_user".to_string()),
        ("GIT_AUTHOR_EMAIL", "fake_email@email.com".to_string()),
        ("GIT_AUTHOR_DATE", "2023-01-01 12:00:00 +0000".to_string()),
    ]);
    cmd.env_remove("FOLIO_TOKEN");
    cmd.env_remove("FOLIO_CONFIG");
    cmd.env_remove("RUST_LOG");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
