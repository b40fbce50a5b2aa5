use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::Words;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

use common::{FIRST_POST, run_folio_command, site_dir};

#[rstest]
fn list_configured_collections(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["collections"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "posts\tBlog posts\tfolder _posts (*.md)",
        ))
        .stdout(predicate::str::contains(
            "settings\tSettings\tfiles general",
        ));
}

#[rstest]
fn list_entries_of_folder_collection(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["entries", "posts"])
        .assert()
        .success()
        .stdout(predicate::eq("first-post\tFirst post\n"));
}

#[rstest]
fn list_entries_of_file_collection(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["entries", "settings"])
        .assert()
        .success()
        .stdout(predicate::eq("general\tgeneral\n"));
}

#[rstest]
fn show_entry_as_stored_document(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["show", "posts", "first-post"])
        .assert()
        .success()
        .stdout(predicate::eq(FIRST_POST));
}

#[rstest]
fn show_entry_as_json(site_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let output = run_folio_command(site_dir.path(), &["show", "posts", "first-post", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entry: serde_json::Value = serde_json::from_slice(&output)?;

    assert_eq!(entry["collection"], "posts");
    assert_eq!(entry["path"], "_posts/first-post.md");
    assert_eq!(entry["data"]["title"], "First post");
    assert_eq!(entry["data"]["body"], "Hello there\n");
    assert!(entry["sha"].as_str().is_some_and(|sha| sha.len() == 40));

    Ok(())
}

#[rstest]
fn show_missing_entry_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["show", "posts", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry posts/nope not found"));
}

#[rstest]
fn create_entry_from_fields_and_body_file(
    site_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let body = Words(5..10).fake::<Vec<String>>().join(" ");
    site_dir.child("body.md").write_str(&body)?;

    run_folio_command(
        site_dir.path(),
        &[
            "new",
            "posts",
            "-f",
            "title=Hello World",
            "-f",
            "draft=true",
            "--body-file",
            "body.md",
        ],
    )
    .assert()
    .success()
    .stdout(predicate::str::is_match(
        r"^Created posts/hello-world \[[0-9a-f]{7}\] _posts/hello-world\.md\n$",
    )?);

    Ok(())
}

#[rstest]
fn create_entry_with_existing_slug_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["new", "posts", "-f", "title=First Post"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to save entry posts/first-post"))
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn create_entry_without_required_field_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["new", "posts", "-f", "draft=true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to save entry in posts"))
        .stderr(predicate::str::contains("title is required"));
}

#[rstest]
fn create_entry_in_file_collection_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["new", "settings", "-f", "site_title=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "collection settings does not allow creating entries",
        ));
}

#[rstest]
fn update_existing_entry(site_dir: TempDir) {
    run_folio_command(
        site_dir.path(),
        &["edit", "settings", "general", "-f", "site_title=Renamed"],
    )
    .assert()
    .success()
    .stdout(predicate::str::starts_with("Updated settings/general ["))
    .stdout(predicate::str::ends_with("] _data/settings.json\n"));
}

#[rstest]
fn update_with_malformed_field_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["edit", "posts", "first-post", "-f", "title"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[rstest]
fn delete_existing_entry(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["delete", "posts", "first-post"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^Deleted posts/first-post \([0-9a-f]{7}\)\n$").unwrap());
}

#[rstest]
fn delete_missing_entry_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["delete", "posts", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to delete entry posts/missing"));
}

#[rstest]
fn upload_media_file(site_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    site_dir.child("logo.svg").write_str("<svg/>")?;

    run_folio_command(site_dir.path(), &["upload", "logo.svg"])
        .assert()
        .success()
        .stdout(predicate::eq("Uploaded static/uploads/logo.svg\n"));

    Ok(())
}

#[rstest]
fn unknown_collection_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["entries", "authors"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown collection authors"));
}

#[rstest]
fn missing_configuration_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["--config", "other.yml", "collections"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unable to read configuration other.yml"));
}
