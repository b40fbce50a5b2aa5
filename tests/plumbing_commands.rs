use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use folio::artifacts::objects::blob::Blob;
use folio::artifacts::objects::object::Object;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::{FIRST_POST, run_folio_command, site_dir};

#[test]
fn hash_object_without_configuration() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    dir.child(&file_name).write_str(&file_content)?;

    let expected = Blob::new(file_content).object_id()?;

    run_folio_command(dir.path(), &["hash-object", &file_name])
        .assert()
        .success()
        .stdout(predicate::eq(format!("{expected}\n")));

    Ok(())
}

#[test]
fn hash_object_matches_git_for_known_content() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    dir.child("hello.txt").write_str("hello\n")?;

    run_folio_command(dir.path(), &["hash-object", "hello.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("ce013625030ba8dba906f756967f9e9ca394464a\n"));

    Ok(())
}

#[rstest]
fn list_root_tree(site_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_folio_command(site_dir.path(), &["ls-tree"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(concat!(
            r"^040000 tree [0-9a-f]{40}\t_data\n",
            r"040000 tree [0-9a-f]{40}\t_posts\n",
            r"040000 tree [0-9a-f]{40}\tstatic\n$",
        ))?);

    Ok(())
}

#[rstest]
fn list_directory_recursively(site_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    let first_post = Blob::new(FIRST_POST).object_id()?;

    run_folio_command(site_dir.path(), &["ls-tree", "-r", "_posts"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "100644 blob {first_post}\t_posts/first-post.md\n"
        )))
        .stdout(predicate::str::contains("\t_posts/notes.txt\n"));

    Ok(())
}

#[rstest]
fn list_file_as_directory_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["ls-tree", "_posts/notes.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a directory"));
}

#[rstest]
fn print_file_content(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["cat-file", "_posts/notes.txt"])
        .assert()
        .success()
        .stdout(predicate::eq("scratch"));
}

#[rstest]
fn print_missing_file_fails(site_dir: TempDir) {
    run_folio_command(site_dir.path(), &["cat-file", "_posts/missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("_posts/missing.md not found"));
}
