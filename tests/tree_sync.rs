use bytes::Bytes;
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use folio::areas::backend::GitApi;
use folio::areas::backend::memory::MemoryApi;
use folio::artifacts::objects::blob::Blob;
use folio::artifacts::objects::object::Object;
use folio::artifacts::sync::tree_sync::{TreeSync, Upload};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use std::collections::BTreeMap;

fn random_content() -> String {
    Words(3..8).fake::<Vec<String>>().join(" ")
}

#[fixture]
async fn site() -> MemoryApi {
    MemoryApi::seeded(vec![
        ("README.md".to_string(), Bytes::from("readme")),
        ("_posts/a.md".to_string(), Bytes::from("a")),
        ("_posts/b.md".to_string(), Bytes::from("b")),
        ("static/logo.svg".to_string(), Bytes::from("<svg/>")),
    ])
    .await
    .expect("Failed to seed repository")
}

#[rstest]
#[tokio::test]
async fn files_under_absent_directories_form_new_trees() {
    let api = MemoryApi::new().unwrap();
    let files = (1..=4)
        .map(|index| {
            let path = format!(
                "{}/{index}/{}.md",
                Word().fake::<String>(),
                Word().fake::<String>()
            );
            (path, random_content())
        })
        .collect::<BTreeMap<_, _>>();

    TreeSync::new(&api)
        .commit_files(
            files
                .iter()
                .map(|(path, content)| Upload::content(path.clone(), content.clone()))
                .collect(),
            "Add files",
        )
        .await
        .unwrap();

    let expected = files
        .into_iter()
        .map(|(path, content)| (path, Bytes::from(content)))
        .collect::<BTreeMap<_, _>>();
    assert_eq!(api.snapshot().await.unwrap(), expected);
}

#[rstest]
#[tokio::test]
async fn overlapping_files_replace_only_changed_entries(#[future] site: MemoryApi) {
    let api = site.await;
    let before = api.list_files("").await.unwrap();
    let content = random_content();

    TreeSync::new(&api)
        .commit_files(
            vec![
                Upload::content("_posts/b.md", content.clone()),
                Upload::content("_posts/c.md", "c"),
            ],
            "Update posts",
        )
        .await
        .unwrap();

    let snapshot = api.snapshot().await.unwrap();
    assert_eq!(snapshot["README.md"], Bytes::from("readme"));
    assert_eq!(snapshot["_posts/a.md"], Bytes::from("a"));
    assert_eq!(snapshot["_posts/b.md"], Bytes::from(content.clone()));
    assert_eq!(snapshot["_posts/c.md"], Bytes::from("c"));
    assert_eq!(snapshot.len(), 5);

    // untouched directories keep their tree ids
    let after = api.list_files("").await.unwrap();
    let static_dir = |listing: &[folio::areas::backend::FileInfo]| {
        listing
            .iter()
            .find(|info| info.name == "static")
            .map(|info| info.sha.clone())
    };
    assert_eq!(static_dir(&before), static_dir(&after));

    let posts = api.list_files("_posts").await.unwrap();
    let b = posts.iter().find(|info| info.name == "b.md").unwrap();
    assert_eq!(b.sha, Blob::new(content).object_id().unwrap());
}

#[rstest]
#[tokio::test]
async fn commit_parent_is_previous_head(#[future] site: MemoryApi) {
    let api = site.await;
    let head = api.branch_head().await.unwrap();

    let outcome = TreeSync::new(&api)
        .commit_files(vec![Upload::content("new.md", "new")], "Add new")
        .await
        .unwrap();

    let commit = api.read_commit(&outcome.commit).await.unwrap();
    assert_eq!(commit.parents, vec![head]);
    assert_eq!(commit.tree, outcome.tree);
    assert_eq!(api.branch_head().await.unwrap(), outcome.commit);
}

#[rstest]
#[tokio::test]
async fn deleting_removes_exactly_one_entry(#[future] site: MemoryApi) {
    let api = site.await;
    let mut expected = api.snapshot().await.unwrap();

    let sha = TreeSync::new(&api)
        .delete_file("_posts/a.md", "Delete a")
        .await
        .unwrap();

    expected.remove("_posts/a.md");
    assert_eq!(sha, Blob::new("a").object_id().unwrap());
    assert_eq!(api.snapshot().await.unwrap(), expected);
}

#[rstest]
#[tokio::test]
async fn already_uploaded_blobs_are_reused(#[future] site: MemoryApi) {
    let api = site.await;
    let sha = api.upload_blob(Bytes::from("shared")).await.unwrap();

    TreeSync::new(&api)
        .commit_files(
            vec![Upload::blob("one.txt", sha.clone()), Upload::blob("two/two.txt", sha)],
            "Reuse blob",
        )
        .await
        .unwrap();

    let snapshot = api.snapshot().await.unwrap();
    assert_eq!(snapshot["one.txt"], Bytes::from("shared"));
    assert_eq!(snapshot["two/two.txt"], Bytes::from("shared"));
}

#[rstest]
#[tokio::test]
async fn last_upload_of_a_path_wins(#[future] site: MemoryApi) {
    let api = site.await;

    TreeSync::new(&api)
        .commit_files(
            vec![
                Upload::content("README.md", "first"),
                Upload::content("/README.md", "second"),
            ],
            "Rewrite readme",
        )
        .await
        .unwrap();

    assert_eq!(api.snapshot().await.unwrap()["README.md"], Bytes::from("second"));
}
