//! REST backend for GitHub and local Git proxies
//!
//! Both flavors share one route table; they only differ in where the
//! repository lives:
//!
//! - GitHub: `{api_root}/repos/{owner}/{name}/...`
//! - Local proxy: `{api_root}/...`
//!
//! ## Routes
//!
//! | operation     | request                                   |
//! |---------------|-------------------------------------------|
//! | read_file     | `GET contents/{path}?ref={branch}` (raw)  |
//! | list_files    | `GET contents/{path}?ref={branch}`        |
//! | upload_blob   | `POST git/blobs`                          |
//! | read_tree     | `GET git/trees/{sha}`                     |
//! | create_tree   | `POST git/trees`                          |
//! | read_commit   | `GET git/commits/{sha}`                   |
//! | create_commit | `POST git/commits`                        |
//! | branch_head   | `GET git/refs/heads/{branch}`             |
//! | update_ref    | `PATCH git/refs/heads/{branch}`           |
//! | delete_file   | `DELETE contents/{path}`                  |

use crate::areas::backend::{ApiError, ApiResult, FileInfo, GitApi, User, normalize_path};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeEntry};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const GITHUB_API_ROOT: &str = "https://api.github.com";
pub const LOCAL_API_ROOT: &str = "http://localhost:8081/api";

const RAW_MEDIA_TYPE: &str = "application/vnd.github.VERSION.raw";
const USER_AGENT: &str = concat!("folio/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flavor {
    /// `repo` is `owner/name`
    GitHub { repo: String },
    Local,
}

#[derive(Debug, Clone)]
pub struct HttpGitApi {
    client: Client,
    flavor: Flavor,
    api_root: String,
    branch: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShaResponse {
    sha: ObjectId,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaResponse,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: ObjectId,
    tree: ShaResponse,
    #[serde(default)]
    parents: Vec<ShaResponse>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryResponse {
    #[serde(default)]
    permissions: Option<Permissions>,
}

#[derive(Debug, Deserialize)]
struct Permissions {
    #[serde(default)]
    push: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct CreateBlob<'b> {
    content: String,
    encoding: &'b str,
}

#[derive(Debug, Serialize)]
struct CreateTree {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Serialize)]
struct CreateCommit<'c> {
    message: &'c str,
    tree: &'c ObjectId,
    parents: Vec<ObjectId>,
}

#[derive(Debug, Serialize)]
struct UpdateRef<'r> {
    sha: &'r ObjectId,
    force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteFile<'d> {
    message: &'d str,
    sha: &'d ObjectId,
    branch: &'d str,
}

impl HttpGitApi {
    pub fn new(
        flavor: Flavor,
        api_root: String,
        branch: String,
        token: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(HttpGitApi {
            client,
            flavor,
            api_root: api_root.trim_end_matches('/').to_string(),
            branch,
            token,
        })
    }

    /// Root URL of the repository routes
    pub fn repo_url(&self) -> String {
        match &self.flavor {
            Flavor::GitHub { repo } => format!("{}/repos/{}", self.api_root, repo),
            Flavor::Local => self.api_root.clone(),
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.repo_url(), route.trim_start_matches('/'))
    }

    fn contents_url(&self, path: &str) -> ApiResult<String> {
        Ok(self.url(&format!("contents/{}", normalize_path(path)?)))
    }

    fn ref_url(&self) -> String {
        self.url(&format!("git/refs/heads/{}", self.branch))
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!(%method, %url, "git api request");

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, format!("token {token}")),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> ApiResult<T> {
        let response = check_status(builder.send().await?, what).await?;

        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(format!("{what}: {err}")))
    }
}

/// Map a non-success response onto the error taxonomy.
pub fn classify_status(status: StatusCode, message: String, what: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::AuthenticationFailed(message),
        StatusCode::FORBIDDEN => ApiError::AuthorizationFailed(message),
        StatusCode::NOT_FOUND => ApiError::NotFound(what.to_string()),
        StatusCode::CONFLICT => ApiError::Conflict(message),
        status => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// A missing directory lists as empty.
fn empty_when_missing(listing: ApiResult<Vec<FileInfo>>) -> ApiResult<Vec<FileInfo>> {
    match listing {
        Err(ApiError::NotFound(_)) => Ok(Vec::new()),
        listing => listing,
    }
}

/// `user` may commit to `repo` only with push permission on it.
fn check_push_access(user: User, repo: &str, repository: RepositoryResponse) -> ApiResult<User> {
    if repository
        .permissions
        .is_some_and(|permissions| permissions.push)
    {
        return Ok(user);
    }

    Err(ApiError::AuthorizationFailed(format!(
        "{} has no write access to {}",
        user.login, repo
    )))
}

async fn check_status(response: Response, what: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|error| error.message)
        .unwrap_or(body);

    Err(classify_status(status, message, what))
}

#[async_trait]
impl GitApi for HttpGitApi {
    async fn read_file(&self, path: &str) -> ApiResult<Bytes> {
        let request = self
            .request(Method::GET, self.contents_url(path)?)
            .query(&[("ref", self.branch.as_str())])
            .header(reqwest::header::ACCEPT, RAW_MEDIA_TYPE);
        let response = check_status(request.send().await?, path).await?;

        Ok(response.bytes().await?)
    }

    async fn list_files(&self, path: &str) -> ApiResult<Vec<FileInfo>> {
        let request = self
            .request(Method::GET, self.contents_url(path)?)
            .query(&[("ref", self.branch.as_str())]);

        empty_when_missing(self.send_json::<Vec<FileInfo>>(request, path).await)
    }

    async fn upload_blob(&self, content: Bytes) -> ApiResult<ObjectId> {
        let body = CreateBlob {
            content: BASE64.encode(&content),
            encoding: "base64",
        };
        let request = self.request(Method::POST, self.url("git/blobs")).json(&body);

        Ok(self.send_json::<ShaResponse>(request, "blob").await?.sha)
    }

    async fn read_tree(&self, sha: &ObjectId) -> ApiResult<Tree> {
        let request = self.request(Method::GET, self.url(&format!("git/trees/{sha}")));

        self.send_json(request, &format!("tree {sha}")).await
    }

    async fn create_tree(&self, entries: Vec<TreeEntry>) -> ApiResult<ObjectId> {
        let request = self
            .request(Method::POST, self.url("git/trees"))
            .json(&CreateTree { tree: entries });

        Ok(self.send_json::<ShaResponse>(request, "tree").await?.sha)
    }

    async fn read_commit(&self, sha: &ObjectId) -> ApiResult<Commit> {
        let request = self.request(Method::GET, self.url(&format!("git/commits/{sha}")));
        let commit = self
            .send_json::<CommitResponse>(request, &format!("commit {sha}"))
            .await?;

        Ok(Commit {
            sha: commit.sha,
            tree: commit.tree.sha,
            parents: commit.parents.into_iter().map(|parent| parent.sha).collect(),
            message: commit.message,
        })
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &ObjectId,
        parents: Vec<ObjectId>,
    ) -> ApiResult<ObjectId> {
        let body = CreateCommit {
            message,
            tree,
            parents,
        };
        let request = self.request(Method::POST, self.url("git/commits")).json(&body);

        Ok(self.send_json::<ShaResponse>(request, "commit").await?.sha)
    }

    async fn branch_head(&self) -> ApiResult<ObjectId> {
        let request = self.request(Method::GET, self.ref_url());
        let what = format!("branch {}", self.branch);

        Ok(self.send_json::<RefResponse>(request, &what).await?.object.sha)
    }

    async fn update_ref(&self, commit: &ObjectId) -> ApiResult<()> {
        let body = UpdateRef {
            sha: commit,
            force: true,
        };
        let request = self.request(Method::PATCH, self.ref_url()).json(&body);
        let what = format!("branch {}", self.branch);
        check_status(request.send().await?, &what).await?;

        info!(branch = %self.branch, %commit, "updated branch ref");
        Ok(())
    }

    async fn delete_file(&self, path: &str, sha: &ObjectId, message: &str) -> ApiResult<()> {
        let body = DeleteFile {
            message,
            sha,
            branch: &self.branch,
        };
        let request = self
            .request(Method::DELETE, self.contents_url(path)?)
            .json(&body);
        check_status(request.send().await?, path).await?;

        info!(%path, "deleted file");
        Ok(())
    }

    async fn authorize(&self) -> ApiResult<User> {
        if self.token.is_none() {
            return Err(ApiError::AuthenticationFailed(
                "no access token available".to_string(),
            ));
        }

        let request = self.request(Method::GET, format!("{}/user", self.api_root));
        let user = self.send_json::<User>(request, "user").await?;

        if let Flavor::GitHub { repo } = &self.flavor {
            let request = self.request(Method::GET, self.repo_url());
            let repository = self.send_json::<RepositoryResponse>(request, repo).await?;

            return check_push_access(user, repo, repository);
        }

        Ok(user)
    }
}
