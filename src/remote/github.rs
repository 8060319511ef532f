//! GitHub contents API implementation of the remote store.
//!
//! Files live in a (usually private) repository under the configured
//! account; the contents API's blob SHA doubles as the version token for
//! optimistic-concurrency writes.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::RemoteConfig;
use crate::error::{Error, RemoteError, Result};
use crate::remote::RemoteFileStore;
use crate::types::{RepositoryId, VersionToken};

/// Remote store backed by the GitHub contents API
pub struct GithubContentStore {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repository: String,
    token: Option<String>,
    author_name: String,
    author_email: String,
}

#[derive(Debug, Deserialize)]
struct ContentMeta {
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: Option<ContentMeta>,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    id: i64,
}

#[derive(Debug, Serialize)]
struct CommitAuthor<'a> {
    name: &'a str,
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct WritePayload<'a> {
    message: &'a str,
    content: String,
    author: CommitAuthor<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct CreateRepoPayload<'a> {
    name: &'a str,
    private: bool,
    auto_init: bool,
}

impl GithubContentStore {
    /// Create a store from remote configuration.
    ///
    /// Construction succeeds even without credentials so callers can probe
    /// readiness via [`RemoteFileStore::is_ready`]; requests made while
    /// unconfigured fail with [`RemoteError::Credentials`].
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| Error::Config {
                message: format!("invalid API base URL: {}", e),
                key: Some("remote.api_base_url".to_string()),
            })?
            .to_string();

        let client = reqwest::Client::builder()
            .user_agent("pulselog")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repository: config.repository.clone(),
            token: config.token.clone(),
            author_name: config.author_name.clone(),
            author_email: config.author_email.clone(),
        })
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        if self.owner.is_empty() {
            return Err(RemoteError::Credentials("no account configured".to_string()).into());
        }
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| RemoteError::Credentials("no access token configured".to_string()))?;
        Ok((self.owner.as_str(), token))
    }

    fn contents_url(&self, path: &str) -> String {
        // Encode per segment so the directory separators survive
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            self.owner,
            self.repository,
            encoded.join("/")
        )
    }

    async fn create_repository(&self) -> Result<RepositoryId> {
        let (user, token) = self.credentials()?;
        let url = format!("{}/user/repos", self.base_url);

        let response = self
            .client
            .post(&url)
            .basic_auth(user, Some(token))
            .header("Cache-Control", "no-cache")
            .json(&CreateRepoPayload {
                name: &self.repository,
                private: true,
                auto_init: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Repository(format!(
                "create returned status {}",
                status.as_u16()
            ))
            .into());
        }

        let repo: RepoResponse = response.json().await?;
        tracing::info!(repository_id = repo.id, "Created export repository");
        Ok(RepositoryId(repo.id))
    }
}

#[async_trait]
impl RemoteFileStore for GithubContentStore {
    fn is_ready(&self) -> bool {
        self.credentials().is_ok()
    }

    async fn ensure_repository(&self) -> Result<RepositoryId> {
        let (user, token) = self.credentials()?;
        let url = format!("{}/repos/{}/{}", self.base_url, self.owner, self.repository);

        let response = self
            .client
            .get(&url)
            .basic_auth(user, Some(token))
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return self.create_repository().await;
        }
        if !status.is_success() {
            return Err(RemoteError::Repository(format!(
                "lookup returned status {}",
                status.as_u16()
            ))
            .into());
        }

        let repo: RepoResponse = response.json().await?;
        tracing::debug!(repository_id = repo.id, "Export repository resolved");
        Ok(RepositoryId(repo.id))
    }

    async fn read_version(&self, path: &str) -> Result<Option<VersionToken>> {
        let (user, token) = self.credentials()?;
        let url = self.contents_url(path);

        let response = self
            .client
            .get(&url)
            .basic_auth(user, Some(token))
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // Not an error: the file simply does not exist yet
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            }
            .into());
        }

        let meta: ContentMeta = response.json().await?;
        Ok(meta.sha.map(VersionToken))
    }

    async fn write_file(
        &self,
        path: &str,
        content: &str,
        version: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken> {
        let (user, token) = self.credentials()?;
        let url = self.contents_url(path);

        let payload = WritePayload {
            message,
            content: BASE64.encode(content.as_bytes()),
            author: CommitAuthor {
                name: &self.author_name,
                email: &self.author_email,
            },
            sha: version.map(VersionToken::as_str),
        };

        let response = self
            .client
            .put(&url)
            .basic_auth(user, Some(token))
            .header("Cache-Control", "no-cache")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            }
            .into());
        }

        let body: WriteResponse = response.json().await?;
        let sha = body
            .content
            .and_then(|content| content.sha)
            .ok_or_else(|| RemoteError::InvalidResponse {
                path: path.to_string(),
                reason: "missing content sha".to_string(),
            })?;

        tracing::debug!(path = %path, version = %sha, "Remote file updated");
        Ok(VersionToken(sha))
    }
}
