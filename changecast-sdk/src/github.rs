//! GitHub REST client: commit listing and release creation.

use async_trait::async_trait;
use changecast_core::config::GITHUB_API_URL;
use changecast_core::source::validate_days;
use changecast_core::{ChangelogDocument, Commit, CommitSource, Config, Error, RepoRef, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const SERVICE: &str = "GitHub";
const USER_AGENT: &str = concat!("changecast/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

#[derive(Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Deserialize)]
struct ApiCommitDetail {
    message: String,
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
}

#[derive(Deserialize)]
struct ApiSignature {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    html_url: String,
}

impl From<ApiCommit> for Commit {
    fn from(api: ApiCommit) -> Self {
        let ApiCommitDetail {
            message,
            author,
            committer,
        } = api.commit;

        let name = author
            .as_ref()
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let timestamp = author
            .and_then(|a| a.date)
            .or_else(|| committer.and_then(|c| c.date))
            .unwrap_or_default();

        Commit::new(api.sha, message, name, timestamp)
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: GITHUB_API_URL.to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.github_token.clone())?.with_base_url(&config.github_api_url))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Commits authored in the last `days` days, newest first.
    pub async fn fetch_commits(&self, repo: &RepoRef, days: u32) -> Result<Vec<Commit>> {
        let days = validate_days(days)?;
        let since = Utc::now()
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(Error::InvalidDays(days))?;
        self.list_commits(repo, Some(since)).await
    }

    /// The most recent page of commits, with no date filter.
    pub async fn fetch_recent_commits(&self, repo: &RepoRef) -> Result<Vec<Commit>> {
        self.list_commits(repo, None).await
    }

    async fn list_commits(
        &self,
        repo: &RepoRef,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Commit>> {
        let url = format!(
            "{}/repos/{}/{}/commits",
            self.base_url, repo.owner, repo.name
        );

        let mut query = vec![("per_page", PER_PAGE.to_string())];
        if let Some(since) = since {
            query.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }

        debug!("GET {} {:?} (authenticated: {})", url, query, self.has_token());

        let response = self
            .request(Method::GET, &url)
            .query(&query)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let commits: Vec<ApiCommit> = serde_json::from_str(&body)
            .map_err(|e| Error::Fetch(format!("malformed response body: {}", e)))?;

        info!("Fetched {} commits from {}", commits.len(), repo);
        Ok(commits.into_iter().map(Commit::from).collect())
    }

    /// Publishes the document as a GitHub release and returns its page URL.
    pub async fn create_release(
        &self,
        repo: &RepoRef,
        tag: &str,
        document: &ChangelogDocument,
    ) -> Result<String> {
        if self.token.is_none() {
            return Err(Error::MissingToken("create a release".to_string()));
        }

        let url = format!(
            "{}/repos/{}/{}/releases",
            self.base_url, repo.owner, repo.name
        );
        let request = CreateReleaseRequest {
            tag_name: tag,
            name: &document.title,
            body: &document.content,
            draft: false,
        };

        let response = self
            .request(Method::POST, &url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let release: ReleaseResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Publish(format!("unexpected release response: {}", e)))?;

        info!("Created release {} on {}", tag, repo);
        Ok(release.html_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/vnd.github+json");

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn commits_since(&self, repo: &RepoRef, days: u32) -> Result<Vec<Commit>> {
        self.fetch_commits(repo, days).await
    }

    async fn recent_commits(&self, repo: &RepoRef) -> Result<Vec<Commit>> {
        self.fetch_recent_commits(repo).await
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() || e.is_request() {
        Error::NoResponse {
            service: SERVICE.to_string(),
            message: e.to_string(),
        }
    } else {
        Error::Fetch(e.to_string())
    }
}

fn api_error(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());

    Error::Api {
        service: SERVICE.to_string(),
        status: status.as_u16(),
        message,
    }
}
