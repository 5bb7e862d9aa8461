//! forge::github
//!
//! GitHub ref store implementation using the REST and GraphQL APIs.
//!
//! # Design
//!
//! This module implements the `RefStore` trait for GitHub. It uses:
//! - REST `git/matching-refs` and `git/refs` endpoints for lookups and writes
//! - GraphQL `repository.refs` for the ordered, cursor-paginated namespace walk
//!   (REST has no server-side ordering)
//!
//! # Authentication
//!
//! A bearer token is sent with every request. The token is never logged and
//! is redacted from `Debug` output.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not retry; a failed run is recovered by running again
//!
//! # Example
//!
//! ```ignore
//! use reftagger::forge::github::GitHubRefStore;
//! use reftagger::forge::RefStore;
//! use reftagger::core::types::Namespace;
//!
//! let store = GitHubRefStore::new("ghp_xxx", "octocat", "hello-world");
//! let page = store.paged_refs(Namespace::Tags, None).await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ForgeError, MatchingRef, RefNode, RefPage, RefStore, PAGE_SIZE};
use crate::core::types::{Namespace, Oid, RefName};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "reftagger";

/// Walks a ref namespace in descending alphabetical order.
const REFS_QUERY: &str = r#"query($owner: String!, $name: String!, $refPrefix: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: $refPrefix, first: $first, after: $after, orderBy: {field: ALPHABETICAL, direction: DESC}) {
      nodes {
        name
        target { oid }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}"#;

/// GitHub ref store.
///
/// Implements the `RefStore` trait for one repository.
pub struct GitHubRefStore {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
    /// GraphQL endpoint (configurable for GitHub Enterprise)
    graphql_url: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubRefStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRefStore")
            .field("has_token", &!self.token.is_empty())
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .field("graphql_url", &self.graphql_url)
            .finish()
    }
}

impl GitHubRefStore {
    /// Create a store for `owner/repo` on github.com.
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::with_endpoints(token, owner, repo, DEFAULT_API_BASE, DEFAULT_GRAPHQL_URL)
    }

    /// Create a store with custom REST and GraphQL endpoints.
    ///
    /// Use this for GitHub Enterprise installations, e.g.
    /// `https://github.example.com/api/v3` and `https://github.example.com/api/graphql`.
    pub fn with_endpoints(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
        graphql_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            graphql_url: graphql_url.into(),
        }
    }

    /// Create a store from an `owner/repo` slug or a GitHub remote URL.
    ///
    /// Returns `None` if the repository cannot be parsed.
    pub fn from_repository(repository: &str, token: impl Into<String>) -> Option<Self> {
        let (owner, repo) = parse_repository(repository)?;
        Some(Self::new(token, owner, repo))
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Send a request, mapping transport and HTTP failures.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ForgeError> {
        let response = request
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Self::handle_error_response(response, status).await
        }
    }

    /// Decode a successful JSON response.
    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ForgeError> {
        let status = response.status();
        response.json().await.map_err(|e| ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("Failed to parse response: {}", e),
        })
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                ForgeError::AuthFailed(format!("Permission denied: {}", message))
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => {
                let lower = message.to_ascii_lowercase();
                if lower.contains("already exists") {
                    ForgeError::AlreadyExists(message)
                } else if lower.contains("does not exist") {
                    ForgeError::NotFound(message)
                } else {
                    ForgeError::ApiError {
                        status: status.as_u16(),
                        message,
                    }
                }
            }
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl RefStore for GitHubRefStore {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_matching_refs(&self, prefix: &RefName) -> Result<Vec<MatchingRef>, ForgeError> {
        let url = self.repo_url(&format!("git/matching-refs/{}", prefix));
        let response = self.send(self.client.get(&url)).await?;
        let refs: Vec<GitHubRef> = Self::decode(response).await?;
        Ok(refs.into_iter().map(Into::into).collect())
    }

    async fn create_ref(&self, name: &RefName, sha: &Oid) -> Result<(), ForgeError> {
        let url = self.repo_url("git/refs");
        let full = name.full();
        let body = CreateRefBody {
            ref_name: &full,
            sha: sha.as_str(),
        };
        let response = self.send(self.client.post(&url).json(&body)).await?;
        let created: GitHubRef = Self::decode(response).await?;
        debug!(ref_name = %created.ref_name, sha = %created.object.sha, "created ref");
        Ok(())
    }

    async fn update_ref(&self, name: &RefName, sha: &Oid, force: bool) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("git/refs/{}", name));
        let body = UpdateRefBody {
            sha: sha.as_str(),
            force,
        };
        let response = self.send(self.client.patch(&url).json(&body)).await?;
        let updated: GitHubRef = Self::decode(response).await?;
        debug!(ref_name = %updated.ref_name, sha = %updated.object.sha, "updated ref");
        Ok(())
    }

    async fn delete_ref(&self, name: &RefName) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("git/refs/{}", name));
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn paged_refs(
        &self,
        namespace: Namespace,
        cursor: Option<&str>,
    ) -> Result<RefPage, ForgeError> {
        let body = serde_json::json!({
            "query": REFS_QUERY,
            "variables": {
                "owner": self.owner,
                "name": self.repo,
                "refPrefix": namespace.full_prefix(),
                "first": PAGE_SIZE,
                "after": cursor,
            }
        });

        let response = self.send(self.client.post(&self.graphql_url).json(&body)).await?;
        let result: GraphQLResponse<RefsData> = Self::decode(response).await?;

        if let Some(errors) = result.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(ForgeError::GraphQl(first.message));
            }
        }

        let repository = result
            .data
            .and_then(|d| d.repository)
            .ok_or_else(|| ForgeError::NotFound(format!("repository {}/{}", self.owner, self.repo)))?;

        let refs = repository.refs;
        Ok(RefPage {
            refs: refs
                .nodes
                .into_iter()
                .filter_map(|node| {
                    node.target.map(|t| RefNode {
                        name: node.name,
                        target: t.oid,
                    })
                })
                .collect(),
            end_cursor: refs.page_info.end_cursor,
            has_next_page: refs.page_info.has_next_page,
        })
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

/// Request body for moving a ref.
#[derive(Serialize)]
struct UpdateRefBody<'a> {
    sha: &'a str,
    force: bool,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub git reference format.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubObject,
}

/// The object a git reference points at.
#[derive(Deserialize)]
struct GitHubObject {
    sha: Oid,
}

impl From<GitHubRef> for MatchingRef {
    fn from(gh: GitHubRef) -> Self {
        MatchingRef {
            ref_name: gh.ref_name,
            sha: gh.object.sha,
        }
    }
}

/// GraphQL response wrapper.
#[derive(Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

/// GraphQL error format.
#[derive(Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Deserialize)]
struct RefsData {
    repository: Option<GraphQlRepository>,
}

#[derive(Deserialize)]
struct GraphQlRepository {
    refs: GraphQlRefs,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRefs {
    nodes: Vec<GraphQlRefNode>,
    page_info: GraphQlPageInfo,
}

#[derive(Deserialize)]
struct GraphQlRefNode {
    name: String,
    target: Option<GraphQlTarget>,
}

#[derive(Deserialize)]
struct GraphQlTarget {
    oid: Oid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlPageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

// --------------------------------------------------------------------------
// Repository Parsing
// --------------------------------------------------------------------------

/// Parse a repository into owner and name.
///
/// Supports the `owner/repo` slug the runner exports as `GITHUB_REPOSITORY`
/// as well as SSH and HTTPS remote URLs:
/// - `owner/repo`
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
///
/// # Example
///
/// ```
/// use reftagger::forge::github::parse_repository;
///
/// let (owner, repo) = parse_repository("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_repository(repository: &str) -> Option<(String, String)> {
    let repository = repository.trim();
    let rest = repository
        .strip_prefix("git@github.com:")
        .or_else(|| repository.strip_prefix("https://github.com/"))
        .or_else(|| repository.strip_prefix("http://github.com/"))
        .unwrap_or(repository);
    if rest.contains("://") || rest.contains('@') {
        return None;
    }

    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
