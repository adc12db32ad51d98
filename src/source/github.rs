use crate::config::Config;
use crate::core::{AuditError, AuditResult, CredentialStore};
use crate::http::{build_client, send_with_retry};
use crate::source::{EntryType, RepositoryRef, RepositorySource, Tree, TreeEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Keychain entry holding the GitHub token
pub const TOKEN_CREDENTIAL_KEY: &str = "github_token";

const GITHUB_JSON: &str = "application/vnd.github+json";
const GITHUB_RAW: &str = "application/vnd.github.v3.raw";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;

const LIST_REPOSITORIES_QUERY: &str = r#"
query($org: String!, $first: Int!, $after: String) {
  organization(login: $org) {
    repositories(first: $first, after: $after) {
      nodes {
        nameWithOwner
        archivedAt
        defaultBranchRef { name }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

/// Find a GitHub token: `GITHUB_TOKEN`, then `GH_TOKEN`, then the keychain
pub fn resolve_token() -> Option<String> {
    ["GITHUB_TOKEN", "GH_TOKEN"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .or_else(|| CredentialStore::retrieve(TOKEN_CREDENTIAL_KEY).ok())
}

/// GitHub REST + GraphQL client
pub struct GitHubSource {
    client: Client,
    api_url: String,
    token: String,
    repository_limit: usize,
    max_retries: u32,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: ListVariables<'a>,
}

#[derive(Serialize)]
struct ListVariables<'a> {
    org: &'a str,
    first: usize,
    after: Option<String>,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct OrganizationData {
    organization: Option<Organization>,
}

#[derive(Debug, Deserialize)]
struct Organization {
    repositories: RepositoryConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryConnection {
    nodes: Vec<RepositoryNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name_with_owner: String,
    archived_at: Option<DateTime<Utc>>,
    default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeNode>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeNode {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl RepositoryNode {
    fn into_ref(self) -> RepositoryRef {
        RepositoryRef {
            full_name: self.name_with_owner,
            default_branch: self.default_branch_ref.map(|b| b.name),
            archived_at: self.archived_at,
        }
    }
}

impl TreeResponse {
    fn into_tree(self) -> Tree {
        Tree {
            entries: self
                .tree
                .into_iter()
                .map(|node| TreeEntry::new(node.path, EntryType::from_api(&node.kind)))
                .collect(),
            truncated: self.truncated,
        }
    }
}

impl GitHubSource {
    /// Create a client with the token from [`resolve_token`]
    pub fn new(config: &Config) -> AuditResult<Self> {
        let token = resolve_token().ok_or_else(|| {
            AuditError::NotAuthenticated("no GitHub token found".to_string())
        })?;
        Self::with_token(config, token)
    }

    pub fn with_token(config: &Config, token: impl Into<String>) -> AuditResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            api_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: token.into(),
            repository_limit: config.repository_limit,
            max_retries: config.max_retries,
        })
    }

    fn graphql_url(&self) -> String {
        // GitHub Enterprise serves REST at /api/v3 and GraphQL at /api/graphql
        match self.api_url.strip_suffix("/api/v3") {
            Some(base) => format!("{}/api/graphql", base),
            None => format!("{}/graphql", self.api_url),
        }
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> AuditResult<Response> {
        let response = send_with_retry(self.authed(request), self.max_retries).await?;
        match status_error(response.status(), what) {
            Some(err) => Err(err),
            None => Ok(response),
        }
    }

    async fn list_page(
        &self,
        org: &str,
        first: usize,
        after: Option<String>,
    ) -> AuditResult<RepositoryConnection> {
        let body = GraphQlRequest {
            query: LIST_REPOSITORIES_QUERY,
            variables: ListVariables { org, first, after },
        };
        let what = format!("repositories of organization '{}'", org);
        let response = self
            .send(self.client.post(self.graphql_url()).json(&body), &what)
            .await?;

        let parsed: GraphQlResponse<OrganizationData> = response.json().await?;
        organization_from_response(parsed, org)
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    async fn verify_access(&self) -> AuditResult<()> {
        let url = format!("{}/user", self.api_url);
        self.send(self.client.get(url).header(ACCEPT, GITHUB_JSON), "the authenticated user")
            .await
            .map(|_| ())
    }

    async fn list_repositories(&self, org: &str) -> AuditResult<Vec<RepositoryRef>> {
        let mut repositories = Vec::new();
        let mut after = None;

        while repositories.len() < self.repository_limit {
            let first = PAGE_SIZE.min(self.repository_limit - repositories.len());
            let page = self.list_page(org, first, after).await?;
            debug!(org, count = page.nodes.len(), "listed repository page");

            repositories.extend(page.nodes.into_iter().map(RepositoryNode::into_ref));

            match (page.page_info.has_next_page, page.page_info.end_cursor) {
                (true, Some(cursor)) => after = Some(cursor),
                _ => break,
            }
        }

        repositories.truncate(self.repository_limit);
        Ok(repositories)
    }

    async fn get_tree(&self, repo: &str, git_ref: &str) -> AuditResult<Tree> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_url,
            repo,
            urlencoding::encode(git_ref)
        );
        let what = format!("tree of {}@{}", repo, git_ref);
        let response = self
            .send(self.client.get(url).header(ACCEPT, GITHUB_JSON), &what)
            .await?;

        let tree: TreeResponse = response.json().await?;
        Ok(tree.into_tree())
    }

    async fn get_raw_content(&self, repo: &str, path: &str, git_ref: &str) -> AuditResult<Vec<u8>> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.api_url,
            repo,
            encode_path(path),
            urlencoding::encode(git_ref)
        );
        let what = format!("{}/{}@{}", repo, path, git_ref);
        let response = self
            .send(self.client.get(url).header(ACCEPT, GITHUB_RAW), &what)
            .await?;

        Ok(response.bytes().await?.to_vec())
    }
}

/// Map a non-success status to the error taxonomy the collector branches on
fn status_error(status: StatusCode, what: &str) -> Option<AuditError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED => {
            AuditError::NotAuthenticated(format!("GitHub rejected the token while fetching {}", what))
        }
        StatusCode::NOT_FOUND => AuditError::NotFound(what.to_string()),
        _ => AuditError::Source(format!("Failed to fetch {}: HTTP {}", what, status)),
    })
}

fn organization_from_response(
    response: GraphQlResponse<OrganizationData>,
    org: &str,
) -> AuditResult<RepositoryConnection> {
    if response
        .errors
        .iter()
        .any(|e| e.kind.as_deref() == Some("NOT_FOUND"))
    {
        return Err(AuditError::NotFound(format!("organization '{}'", org)));
    }
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(AuditError::Source(messages.join("; ")));
    }

    response
        .data
        .and_then(|data| data.organization)
        .map(|organization| organization.repositories)
        .ok_or_else(|| AuditError::NotFound(format!("organization '{}'", org)))
}

/// Percent-encode each segment of a repository path, keeping the slashes
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
