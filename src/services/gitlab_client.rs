//! GitLab API client.
//!
//! Provides HTTP client for GitLab API v4 with authentication and pagination.
//! Project-scoped endpoints accept either a numeric ID or a `group/project`
//! path.

use crate::error::AppError;
use crate::models::{ApprovalSummary, Approver, MergeRequest, MergeRequestCommit};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// GitLab API client configuration.
#[derive(Debug, Clone)]
pub struct GitLabClientConfig {
    /// Base URL of the GitLab instance (e.g., `https://gitlab.com`).
    pub base_url: String,

    /// Personal access token for authentication.
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitLabClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// GitLab API client.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: Client,
    config: GitLabClientConfig,
}

/// Query parameters for listing a project's merge requests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeRequestsQuery {
    /// Filter by state: `opened`, `merged`, `closed`. Omitted for all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Filter by scope: `created_by_me`, `assigned_to_me`, `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Search title and description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Return label names only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_labels_details: Option<bool>,
}

/// Body of `POST /projects/:id/merge_requests`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateMergeRequestBody<'a> {
    pub source_branch: &'a str,
    pub target_branch: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

/// Body of `PUT /projects/:id/merge_requests/:iid/merge`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptMergeRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash: Option<bool>,
}

/// GitLab user from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabUser {
    pub username: String,
    pub name: String,
}

/// Response from the MR approvals endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestApprovals {
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub approvals_required: u32,
    #[serde(default)]
    pub approvals_left: u32,
    #[serde(default)]
    pub approved_by: Vec<ApprovedBy>,
}

/// User who approved an MR.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovedBy {
    pub user: GitLabUser,
}

impl From<MergeRequestApprovals> for ApprovalSummary {
    fn from(approvals: MergeRequestApprovals) -> Self {
        Self {
            approved: approvals.approved,
            approved_by: approvals
                .approved_by
                .into_iter()
                .map(|a| Approver {
                    name: a.user.name,
                    username: a.user.username,
                })
                .collect(),
            approvals_required: approvals.approvals_required,
            approvals_left: approvals.approvals_left,
        }
    }
}

impl GitLabClient {
    /// Create a new GitLab client.
    pub fn new(config: GitLabClientConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();

        // Add the private token header for authentication
        let token_value = header::HeaderValue::from_str(config.token.trim())
            .map_err(|_| AppError::configuration("Invalid token format"))?;
        headers.insert("PRIVATE-TOKEN", token_value);

        // Build the HTTP client
        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL for API requests.
    fn api_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4{}",
            self.config.base_url.trim_end_matches('/'),
            path
        )
    }

    /// Path prefix for a project, percent-encoding `group/project` paths.
    fn project_path(project_id: &str) -> String {
        format!("/projects/{}", urlencoding::encode(project_id.trim()))
    }

    /// Next page number from the `x-next-page` header. GitLab sends it
    /// empty on the last page.
    fn next_page(response: &Response) -> Option<u32> {
        response
            .headers()
            .get("x-next-page")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }

    /// Handle API response errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            // 401 Unauthorized - token is expired or revoked
            Err(AppError::authentication_expired(
                "GitLab token expired or revoked. Please update your access token.",
            ))
        } else if status == StatusCode::NOT_FOUND {
            Err(AppError::not_found_with_id("GitLab resource", endpoint))
        } else {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = match (status, error_message(&body)) {
                (StatusCode::FORBIDDEN, _) => "Access denied".to_string(),
                (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
                (_, Some(msg)) => msg,
                _ => format!("Request failed ({}): {}", status_code, body),
            };

            Err(AppError::gitlab_api_full(message, status_code, endpoint))
        }
    }

    /// Fetch all pages of a paginated endpoint.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Option<&impl Serialize>,
    ) -> Result<Vec<T>, AppError> {
        let mut all_data = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.api_url(endpoint);
            let mut request = self.client.get(&url);

            // Add original query params
            if let Some(q) = query {
                request = request.query(q);
            }

            // Add pagination params
            request = request.query(&[("page", page.to_string()), ("per_page", "100".to_string())]);

            let response = request.send().await?;
            let next_page = Self::next_page(&response);
            let data = self.handle_response::<Vec<T>>(response, endpoint).await?;

            all_data.extend(data);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(all_data)
    }

    /// List a project's merge requests across all pages.
    pub async fn list_merge_requests(
        &self,
        project_id: &str,
        query: &MergeRequestsQuery,
    ) -> Result<Vec<MergeRequest>, AppError> {
        let endpoint = format!("{}/merge_requests", Self::project_path(project_id));
        self.get_all_pages(&endpoint, Some(query)).await
    }

    /// Get a single merge request by project and IID.
    pub async fn get_merge_request(
        &self,
        project_id: &str,
        mr_iid: i64,
    ) -> Result<MergeRequest, AppError> {
        let endpoint = format!("{}/merge_requests/{}", Self::project_path(project_id), mr_iid);
        let url = self.api_url(&endpoint);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response, &endpoint).await
    }

    /// List the commits of a merge request.
    pub async fn list_merge_request_commits(
        &self,
        project_id: &str,
        mr_iid: i64,
    ) -> Result<Vec<MergeRequestCommit>, AppError> {
        let endpoint = format!(
            "{}/merge_requests/{}/commits",
            Self::project_path(project_id),
            mr_iid
        );
        self.get_all_pages(&endpoint, None::<&()>).await
    }

    /// Get approval status for a merge request.
    pub async fn get_mr_approvals(
        &self,
        project_id: &str,
        mr_iid: i64,
    ) -> Result<MergeRequestApprovals, AppError> {
        let endpoint = format!(
            "{}/merge_requests/{}/approvals",
            Self::project_path(project_id),
            mr_iid
        );
        let url = self.api_url(&endpoint);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response, &endpoint).await
    }

    /// Create a merge request.
    pub async fn create_merge_request(
        &self,
        project_id: &str,
        body: &CreateMergeRequestBody<'_>,
    ) -> Result<MergeRequest, AppError> {
        let endpoint = format!("{}/merge_requests", Self::project_path(project_id));
        let url = self.api_url(&endpoint);
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response, &endpoint).await
    }

    /// Merge a merge request.
    pub async fn merge_merge_request(
        &self,
        project_id: &str,
        mr_iid: i64,
        body: &AcceptMergeRequestBody<'_>,
    ) -> Result<(), AppError> {
        let endpoint = format!(
            "{}/merge_requests/{}/merge",
            Self::project_path(project_id),
            mr_iid
        );
        let url = self.api_url(&endpoint);
        let response = self.client.put(&url).json(body).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            // Read the body for a more descriptive error
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| match status.as_u16() {
                401 => "Not authorized to merge".into(),
                405 => "MR cannot be merged (check conflicts or pipeline)".into(),
                406 => "Branch cannot be merged".into(),
                409 => "SHA mismatch, the MR has been updated".into(),
                _ => format!("Merge failed ({})", status),
            });

            Err(AppError::gitlab_api_full(message, status.as_u16(), &endpoint))
        }
    }
}

/// Extract GitLab's error text from a response body.
///
/// GitLab returns errors as `{"message": "..."}` or `{"error": "..."}`, and
/// sometimes `message` is an object like `{"base": ["msg"]}`.
fn error_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let message = value.get("message").or_else(|| value.get("error"))?;
    Some(match message.as_str() {
        Some(s) => s.to_string(),
        None => message.to_string(),
    })
}
