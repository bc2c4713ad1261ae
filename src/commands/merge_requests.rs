//! Merge request commands.

use super::git::report_switch;
use super::print_json;
use crate::app::AppContext;
use crate::error::AppError;
use crate::models::{MergeRequest, MergeRequestDetails, MergeRequestStateFilter};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One list line: reference, state, branches and title.
pub fn format_list_line(mr: &MergeRequest) -> String {
    format!(
        "{:<6} {:<7} {} → {}  {} (@{})",
        mr.reference(),
        mr.state.to_string(),
        mr.source_branch,
        mr.target_branch,
        mr.title,
        mr.author.username
    )
}

/// Full detail text for one merge request.
pub fn format_details(details: &MergeRequestDetails) -> String {
    let mr = &details.merge_request;
    let mut lines = vec![
        format!("{} {}", mr.reference(), mr.title),
        format!("State:    {}", mr.state),
        format!("Author:   {} (@{})", mr.author.name, mr.author.username),
        format!("Branches: {} → {}", mr.source_branch, mr.target_branch),
        format!("Created:  {}", mr.created_at.format(DATE_FORMAT)),
        format!("Updated:  {}", mr.updated_at.format(DATE_FORMAT)),
    ];

    if let Some(merged_at) = mr.merged_at {
        lines.push(format!("Merged:   {}", merged_at.format(DATE_FORMAT)));
    }
    if !mr.labels.is_empty() {
        let labels: Vec<&str> = mr.labels.iter().map(String::as_str).collect();
        lines.push(format!("Labels:   {}", labels.join(", ")));
    }
    if !mr.assignees.is_empty() {
        let assignees: Vec<String> = mr
            .assignees
            .iter()
            .map(|a| format!("@{}", a.username))
            .collect();
        lines.push(format!("Assigned: {}", assignees.join(", ")));
    }
    lines.push(mr.web_url.clone());

    if let Some(description) = mr.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(String::new());
        lines.push(description.trim_end().to_string());
    }

    if let Some(approvals) = &details.approvals {
        lines.push(String::new());
        let approvers: Vec<&str> = approvals
            .approved_by
            .iter()
            .map(|a| a.username.as_str())
            .collect();
        if approvals.approved {
            lines.push(format!("Approved by: {}", approvers.join(", ")));
        } else {
            lines.push(format!(
                "Approvals: {} of {} required ({} left)",
                approvers.len(),
                approvals.approvals_required,
                approvals.approvals_left
            ));
        }
    }

    if let Some(commits) = &details.commits {
        lines.push(String::new());
        lines.push(format!("Commits ({}):", commits.len()));
        for commit in commits {
            lines.push(format!(
                "  {} {} ({})",
                commit.short_id, commit.title, commit.author_name
            ));
        }
    }

    lines.join("\n")
}

pub async fn list(
    ctx: &AppContext,
    state: MergeRequestStateFilter,
    search: Option<&str>,
    json: bool,
) -> Result<bool, AppError> {
    let mrs = match search.map(str::trim).filter(|q| !q.is_empty()) {
        Some(query) => ctx.remote().search_merge_requests(query).await?,
        None => ctx.remote().get_merge_requests(state).await?,
    };

    if json {
        print_json(&mrs)?;
    } else if mrs.is_empty() {
        println!("No merge requests found");
    } else {
        for mr in &mrs {
            println!("{}", format_list_line(mr));
        }
    }
    Ok(true)
}

pub async fn show(ctx: &AppContext, iid: i64, json: bool) -> Result<bool, AppError> {
    let Some(details) = ctx.remote().get_merge_request_details(iid).await? else {
        return Ok(false);
    };

    if json {
        print_json(&details)?;
    } else {
        println!("{}", format_details(&details));
    }
    Ok(true)
}

/// Fetch the merge request's source branch and switch to it.
///
/// The switch goes through the branch switch coordinator, so uncommitted
/// changes are handled the same way as for `switch-branch`.
pub async fn checkout(ctx: &AppContext, iid: i64) -> Result<bool, AppError> {
    let Some(mr) = ctx.remote().get_merge_request(iid).await? else {
        return Ok(false);
    };

    if !ctx.remote().fetch_merge_request_branch(&mr, ctx.workdir()).await {
        ctx.refresh_status().await;
        return Ok(false);
    }

    let outcome = ctx.coordinator().switch_to(&mr.source_branch).await;
    Ok(report_switch(ctx, &mr.source_branch, outcome))
}

pub async fn merge(
    ctx: &AppContext,
    iid: i64,
    message: Option<&str>,
    squash: bool,
) -> Result<bool, AppError> {
    ctx.remote()
        .merge_merge_request(iid, message, squash.then_some(true))
        .await
}

pub async fn create(
    ctx: &AppContext,
    source: &str,
    target: &str,
    title: &str,
    description: &str,
) -> Result<bool, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::invalid_input_field("Title must not be empty", "title"));
    }

    match ctx
        .remote()
        .create_merge_request(source, target, title.trim(), description)
        .await?
    {
        Some(mr) => {
            println!("{}", mr.web_url);
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalSummary, Approver, MergeRequestCommit};

    fn merge_request() -> MergeRequest {
        serde_json::from_value(serde_json::json!({
            "iid": 7,
            "title": "Weekly review",
            "description": "Notes for week 12",
            "state": "opened",
            "author": {"name": "Sam Doe", "username": "sam"},
            "source_branch": "weekly-review",
            "target_branch": "main",
            "created_at": "2024-03-18T09:30:00Z",
            "updated_at": "2024-03-19T10:00:00.000Z",
            "web_url": "https://gitlab.com/group/notes/-/merge_requests/7",
            "labels": ["notes"]
        }))
        .unwrap()
    }

    fn details_time() -> chrono::DateTime<chrono::Utc> {
        "2024-03-18T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_format_list_line() {
        assert_eq!(
            format_list_line(&merge_request()),
            "!7     opened  weekly-review → main  Weekly review (@sam)"
        );
    }

    #[test]
    fn test_format_details() {
        let details = MergeRequestDetails {
            merge_request: merge_request(),
            commits: Some(vec![MergeRequestCommit {
                id: "0123456789abcdef".into(),
                short_id: "0123456".into(),
                title: "Add week 12".into(),
                author_name: "Sam Doe".into(),
                created_at: details_time(),
                message: "Add week 12\n".into(),
            }]),
            approvals: Some(ApprovalSummary {
                approved: false,
                approved_by: vec![Approver {
                    name: "Kim".into(),
                    username: "kim".into(),
                }],
                approvals_required: 2,
                approvals_left: 1,
            }),
        };

        let text = format_details(&details);
        assert!(text.starts_with("!7 Weekly review\n"));
        assert!(text.contains("Created:  2024-03-18 09:30"));
        assert!(text.contains("Labels:   notes"));
        assert!(text.contains("Approvals: 1 of 2 required (1 left)"));
        assert!(text.contains("  0123456 Add week 12 (Sam Doe)"));
    }

    #[test]
    fn test_format_details_without_optional_sections() {
        let details = MergeRequestDetails {
            merge_request: merge_request(),
            commits: None,
            approvals: None,
        };

        let text = format_details(&details);
        assert!(!text.contains("Approv"));
        assert!(!text.contains("Commits"));
    }
}
