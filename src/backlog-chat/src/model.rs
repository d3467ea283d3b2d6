//! Typed webhook events.
//!
//! Every Backlog webhook carries the same envelope (`id`, `type`, `created`,
//! `createdUser`, `project`) and a `content` object whose shape depends on
//! `type`. [`Content`] is the closed set of shapes this crate renders.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::error::{RenderError, RenderResult};
use crate::event_type::EventType;
use crate::normalize::de;
use crate::resolver::{Change, EnumContext, IssueStatus, Priority, RawChange, Resolution};

// ============================================================================
// Shared entities
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NulabAccount {
    pub nulab_id: String,
    pub name: String,
    pub unique_id: String,
}

/// The user who triggered the event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: i64,
    pub name: String,
    pub role_type: i64,
    #[serde(default)]
    pub nulab_account: Option<NulabAccount>,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub mail_address: Option<String>,
    #[serde(default, deserialize_with = "de::optional_id_string")]
    pub user_id: Option<String>,
}

/// A project member listed in join/leave events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub nulab_account: Option<NulabAccount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: i64,
    pub name: String,
    pub role_type: i64,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "de::optional_id_string")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub project_key: String,
    pub name: String,
    #[serde(default, deserialize_with = "de::string_bool")]
    pub archived: bool,
    #[serde(default, deserialize_with = "de::string_bool")]
    pub chart_enabled: bool,
    #[serde(default, deserialize_with = "de::string_bool")]
    pub subtasking_enabled: bool,
}

impl Project {
    /// `Name (KEY)`, used as the card title of project-wide events.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.project_key)
    }

    /// Issue key for a numeric issue ID within this project.
    pub fn issue_key(&self, key_id: impl std::fmt::Display) -> String {
        format!("{}-{}", self.project_key, key_id)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueType {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub color: Option<String>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(deserialize_with = "de::required_nullable")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub display_order: Option<i64>,
}

/// A milestone. Versions use the same shape, see [`Version`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub name: String,
    pub description: String,
    #[serde(deserialize_with = "de::string_bool")]
    pub archived: bool,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub display_order: Option<i64>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub release_due_date: Option<NaiveDate>,
}

/// An affected version.
pub type Version = Milestone;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SharedFile {
    pub id: i64,
    pub name: String,
    pub size: i64,
    pub dir: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Revision {
    pub rev: String,
    pub comment: String,
}

impl Revision {
    /// First ten characters of the revision hash.
    pub fn short_rev(&self) -> &str {
        match self.rev.char_indices().nth(10) {
            Some((idx, _)) => &self.rev[..idx],
            None => &self.rev,
        }
    }
}

/// An issue touched by a bulk update. Backlog sends the IDs as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(deserialize_with = "de::id_string")]
    pub key_id: String,
    pub title: String,
}

/// An issue related to a pull request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Issue {
    pub id: i64,
    pub key_id: i64,
    pub summary: String,
    pub description: String,
}

// ============================================================================
// Content variants
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueContent {
    pub id: i64,
    #[serde(rename = "key_id")]
    pub key_id: i64,
    pub issue_type: IssueType,
    pub summary: String,
    pub description: String,
    #[serde(deserialize_with = "de::required_enum")]
    pub status: IssueStatus,
    #[serde(deserialize_with = "de::optional_enum")]
    pub priority: Option<Priority>,
    #[serde(deserialize_with = "de::optional_enum")]
    pub resolution: Option<Resolution>,
    #[serde(default)]
    pub parent_issue_id: Option<i64>,
    #[serde(deserialize_with = "de::optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "de::optional_date")]
    pub due_date: Option<NaiveDate>,
    pub category: Vec<Category>,
    pub milestone: Vec<Milestone>,
    pub versions: Vec<Version>,
    #[serde(deserialize_with = "de::required_nullable")]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
}

/// Issue update. `C` is [`RawChange`] straight off the wire and [`Change`]
/// once resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateIssueContent<C = Change> {
    pub id: i64,
    pub key_id: i64,
    pub summary: String,
    pub description: String,
    #[serde(deserialize_with = "de::required_nullable")]
    pub comment: Option<Comment>,
    pub changes: Vec<C>,
    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}

impl UpdateIssueContent<RawChange> {
    pub fn resolve(self) -> RenderResult<UpdateIssueContent> {
        Ok(UpdateIssueContent {
            id: self.id,
            key_id: self.key_id,
            summary: self.summary,
            description: self.description,
            comment: self.comment,
            changes: Change::resolve_all(self.changes, EnumContext::Issue)?,
            shared_files: self.shared_files,
        })
    }
}

/// Comment added to an issue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueContent {
    pub id: i64,
    pub key_id: i64,
    pub summary: String,
    pub description: String,
    pub comment: Comment,
}

/// Deleted issue; only the identifiers survive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IssueSummary {
    pub id: i64,
    pub key_id: i64,
}

/// Created or deleted wiki page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WikiPage {
    pub id: i64,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateWikiContent {
    pub id: i64,
    pub name: String,
    pub content: String,
    /// Backlog's own diff of the page body; may be empty.
    pub diff: String,
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommitSubversionContent {
    pub rev: i64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushGitContent {
    pub repository: Repository,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub change_type: String,
    pub revision_count: i64,
    pub revision_type: String,
    pub revisions: Vec<Revision>,
}

impl PushGitContent {
    /// Branch name, i.e. the last segment of `refs/heads/<branch>`.
    pub fn branch(&self) -> &str {
        self.git_ref.rsplit('/').next().unwrap_or(&self.git_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateGitContent {
    pub repository: Repository,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BulkUpdateIssueContent<C = Change> {
    #[serde(deserialize_with = "de::id_string")]
    pub tx_id: String,
    pub link: Vec<Link>,
    pub changes: Vec<C>,
}

impl BulkUpdateIssueContent<RawChange> {
    pub fn resolve(self) -> RenderResult<BulkUpdateIssueContent> {
        Ok(BulkUpdateIssueContent {
            tx_id: self.tx_id,
            link: self.link,
            changes: Change::resolve_all(self.changes, EnumContext::Issue)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JoinProjectContent {
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub comment: Option<String>,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeaveProjectContent {
    pub users: Vec<User>,
}

/// Pull request created, updated or commented on. The three events share
/// one shape; `status` changes resolve against the pull-request table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PullRequestContent<C = Change> {
    pub id: i64,
    pub number: i64,
    pub summary: String,
    pub description: String,
    pub repository: Repository,
    pub base: String,
    pub branch: String,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub diff: Option<String>,
    #[serde(default)]
    pub issue: Option<Issue>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    pub changes: Vec<C>,
}

impl PullRequestContent<RawChange> {
    pub fn resolve(self) -> RenderResult<PullRequestContent> {
        Ok(PullRequestContent {
            id: self.id,
            number: self.number,
            summary: self.summary,
            description: self.description,
            repository: self.repository,
            base: self.base,
            branch: self.branch,
            comment: self.comment,
            diff: self.diff,
            issue: self.issue,
            assignee: self.assignee,
            changes: Change::resolve_all(self.changes, EnumContext::PullRequest)?,
        })
    }
}

/// Event content, one variant per supported event type.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    CreateIssue(CreateIssueContent),
    UpdateIssue(UpdateIssueContent),
    AddComment(IssueContent),
    DeleteIssue(IssueSummary),
    CreateWiki(WikiPage),
    UpdateWiki(UpdateWikiContent),
    DeleteWiki(WikiPage),
    CommitSubversion(CommitSubversionContent),
    PushGit(PushGitContent),
    CreateGit(CreateGitContent),
    BulkUpdateIssue(BulkUpdateIssueContent),
    JoinProject(JoinProjectContent),
    LeaveProject(LeaveProjectContent),
    CreatePullRequest(PullRequestContent),
    UpdatePullRequest(PullRequestContent),
    CommentPullRequest(PullRequestContent),
}

impl Content {
    /// The event type this content belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::CreateIssue(_) => EventType::CreateIssue,
            Self::UpdateIssue(_) => EventType::UpdateIssue,
            Self::AddComment(_) => EventType::AddComment,
            Self::DeleteIssue(_) => EventType::DeleteIssue,
            Self::CreateWiki(_) => EventType::CreateWiki,
            Self::UpdateWiki(_) => EventType::UpdateWiki,
            Self::DeleteWiki(_) => EventType::DeleteWiki,
            Self::CommitSubversion(_) => EventType::CommitSubversion,
            Self::PushGit(_) => EventType::PushGit,
            Self::CreateGit(_) => EventType::CreateGit,
            Self::BulkUpdateIssue(_) => EventType::BulkUpdateIssue,
            Self::JoinProject(_) => EventType::JoinProject,
            Self::LeaveProject(_) => EventType::LeaveProject,
            Self::CreatePullRequest(_) => EventType::CreatePullRequest,
            Self::UpdatePullRequest(_) => EventType::UpdatePullRequest,
            Self::CommentPullRequest(_) => EventType::CommentPullRequest,
        }
    }
}

// ============================================================================
// Envelope
// ============================================================================

/// Fields shared by every webhook, excluding `type` and `content`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub created_user: CreatedUser,
    #[serde(default)]
    pub project: Option<Project>,
}

/// A normalized webhook event.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub id: i64,
    pub event_type: EventType,
    pub created: DateTime<Utc>,
    pub created_user: CreatedUser,
    pub project: Option<Project>,
    pub content: Content,
}

impl WebhookEvent {
    /// Combine an envelope with its normalized content.
    pub fn new(envelope: EventEnvelope, content: Content) -> Self {
        Self {
            id: envelope.id,
            event_type: content.event_type(),
            created: envelope.created,
            created_user: envelope.created_user,
            project: envelope.project,
            content,
        }
    }

    /// The project the event belongs to.
    ///
    /// Every supported event is project-scoped, so a missing project means
    /// the payload is malformed.
    pub fn project(&self) -> RenderResult<&Project> {
        self.project
            .as_ref()
            .ok_or_else(|| RenderError::malformed(self.event_type.name(), "missing project"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_project_accepts_string_booleans() {
        let project: Project = serde_json::from_value(json!({
            "id": 1, "projectKey": "TEST", "name": "Test", "archived": "TRUE"
        }))
        .unwrap();
        assert!(project.archived);
        assert!(!project.chart_enabled);
        assert_eq!(project.display_name(), "Test (TEST)");
        assert_eq!(project.issue_key(12), "TEST-12");
    }

    #[test]
    fn test_link_ids_accept_strings_and_numbers() {
        let link: Link =
            serde_json::from_value(json!({"id": "100", "key_id": 101, "title": "t"})).unwrap();
        assert_eq!(link.id, "100");
        assert_eq!(link.key_id, "101");
    }

    #[test]
    fn test_short_rev() {
        let rev = Revision {
            rev: "e1cf1103242ea1ce59382ac2e2ab4de43751524d".to_string(),
            comment: String::new(),
        };
        assert_eq!(rev.short_rev(), "e1cf110324");

        let short = Revision {
            rev: "abc".to_string(),
            comment: String::new(),
        };
        assert_eq!(short.short_rev(), "abc");
    }

    #[test]
    fn test_branch_name() {
        let content: PushGitContent = serde_json::from_value(json!({
            "repository": {"id": 3, "name": "app"},
            "ref": "refs/heads/feature/login",
            "change_type": "update",
            "revision_count": 0,
            "revision_type": "commit",
            "revisions": []
        }))
        .unwrap();
        assert_eq!(content.branch(), "login");
    }

    #[test]
    fn test_envelope_parses_created_timestamp() {
        let envelope: EventEnvelope = serde_json::from_value(json!({
            "id": 10,
            "created": "2017-07-19T11:02:22Z",
            "createdUser": {"id": 1, "name": "John Doe", "roleType": 1, "userId": null},
            "project": null
        }))
        .unwrap();
        assert_eq!(envelope.created.to_rfc3339(), "2017-07-19T11:02:22+00:00");
        assert_eq!(envelope.project, None);
    }
}
