//! Backlog webhook event type codes.

use std::fmt;

/// Event type codes sent in the `type` field of a Backlog webhook.
///
/// Only a subset of these has a renderer; see
/// [`supported_event_types`](crate::dispatch::supported_event_types).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    /// An issue was created.
    CreateIssue = 1,
    /// Issue fields changed, optionally with a comment.
    UpdateIssue = 2,
    /// A comment was added to an issue.
    AddComment = 3,
    /// An issue was deleted.
    DeleteIssue = 4,
    /// A wiki page was created.
    CreateWiki = 5,
    /// A wiki page was edited.
    UpdateWiki = 6,
    /// A wiki page was deleted.
    DeleteWiki = 7,
    /// A shared file was added. Not rendered.
    AddFile = 8,
    /// A shared file was replaced. Not rendered.
    UpdateFile = 9,
    /// A shared file was deleted. Not rendered.
    DeleteFile = 10,
    /// A Subversion revision was committed.
    CommitSubversion = 11,
    /// Commits were pushed to a Git branch.
    PushGit = 12,
    /// A Git repository was created.
    CreateGit = 13,
    /// Several issues were updated at once.
    BulkUpdateIssue = 14,
    /// Users joined the project.
    JoinProject = 15,
    /// Users left the project.
    LeaveProject = 16,
    /// A user was notified of a comment. Not rendered.
    NotifyComment = 17,
    /// A pull request was opened.
    CreatePullRequest = 18,
    /// Pull request fields changed.
    UpdatePullRequest = 19,
    /// A comment was added to a pull request.
    CommentPullRequest = 20,
}

impl EventType {
    /// Every code known to this crate, in code order.
    pub const ALL: [EventType; 20] = [
        Self::CreateIssue,
        Self::UpdateIssue,
        Self::AddComment,
        Self::DeleteIssue,
        Self::CreateWiki,
        Self::UpdateWiki,
        Self::DeleteWiki,
        Self::AddFile,
        Self::UpdateFile,
        Self::DeleteFile,
        Self::CommitSubversion,
        Self::PushGit,
        Self::CreateGit,
        Self::BulkUpdateIssue,
        Self::JoinProject,
        Self::LeaveProject,
        Self::NotifyComment,
        Self::CreatePullRequest,
        Self::UpdatePullRequest,
        Self::CommentPullRequest,
    ];

    /// Look up the event type for a raw code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.code() == code)
    }

    /// The integer code used on the wire.
    pub fn code(self) -> i64 {
        self as i64
    }

    /// Snake-case name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::CreateIssue => "create_issue",
            Self::UpdateIssue => "update_issue",
            Self::AddComment => "add_comment",
            Self::DeleteIssue => "delete_issue",
            Self::CreateWiki => "create_wiki",
            Self::UpdateWiki => "update_wiki",
            Self::DeleteWiki => "delete_wiki",
            Self::AddFile => "add_file",
            Self::UpdateFile => "update_file",
            Self::DeleteFile => "delete_file",
            Self::CommitSubversion => "commit_subversion",
            Self::PushGit => "push_git",
            Self::CreateGit => "create_git",
            Self::BulkUpdateIssue => "bulk_update_issue",
            Self::JoinProject => "join_project",
            Self::LeaveProject => "leave_project",
            Self::NotifyComment => "notify_comment",
            Self::CreatePullRequest => "create_pull_request",
            Self::UpdatePullRequest => "update_pull_request",
            Self::CommentPullRequest => "comment_pull_request",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}

impl TryFrom<i64> for EventType {
    type Error = i64;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for ty in EventType::ALL {
            assert_eq!(EventType::from_code(ty.code()), Some(ty));
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(EventType::from_code(0), None);
        assert_eq!(EventType::from_code(99), None);
        assert_eq!(EventType::try_from(-1), Err(-1));
    }

    #[test]
    fn test_display() {
        assert_eq!(EventType::PushGit.to_string(), "push_git (12)");
    }
}
