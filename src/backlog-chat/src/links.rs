//! Deep links into Backlog.
//!
//! Each accessor on [`EventLinks`] only accepts the event kinds that carry
//! its entity; anything else is a [`RenderError::TypeState`].

use crate::error::{RenderError, RenderResult};
use crate::model::{Content, Project, Revision, SharedFile, WebhookEvent};

/// Builds Backlog URLs from a fixed base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    /// Create a builder. A single trailing slash is stripped from `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/view/<key>`.
    pub fn view(&self, issue_key: &str) -> String {
        format!("{}/view/{}", self.base_url, issue_key)
    }

    /// `<base>/projects/<KEY>`.
    pub fn project(&self, project: &Project) -> String {
        format!("{}/projects/{}", self.base_url, project.project_key)
    }

    /// Links for one event.
    pub fn for_event<'a>(&'a self, event: &'a WebhookEvent) -> EventLinks<'a> {
        EventLinks {
            builder: self,
            event,
        }
    }
}

/// Link accessors bound to one event.
#[derive(Debug, Clone, Copy)]
pub struct EventLinks<'a> {
    builder: &'a LinkBuilder,
    event: &'a WebhookEvent,
}

impl EventLinks<'_> {
    fn base(&self) -> &str {
        self.builder.base_url()
    }

    fn project_key(&self) -> RenderResult<&str> {
        Ok(&self.event.project()?.project_key)
    }

    fn unsupported(&self, operation: &'static str) -> RenderError {
        RenderError::TypeState {
            operation,
            event_type: self.event.event_type,
        }
    }

    /// `<KEY>-<key_id>` for issue events.
    pub fn issue_key(&self) -> RenderResult<String> {
        let key_id = match &self.event.content {
            Content::CreateIssue(c) => c.key_id,
            Content::UpdateIssue(c) => c.key_id,
            Content::AddComment(c) => c.key_id,
            Content::DeleteIssue(c) => c.key_id,
            _ => return Err(self.unsupported("issue_key")),
        };
        Ok(format!("{}-{}", self.project_key()?, key_id))
    }

    pub fn issue(&self) -> RenderResult<String> {
        Ok(self.builder.view(&self.issue_key()?))
    }

    /// Issue link anchored at the event's comment.
    pub fn issue_comment(&self) -> RenderResult<String> {
        let comment_id = match &self.event.content {
            Content::UpdateIssue(c) => c.comment.as_ref().map(|comment| comment.id),
            Content::AddComment(c) => Some(c.comment.id),
            _ => None,
        }
        .ok_or_else(|| self.unsupported("issue_comment"))?;
        Ok(format!("{}#comment-{}", self.issue()?, comment_id))
    }

    pub fn shared_file(&self, file: &SharedFile) -> RenderResult<String> {
        if !matches!(self.event.content, Content::UpdateIssue(_)) {
            return Err(self.unsupported("shared_file"));
        }
        Ok(format!(
            "{}/ViewSharedFile.action?projectKey={}&sharedFileId={}",
            self.base(),
            self.project_key()?,
            file.id
        ))
    }

    pub fn wiki(&self) -> RenderResult<String> {
        let id = match &self.event.content {
            Content::CreateWiki(c) => c.id,
            Content::UpdateWiki(c) => c.id,
            _ => return Err(self.unsupported("wiki")),
        };
        Ok(format!("{}/alias/wiki/{}", self.base(), id))
    }

    /// Diff between the previous and the current page version.
    pub fn wiki_diff(&self) -> RenderResult<String> {
        let Content::UpdateWiki(c) = &self.event.content else {
            return Err(self.unsupported("wiki_diff"));
        };
        let previous = c.version.checked_sub(1).ok_or_else(|| {
            RenderError::malformed("update_wiki", format!("invalid version `{}`", c.version))
        })?;
        Ok(format!(
            "{}/alias/wiki/diff/{}/{}...{}",
            self.base(),
            c.id,
            previous,
            c.version
        ))
    }

    pub fn subversion_commit(&self) -> RenderResult<String> {
        let Content::CommitSubversion(c) = &self.event.content else {
            return Err(self.unsupported("subversion_commit"));
        };
        Ok(format!("{}/rev/{}/{}", self.base(), self.project_key()?, c.rev))
    }

    pub fn git_repository(&self) -> RenderResult<String> {
        let repository = match &self.event.content {
            Content::PushGit(c) => &c.repository,
            Content::CreateGit(c) => &c.repository,
            _ => return Err(self.unsupported("git_repository")),
        };
        Ok(format!(
            "{}/git/{}/{}",
            self.base(),
            self.project_key()?,
            repository.name
        ))
    }

    pub fn git_branch(&self) -> RenderResult<String> {
        let Content::PushGit(c) = &self.event.content else {
            return Err(self.unsupported("git_branch"));
        };
        Ok(format!("{}/tree/{}", self.git_repository()?, c.branch()))
    }

    pub fn git_commit(&self, revision: &Revision) -> RenderResult<String> {
        if !matches!(self.event.content, Content::PushGit(_)) {
            return Err(self.unsupported("git_commit"));
        }
        Ok(format!("{}/commit/{}", self.git_repository()?, revision.rev))
    }

    pub fn pull_request(&self) -> RenderResult<String> {
        let c = match &self.event.content {
            Content::CreatePullRequest(c)
            | Content::UpdatePullRequest(c)
            | Content::CommentPullRequest(c) => c,
            _ => return Err(self.unsupported("pull_request")),
        };
        Ok(format!(
            "{}/git/{}/{}/pullRequests/{}",
            self.base(),
            self.project_key()?,
            c.repository.name,
            c.number
        ))
    }

    pub fn project(&self) -> RenderResult<String> {
        Ok(self.builder.project(self.event.project()?))
    }

    /// Issue link for a key assembled elsewhere (bulk updates, related issues).
    pub fn view(&self, issue_key: &str) -> String {
        self.builder.view(issue_key)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::event_type::EventType;
    use crate::model::{
        CommitSubversionContent, CreatedUser, IssueSummary, PushGitContent, Repository,
        UpdateWikiContent, WikiPage,
    };

    fn event(content: Content) -> WebhookEvent {
        WebhookEvent {
            id: 10,
            event_type: content.event_type(),
            created: Utc.with_ymd_and_hms(2017, 7, 19, 11, 2, 22).unwrap(),
            created_user: CreatedUser {
                id: 1,
                name: "John Doe".to_string(),
                role_type: 1,
                nulab_account: None,
                mail_address: None,
                user_id: None,
            },
            project: Some(Project {
                id: 100,
                project_key: "TEST".to_string(),
                name: "TestProject".to_string(),
                archived: false,
                chart_enabled: false,
                subtasking_enabled: false,
            }),
            content,
        }
    }

    fn wiki_update() -> WebhookEvent {
        event(Content::UpdateWiki(UpdateWikiContent {
            id: 100,
            name: "page".to_string(),
            content: String::new(),
            diff: String::new(),
            version: 3,
        }))
    }

    #[test]
    fn test_single_trailing_slash_is_stripped() {
        assert_eq!(LinkBuilder::new("https://backlog.com/").base_url(), "https://backlog.com");
        assert_eq!(LinkBuilder::new("https://backlog.com//").base_url(), "https://backlog.com/");
        assert_eq!(LinkBuilder::new("https://backlog.com").base_url(), "https://backlog.com");
    }

    #[test]
    fn test_wiki_links() {
        let builder = LinkBuilder::new("https://backlog.com/");
        let event = wiki_update();
        let links = builder.for_event(&event);
        assert_eq!(links.wiki().unwrap(), "https://backlog.com/alias/wiki/100");
        assert_eq!(
            links.wiki_diff().unwrap(),
            "https://backlog.com/alias/wiki/diff/100/2...3"
        );

        let created = event_with_wiki_page();
        assert_eq!(
            builder.for_event(&created).wiki().unwrap(),
            "https://backlog.com/alias/wiki/7"
        );
    }

    fn event_with_wiki_page() -> WebhookEvent {
        event(Content::CreateWiki(WikiPage {
            id: 7,
            name: "page".to_string(),
            content: String::new(),
        }))
    }

    #[test]
    fn test_wiki_link_rejects_other_events() {
        let builder = LinkBuilder::new("https://backlog.com");
        let event = event(Content::DeleteIssue(IssueSummary { id: 1, key_id: 5 }));
        let links = builder.for_event(&event);
        assert_eq!(
            links.wiki().unwrap_err(),
            RenderError::TypeState {
                operation: "wiki",
                event_type: EventType::DeleteIssue,
            }
        );
        assert_eq!(links.issue().unwrap(), "https://backlog.com/view/TEST-5");
        assert!(links.issue_comment().is_err());
        assert!(links.pull_request().is_err());
    }

    #[test]
    fn test_git_links() {
        let builder = LinkBuilder::new("https://backlog.com");
        let revision = Revision {
            rev: "abc123".to_string(),
            comment: "fix".to_string(),
        };
        let event = event(Content::PushGit(PushGitContent {
            repository: Repository {
                id: 3,
                name: "app".to_string(),
                description: None,
            },
            git_ref: "refs/heads/test".to_string(),
            change_type: "update".to_string(),
            revision_count: 1,
            revision_type: "commit".to_string(),
            revisions: vec![revision.clone()],
        }));
        let links = builder.for_event(&event);
        assert_eq!(links.git_repository().unwrap(), "https://backlog.com/git/TEST/app");
        assert_eq!(
            links.git_branch().unwrap(),
            "https://backlog.com/git/TEST/app/tree/test"
        );
        assert_eq!(
            links.git_commit(&revision).unwrap(),
            "https://backlog.com/git/TEST/app/commit/abc123"
        );
        assert!(links.wiki_diff().is_err());
    }

    #[test]
    fn test_subversion_and_project_links() {
        let builder = LinkBuilder::new("https://backlog.com");
        let event = event(Content::CommitSubversion(CommitSubversionContent {
            rev: 42,
            comment: String::new(),
        }));
        let links = builder.for_event(&event);
        assert_eq!(links.subversion_commit().unwrap(), "https://backlog.com/rev/TEST/42");
        assert_eq!(links.project().unwrap(), "https://backlog.com/projects/TEST");
        assert_eq!(links.view("TEST-9"), "https://backlog.com/view/TEST-9");
    }

    #[test]
    fn test_missing_project_is_malformed() {
        let builder = LinkBuilder::new("https://backlog.com");
        let mut event = wiki_update();
        event.project = None;
        assert!(matches!(
            builder.for_event(&event).project(),
            Err(RenderError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_wiki_diff_rejects_minimum_version() {
        let builder = LinkBuilder::new("https://backlog.com");
        let mut event = wiki_update();
        if let Content::UpdateWiki(c) = &mut event.content {
            c.version = i64::MIN;
        }
        assert!(matches!(
            builder.for_event(&event).wiki_diff(),
            Err(RenderError::MalformedPayload { .. })
        ));
    }
}
