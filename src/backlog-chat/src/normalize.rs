//! Raw payload normalization.
//!
//! Backlog payloads are loosely typed: optional strings arrive as the
//! literal `"null"`, booleans as `"true"`/`"false"`, dates as `YYYY-MM-DD`
//! or the empty string, and some IDs as either numbers or strings. Each of
//! those rules lives in exactly one function here and is applied through
//! `#[serde(deserialize_with = ...)]` on the model types.
//!
//! Required keys are never defaulted. A missing key or an unknown enum ID
//! fails the whole event so contract breaks surface upstream.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{RenderError, RenderResult};
use crate::model::{
    BulkUpdateIssueContent, CommitSubversionContent, Content, CreateGitContent,
    CreateIssueContent, IssueContent, IssueSummary, JoinProjectContent, LeaveProjectContent,
    PullRequestContent, PushGitContent, UpdateIssueContent, UpdateWikiContent, WikiPage,
};
use crate::resolver::{Change, RawChange};

/// Map the `"null"` sentinel to an absent value.
pub fn maybe_null(value: Option<String>) -> Option<String> {
    value.filter(|v| v != "null")
}

/// Parse a string-encoded boolean (`true`/`false`, any case).
pub fn parse_bool(value: &str) -> Result<bool, String> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("invalid boolean `{value}`"))
    }
}

/// Parse an optional `YYYY-MM-DD` date; empty and `"null"` are absent.
pub fn parse_optional_date(value: &str) -> Result<Option<NaiveDate>, String> {
    if value.is_empty() || value == "null" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| format!("invalid date `{value}`: {e}"))
}

/// `deserialize_with` helpers applying the rules above.
///
/// Fields using a helper without `#[serde(default)]` are required keys even
/// when their type is `Option`.
pub(crate) mod de {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::resolver::IdEnum;

    pub fn nullable_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(super::maybe_null)
    }

    pub fn string_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(b),
            Value::String(s) => super::parse_bool(&s).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("invalid boolean `{other}`"))),
        }
    }

    pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => super::parse_optional_date(&s).map_err(D::Error::custom),
            None => Ok(None),
        }
    }

    /// Identifier sent as either a JSON number or a JSON string.
    pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("invalid identifier `{other}`"))),
        }
    }

    pub fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(super::maybe_null(Some(s))),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!("invalid identifier `{other}`"))),
        }
    }

    /// A nullable value whose key must be present.
    pub fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer)
    }

    #[derive(Deserialize)]
    struct EnumRef {
        #[serde(default)]
        id: Option<i64>,
    }

    /// `{"id": n, "name": ...}` where the ID must be present and known.
    pub fn required_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: IdEnum,
    {
        let id = EnumRef::deserialize(deserializer)?
            .id
            .ok_or_else(|| D::Error::custom(format!("{} id is missing", T::KIND)))?;
        T::from_id(id).ok_or_else(|| D::Error::custom(format!("unknown {} id `{id}`", T::KIND)))
    }

    /// Nullable `{"id": n?, ...}`; a present ID must be known.
    pub fn optional_enum<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: IdEnum,
    {
        match Option::<EnumRef>::deserialize(deserializer)?.and_then(|r| r.id) {
            Some(id) => T::from_id(id)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown {} id `{id}`", T::KIND))),
            None => Ok(None),
        }
    }
}

/// Deserialize `raw` into `T`, reporting failures as malformed payloads.
pub fn parse<T: DeserializeOwned>(raw: &Value, context: &str) -> RenderResult<T> {
    T::deserialize(raw).map_err(|e| RenderError::malformed(context, e))
}

pub fn create_issue(raw: &Value) -> RenderResult<Content> {
    parse::<CreateIssueContent>(raw, "create_issue").map(Content::CreateIssue)
}

pub fn update_issue(raw: &Value) -> RenderResult<Content> {
    let content: UpdateIssueContent<RawChange> = parse(raw, "update_issue")?;
    Ok(Content::UpdateIssue(content.resolve()?))
}

pub fn add_comment(raw: &Value) -> RenderResult<Content> {
    parse::<IssueContent>(raw, "add_comment").map(Content::AddComment)
}

pub fn delete_issue(raw: &Value) -> RenderResult<Content> {
    parse::<IssueSummary>(raw, "delete_issue").map(Content::DeleteIssue)
}

pub fn create_wiki(raw: &Value) -> RenderResult<Content> {
    parse::<WikiPage>(raw, "create_wiki").map(Content::CreateWiki)
}

pub fn update_wiki(raw: &Value) -> RenderResult<Content> {
    parse::<UpdateWikiContent>(raw, "update_wiki").map(Content::UpdateWiki)
}

pub fn delete_wiki(raw: &Value) -> RenderResult<Content> {
    parse::<WikiPage>(raw, "delete_wiki").map(Content::DeleteWiki)
}

pub fn commit_subversion(raw: &Value) -> RenderResult<Content> {
    parse::<CommitSubversionContent>(raw, "commit_subversion").map(Content::CommitSubversion)
}

pub fn push_git(raw: &Value) -> RenderResult<Content> {
    parse::<PushGitContent>(raw, "push_git").map(Content::PushGit)
}

pub fn create_git(raw: &Value) -> RenderResult<Content> {
    parse::<CreateGitContent>(raw, "create_git").map(Content::CreateGit)
}

pub fn bulk_update_issue(raw: &Value) -> RenderResult<Content> {
    let content: BulkUpdateIssueContent<RawChange> = parse(raw, "bulk_update_issue")?;
    Ok(Content::BulkUpdateIssue(content.resolve()?))
}

pub fn join_project(raw: &Value) -> RenderResult<Content> {
    parse::<JoinProjectContent>(raw, "join_project").map(Content::JoinProject)
}

pub fn leave_project(raw: &Value) -> RenderResult<Content> {
    parse::<LeaveProjectContent>(raw, "leave_project").map(Content::LeaveProject)
}

fn pull_request(raw: &Value, context: &str) -> RenderResult<PullRequestContent<Change>> {
    let content: PullRequestContent<RawChange> = parse(raw, context)?;
    content.resolve()
}

pub fn create_pull_request(raw: &Value) -> RenderResult<Content> {
    pull_request(raw, "create_pull_request").map(Content::CreatePullRequest)
}

pub fn update_pull_request(raw: &Value) -> RenderResult<Content> {
    pull_request(raw, "update_pull_request").map(Content::UpdatePullRequest)
}

pub fn comment_pull_request(raw: &Value) -> RenderResult<Content> {
    pull_request(raw, "comment_pull_request").map(Content::CommentPullRequest)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::resolver::{IssueStatus, Priority};

    #[test]
    fn test_maybe_null() {
        assert_eq!(maybe_null(Some("null".into())), None);
        assert_eq!(maybe_null(Some("NULL".into())), Some("NULL".into()));
        assert_eq!(maybe_null(Some("blue".into())), Some("blue".into()));
        assert_eq!(maybe_null(None), None);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Ok(true));
        assert_eq!(parse_bool("FALSE"), Ok(false));
        assert!(parse_bool("yes").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(
            parse_optional_date("2017-07-19"),
            Ok(NaiveDate::from_ymd_opt(2017, 7, 19))
        );
        assert_eq!(parse_optional_date(""), Ok(None));
        assert_eq!(parse_optional_date("null"), Ok(None));
        assert!(parse_optional_date("19/07/2017").is_err());
    }

    fn create_issue_payload() -> Value {
        json!({
            "id": 100,
            "key_id": 100,
            "summary": "test issue",
            "description": "test description",
            "issueType": {"id": 400, "name": "Bug", "color": "null"},
            "status": {"id": 2, "name": "In Progress"},
            "priority": {"id": 3, "name": ""},
            "resolution": {"id": null, "name": ""},
            "startDate": "",
            "dueDate": "2017-07-19",
            "category": [],
            "milestone": [
                {"name": "v1", "description": "", "archived": "false", "releaseDueDate": "null"}
            ],
            "versions": [],
            "assignee": null
        })
    }

    #[test]
    fn test_create_issue_normalizes_embedded_values() {
        let Content::CreateIssue(content) = create_issue(&create_issue_payload()).unwrap() else {
            panic!("expected create issue content");
        };
        assert_eq!(content.status, IssueStatus::InProgress);
        assert_eq!(content.priority, Some(Priority::Normal));
        assert_eq!(content.resolution, None);
        assert_eq!(content.issue_type.color, None);
        assert_eq!(content.start_date, None);
        assert_eq!(content.due_date, NaiveDate::from_ymd_opt(2017, 7, 19));
        assert!(!content.milestone[0].archived);
        assert_eq!(content.milestone[0].release_due_date, None);
    }

    #[test]
    fn test_missing_required_key_fails() {
        let mut raw = create_issue_payload();
        raw.as_object_mut().unwrap().remove("summary");
        let err = create_issue(&raw).unwrap_err();
        assert!(err.to_string().contains("missing field `summary`"));
    }

    #[test]
    fn test_nullable_key_must_be_present() {
        let mut raw = create_issue_payload();
        raw.as_object_mut().unwrap().remove("assignee");
        assert!(matches!(
            create_issue(&raw),
            Err(RenderError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_unknown_enum_id_fails() {
        let mut raw = create_issue_payload();
        raw["status"]["id"] = json!(9);
        let err = create_issue(&raw).unwrap_err();
        assert!(err.to_string().contains("unknown status id `9`"));
    }

    #[test]
    fn test_invalid_boolean_fails() {
        let mut raw = create_issue_payload();
        raw["milestone"][0]["archived"] = json!("maybe");
        let err = create_issue(&raw).unwrap_err();
        assert!(err.to_string().contains("invalid boolean `maybe`"));
    }

    #[test]
    fn test_pull_request_status_uses_pull_request_table() {
        let raw = json!({
            "id": 1, "number": 7, "summary": "s", "description": "d",
            "repository": {"id": 1, "name": "app"},
            "base": "main", "branch": "topic",
            "changes": [{"field": "status", "old_value": "1", "new_value": "3"}]
        });
        let Content::UpdatePullRequest(content) = update_pull_request(&raw).unwrap() else {
            panic!("expected pull request content");
        };
        assert_eq!(content.changes[0].transition(), "Open > Merged");
        assert_eq!(content.comment, None);
    }

    #[test]
    fn test_unmapped_change_field() {
        let raw = json!({
            "id": 1, "key_id": 2, "summary": "s", "description": "d", "comment": null,
            "changes": [{"field": "customField_9", "new_value": "x"}]
        });
        assert_eq!(
            update_issue(&raw).unwrap_err(),
            RenderError::UnmappedField("customField_9".into())
        );
    }
}
