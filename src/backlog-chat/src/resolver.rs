//! Field and enumeration resolution.
//!
//! Backlog reports issue and pull-request changes as `(field, old, new)`
//! string triples. This module maps raw field identifiers to display labels
//! and turns numeric enum IDs (status, priority, resolution) into their
//! labels. Everything here is static, read-only data.

use std::fmt;

use serde::Deserialize;

use crate::error::{RenderError, RenderResult};
use crate::message::Icon;
use crate::normalize::de;

/// An enumeration reconstructed from a fixed integer ID table.
pub trait IdEnum: Sized + Copy {
    /// Entity name used in error messages.
    const KIND: &'static str;

    /// Look up the entry for `id`.
    fn from_id(id: i64) -> Option<Self>;

    /// Display label.
    fn label(self) -> &'static str;

    /// Look up the entry for `id`, failing on unknown IDs.
    fn resolve(id: i64) -> RenderResult<Self> {
        Self::from_id(id)
            .ok_or_else(|| RenderError::malformed(Self::KIND, format!("unknown id `{id}`")))
    }
}

macro_rules! id_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident = $id:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $id),+
        }

        impl $name {
            /// Numeric ID on the wire.
            pub fn id(self) -> i64 {
                self as i64
            }
        }

        impl IdEnum for $name {
            const KIND: &'static str = $kind;

            fn from_id(id: i64) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)+
                    _ => None,
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

id_enum! {
    /// Issue status.
    IssueStatus, "status" {
        Open = 1 => "未対応",
        InProgress = 2 => "処理中",
        Resolved = 3 => "処理済み",
        Closed = 4 => "完了",
    }
}

id_enum! {
    /// Issue priority.
    Priority, "priority" {
        High = 2 => "高",
        Normal = 3 => "中",
        Low = 4 => "低",
    }
}

id_enum! {
    /// Issue resolution.
    Resolution, "resolution" {
        Fixed = 0 => "対応済み",
        WontFix = 1 => "対応しない",
        Invalid = 2 => "無効",
        Duplicate = 3 => "重複",
        CannotReproduce = 4 => "再現しない",
    }
}

id_enum! {
    /// Pull request status. Shares the `status` field name with issues.
    PullRequestStatus, "pull request status" {
        Open = 1 => "Open",
        Closed = 2 => "Closed",
        Merged = 3 => "Merged",
    }
}

/// Which enumeration family a `status` change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumContext {
    /// Issue events (create/update/bulk update).
    Issue,
    /// Pull-request events.
    PullRequest,
}

/// How a change value is formatted for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Shown as sent.
    Verbatim,
    /// Issue status ID, e.g. `2` to 処理中.
    IssueStatus,
    /// Priority ID, e.g. `3` to 中.
    Priority,
    /// Resolution ID, e.g. `0` to 対応済み.
    Resolution,
    /// Pull-request status ID, e.g. `3` to `Merged`.
    PullRequestStatus,
}

impl ValueFormat {
    /// Format one change value.
    ///
    /// Non-numeric values are returned unchanged; numeric values must be
    /// known IDs of the matching table.
    pub fn apply(self, value: &str) -> RenderResult<String> {
        let label = match self {
            Self::Verbatim => return Ok(value.to_string()),
            Self::IssueStatus => lookup::<IssueStatus>(value)?,
            Self::Priority => lookup::<Priority>(value)?,
            Self::Resolution => lookup::<Resolution>(value)?,
            Self::PullRequestStatus => lookup::<PullRequestStatus>(value)?,
        };
        Ok(label.map_or_else(|| value.to_string(), str::to_string))
    }
}

fn lookup<T: IdEnum>(value: &str) -> RenderResult<Option<&'static str>> {
    match value.trim().parse::<i64>() {
        Ok(id) => T::resolve(id).map(|entry| Some(entry.label())),
        Err(_) => Ok(None),
    }
}

/// Static description of one change field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Raw identifier as sent by Backlog.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Value formatter.
    pub format: ValueFormat,
}

const fn field(id: &'static str, label: &'static str, format: ValueFormat) -> FieldInfo {
    FieldInfo { id, label, format }
}

/// Fields that may appear in issue and pull-request change lists.
pub static FIELDS: &[FieldInfo] = &[
    field("issueType", "種別", ValueFormat::Verbatim),
    field("summary", "件名", ValueFormat::Verbatim),
    field("parentIssue", "親課題", ValueFormat::Verbatim),
    field("description", "詳細", ValueFormat::Verbatim),
    field("status", "状態", ValueFormat::IssueStatus),
    field("priority", "優先度", ValueFormat::Priority),
    field("milestone", "マイルストーン", ValueFormat::Verbatim),
    field("category", "カテゴリー", ValueFormat::Verbatim),
    field("versions", "発生バージョン", ValueFormat::Verbatim),
    field("assignee", "担当者", ValueFormat::Verbatim),
    field("assigner", "担当者", ValueFormat::Verbatim),
    field("startDate", "開始日", ValueFormat::Verbatim),
    field("dueDate", "期限日", ValueFormat::Verbatim),
    field("limitDate", "期限日", ValueFormat::Verbatim),
    field("estimatedHours", "予定時間", ValueFormat::Verbatim),
    field("actualHours", "実績時間", ValueFormat::Verbatim),
    field("attachment", "添付ファイル", ValueFormat::Verbatim),
    field("resolution", "完了理由", ValueFormat::Resolution),
    field("issue", "関連課題", ValueFormat::Verbatim),
];

/// `status` as it appears on pull-request events.
pub static PULL_REQUEST_STATUS_FIELD: FieldInfo =
    field("status", "Status", ValueFormat::PullRequestStatus);

/// Look up a raw field identifier in the given context.
pub fn field_info(raw_field: &str, context: EnumContext) -> Option<FieldInfo> {
    if raw_field == "status" && context == EnumContext::PullRequest {
        return Some(PULL_REQUEST_STATUS_FIELD);
    }
    FIELDS.iter().find(|info| info.id == raw_field).copied()
}

/// Icon shown next to a field's key-value widget.
pub fn icon_for_field(raw_field: &str) -> Icon {
    match raw_field {
        "parentIssue" | "issue" => Icon::Ticket,
        "assignee" | "assigner" => Icon::Person,
        "dueDate" | "limitDate" => Icon::Clock,
        _ => Icon::Description,
    }
}

/// A change entry exactly as it arrives in the payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawChange {
    pub field: String,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub old_value: Option<String>,
    #[serde(default, deserialize_with = "de::nullable_string")]
    pub new_value: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "de::nullable_string")]
    pub change_type: Option<String>,
}

/// A change entry with its label and formatted values.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Raw field identifier from the payload.
    pub field: String,
    /// Display label.
    pub label: &'static str,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Backlog's change type tag (`standard` for built-in fields).
    pub change_type: Option<String>,
}

impl Change {
    /// Resolve a raw change entry. Empty values become absent.
    pub fn resolve(raw: RawChange, context: EnumContext) -> RenderResult<Self> {
        let info = field_info(&raw.field, context)
            .ok_or_else(|| RenderError::UnmappedField(raw.field.clone()))?;
        let format = |value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .map(|v| info.format.apply(&v))
                .transpose()
        };

        Ok(Self {
            label: info.label,
            old_value: format(raw.old_value)?,
            new_value: format(raw.new_value)?,
            change_type: raw.change_type,
            field: raw.field,
        })
    }

    /// Resolve a whole change list, preserving order.
    pub fn resolve_all(raw: Vec<RawChange>, context: EnumContext) -> RenderResult<Vec<Self>> {
        raw.into_iter()
            .map(|change| Self::resolve(change, context))
            .collect()
    }

    /// `old > new`, with `--` standing in for absent values.
    pub fn transition(&self) -> String {
        format!(
            "{} > {}",
            self.old_value.as_deref().unwrap_or("--"),
            self.new_value.as_deref().unwrap_or("--"),
        )
    }
}
