//! Google Chat card messages (v1 card format).
//!
//! Provides:
//! - The serializable card document (`text`, `cards[].header`, `sections[].widgets`)
//! - Widget constructors for paragraphs, key-values and button bars
//! - [`MessageBuilder`], which keeps the action bar as the last section

use serde::{Deserialize, Serialize};

/// Icons Google Chat can show next to a key-value widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Icon {
    Ticket,
    Person,
    Clock,
    Description,
}

/// A rendered chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Notification text.
    pub text: String,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub header: CardHeader,
    /// Omitted entirely for header-only cards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub widgets: Vec<Widget>,
}

/// Card widget. Serialized as a single-key object, e.g. `{"textParagraph": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Widget {
    TextParagraph(TextParagraph),
    KeyValue(KeyValue),
    Buttons(Vec<Button>),
}

impl Widget {
    /// Plain text paragraph.
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextParagraph(TextParagraph { text: text.into() })
    }
}

impl From<KeyValue> for Widget {
    fn from(key_value: KeyValue) -> Self {
        Self::KeyValue(key_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextParagraph {
    pub text: String,
}

/// Labelled value with an optional icon and inline button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub top_label: String,
    pub content: String,
    pub content_multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<OnClick>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<Button>,
}

impl KeyValue {
    /// Create a multiline key-value.
    pub fn new(top_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            top_label: top_label.into(),
            content: content.into(),
            content_multiline: true,
            bottom_label: None,
            on_click: None,
            icon: None,
            button: None,
        }
    }

    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_button(mut self, button: Button) -> Self {
        self.button = Some(button);
        self
    }

    pub fn with_bottom_label(mut self, label: impl Into<String>) -> Self {
        self.bottom_label = Some(label.into());
        self
    }

    /// Make the whole widget open `url` when clicked.
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.on_click = Some(OnClick::open(url));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Button {
    TextButton(TextButton),
}

impl Button {
    /// Text button opening `url`.
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self::TextButton(TextButton {
            text: text.into(),
            on_click: OnClick::open(url),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextButton {
    pub text: String,
    pub on_click: OnClick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnClick {
    pub open_link: OpenLink,
}

impl OnClick {
    pub fn open(url: impl Into<String>) -> Self {
        Self {
            open_link: OpenLink { url: url.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenLink {
    pub url: String,
}

/// Builder for single-card messages.
///
/// Sections are emitted in insertion order; buttons added with
/// [`action`](Self::action) are collected into one button bar that always
/// comes last.
pub struct MessageBuilder {
    text: String,
    header: CardHeader,
    sections: Vec<Section>,
    actions: Vec<Button>,
}

impl MessageBuilder {
    /// Create a builder with the notification text and card header.
    pub fn new(
        text: impl Into<String>,
        title: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            header: CardHeader {
                title: title.into(),
                subtitle: subtitle.into(),
            },
            sections: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Append a section, even when `widgets` is empty.
    pub fn section(mut self, widgets: Vec<Widget>) -> Self {
        self.sections.push(Section { widgets });
        self
    }

    /// Append a section only if it has widgets.
    pub fn section_if_any(self, widgets: Vec<Widget>) -> Self {
        if widgets.is_empty() {
            self
        } else {
            self.section(widgets)
        }
    }

    /// Add a button to the trailing action bar.
    pub fn action(mut self, text: impl Into<String>, url: impl Into<String>) -> Self {
        self.actions.push(Button::link(text, url));
        self
    }

    /// Build the message content.
    pub fn build(self) -> ChatMessage {
        let mut sections = self.sections;
        if !self.actions.is_empty() {
            sections.push(Section {
                widgets: vec![Widget::Buttons(self.actions)],
            });
        }
        ChatMessage {
            text: self.text,
            cards: vec![Card {
                header: self.header,
                sections,
            }],
        }
    }
}
