use serde::Serialize;

/// A Slack event after the receiver has normalized it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    SlashCommand {
        command: String,
        text: String,
        user_name: String,
    },
    InteractiveAction {
        action_id: String,
        selected_value: String,
    },
    ReactionAdded {
        reaction: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    /// Only the invoking user sees the reply.
    #[serde(rename = "ephemeral")]
    Private,
    #[serde(rename = "in_channel")]
    Public,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    #[serde(rename = "response_type")]
    pub visibility: Visibility,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    pub fn text(visibility: Visibility, text: impl Into<String>) -> Self {
        Self {
            visibility,
            text: text.into(),
            attachments: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<AttachmentAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    #[serde(rename = "button")]
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub name: String,
    #[serde(rename = "text")]
    pub label: String,
    pub value: String,
}

impl AttachmentAction {
    pub fn button(name: &str, label: &str, value: &str) -> Self {
        Self {
            kind: ActionKind::Button,
            name: name.to_string(),
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}
