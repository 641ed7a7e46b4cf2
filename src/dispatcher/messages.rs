//! Canned replies.

use crate::types::*;

/// Correlates button clicks back to the greeting flow.
pub const GREETINGS_CALLBACK_ID: &str = "greetings_click";
pub const WAVE: &str = ":wave:";
pub const DEFAULT_USAGE_URL: &str = "https://github.com/vghn/vbot/blob/master/README.md";

// (name, label, value)
const GREETING_CHOICES: [(&str, &str, &str); 4] = [
    ("Wave", WAVE, WAVE),
    ("Hello", "Hello", "Hello"),
    ("Howdy", "Howdy", "Howdy"),
    ("Hiya", "Hiya", "Hiya"),
];

/// Messages that never change for the life of the process.
#[derive(Debug, Clone)]
pub struct Templates {
    usage: OutboundMessage,
}

impl Templates {
    pub fn new(usage_url: &str) -> Self {
        Self {
            usage: usage_message(usage_url),
        }
    }

    pub fn usage(&self) -> &OutboundMessage {
        &self.usage
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new(DEFAULT_USAGE_URL)
    }
}

fn usage_message(usage_url: &str) -> OutboundMessage {
    OutboundMessage {
        visibility: Visibility::Private,
        text: "*USAGE*".to_string(),
        attachments: vec![Attachment {
            title: Some("USAGE:".to_string()),
            title_link: Some(usage_url.to_string()),
            color: Some("#36a64f".to_string()),
            fields: vec![AttachmentField {
                title: "/vbot hi".to_string(),
                value: "Choose how to say hi to the channel".to_string(),
                short: false,
            }],
            ..Attachment::default()
        }],
    }
}

pub fn greeting(user_name: &str) -> OutboundMessage {
    OutboundMessage {
        visibility: Visibility::Private,
        text: format!(
            "Hello {}! How would you like to greet the channel?",
            user_name
        ),
        attachments: vec![Attachment {
            fallback: Some("actions".to_string()),
            callback_id: Some(GREETINGS_CALLBACK_ID.to_string()),
            actions: GREETING_CHOICES
                .iter()
                .map(|(name, label, value)| AttachmentAction::button(name, label, value))
                .collect(),
            ..Attachment::default()
        }],
    }
}

pub fn echo(value: &str) -> OutboundMessage {
    OutboundMessage::text(Visibility::Public, value)
}

pub fn wave() -> OutboundMessage {
    OutboundMessage::text(Visibility::Public, WAVE)
}
