//! Wire formats Slack posts to the endpoint.

use serde::Deserialize;

/// Form body of a slash command invocation.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct SlackCommand {
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
}

/// JSON carried in the `payload` field of an interactive callback.
#[derive(Debug, Deserialize)]
pub struct InteractivePayload {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub callback_id: Option<String>,
    #[serde(default)]
    pub actions: Vec<PayloadAction>,
    pub response_url: String,
    #[serde(default)]
    pub user: Option<PayloadUser>,
}

#[derive(Debug, Deserialize)]
pub struct PayloadAction {
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Debug, Deserialize)]
pub struct SelectedOption {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PayloadUser {
    pub id: String,
}

/// Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventsApiBody {
    UrlVerification { challenge: String },
    EventCallback { event: CallbackEvent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    ReactionAdded {
        #[serde(default)]
        user: String,
        reaction: String,
        item: ReactionItem,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct ReactionItem {
    #[serde(default)]
    pub channel: Option<String>,
}
