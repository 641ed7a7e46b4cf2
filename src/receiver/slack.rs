use std::collections::HashMap;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use vbot_dispatcher::InboundEvent;

use crate::reply::ReplyTarget;
use crate::types::*;

type HmacSha256 = Hmac<Sha256>;

/// Requests older than this are treated as replays.
const MAX_REQUEST_AGE_SECS: u64 = 60 * 5;

pub fn verify_slack_signature(
    signing_secret: &str,
    body: &[u8],
    timestamp: &str,
    signature: &str,
) -> bool {
    verify_slack_signature_at(signing_secret, body, timestamp, signature, Utc::now().timestamp())
}

fn verify_slack_signature_at(
    signing_secret: &str,
    body: &[u8],
    timestamp: &str,
    signature: &str,
    now: i64,
) -> bool {
    let Ok(request_timestamp) = timestamp.parse::<i64>() else {
        return false;
    };
    if now.abs_diff(request_timestamp) > MAX_REQUEST_AGE_SECS {
        return false;
    }

    let Some(expected) = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(signing_secret.as_bytes()) else {
        return false;
    };
    mac.update(format!("v0:{}:", timestamp).as_bytes());
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("interactive payload carries no action")]
    MissingAction,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SlackRequest {
    /// Events API endpoint handshake; echo the challenge back.
    UrlVerification { challenge: String },
    Event {
        event: InboundEvent,
        target: ReplyTarget,
    },
    Ignored(String),
}

pub fn parse_request(content_type: &str, body: &str) -> Result<SlackRequest, ParseError> {
    if content_type.starts_with("application/json") {
        return parse_events_api(body);
    }

    let params: HashMap<String, String> = serde_urlencoded::from_str(body)?;
    match params.get("payload") {
        Some(payload) => parse_interactive(payload),
        None => {
            let command: SlackCommand = serde_urlencoded::from_str(body)?;
            tracing::info!(
                user_id = %command.user_id,
                channel = %command.channel_name,
                command = %command.command,
                text = %command.text,
                "slash command received"
            );
            Ok(SlackRequest::Event {
                event: InboundEvent::SlashCommand {
                    command: command.command,
                    text: command.text,
                    user_name: command.user_name,
                },
                target: ReplyTarget::ResponseUrl(command.response_url),
            })
        }
    }
}

fn parse_interactive(payload: &str) -> Result<SlackRequest, ParseError> {
    let payload: InteractivePayload = serde_json::from_str(payload)?;
    let action = payload.actions.first().ok_or(ParseError::MissingAction)?;

    // Legacy attachments correlate on callback_id, Block Kit on action_id.
    let action_id = payload
        .callback_id
        .clone()
        .or_else(|| action.action_id.clone())
        .unwrap_or_default();
    let selected_value = action
        .value
        .clone()
        .or_else(|| action.selected_options.first().map(|o| o.value.clone()))
        .unwrap_or_default();

    tracing::info!(
        kind = %payload.kind,
        action_id = %action_id,
        user_id = payload.user.as_ref().map(|u| u.id.as_str()).unwrap_or(""),
        "interactive action received"
    );

    Ok(SlackRequest::Event {
        event: InboundEvent::InteractiveAction {
            action_id,
            selected_value,
        },
        target: ReplyTarget::ResponseUrl(payload.response_url),
    })
}

fn parse_events_api(body: &str) -> Result<SlackRequest, ParseError> {
    let event = match serde_json::from_str::<EventsApiBody>(body)? {
        EventsApiBody::UrlVerification { challenge } => {
            return Ok(SlackRequest::UrlVerification { challenge })
        }
        EventsApiBody::EventCallback { event } => event,
        EventsApiBody::Other => return Ok(SlackRequest::Ignored("unsupported envelope".into())),
    };

    match event {
        CallbackEvent::ReactionAdded {
            user,
            reaction,
            item,
        } => match item.channel {
            Some(channel) => {
                tracing::info!(user_id = %user, reaction = %reaction, channel = %channel, "reaction added");
                Ok(SlackRequest::Event {
                    event: InboundEvent::ReactionAdded { reaction },
                    target: ReplyTarget::Channel { channel, user },
                })
            }
            None => Ok(SlackRequest::Ignored("reaction on an item outside a channel".into())),
        },
        CallbackEvent::Other => Ok(SlackRequest::Ignored("unsupported event type".into())),
    }
}
