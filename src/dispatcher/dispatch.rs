use crate::messages::{self, Templates, GREETINGS_CALLBACK_ID};
use crate::types::{InboundEvent, OutboundMessage};

pub const VBOT_COMMAND: &str = "/vbot";

pub struct Dispatcher {
    templates: Templates,
}

impl Dispatcher {
    pub fn new(templates: Templates) -> Self {
        Self { templates }
    }

    /// Picks the reply for `event`. Returns `None` only for interactive
    /// callbacks this bot never registered.
    pub fn handle(&self, event: &InboundEvent) -> Option<OutboundMessage> {
        match event {
            InboundEvent::SlashCommand {
                command,
                text,
                user_name,
            } => {
                if command != VBOT_COMMAND {
                    tracing::warn!(command = %command, "unknown slash command, sending usage");
                    return Some(self.templates.usage().clone());
                }
                match text.trim() {
                    "hi" => Some(messages::greeting(user_name)),
                    other => {
                        tracing::debug!(text = other, "unrecognized subcommand, sending usage");
                        Some(self.templates.usage().clone())
                    }
                }
            }
            InboundEvent::InteractiveAction {
                action_id,
                selected_value,
            } => {
                if action_id == GREETINGS_CALLBACK_ID {
                    Some(messages::echo(selected_value))
                } else {
                    tracing::warn!(action_id = %action_id, "ignoring unregistered interactive action");
                    None
                }
            }
            InboundEvent::ReactionAdded { reaction } => {
                tracing::debug!(reaction = %reaction, "reaction added");
                Some(messages::wave())
            }
        }
    }
}
