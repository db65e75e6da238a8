use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Form-encoded payload Slack posts when a user runs a slash command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashCommandRequest {
    pub token: String,
    pub team_id: String,
    pub team_domain: String,
    pub channel_id: String,
    pub channel_name: String,
    pub user_id: String,
    pub user_name: String,
    pub command: String,
    pub text: String,
    pub response_url: String,
    pub trigger_id: String,
}

impl SlashCommandRequest {
    pub fn new(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self { command: command.into(), text: text.into(), ..Self::default() }
    }

    /// Builds a request from already-decoded form fields; absent fields are empty.
    pub fn from_parameters(parameters: &HashMap<String, String>) -> Self {
        let field = |key: &str| parameters.get(key).cloned().unwrap_or_default();
        Self {
            token: field("token"),
            team_id: field("team_id"),
            team_domain: field("team_domain"),
            channel_id: field("channel_id"),
            channel_name: field("channel_name"),
            user_id: field("user_id"),
            user_name: field("user_name"),
            command: field("command"),
            text: field("text"),
            response_url: field("response_url"),
            trigger_id: field("trigger_id"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlashCommandResponse {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlashCommandResponse {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::InChannel, text: text.into() }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Responded(SlashCommandResponse),
    /// No handler is registered for the command; nothing is sent back.
    Ignored,
    /// The payload's verification token did not match the configured one.
    Rejected,
}

pub type SlashCommandHandler =
    Arc<dyn Fn(&SlashCommandRequest) -> SlashCommandResponse + Send + Sync>;

#[derive(Clone, Default)]
pub struct SlashCommandRegistry {
    handlers: HashMap<String, SlashCommandHandler>,
}

impl SlashCommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&SlashCommandRequest) -> SlashCommandResponse + Send + Sync + 'static,
    {
        self.handlers.insert(normalize_command_name(&name.into()), Arc::new(handler));
    }

    pub fn dispatch(&self, request: &SlashCommandRequest) -> CommandOutcome {
        let Some(handler) = self.handlers.get(&normalize_command_name(&request.command)) else {
            return CommandOutcome::Ignored;
        };

        CommandOutcome::Responded(handler(request))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&normalize_command_name(name))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn command_names(&self) -> Vec<&str> {
        let mut names = self.handlers.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for SlashCommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommandRegistry").field("commands", &self.command_names()).finish()
    }
}

/// Slack always sends the leading slash; registrations may omit it.
fn normalize_command_name(raw: &str) -> String {
    let trimmed = raw.trim().to_ascii_lowercase();
    if trimmed.starts_with('/') {
        trimmed
    } else {
        format!("/{trimmed}")
    }
}
