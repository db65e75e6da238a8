//! One-shot action selection for a single page request.
//!
//! Provider errors stop here: they become the page's result message and are
//! never retried.

use std::collections::HashMap;

use slackline_core::CredentialStore;
use slackline_slack::{
    CommandOutcome, SlackClient, SlashCommandRequest, DEFAULT_NOTIFICATION_TEXT,
    NOTIFICATION_SENT_MESSAGE,
};
use tracing::{info, warn};

pub const OAUTH_SUCCESS_MESSAGE: &str =
    "The application was successfully added to your Slack channel";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    OAuth,
    SendNotification,
    Command,
}

impl Action {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "oauth" => Some(Self::OAuth),
            "send_notification" => Some(Self::SendNotification),
            "command" => Some(Self::Command),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuth => "oauth",
            Self::SendNotification => "send_notification",
            Self::Command => "command",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Option<Action>,
    pub parameters: HashMap<String, String>,
}

impl ActionRequest {
    pub fn from_parameters(parameters: HashMap<String, String>) -> Self {
        let action = parameters.get("action").and_then(|raw| Action::parse(raw));
        Self { action, parameters }
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Render the page; an empty message renders no notice.
    Page { result_message: String },
    /// Reply to Slack directly; nothing is rendered.
    Command(CommandOutcome),
}

impl ActionOutcome {
    fn message(result_message: impl Into<String>) -> Self {
        Self::Page { result_message: result_message.into() }
    }
}

/// Runs the requested action. On a successful OAuth exchange the new
/// credential is persisted and installed on `client`, so the page rendered
/// afterwards reflects the authenticated state.
pub async fn do_action(
    client: &mut SlackClient,
    store: &dyn CredentialStore,
    request: &ActionRequest,
) -> ActionOutcome {
    let Some(action) = request.action else {
        return ActionOutcome::message("");
    };

    match action {
        Action::OAuth => {
            let code = request.parameter("code").unwrap_or_default();
            let credential = match client.exchange_code_for_token(code).await {
                Ok(credential) => credential,
                Err(error) => return ActionOutcome::message(error.to_string()),
            };

            if let Err(error) = store.save(&credential) {
                warn!(
                    event_name = "dispatch.oauth.persist_failed",
                    store = %store.describe(),
                    error = %error,
                    "exchanged credential could not be saved"
                );
                return ActionOutcome::message(format!(
                    "Slack authorized the application, but the access token could not be saved: {error}"
                ));
            }

            info!(
                event_name = "dispatch.oauth.persisted",
                store = %store.describe(),
                "access credential saved"
            );
            client.set_credential(credential);
            ActionOutcome::message(OAUTH_SUCCESS_MESSAGE)
        }
        Action::SendNotification => {
            let text = request
                .parameter("text")
                .filter(|text| !text.trim().is_empty())
                .unwrap_or(DEFAULT_NOTIFICATION_TEXT);

            match client.send_notification(text).await {
                Ok(()) => ActionOutcome::message(NOTIFICATION_SENT_MESSAGE),
                Err(error) => ActionOutcome::message(error.to_string()),
            }
        }
        Action::Command => {
            let command = SlashCommandRequest::from_parameters(&request.parameters);
            ActionOutcome::Command(client.dispatch_slash_command(&command))
        }
    }
}
