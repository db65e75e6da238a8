use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use slackline_core::config::SlackConfig;
use slackline_core::AccessCredential;
use tracing::{debug, info, warn};

use crate::commands::{
    CommandOutcome, SlashCommandRegistry, SlashCommandRequest, SlashCommandResponse,
};
use crate::error::{AuthExchangeError, NotificationError};
use crate::oauth::{self, OAuthAccessResponse};

/// Sent when a notification request carries no text.
pub const DEFAULT_NOTIFICATION_TEXT: &str = "Hello!";
pub const NOTIFICATION_SENT_MESSAGE: &str = "Notification sent to Slack channel.";

/// Outbound Slack calls plus the slash-command registry.
///
/// The client never touches storage: the caller hands it a loaded
/// [`AccessCredential`] and persists whatever `exchange_code_for_token` returns.
/// Cloning is cheap; the registry is shared between clones until one of them
/// registers another command.
#[derive(Clone, Debug)]
pub struct SlackClient {
    config: SlackConfig,
    http: Client,
    credential: AccessCredential,
    commands: Arc<SlashCommandRegistry>,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self::with_http_client(config, http))
    }

    pub fn with_http_client(config: SlackConfig, http: Client) -> Self {
        Self {
            config,
            http,
            credential: AccessCredential::default(),
            commands: Arc::new(SlashCommandRegistry::new()),
        }
    }

    pub fn with_credential(mut self, credential: AccessCredential) -> Self {
        self.credential = credential;
        self
    }

    pub fn set_credential(&mut self, credential: AccessCredential) {
        self.credential = credential;
    }

    pub fn credential(&self) -> &AccessCredential {
        &self.credential
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.has_token()
    }

    pub fn get_authorization_url(&self) -> String {
        oauth::authorization_url(
            &self.config.authorize_url,
            &self.config.client_id,
            self.config.scopes.as_slice(),
        )
    }

    pub async fn exchange_code_for_token(
        &self,
        code: &str,
    ) -> Result<AccessCredential, AuthExchangeError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthExchangeError::MissingCode);
        }

        let mut form = vec![
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("code", code),
        ];
        if let Some(redirect_uri) = self.config.redirect_uri.as_deref() {
            form.push(("redirect_uri", redirect_uri));
        }

        let response = self.http.post(self.api_url("oauth.access")).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "slack.oauth.exchange_http_error",
                status = %status,
                "slack oauth.access returned a non-success status"
            );
            return Err(AuthExchangeError::Provider(format!("oauth.access returned HTTP {status}")));
        }

        let payload: OAuthAccessResponse = response.json().await?;
        let credential = match payload.into_credential() {
            Ok(credential) => credential,
            Err(error) => {
                warn!(
                    event_name = "slack.oauth.exchange_rejected",
                    error = %error,
                    "slack rejected the authorization code"
                );
                return Err(error);
            }
        };

        info!(
            event_name = "slack.oauth.exchange_succeeded",
            team_id = credential.team_id.as_deref().unwrap_or("unknown"),
            has_webhook = credential.webhook_url().is_some(),
            "exchanged authorization code for access token"
        );
        Ok(credential)
    }

    pub async fn send_notification(&self, message: &str) -> Result<(), NotificationError> {
        if !self.is_authenticated() {
            return Err(NotificationError::NotAuthenticated);
        }

        if let Some(webhook_url) = self.credential.webhook_url() {
            return self.post_to_webhook(webhook_url, message).await;
        }

        if let Some(channel) = self.config.default_channel.as_deref() {
            return self.post_to_channel(channel, message).await;
        }

        Err(NotificationError::NoDestination)
    }

    async fn post_to_webhook(&self, url: &str, message: &str) -> Result<(), NotificationError> {
        let response = self.http.post(url).json(&WebhookMessage { text: message }).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(event_name = "slack.notification.webhook_sent", "notification posted to webhook");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let reason = if body.trim().is_empty() { format!("HTTP {status}") } else { body };
        warn!(
            event_name = "slack.notification.webhook_rejected",
            status = %status,
            reason = %reason,
            "incoming webhook rejected the notification"
        );
        Err(NotificationError::Provider(reason))
    }

    async fn post_to_channel(&self, channel: &str, message: &str) -> Result<(), NotificationError> {
        let response = self
            .http
            .post(self.api_url("chat.postMessage"))
            .bearer_auth(&self.credential.access_token)
            .json(&PostMessageRequest { channel, text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Provider(format!(
                "chat.postMessage returned HTTP {status}"
            )));
        }

        let payload: ApiResponse = response.json().await?;
        if payload.ok {
            debug!(
                event_name = "slack.notification.channel_sent",
                channel,
                "notification posted with chat.postMessage"
            );
            return Ok(());
        }

        let reason = payload.error.unwrap_or_else(|| "unknown_error".to_string());
        warn!(
            event_name = "slack.notification.channel_rejected",
            channel,
            reason = %reason,
            "chat.postMessage rejected the notification"
        );
        Err(NotificationError::Provider(reason))
    }

    pub fn register_slash_command<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&SlashCommandRequest) -> SlashCommandResponse + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.commands).register(name, handler);
    }

    pub fn slash_commands(&self) -> &SlashCommandRegistry {
        &self.commands
    }

    pub fn dispatch_slash_command(&self, request: &SlashCommandRequest) -> CommandOutcome {
        if self.config.verify_command_token && !self.verification_token_matches(&request.token) {
            warn!(
                event_name = "slack.command.rejected",
                command = %request.command,
                team_id = %request.team_id,
                "slash command verification token mismatch"
            );
            return CommandOutcome::Rejected;
        }

        let outcome = self.commands.dispatch(request);
        debug!(
            event_name = "slack.command.dispatched",
            command = %request.command,
            handled = matches!(outcome, CommandOutcome::Responded(_)),
            "slash command dispatched"
        );
        outcome
    }

    fn verification_token_matches(&self, presented: &str) -> bool {
        let expected = self.config.verification_token.expose_secret();
        !expected.is_empty() && constant_time_eq(expected.as_bytes(), presented.as_bytes())
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/{method}", self.config.api_base_url.trim_end_matches('/'))
    }
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
