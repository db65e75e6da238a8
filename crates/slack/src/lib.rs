//! Slack Integration - OAuth, notifications and slash commands
//!
//! This crate provides the Slack interface for slackline:
//! - **OAuth** (`oauth`) - "Add to Slack" link and the `oauth.access` response model
//! - **Client** (`client`) - token exchange, notifications, slash-command dispatch
//! - **Slash Commands** (`commands`) - payload types and the handler registry
//! - **Jokes** (`jokes`) - the demo `/joke` command
//!
//! # Getting Started
//!
//! 1. Create a Slack app at https://api.slack.com/apps
//! 2. Add an incoming webhook and a slash command pointing at `<host>/?action=command`
//! 3. Set the OAuth redirect URL to `<host>/?action=oauth`
//! 4. Set env vars: `SLACKLINE_SLACK_CLIENT_ID`, `SLACKLINE_SLACK_CLIENT_SECRET`,
//!    `SLACKLINE_SLACK_VERIFICATION_TOKEN`
//!
//! # Architecture
//!
//! ```text
//! CredentialStore ─load─▶ SlackClient ─▶ oauth.access / incoming webhook
//!        ▲                     │
//!        └──────save───────────┘ (caller persists exchanged credentials)
//! ```

pub mod client;
pub mod commands;
pub mod error;
pub mod jokes;
pub mod oauth;

pub use client::{SlackClient, DEFAULT_NOTIFICATION_TEXT, NOTIFICATION_SENT_MESSAGE};
pub use commands::{
    CommandOutcome, ResponseType, SlashCommandRegistry, SlashCommandRequest, SlashCommandResponse,
};
pub use error::{AuthExchangeError, NotificationError};
