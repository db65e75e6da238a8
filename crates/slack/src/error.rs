use thiserror::Error;

/// Failure while trading an authorization code for an access token.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthExchangeError {
    #[error("authorization code missing from OAuth callback")]
    MissingCode,
    #[error("Slack rejected the authorization: {0}")]
    Provider(String),
    #[error("could not reach Slack: {0}")]
    Transport(String),
    #[error("unexpected response from Slack: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("The application is not connected to Slack yet. Add it to Slack first.")]
    NotAuthenticated,
    #[error("No incoming webhook or default channel is configured for notifications.")]
    NoDestination,
    #[error("Slack rejected the notification: {0}")]
    Provider(String),
    #[error("could not reach Slack: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for AuthExchangeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
