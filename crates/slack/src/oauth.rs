//! OAuth v1 ("Add to Slack") helpers.
//!
//! The authorize link is pure string construction. The token exchange response
//! is modelled here so the client can turn it into an [`AccessCredential`].

use serde::Deserialize;
use slackline_core::{AccessCredential, IncomingWebhook};

use crate::error::AuthExchangeError;

/// Builds `<authorize_url>?scope=<a,b>&client_id=<id>`.
///
/// Scopes are comma-joined as Slack expects; each scope and the client id are
/// percent-encoded individually so the separating commas stay literal.
pub fn authorization_url<S: AsRef<str>>(authorize_url: &str, client_id: &str, scopes: &[S]) -> String {
    let scope = scopes
        .iter()
        .map(|scope| scope.as_ref().trim())
        .filter(|scope| !scope.is_empty())
        .map(|scope| urlencoding::encode(scope).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    let separator = if authorize_url.contains('?') { '&' } else { '?' };

    format!(
        "{authorize_url}{separator}scope={scope}&client_id={client_id}",
        client_id = urlencoding::encode(client_id.trim()),
    )
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OAuthAccessResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub incoming_webhook: Option<IncomingWebhook>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl OAuthAccessResponse {
    pub fn into_credential(self) -> Result<AccessCredential, AuthExchangeError> {
        if !self.ok {
            return Err(AuthExchangeError::Provider(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        let access_token = self
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AuthExchangeError::Decode("response carried no access_token".to_string()))?;

        let mut extra = self.extra;
        extra.remove("warning");
        extra.remove("response_metadata");

        Ok(AccessCredential {
            access_token,
            scope: self.scope,
            team_name: self.team_name,
            team_id: self.team_id,
            incoming_webhook: self.incoming_webhook,
            extra,
        })
    }
}
