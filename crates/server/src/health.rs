use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use slackline_core::CredentialStore;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    store: Arc<dyn CredentialStore>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub credential_store: HealthCheck,
    pub checked_at: String,
}

pub fn router(store: Arc<dyn CredentialStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { store })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    store: Arc<dyn CredentialStore>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.health.start",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(error) = axum::serve(listener, router(store)).await {
            error!(
                event_name = "system.health.error",
                error = %error,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

/// Ready while the credential store is usable. A fresh install with no
/// stored token reports the store as `pending` but stays ready, since the
/// page still serves the "Add to Slack" link.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let credential_store = credential_check(state.store.as_ref());
    let ready = credential_store.status != "degraded";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "slackline-server runtime initialized".to_string(),
        },
        credential_store,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn credential_check(store: &dyn CredentialStore) -> HealthCheck {
    if let Err(error) = store.check() {
        return HealthCheck { status: "degraded", detail: error.to_string() };
    }

    let credential = store.load();
    if credential.has_token() {
        let team = credential.team_name.as_deref().unwrap_or("unknown team");
        HealthCheck {
            status: "ready",
            detail: format!("access token stored in {} for {team}", store.describe()),
        }
    } else {
        HealthCheck {
            status: "pending",
            detail: format!(
                "no access token stored yet in {}; add the app to Slack",
                store.describe()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use slackline_core::{AccessCredential, FileCredentialStore, InMemoryCredentialStore};
    use tempfile::TempDir;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_returns_ready_when_a_credential_is_stored() {
        let store = InMemoryCredentialStore::with_credential(AccessCredential {
            team_name: Some("Acme".to_string()),
            ..AccessCredential::new("tok-1")
        });

        let (status, Json(payload)) = health(State(HealthState { store: Arc::new(store) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.credential_store.status, "ready");
        assert!(payload.credential_store.detail.contains("Acme"));
        assert_eq!(payload.service.status, "ready");
    }

    #[tokio::test]
    async fn health_is_ready_with_pending_store_before_the_app_is_added() {
        let store = InMemoryCredentialStore::new();

        let (status, Json(payload)) = health(State(HealthState { store: Arc::new(store) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.credential_store.status, "pending");
        assert!(payload.credential_store.detail.contains("no access token stored yet"));
        assert!(payload.credential_store.detail.contains("in-memory"));
    }

    #[tokio::test]
    async fn health_is_ready_when_the_credential_file_does_not_exist_yet() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path().join("access.txt"));

        let (status, Json(payload)) = health(State(HealthState { store: Arc::new(store) })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.credential_store.status, "pending");
    }

    #[tokio::test]
    async fn health_returns_service_unavailable_when_the_store_is_unreadable() {
        let dir = TempDir::new().expect("tempdir");
        let store = FileCredentialStore::new(dir.path());

        let (status, Json(payload)) = health(State(HealthState { store: Arc::new(store) })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.credential_store.status, "degraded");
        assert!(payload.credential_store.detail.contains("could not read credential file"));
        assert_eq!(payload.service.status, "ready");
    }
}
