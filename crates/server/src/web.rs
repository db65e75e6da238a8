//! Landing page and Slack callback routes.
//!
//! - `GET  /`: render the page, or run `action=oauth` from the OAuth redirect
//! - `POST /`: page form submissions and slash-command payloads (`action=command`)

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use slackline_core::CredentialStore;
use slackline_slack::{CommandOutcome, SlackClient};
use tera::Tera;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::dispatch::{do_action, ActionOutcome, ActionRequest};
use crate::page::{render_page, PageView};

#[derive(Clone)]
pub struct AppState {
    /// Configured client without a credential; each request installs its own.
    pub slack: SlackClient,
    pub store: Arc<dyn CredentialStore>,
    pub templates: Arc<Tera>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    handle(&state, query).await
}

async fn submit(
    State(state): State<AppState>,
    Query(mut query): Query<HashMap<String, String>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    match form {
        // Form fields win over query parameters with the same name.
        Ok(Form(form)) => query.extend(form),
        // A bodiless POST carries its parameters in the query string only.
        Err(FormRejection::InvalidFormContentType(_)) => {}
        Err(rejection) => return rejection.into_response(),
    }
    handle(&state, query).await
}

async fn handle(state: &AppState, parameters: HashMap<String, String>) -> Response {
    let request_id = Uuid::new_v4().simple().to_string();
    let request = ActionRequest::from_parameters(parameters);
    let action = request.action.map(|action| action.as_str()).unwrap_or("none");

    let mut client = state.slack.clone().with_credential(state.store.load());
    let outcome = do_action(&mut client, state.store.as_ref(), &request).await;

    match outcome {
        ActionOutcome::Command(CommandOutcome::Responded(response)) => {
            info!(event_name = "web.command.responded", request_id = %request_id, "slash command answered");
            Json(response).into_response()
        }
        ActionOutcome::Command(CommandOutcome::Ignored) => {
            info!(event_name = "web.command.ignored", request_id = %request_id, "no handler for slash command");
            StatusCode::OK.into_response()
        }
        ActionOutcome::Command(CommandOutcome::Rejected) => {
            warn!(
                event_name = "web.command.rejected",
                request_id = %request_id,
                "slash command verification token mismatch"
            );
            StatusCode::UNAUTHORIZED.into_response()
        }
        ActionOutcome::Page { result_message } => {
            let view = PageView {
                result_message,
                authenticated: client.is_authenticated(),
                authorization_url: client.get_authorization_url(),
            };
            match render_page(&state.templates, &view) {
                Ok(html) => {
                    info!(
                        event_name = "web.page.rendered",
                        request_id = %request_id,
                        action,
                        authenticated = view.authenticated,
                        "page rendered"
                    );
                    Html(html).into_response()
                }
                Err(e) => {
                    error!(
                        event_name = "web.page.template_error",
                        request_id = %request_id,
                        error = ?e,
                        "page template failed to render"
                    );
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Html("<h1>Template Error</h1>".to_string()),
                    )
                        .into_response()
                }
            }
        }
    }
}
