//! HTTP trigger endpoint. Receives new-modmail events and runs the evaluator.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info_span};
use uuid::Uuid;

use crate::error::Error;
use crate::highlight::HighlightEvaluator;
use crate::modmail::ModMailEvent;
use crate::settings::SettingsStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<HighlightEvaluator>,
    /// Read once per delivered event.
    pub settings: Arc<dyn SettingsStore>,
}

/// Build the router with the modmail trigger and health routes.
pub fn trigger_routes(
    evaluator: Arc<HighlightEvaluator>,
    settings: Arc<dyn SettingsStore>,
) -> Router {
    let state = AppState {
        evaluator,
        settings,
    };

    Router::new()
        .route("/health", get(health))
        .route("/triggers/modmail", post(on_mod_mail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "modmail-highlight"
    }))
}

async fn on_mod_mail(
    State(state): State<AppState>,
    Json(event): Json<ModMailEvent>,
) -> impl IntoResponse {
    let span = info_span!(
        "modmail_trigger",
        delivery_id = %Uuid::new_v4(),
        conversation_id = %event.conversation_id,
    );

    async move {
        match state.evaluator.handle(state.settings.as_ref(), &event).await {
            Ok(evaluation) => (StatusCode::OK, Json(json!(evaluation))),
            Err(e) => {
                error!(error = %e, "Modmail trigger failed");
                (status_for(&e), Json(json!({ "error": e.to_string() })))
            }
        }
    }
    .instrument(span)
    .await
}

/// Upstream modmail failures are 502 so the dispatcher can tell them from local faults.
fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::ModMail(_) => StatusCode::BAD_GATEWAY,
        Error::Settings(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
