//! # Request Handlers
//!
//! File: cli/src/commands/serve/handlers.rs
//!
//! ## Overview
//!
//! One handler per route, all sharing [`AppState`]. Each request makes exactly
//! one `Responder::respond` call. Empty input is the only client error; every
//! backend problem has already been turned into a fallback reply by the time
//! it reaches this layer.
//!
use crate::bot::{ReplySource, Responder};
use crate::core::error::CauseurError;
use crate::core::templating::{ChatView, PageRenderer};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, error};

/// Shown when a handler panics.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne du serveur.";
const INVALID_JSON_MESSAGE: &str = "Requête JSON invalide. Format attendu : {\"message\": \"...\"}";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub responder: Arc<dyn Responder>,
    pub pages: Arc<PageRenderer>,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub source: ReplySource,
}

/// Errors surfaced by the handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<CauseurError>() {
            Some(e) if e.is_validation() => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_MESSAGE.to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// `GET /`: the empty form.
pub async fn show_form(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.pages.render_chat(&ChatView::default())?))
}

/// `POST /`: answer the `query` field and re-render the form.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let view = match state.responder.respond(&form.query).await {
        Ok(reply) => ChatView {
            user_input: form.query,
            response: Some(reply.text),
            error: None,
        },
        Err(err) => match ApiError::from(err) {
            ApiError::BadRequest(message) => {
                let page = state.pages.render_chat(&ChatView {
                    user_input: form.query,
                    response: None,
                    error: Some(message),
                })?;
                return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
            }
            internal => return Err(internal),
        },
    };
    Ok(Html(state.pages.render_chat(&view)?).into_response())
}

/// `POST /api/chat`: JSON in, JSON out.
pub async fn api_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Rejected chat payload: {}", rejection);
        ApiError::BadRequest(INVALID_JSON_MESSAGE.to_string())
    })?;
    let reply = state.responder.respond(&request.message).await?;
    Ok(Json(ChatResponse {
        response: reply.text,
        source: reply.source,
    }))
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Turns a handler panic into a JSON 500 instead of a dropped connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Handler panicked: {}", details);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_become_bad_requests() {
        let err: anyhow::Error = CauseurError::EmptyMessage.into();
        assert!(matches!(ApiError::from(err), ApiError::BadRequest(_)));

        let err: anyhow::Error = CauseurError::FileSystem("disk full".into()).into();
        assert!(matches!(ApiError::from(err), ApiError::Internal(_)));
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn panic_handler_reports_generic_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
