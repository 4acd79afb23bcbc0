use crate::error::HearthError;
use crate::server::router::HearthState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use hearth_schema::{ChatReply, ChatRequest};
use tracing::debug;

pub(super) async fn chat_handler(
    State(state): State<HearthState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, HearthError> {
    let Json(request) = payload?;

    debug!(
        message_chars = request.message.chars().count(),
        preserve_context = request.preserve_context,
        "Incoming chat request"
    );

    let routed = state
        .router
        .send(&request.message, request.preserve_context)
        .await?;

    Ok(Json(ChatReply {
        response: routed.text,
        provider: routed.provider,
        timestamp: Utc::now(),
        tokens_used: routed.tokens_used,
    }))
}
