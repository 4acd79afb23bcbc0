pub mod chat;
pub mod status;

use crate::server::router::HearthState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes mounted under `/api` behind the key guard.
pub fn api_router() -> Router<HearthState> {
    Router::new()
        .route("/chat", post(chat::chat_handler))
        .route("/ai-status", get(status::ai_status_handler))
        .route(
            "/reset-conversation",
            post(status::reset_conversation_handler),
        )
}
