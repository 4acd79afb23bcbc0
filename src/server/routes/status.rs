use crate::error::HearthError;
use crate::failover::ProviderStatus;
use crate::server::router::HearthState;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AiStatusReply {
    pub providers: Vec<ProviderStatus>,
    pub total_providers: usize,
    pub available_providers: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ResetReply {
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthReply {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub(super) async fn ai_status_handler(
    State(state): State<HearthState>,
) -> Result<Json<AiStatusReply>, HearthError> {
    let providers = state.router.provider_status().await?;
    // Quota-exhausted providers keep `available = true` but cannot take traffic.
    let available_providers = providers
        .iter()
        .filter(|p| p.available && p.messages_used < p.daily_limit)
        .count();

    Ok(Json(AiStatusReply {
        total_providers: providers.len(),
        available_providers,
        providers,
        timestamp: Utc::now(),
    }))
}

pub(super) async fn reset_conversation_handler(
    State(state): State<HearthState>,
) -> Result<Json<ResetReply>, HearthError> {
    state.router.reset_conversation().await?;
    Ok(Json(ResetReply {
        message: "Conversation context reset",
        timestamp: Utc::now(),
    }))
}

pub(crate) async fn health_handler() -> Json<HealthReply> {
    Json(HealthReply {
        status: "ok",
        timestamp: Utc::now(),
    })
}
