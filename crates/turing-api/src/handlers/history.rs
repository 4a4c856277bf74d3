//! History handler.

use axum::{extract::State, Json};

use crate::error::Result;
use crate::state::AppState;
use crate::types::{ConversationResponse, HistoryResponse};

/// GET /api/history - Completed conversations, newest first.
pub async fn list_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let conversations: Vec<ConversationResponse> = state
        .orchestrator
        .history()
        .await?
        .iter()
        .map(ConversationResponse::from)
        .collect();
    let total = conversations.len();

    Ok(Json(HistoryResponse {
        conversations,
        total,
    }))
}
