//! Conversation lifecycle handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use turing_models::ConversationId;

use crate::error::Result;
use crate::state::AppState;
use crate::types::{ConversationResponse, CreateConversationRequest, SubmitMessageRequest};

/// POST /api/conversations - Create an idle conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationResponse>)> {
    let config = req.into_config()?;
    let conversation = state.orchestrator.create(config).await?;

    Ok((
        StatusCode::CREATED,
        Json(ConversationResponse::from(&conversation)),
    ))
}

/// GET /api/conversations/:id - Live or archived conversation.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = state
        .orchestrator
        .get(&ConversationId::from_string(id))
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

/// POST /api/conversations/:id/start - Activate and let the Interrogator open.
pub async fn start_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = state
        .orchestrator
        .start(&ConversationId::from_string(id))
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

/// POST /api/conversations/:id/advance - Produce the next AI turn.
pub async fn advance_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = state
        .orchestrator
        .advance(&ConversationId::from_string(id))
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

/// POST /api/conversations/:id/message - Human stand-in speaks.
pub async fn submit_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitMessageRequest>,
) -> Result<Json<ConversationResponse>> {
    let content = req.content()?;
    let conversation = state
        .orchestrator
        .submit_human_message(&ConversationId::from_string(id), content)
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

/// POST /api/conversations/:id/end - Adjudicate now.
pub async fn end_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>> {
    let conversation = state
        .orchestrator
        .end(&ConversationId::from_string(id))
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}
