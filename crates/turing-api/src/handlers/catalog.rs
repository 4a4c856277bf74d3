//! Persona and model catalog handlers.

use axum::{extract::State, Json};

use turing_agent::MODEL_CATALOG;
use turing_models::PERSONA_PRESETS;

use crate::state::AppState;
use crate::types::{ModelListResponse, ModelSummary, PersonaInfo, PersonaListResponse};

/// GET /api/personas - Built-in persona presets.
pub async fn list_personas() -> Json<PersonaListResponse> {
    let personas: Vec<PersonaInfo> = PERSONA_PRESETS.iter().map(PersonaInfo::from).collect();
    let total = personas.len();
    Json(PersonaListResponse { personas, total })
}

/// GET /api/models - Model catalog with provider availability.
pub async fn list_models(State(state): State<AppState>) -> Json<ModelListResponse> {
    let models: Vec<ModelSummary> = MODEL_CATALOG
        .iter()
        .map(|m| ModelSummary::new(m, state.is_available(m.provider)))
        .collect();
    let total = models.len();
    Json(ModelListResponse { models, total })
}
