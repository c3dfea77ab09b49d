//! Axum route handlers for the job ad form API.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::job_ad::form::{FormModel, ProvenanceSet};
use crate::job_ad::models::{FieldValue, FormField, Vocabulary, VOCABULARY};
use crate::job_ad::pipeline::{generate_into_form, GenerationReport};
use crate::job_ad::session::SessionHandle;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub form: FormModel,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub form: FormModel,
    pub report: GenerationReport,
}

#[derive(Debug, Deserialize)]
pub struct FieldEditRequest {
    pub field: String,
    pub value: FieldValue,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub values: BTreeMap<FormField, FieldValue>,
    /// Fields submitted with the assistant's value, never touched by the user.
    pub unreviewed: ProvenanceSet,
}

async fn session(state: &AppState, id: Uuid) -> Result<SessionHandle, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/job-ad/vocabulary
///
/// The fixed values the form offers for enum-typed fields.
pub async fn handle_vocabulary() -> Json<Vocabulary> {
    Json(VOCABULARY)
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, handle) = state.sessions.create().await;
    info!("Session {session_id} started ({} active)", state.sessions.len().await);
    let form = handle.lock().await.clone();
    (StatusCode::CREATED, Json(SessionResponse { session_id, form }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = session(&state, session_id).await?;
    let form = handle.lock().await.clone();
    Ok(Json(SessionResponse { session_id, form }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.sessions.remove(session_id).await {
        return Err(AppError::NotFound(format!("Session {session_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/generate
///
/// Runs the AI pipeline on the recruiter's description and prefills the form.
/// On any error the form keeps its previous state.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload?;
    let handle = session(&state, session_id).await?;
    let mut form = handle.lock().await;

    info!("Generating job ad for session {session_id}");
    let report = generate_into_form(
        state.backend.as_ref(),
        &mut form,
        &request.description,
        &state.generation,
    )
    .await?;

    Ok(Json(GenerateResponse {
        session_id,
        form: form.clone(),
        report,
    }))
}

/// PATCH /api/v1/sessions/:id/fields
///
/// A direct user edit. The value is stored as given and the field loses its
/// ai-filled marker.
pub async fn handle_edit_field(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    payload: Result<Json<FieldEditRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let Json(request) = payload?;
    let field: FormField = request
        .field
        .parse()
        .map_err(|e| AppError::Validation(format!("{e}")))?;

    let handle = session(&state, session_id).await?;
    let mut form = handle.lock().await;
    form.edit(field, request.value);

    Ok(Json(SessionResponse {
        session_id,
        form: form.clone(),
    }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let handle = session(&state, session_id).await?;
    let mut form = handle.lock().await;
    form.reset();

    Ok(Json(SessionResponse {
        session_id,
        form: form.clone(),
    }))
}

/// POST /api/v1/sessions/:id/submit
///
/// Echoes the collected values back. Nothing is stored.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    let handle = session(&state, session_id).await?;
    let form = handle.lock().await;
    let values = form.values().clone();
    let unreviewed = form.ai_filled();
    info!(
        "Session {session_id} submitted {} fields ({} unreviewed)",
        values.len(),
        unreviewed.len()
    );

    Ok(Json(SubmitResponse {
        session_id,
        submitted_at: Utc::now(),
        values,
        unreviewed,
    }))
}
