use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdminId, ClientId, ClientRegistration, TrackType};
use super::repository::{ClientRepository, RepositoryError, ReviewNoticePublisher};
use super::service::{ApplicationServiceError, ApplicationStatusEngine};
use super::transitions::TransitionError;

type Engine<R, N> = Arc<ApplicationStatusEngine<R, N>>;

#[derive(Debug, Deserialize)]
pub(crate) struct ValidateRequest {
    pub(crate) validator_id: String,
    #[serde(default)]
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

/// Router exposing registration, track transitions, views, and the admin
/// dashboard aggregates.
pub fn client_router<R, N>(engine: Engine<R, N>) -> Router
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    Router::new()
        .route("/api/v1/clients", post(register_handler::<R, N>))
        .route("/api/v1/clients/:client_id", get(client_handler::<R, N>))
        .route(
            "/api/v1/clients/:client_id/tracks/:track/submit",
            post(submit_handler::<R, N>),
        )
        .route(
            "/api/v1/clients/:client_id/tracks/:track/validate",
            post(validate_handler::<R, N>),
        )
        .route(
            "/api/v1/clients/:client_id/tracks/:track/reject",
            post(reject_handler::<R, N>),
        )
        .route(
            "/api/v1/clients/:client_id/tracks/:track/view",
            get(view_handler::<R, N>),
        )
        .route("/api/v1/admin/aggregates", get(aggregates_handler::<R, N>))
        .with_state(engine)
}

pub(crate) async fn register_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Json(registration): Json<ClientRegistration>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    match engine.register_client(registration, engine.now()) {
        Ok(client) => (StatusCode::CREATED, Json(client)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn client_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Path(client_id): Path<String>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    match engine.get_client(&ClientId(client_id)) {
        Ok(client) => (StatusCode::OK, Json(client)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Path((client_id, track)): Path<(String, TrackType)>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    match engine.submit_track(&ClientId(client_id), track, engine.now()) {
        Ok(state) => (StatusCode::ACCEPTED, Json(state)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn validate_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Path((client_id, track)): Path<(String, TrackType)>,
    Json(request): Json<ValidateRequest>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    let validator = AdminId(request.validator_id);
    match engine.validate_track(
        &ClientId(client_id),
        track,
        &validator,
        request.notes,
        engine.now(),
    ) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reject_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Path((client_id, track)): Path<(String, TrackType)>,
    request: Option<Json<RejectRequest>>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    // No body, or a body without `reason`, records a blank reason.
    let reason = request
        .and_then(|Json(request)| request.reason)
        .unwrap_or_default();
    match engine.reject_track(&ClientId(client_id), track, reason, engine.now()) {
        Ok(state) => (StatusCode::OK, Json(state)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn view_handler<R, N>(
    State(engine): State<Engine<R, N>>,
    Path((client_id, track)): Path<(String, TrackType)>,
) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    match engine.project_track_view(&ClientId(client_id), track, engine.now()) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn aggregates_handler<R, N>(State(engine): State<Engine<R, N>>) -> Response
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    match engine.list_aggregates(engine.now()) {
        Ok(aggregates) => (StatusCode::OK, Json(aggregates)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ApplicationServiceError) -> Response {
    let message = err.to_string();
    match err {
        ApplicationServiceError::Transition(TransitionError::SubmissionBlocked {
            hours_left,
            minutes_left,
        }) => {
            let payload = json!({
                "error": message,
                "kind": "submission_blocked",
                "hours_left": hours_left,
                "minutes_left": minutes_left,
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Transition(transition) => {
            let payload = json!({
                "error": message,
                "kind": transition.kind(),
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::ConcurrentModification { .. } => {
            let payload = json!({
                "error": message,
                "kind": "concurrent_modification",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Registration(_) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "client already registered" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "client not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            let payload = json!({ "error": message });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
