use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::aggregate::{aggregate, ClientAggregates};
use super::clock::{Clock, SystemClock};
use super::domain::{
    AdminId, Client, ClientId, ClientRegistration, Track, TrackType, ValidationStamp,
};
use super::intake::{normalize_registration, RegistrationError};
use super::repository::{
    ClientRepository, RepositoryError, ReviewNotice, ReviewNoticePublisher,
};
use super::transitions::{ReviewAction, TransitionError};
use super::view::{project_track_view, TrackViewResponse};

/// Application Status Engine: owns every status change on a client's tracks.
pub struct ApplicationStatusEngine<R, N> {
    repository: Arc<R>,
    notices: Arc<N>,
    clock: Arc<dyn Clock>,
}

static CLIENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    let id = CLIENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ClientId(format!("client-{id:06}"))
}

impl<R, N> ApplicationStatusEngine<R, N>
where
    R: ClientRepository + 'static,
    N: ReviewNoticePublisher + 'static,
{
    pub fn new(repository: Arc<R>, notices: Arc<N>) -> Self {
        Self::with_clock(repository, notices, Arc::new(SystemClock))
    }

    pub fn with_clock(repository: Arc<R>, notices: Arc<N>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            notices,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a client from the public site. All tracks start unsubmitted.
    pub fn register_client(
        &self,
        registration: ClientRegistration,
        now: DateTime<Utc>,
    ) -> Result<Client, ApplicationServiceError> {
        let registration = normalize_registration(registration)?;

        let client = Client::new(next_client_id(), registration.name, registration.email, now);
        let stored = self.repository.insert(client)?;
        info!(client_id = %stored.id.0, "client registered");
        Ok(stored)
    }

    pub fn get_client(&self, id: &ClientId) -> Result<Client, ApplicationServiceError> {
        let client = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(client)
    }

    /// Client files a track's form; moves it to pending.
    pub fn submit_track(
        &self,
        id: &ClientId,
        track: TrackType,
        now: DateTime<Utc>,
    ) -> Result<Track, ApplicationServiceError> {
        self.transition(id, track, ReviewAction::Submit, |current| {
            current.submit(now)
        })
    }

    /// Admin approves a pending track and stamps the client-level validation.
    pub fn validate_track(
        &self,
        id: &ClientId,
        track: TrackType,
        validator: &AdminId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Track, ApplicationServiceError> {
        let next = self.transition(id, track, ReviewAction::Validate, |current| {
            current.validate(validator, notes.clone(), now)
        })?;

        let stamp = ValidationStamp {
            validated_at: now,
            validated_by: validator.clone(),
        };
        // The track is already validated; a missing client-level stamp is
        // covered by the per-track stamp in dashboard listings.
        if let Err(err) = self.repository.record_validation(id, stamp) {
            warn!(client_id = %id.0, %track, error = %err, "client validation stamp not recorded");
        }

        let mut details = BTreeMap::new();
        details.insert("validated_by".to_string(), validator.0.clone());
        self.notify("track_validated", id, track, details);

        Ok(next)
    }

    /// Admin rejects a pending track, starting the resubmission cooldown.
    pub fn reject_track(
        &self,
        id: &ClientId,
        track: TrackType,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Track, ApplicationServiceError> {
        let next = self.transition(id, track, ReviewAction::Reject, |current| {
            current.reject(reason.clone(), now)
        })?;

        let mut details = BTreeMap::new();
        details.insert("reason".to_string(), reason);
        self.notify("track_rejected", id, track, details);

        Ok(next)
    }

    pub fn project_track_view(
        &self,
        id: &ClientId,
        track: TrackType,
        now: DateTime<Utc>,
    ) -> Result<TrackViewResponse, ApplicationServiceError> {
        let state = self.repository.load_track(id, track)?;
        Ok(TrackViewResponse {
            track,
            status: state.status,
            view: project_track_view(&state, now),
        })
    }

    pub fn list_aggregates(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ClientAggregates, ApplicationServiceError> {
        let clients = self.repository.list_clients()?;
        Ok(aggregate(&clients, now))
    }

    fn transition<F>(
        &self,
        id: &ClientId,
        track: TrackType,
        action: ReviewAction,
        apply: F,
    ) -> Result<Track, ApplicationServiceError>
    where
        F: Fn(&Track) -> Result<Track, TransitionError>,
    {
        let current = self.repository.load_track(id, track)?;
        let next = apply(&current)?;

        if self
            .repository
            .compare_and_swap_track(id, track, current.status, next.clone())?
        {
            info!(
                client_id = %id.0,
                %track,
                action = action.label(),
                from = %current.status,
                to = %next.status,
                "track transition committed"
            );
            return Ok(next);
        }

        // Lost the race: re-check against whatever won so the caller sees the
        // failure that matches the fresh state.
        let fresh = self.repository.load_track(id, track)?;
        debug!(client_id = %id.0, %track, status = %fresh.status, "track changed during transition");
        apply(&fresh)?;

        warn!(client_id = %id.0, %track, action = action.label(), "concurrent track modification");
        Err(ApplicationServiceError::ConcurrentModification {
            client_id: id.clone(),
            track,
        })
    }

    fn notify(
        &self,
        template: &str,
        id: &ClientId,
        track: TrackType,
        details: BTreeMap<String, String>,
    ) {
        let notice = ReviewNotice {
            template: template.to_string(),
            client_id: id.clone(),
            track,
            details,
        };
        // The transition is already committed; a lost notice is logged only.
        if let Err(err) = self.notices.publish(notice) {
            warn!(client_id = %id.0, %track, error = %err, "review notice dropped");
        }
    }
}

/// Error raised by the status engine.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("{track} track for {} changed concurrently; reload and retry", .client_id.0)]
    ConcurrentModification { client_id: ClientId, track: TrackType },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
