use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::applications::clock::Clock;
use crate::workflows::applications::domain::{
    AdminId, Client, ClientId, ClientRegistration, Track, TrackStatus, TrackType,
    ValidationStamp,
};
use crate::workflows::applications::repository::{
    ClientRepository, NoticeError, RepositoryError, ReviewNotice, ReviewNoticePublisher,
};
use crate::workflows::applications::ApplicationStatusEngine;

/// Reference instant all scenarios are expressed against.
pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn at(hours: i64, minutes: i64) -> DateTime<Utc> {
    t0() + Duration::hours(hours) + Duration::minutes(minutes)
}

pub(super) fn admin() -> AdminId {
    AdminId("admin-ines".to_string())
}

pub(super) fn registration(name: &str, email: &str) -> ClientRegistration {
    ClientRegistration {
        name: name.to_string(),
        email: email.to_string(),
    }
}

pub(super) fn client(suffix: &str) -> Client {
    Client::new(
        ClientId(format!("client-{suffix}")),
        format!("Client {suffix}"),
        format!("{suffix}@example.com"),
        t0(),
    )
}

pub(super) fn pending_track(submitted_at: DateTime<Utc>) -> Track {
    Track::default()
        .submit(submitted_at)
        .expect("unsubmitted track accepts a submission")
}

pub(super) fn rejected_track(rejected_at: DateTime<Utc>, reason: &str) -> Track {
    pending_track(rejected_at - Duration::hours(1))
        .reject(reason.to_string(), rejected_at)
        .expect("pending track can be rejected")
}

pub(super) fn validated_track(validated_at: DateTime<Utc>) -> Track {
    pending_track(validated_at - Duration::hours(1))
        .validate(&admin(), None, validated_at)
        .expect("pending track can be validated")
}

pub(super) fn build_engine() -> (
    ApplicationStatusEngine<MemoryRepository, MemoryNotices>,
    Arc<MemoryRepository>,
    Arc<MemoryNotices>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notices = Arc::new(MemoryNotices::default());
    let engine = ApplicationStatusEngine::with_clock(
        repository.clone(),
        notices.clone(),
        Arc::new(SteppingClock::starting_at(t0())),
    );
    (engine, repository, notices)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) clients: Arc<Mutex<HashMap<ClientId, Client>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, client: Client) {
        self.clients
            .lock()
            .expect("repository mutex poisoned")
            .insert(client.id.clone(), client);
    }

    pub(super) fn stored(&self, id: &ClientId) -> Client {
        self.clients
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("client stored")
    }
}

impl ClientRepository for MemoryRepository {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError> {
        let mut guard = self.clients.lock().expect("repository mutex poisoned");
        if guard.contains_key(&client.id)
            || guard.values().any(|existing| existing.email == client.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        let guard = self.clients.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn load_track(&self, id: &ClientId, track: TrackType) -> Result<Track, RepositoryError> {
        let guard = self.clients.lock().expect("repository mutex poisoned");
        guard
            .get(id)
            .map(|client| client.track(track).clone())
            .ok_or(RepositoryError::NotFound)
    }

    fn compare_and_swap_track(
        &self,
        id: &ClientId,
        track: TrackType,
        expected: TrackStatus,
        next: Track,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.clients.lock().expect("repository mutex poisoned");
        let client = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let slot = client.track_mut(track);
        if slot.status != expected {
            return Ok(false);
        }
        *slot = next;
        Ok(true)
    }

    fn record_validation(
        &self,
        id: &ClientId,
        stamp: ValidationStamp,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.clients.lock().expect("repository mutex poisoned");
        let client = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        client.apply_validation(stamp);
        Ok(())
    }

    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let guard = self.clients.lock().expect("repository mutex poisoned");
        let mut clients: Vec<Client> = guard.values().cloned().collect();
        clients.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(clients)
    }
}

/// Wraps [`MemoryRepository`] so the next compare-and-swap loses. When a
/// competing state is staged it is written first, as if another request had
/// committed in between.
#[derive(Default)]
pub(super) struct RacingRepository {
    pub(super) inner: MemoryRepository,
    lose_next: AtomicBool,
    competitor: Mutex<Option<Track>>,
}

impl RacingRepository {
    pub(super) fn lose_next_swap(&self, competitor: Option<Track>) {
        *self.competitor.lock().expect("competitor mutex poisoned") = competitor;
        self.lose_next.store(true, Ordering::SeqCst);
    }
}

impl ClientRepository for RacingRepository {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError> {
        self.inner.insert(client)
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn load_track(&self, id: &ClientId, track: TrackType) -> Result<Track, RepositoryError> {
        self.inner.load_track(id, track)
    }

    fn compare_and_swap_track(
        &self,
        id: &ClientId,
        track: TrackType,
        expected: TrackStatus,
        next: Track,
    ) -> Result<bool, RepositoryError> {
        if self.lose_next.swap(false, Ordering::SeqCst) {
            let competitor = self
                .competitor
                .lock()
                .expect("competitor mutex poisoned")
                .take();
            if let Some(state) = competitor {
                let mut guard = self.inner.clients.lock().expect("repository mutex poisoned");
                let client = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
                *client.track_mut(track) = state;
            }
            return Ok(false);
        }
        self.inner.compare_and_swap_track(id, track, expected, next)
    }

    fn record_validation(
        &self,
        id: &ClientId,
        stamp: ValidationStamp,
    ) -> Result<(), RepositoryError> {
        self.inner.record_validation(id, stamp)
    }

    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        self.inner.list_clients()
    }
}

/// Stores tracks normally but cannot write the client-level validation stamp.
#[derive(Default)]
pub(super) struct StamplessRepository {
    pub(super) inner: MemoryRepository,
}

impl ClientRepository for StamplessRepository {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError> {
        self.inner.insert(client)
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn load_track(&self, id: &ClientId, track: TrackType) -> Result<Track, RepositoryError> {
        self.inner.load_track(id, track)
    }

    fn compare_and_swap_track(
        &self,
        id: &ClientId,
        track: TrackType,
        expected: TrackStatus,
        next: Track,
    ) -> Result<bool, RepositoryError> {
        self.inner.compare_and_swap_track(id, track, expected, next)
    }

    fn record_validation(
        &self,
        _id: &ClientId,
        _stamp: ValidationStamp,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("clients table locked".to_string()))
    }

    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        self.inner.list_clients()
    }
}

pub(super) struct UnavailableRepository;

impl ClientRepository for UnavailableRepository {
    fn insert(&self, _client: Client) -> Result<Client, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn load_track(&self, _id: &ClientId, _track: TrackType) -> Result<Track, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn compare_and_swap_track(
        &self,
        _id: &ClientId,
        _track: TrackType,
        _expected: TrackStatus,
        _next: Track,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_validation(
        &self,
        _id: &ClientId,
        _stamp: ValidationStamp,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<ReviewNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<ReviewNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl ReviewNoticePublisher for MemoryNotices {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) struct OfflineNotices;

impl ReviewNoticePublisher for OfflineNotices {
    fn publish(&self, _notice: ReviewNotice) -> Result<(), NoticeError> {
        Err(NoticeError::Transport("smtp relay down".to_string()))
    }
}

/// Clock the routing tests advance between requests.
pub(super) struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    pub(super) fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub(super) fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += by;
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock mutex poisoned")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
