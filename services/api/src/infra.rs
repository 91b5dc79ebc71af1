use chrono::{DateTime, NaiveDateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use visa_desk::workflows::applications::{
    Client, ClientId, ClientRepository, NoticeError, RepositoryError, ReviewNotice,
    ReviewNoticePublisher, Track, TrackStatus, TrackType, ValidationStamp,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local client store. A single mutex serializes every
/// compare-and-swap, which covers the per-track ordering requirement.
#[derive(Default, Clone)]
pub(crate) struct InMemoryClientRepository {
    clients: Arc<Mutex<HashMap<ClientId, Client>>>,
}

impl InMemoryClientRepository {
    fn lock(&self) -> Result<MutexGuard<'_, HashMap<ClientId, Client>>, RepositoryError> {
        self.clients
            .lock()
            .map_err(|_| RepositoryError::Unavailable("client store poisoned".to_string()))
    }
}

impl ClientRepository for InMemoryClientRepository {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.contains_key(&client.id)
            || guard.values().any(|existing| existing.email == client.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(client.id.clone(), client.clone());
        Ok(client)
    }

    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn load_track(&self, id: &ClientId, track: TrackType) -> Result<Track, RepositoryError> {
        self.lock()?
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
        let mut guard = self.lock()?;
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
        let mut guard = self.lock()?;
        guard
            .get_mut(id)
            .ok_or(RepositoryError::NotFound)?
            .apply_validation(stamp);
        Ok(())
    }

    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        let mut clients: Vec<Client> = self.lock()?.values().cloned().collect();
        clients.sort_by(|a, b| a.registered_at.cmp(&b.registered_at).then(a.id.cmp(&b.id)));
        Ok(clients)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<ReviewNotice>>>,
}

impl ReviewNoticePublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NoticeError::Transport("notice outbox poisoned".to_string()))?;
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<ReviewNotice> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM` (read as UTC).
pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DDTHH:MM ({err})"))
}
