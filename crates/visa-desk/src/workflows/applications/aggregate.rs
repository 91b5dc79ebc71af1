use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cooldown::time_remaining;
use super::domain::{AdminId, Client, ClientId, ClientSummary, TrackStatus, TrackType};

/// Pending review queue for a single track type.
#[derive(Debug, Clone, Serialize)]
pub struct PendingQueue {
    pub track: TrackType,
    pub clients: Vec<ClientSummary>,
}

/// One validated `(client, track)` pair for the admin history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedEntry {
    pub client_id: ClientId,
    pub client_name: String,
    pub client_email: String,
    pub track: TrackType,
    pub validated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<AdminId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackCounts {
    pub pending: usize,
    pub validated: usize,
    pub rejected_in_cooldown: usize,
}

/// Dashboard summary tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub total_clients: usize,
    pub equivalence: TrackCounts,
    pub residence: TrackCounts,
    pub partner: TrackCounts,
}

impl DashboardCounts {
    pub fn track(&self, track: TrackType) -> &TrackCounts {
        match track {
            TrackType::Equivalence => &self.equivalence,
            TrackType::Residence => &self.residence,
            TrackType::Partner => &self.partner,
        }
    }

    fn track_mut(&mut self, track: TrackType) -> &mut TrackCounts {
        match track {
            TrackType::Equivalence => &mut self.equivalence,
            TrackType::Residence => &mut self.residence,
            TrackType::Partner => &mut self.partner,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientAggregates {
    pub pending_by_track: Vec<PendingQueue>,
    pub validated_entries: Vec<ValidatedEntry>,
    pub counts: DashboardCounts,
}

impl ClientAggregates {
    pub fn pending(&self, track: TrackType) -> &[ClientSummary] {
        self.pending_by_track
            .iter()
            .find(|queue| queue.track == track)
            .map(|queue| queue.clients.as_slice())
            .unwrap_or_default()
    }
}

pub fn pending_by_track(clients: &[Client], track: TrackType) -> Vec<&Client> {
    clients
        .iter()
        .filter(|client| {
            let state = client.track(track);
            state.is_sending && state.status == TrackStatus::Pending
        })
        .collect()
}

/// Flattens every validated track across clients, most recent first.
pub fn validated_entries(clients: &[Client]) -> Vec<ValidatedEntry> {
    let mut entries: Vec<ValidatedEntry> = clients
        .iter()
        .flat_map(|client| {
            TrackType::ordered().into_iter().filter_map(move |track| {
                let state = client.track(track);
                if state.status != TrackStatus::Validated {
                    return None;
                }
                // Tracks validated before per-track stamps existed fall back to
                // the client-level stamp, then to the last known activity.
                let validated_at = state
                    .validated_at
                    .or(client.validated_at)
                    .or(state.submitted_at)
                    .unwrap_or(client.registered_at);
                Some(ValidatedEntry {
                    client_id: client.id.clone(),
                    client_name: client.name.clone(),
                    client_email: client.email.clone(),
                    track,
                    validated_at,
                    validated_by: state
                        .validated_by
                        .clone()
                        .or_else(|| client.validated_by.clone()),
                })
            })
        })
        .collect();

    entries.sort_by(|a, b| b.validated_at.cmp(&a.validated_at));
    entries
}

pub fn counts(clients: &[Client], now: DateTime<Utc>) -> DashboardCounts {
    let mut counts = DashboardCounts::default();

    for client in clients {
        counts.total_clients += 1;
        for track in TrackType::ordered() {
            let state = client.track(track);
            let tile = counts.track_mut(track);
            match state.status {
                TrackStatus::Pending if state.is_sending => tile.pending += 1,
                TrackStatus::Validated => tile.validated += 1,
                TrackStatus::Rejected if !time_remaining(state.rejected_at, now).can_resubmit => {
                    tile.rejected_in_cooldown += 1
                }
                _ => {}
            }
        }
    }

    counts
}

pub fn aggregate(clients: &[Client], now: DateTime<Utc>) -> ClientAggregates {
    let queues = TrackType::ordered()
        .into_iter()
        .map(|track| PendingQueue {
            track,
            clients: pending_by_track(clients, track)
                .into_iter()
                .map(Client::summary)
                .collect(),
        })
        .collect();

    ClientAggregates {
        pending_by_track: queues,
        validated_entries: validated_entries(clients),
        counts: counts(clients, now),
    }
}
