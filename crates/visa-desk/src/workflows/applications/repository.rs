use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Client, ClientId, Track, TrackStatus, TrackType, ValidationStamp};

/// Storage abstraction for client records.
///
/// Writes to a track go through [`ClientRepository::compare_and_swap_track`],
/// which must apply the new state only while the stored status still equals
/// `expected`. Implementations serialize that check-and-set per
/// `(client, track)`.
///
/// [`ClientRepository::insert`] rejects a duplicate id or e-mail with
/// [`RepositoryError::Conflict`], checked atomically with the write.
pub trait ClientRepository: Send + Sync {
    fn insert(&self, client: Client) -> Result<Client, RepositoryError>;
    fn fetch(&self, id: &ClientId) -> Result<Option<Client>, RepositoryError>;
    fn load_track(&self, id: &ClientId, track: TrackType) -> Result<Track, RepositoryError>;
    fn compare_and_swap_track(
        &self,
        id: &ClientId,
        track: TrackType,
        expected: TrackStatus,
        next: Track,
    ) -> Result<bool, RepositoryError>;
    fn record_validation(
        &self,
        id: &ClientId,
        stamp: ValidationStamp,
    ) -> Result<(), RepositoryError>;
    fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for the notification collaborator (e-mail, sheets export).
pub trait ReviewNoticePublisher: Send + Sync {
    fn publish(&self, notice: ReviewNotice) -> Result<(), NoticeError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewNotice {
    pub template: String,
    pub client_id: ClientId,
    pub track: TrackType,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}
