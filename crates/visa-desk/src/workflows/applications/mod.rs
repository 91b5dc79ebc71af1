//! Per-client application tracks and the status engine that drives them.
//!
//! Each client carries three independent tracks. Clients file a track, admins
//! validate or reject it, and a rejected track unlocks for resubmission once
//! the cooldown has elapsed. Views and dashboard aggregates are pure
//! projections over the stored records so they can be exercised against
//! literal timestamps.

pub mod aggregate;
pub mod clock;
pub mod cooldown;
pub mod domain;
pub(crate) mod intake;
pub mod repository;
pub mod router;
pub mod service;
pub mod transitions;
pub mod view;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate, counts, pending_by_track, validated_entries, ClientAggregates, DashboardCounts,
    PendingQueue, TrackCounts, ValidatedEntry,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use cooldown::{time_remaining, TimeRemaining, REJECTION_COOLDOWN_HOURS};
pub use domain::{
    AdminId, Client, ClientId, ClientRegistration, ClientSummary, Track, TrackStatus, TrackType,
    ValidationStamp,
};
pub use intake::RegistrationError;
pub use repository::{
    ClientRepository, NoticeError, RepositoryError, ReviewNotice, ReviewNoticePublisher,
};
pub use router::client_router;
pub use service::{ApplicationServiceError, ApplicationStatusEngine};
pub use transitions::{ReviewAction, TransitionError};
pub use view::{project_track_view, TrackView, TrackViewResponse};
