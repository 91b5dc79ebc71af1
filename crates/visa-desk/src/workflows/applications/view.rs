use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cooldown::time_remaining;
use super::domain::{Track, TrackStatus, TrackType};

/// What the client portal renders for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum TrackView {
    Form {
        show_resubmission_warning: bool,
    },
    PendingBanner,
    ValidatedBanner,
    RejectedBanner {
        reason: String,
        hours_left: i64,
        minutes_left: i64,
    },
}

impl TrackView {
    pub const fn label(&self) -> &'static str {
        match self {
            TrackView::Form { .. } => "form",
            TrackView::PendingBanner => "pending_banner",
            TrackView::ValidatedBanner => "validated_banner",
            TrackView::RejectedBanner { .. } => "rejected_banner",
        }
    }
}

/// Track view tagged with the track it was projected from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackViewResponse {
    pub track: TrackType,
    pub status: TrackStatus,
    pub view: TrackView,
}

/// Pure projection shared by every track type.
pub fn project_track_view(track: &Track, now: DateTime<Utc>) -> TrackView {
    match track.status {
        TrackStatus::Unsubmitted => TrackView::Form {
            show_resubmission_warning: false,
        },
        TrackStatus::Pending => TrackView::PendingBanner,
        TrackStatus::Validated => TrackView::ValidatedBanner,
        TrackStatus::Rejected => {
            let remaining = time_remaining(track.rejected_at, now);
            if remaining.can_resubmit {
                TrackView::Form {
                    show_resubmission_warning: true,
                }
            } else {
                TrackView::RejectedBanner {
                    reason: track.rejection_reason.clone().unwrap_or_default(),
                    hours_left: remaining.hours_left,
                    minutes_left: remaining.minutes_left,
                }
            }
        }
    }
}
