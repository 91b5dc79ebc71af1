use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cooldown::time_remaining;
use super::domain::{AdminId, Track, TrackStatus};

/// Actions that move a track between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Submit,
    Validate,
    Reject,
}

impl ReviewAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewAction::Submit => "submit",
            ReviewAction::Validate => "validate",
            ReviewAction::Reject => "reject",
        }
    }
}

/// Reasons a transition is refused given the track's current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {} a track that is {from}", .action.label())]
    InvalidTransition {
        from: TrackStatus,
        action: ReviewAction,
    },
    #[error("resubmission blocked for another {hours_left}h {minutes_left}m")]
    SubmissionBlocked { hours_left: i64, minutes_left: i64 },
    #[error("track already submitted and awaiting review")]
    AlreadySubmitted,
    #[error("track already validated")]
    AlreadyValidated,
}

impl TransitionError {
    pub const fn kind(&self) -> &'static str {
        match self {
            TransitionError::InvalidTransition { .. } => "invalid_transition",
            TransitionError::SubmissionBlocked { .. } => "submission_blocked",
            TransitionError::AlreadySubmitted => "already_submitted",
            TransitionError::AlreadyValidated => "already_validated",
        }
    }
}

impl Track {
    /// Client files (or refiles) the track. Allowed from `Unsubmitted`, or from
    /// `Rejected` once the cooldown has elapsed.
    pub fn submit(&self, now: DateTime<Utc>) -> Result<Track, TransitionError> {
        match self.status {
            TrackStatus::Unsubmitted => {}
            TrackStatus::Rejected => {
                let remaining = time_remaining(self.rejected_at, now);
                if !remaining.can_resubmit {
                    return Err(TransitionError::SubmissionBlocked {
                        hours_left: remaining.hours_left,
                        minutes_left: remaining.minutes_left,
                    });
                }
            }
            TrackStatus::Pending => return Err(TransitionError::AlreadySubmitted),
            TrackStatus::Validated => return Err(TransitionError::AlreadyValidated),
        }

        Ok(Track {
            is_sending: true,
            status: TrackStatus::Pending,
            submitted_at: Some(now),
            rejected_at: None,
            rejection_reason: None,
            validated_at: None,
            validated_by: None,
            validation_notes: None,
        })
    }

    /// Admin approves a pending track. Repeated validation fails rather than
    /// succeeding silently.
    pub fn validate(
        &self,
        validator: &AdminId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Track, TransitionError> {
        self.require_pending(ReviewAction::Validate)?;

        Ok(Track {
            status: TrackStatus::Validated,
            validated_at: Some(now),
            validated_by: Some(validator.clone()),
            validation_notes: notes,
            ..self.clone()
        })
    }

    /// Admin rejects a pending track. The reason is stored even when blank so a
    /// reason-less rejection stays distinguishable from no rejection.
    pub fn reject(&self, reason: String, now: DateTime<Utc>) -> Result<Track, TransitionError> {
        self.require_pending(ReviewAction::Reject)?;

        Ok(Track {
            status: TrackStatus::Rejected,
            rejected_at: Some(now),
            rejection_reason: Some(reason),
            ..self.clone()
        })
    }

    fn require_pending(&self, action: ReviewAction) -> Result<(), TransitionError> {
        if self.status == TrackStatus::Pending {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}
