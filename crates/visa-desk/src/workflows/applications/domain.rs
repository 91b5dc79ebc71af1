use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub String);

/// Identifier of the admin or moderator reviewing a track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminId(pub String);

/// The three independent application types a client can file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    Equivalence,
    Residence,
    Partner,
}

impl TrackType {
    pub const fn ordered() -> [TrackType; 3] {
        [TrackType::Equivalence, TrackType::Residence, TrackType::Partner]
    }

    pub const fn label(self) -> &'static str {
        match self {
            TrackType::Equivalence => "equivalence",
            TrackType::Residence => "residence",
            TrackType::Partner => "partner",
        }
    }
}

impl std::fmt::Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Review state of a single track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    #[default]
    Unsubmitted,
    Pending,
    Validated,
    Rejected,
}

impl TrackStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TrackStatus::Unsubmitted => "unsubmitted",
            TrackStatus::Pending => "pending",
            TrackStatus::Validated => "validated",
            TrackStatus::Rejected => "rejected",
        }
    }

    /// True once the client has filed the track at least once.
    pub const fn is_sending(self) -> bool {
        !matches!(self, TrackStatus::Unsubmitted)
    }
}

impl std::fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-track review record. Only the transition functions in
/// [`super::transitions`] produce new states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub is_sending: bool,
    pub status: TrackStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub validated_at: Option<DateTime<Utc>>,
    pub validated_by: Option<AdminId>,
    pub validation_notes: Option<String>,
}

impl Track {
    /// Checks the field-level invariants tying `status` to the rejection stamp
    /// and the `is_sending` flag.
    pub fn is_consistent(&self) -> bool {
        let rejection_fields_match = if self.status == TrackStatus::Rejected {
            self.rejected_at.is_some() && self.rejection_reason.is_some()
        } else {
            self.rejected_at.is_none() && self.rejection_reason.is_none()
        };
        let validation_stamped = self.status != TrackStatus::Validated
            || (self.validated_at.is_some() && self.validated_by.is_some());

        self.is_sending == self.status.is_sending() && rejection_fields_match && validation_stamped
    }
}

/// Global, client-level validation stamp shown in the admin client list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationStamp {
    pub validated_at: DateTime<Utc>,
    pub validated_by: AdminId,
}

/// End customer with their three application tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
    pub equivalence: Track,
    pub residence: Track,
    pub partner: Track,
    pub validated_at: Option<DateTime<Utc>>,
    pub validated_by: Option<AdminId>,
}

impl Client {
    pub fn new(id: ClientId, name: String, email: String, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            email,
            registered_at,
            equivalence: Track::default(),
            residence: Track::default(),
            partner: Track::default(),
            validated_at: None,
            validated_by: None,
        }
    }

    pub fn track(&self, track: TrackType) -> &Track {
        match track {
            TrackType::Equivalence => &self.equivalence,
            TrackType::Residence => &self.residence,
            TrackType::Partner => &self.partner,
        }
    }

    pub fn track_mut(&mut self, track: TrackType) -> &mut Track {
        match track {
            TrackType::Equivalence => &mut self.equivalence,
            TrackType::Residence => &mut self.residence,
            TrackType::Partner => &mut self.partner,
        }
    }

    pub fn apply_validation(&mut self, stamp: ValidationStamp) {
        self.validated_at = Some(stamp.validated_at);
        self.validated_by = Some(stamp.validated_by);
    }

    pub fn summary(&self) -> ClientSummary {
        ClientSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Identity fields carried in dashboard listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub id: ClientId,
    pub name: String,
    pub email: String,
}

/// Public-site registration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
    pub name: String,
    pub email: String,
}
