use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::offer::ParkingOffer;

/// Request lifecycle state, persisted with the Spanish names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pendiente,
    Aceptada,
    Cancelada,
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Pendiente => "pendiente",
            RequestState::Aceptada => "aceptada",
            RequestState::Cancelada => "cancelada",
        }
    }

    /// Only a standalone `pendiente` request can be cancelled by its
    /// creator. Acceptance records are born `aceptada` and stay there.
    pub fn can_transition(self, to: RequestState) -> bool {
        matches!((self, to), (RequestState::Pendiente, RequestState::Cancelada))
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(RequestState::Pendiente),
            "aceptada" => Ok(RequestState::Aceptada),
            "cancelada" => Ok(RequestState::Cancelada),
            other => Err(format!("unknown request state: {other}")),
        }
    }
}

/// Either a standalone statement of need (`linked_offer_id` is None) or,
/// when linked to an offer, the record of accepting part of that offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingRequest {
    pub id: Uuid,
    pub linked_offer_id: Option<Uuid>,
    pub requester_family_code: String,
    pub requested_floor: i32,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub state: RequestState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingRequest {
    /// A standalone "I need a spot" request, created `pendiente`.
    pub fn need(
        requester_family_code: &str,
        requested_floor: i32,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            linked_offer_id: None,
            requester_family_code: requester_family_code.to_string(),
            requested_floor,
            window_start,
            window_end,
            state: RequestState::Pendiente,
            created_at: now,
            updated_at: now,
        }
    }

    /// The record of accepting a sub-window of `offer`, born `aceptada`.
    pub fn acceptance(
        offer: &ParkingOffer,
        requester_family_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            linked_offer_id: Some(offer.id),
            requester_family_code: requester_family_code.to_string(),
            requested_floor: offer.floor.unwrap_or(0),
            window_start,
            window_end,
            state: RequestState::Aceptada,
            created_at: now,
            updated_at: now,
        }
    }
}
