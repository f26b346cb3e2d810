use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::interval;
use crate::spot::ParkingSpot;

/// Offer lifecycle state. The Spanish names are the persisted vocabulary
/// of the portal and appear as-is in storage and on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OfferState {
    Activa,
    Ocupada,
    Cancelada,
}

impl OfferState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferState::Activa => "activa",
            OfferState::Ocupada => "ocupada",
            OfferState::Cancelada => "cancelada",
        }
    }

    /// Transition table. An offer leaves `activa` exactly once, either to
    /// `ocupada` (accepted) or `cancelada` (withdrawn by its owner); both
    /// of those are terminal.
    pub fn can_transition(self, to: OfferState) -> bool {
        matches!(
            (self, to),
            (OfferState::Activa, OfferState::Ocupada)
                | (OfferState::Activa, OfferState::Cancelada)
        )
    }
}

impl fmt::Display for OfferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activa" => Ok(OfferState::Activa),
            "ocupada" => Ok(OfferState::Ocupada),
            "cancelada" => Ok(OfferState::Cancelada),
            other => Err(format!("unknown offer state: {other}")),
        }
    }
}

/// A declaration that a spot is free for `[window_start, window_end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingOffer {
    pub id: Uuid,
    pub spot_code: String,
    pub owner_family_code: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub state: OfferState,
    /// Denormalized from the spot, for display and floor matching.
    pub floor: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingOffer {
    /// Create a fresh `activa` offer for the given spot.
    pub fn new(spot: &ParkingSpot, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            spot_code: spot.code.clone(),
            owner_family_code: spot.owner_family_code.clone(),
            window_start,
            window_end,
            state: OfferState::Activa,
            floor: Some(spot.floor),
            created_at: now,
            updated_at: now,
        }
    }

    /// Re-offer a leftover segment of `parent` after a partial acceptance.
    /// Same spot, same owner, fresh id and window.
    pub fn split_from(parent: &ParkingOffer, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            spot_code: parent.spot_code.clone(),
            owner_family_code: parent.owner_family_code.clone(),
            window_start,
            window_end,
            state: OfferState::Activa,
            floor: parent.floor,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn window_hours(&self) -> f64 {
        interval::segment_hours(self.window_start, self.window_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_strings() {
        for state in [OfferState::Activa, OfferState::Ocupada, OfferState::Cancelada] {
            assert_eq!(state.as_str().parse::<OfferState>().unwrap(), state);
        }
        assert!("ACTIVA".parse::<OfferState>().is_err());
    }

    #[test]
    fn only_activa_can_move() {
        assert!(OfferState::Activa.can_transition(OfferState::Ocupada));
        assert!(OfferState::Activa.can_transition(OfferState::Cancelada));
        assert!(!OfferState::Ocupada.can_transition(OfferState::Cancelada));
        assert!(!OfferState::Cancelada.can_transition(OfferState::Activa));
        assert!(!OfferState::Ocupada.can_transition(OfferState::Activa));
    }
}
