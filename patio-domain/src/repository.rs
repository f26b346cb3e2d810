use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::offer::{OfferState, ParkingOffer};
use crate::request::{ParkingRequest, RequestState};
use crate::spot::ParkingSpot;

/// Storage for parking offers.
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert(&self, offer: &ParkingOffer) -> Result<(), ExchangeError>;

    async fn get(&self, id: Uuid) -> Result<Option<ParkingOffer>, ExchangeError>;

    /// All `activa` offers, ordered by window start ascending, with the
    /// spot's floor populated.
    async fn list_active(&self) -> Result<Vec<ParkingOffer>, ExchangeError>;

    /// Does any `activa` offer for `spot_code` overlap `[start, end)`?
    async fn has_active_overlap(
        &self,
        spot_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ExchangeError>;

    /// Atomically move the offer from `expected` to `to` in a single
    /// conditional write. Returns `false` when the row is no longer in
    /// `expected`, which is how a losing racer finds out.
    async fn transition(
        &self,
        id: Uuid,
        expected: OfferState,
        to: OfferState,
    ) -> Result<bool, ExchangeError>;
}

/// Storage for parking requests (standalone needs and acceptance records).
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn insert(&self, request: &ParkingRequest) -> Result<(), ExchangeError>;

    async fn get(&self, id: Uuid) -> Result<Option<ParkingRequest>, ExchangeError>;

    /// Non-cancelled requests created by the family unit, newest first.
    async fn list_for_family(&self, family_code: &str) -> Result<Vec<ParkingRequest>, ExchangeError>;

    /// Conditional state update, same contract as `OfferRepository::transition`.
    async fn transition(
        &self,
        id: Uuid,
        expected: RequestState,
        to: RequestState,
    ) -> Result<bool, ExchangeError>;
}

/// Read-only access to the portal's parking spot directory.
#[async_trait]
pub trait SpotRepository: Send + Sync {
    async fn get(&self, code: &str) -> Result<Option<ParkingSpot>, ExchangeError>;
}

/// Resolves an authenticated user to their family-unit code. Identity
/// itself is owned by the portal; the engine only consumes the mapping.
#[async_trait]
pub trait FamilyDirectory: Send + Sync {
    async fn family_for_user(&self, user_id: &str) -> Result<Option<String>, ExchangeError>;
}
