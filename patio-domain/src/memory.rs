//! In-memory repository implementations. They back the engine's test
//! suites and give the conditional-update contract a reference behavior:
//! every transition is a check-and-set under one lock.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::offer::{OfferState, ParkingOffer};
use crate::repository::{FamilyDirectory, OfferRepository, RequestRepository, SpotRepository};
use crate::request::{ParkingRequest, RequestState};
use crate::spot::ParkingSpot;

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, ExchangeError> {
    mutex
        .lock()
        .map_err(|_| ExchangeError::Storage("repository lock poisoned".into()))
}

#[derive(Default)]
pub struct InMemoryOfferRepository {
    rows: Mutex<HashMap<Uuid, ParkingOffer>>,
}

impl InMemoryOfferRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OfferRepository for InMemoryOfferRepository {
    async fn insert(&self, offer: &ParkingOffer) -> Result<(), ExchangeError> {
        lock(&self.rows)?.insert(offer.id, offer.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ParkingOffer>, ExchangeError> {
        Ok(lock(&self.rows)?.get(&id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<ParkingOffer>, ExchangeError> {
        let mut active: Vec<ParkingOffer> = lock(&self.rows)?
            .values()
            .filter(|o| o.state == OfferState::Activa)
            .cloned()
            .collect();
        active.sort_by_key(|o| o.window_start);
        Ok(active)
    }

    async fn has_active_overlap(
        &self,
        spot_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ExchangeError> {
        Ok(lock(&self.rows)?.values().any(|o| {
            o.spot_code == spot_code
                && o.state == OfferState::Activa
                && o.window_start < end
                && start < o.window_end
        }))
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: OfferState,
        to: OfferState,
    ) -> Result<bool, ExchangeError> {
        let mut rows = lock(&self.rows)?;
        match rows.get_mut(&id) {
            Some(offer) if offer.state == expected => {
                offer.state = to;
                offer.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRequestRepository {
    rows: Mutex<HashMap<Uuid, ParkingRequest>>,
}

impl InMemoryRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn insert(&self, request: &ParkingRequest) -> Result<(), ExchangeError> {
        lock(&self.rows)?.insert(request.id, request.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ParkingRequest>, ExchangeError> {
        Ok(lock(&self.rows)?.get(&id).cloned())
    }

    async fn list_for_family(&self, family_code: &str) -> Result<Vec<ParkingRequest>, ExchangeError> {
        let mut own: Vec<ParkingRequest> = lock(&self.rows)?
            .values()
            .filter(|r| r.requester_family_code == family_code && r.state != RequestState::Cancelada)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(own)
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: RequestState,
        to: RequestState,
    ) -> Result<bool, ExchangeError> {
        let mut rows = lock(&self.rows)?;
        match rows.get_mut(&id) {
            Some(request) if request.state == expected => {
                request.state = to;
                request.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct InMemorySpotRepository {
    rows: HashMap<String, ParkingSpot>,
}

impl InMemorySpotRepository {
    pub fn with_spots(spots: Vec<ParkingSpot>) -> Self {
        Self {
            rows: spots.into_iter().map(|s| (s.code.clone(), s)).collect(),
        }
    }
}

#[async_trait]
impl SpotRepository for InMemorySpotRepository {
    async fn get(&self, code: &str) -> Result<Option<ParkingSpot>, ExchangeError> {
        Ok(self.rows.get(code).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryFamilyDirectory {
    users: HashMap<String, String>,
}

impl InMemoryFamilyDirectory {
    pub fn with_users(users: Vec<(&str, &str)>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|(user, family)| (user.to_string(), family.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl FamilyDirectory for InMemoryFamilyDirectory {
    async fn family_for_user(&self, user_id: &str) -> Result<Option<String>, ExchangeError> {
        Ok(self.users.get(user_id).cloned())
    }
}
