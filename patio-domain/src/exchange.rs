use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::interval;
use crate::offer::{OfferState, ParkingOffer};
use crate::repository::{OfferRepository, RequestRepository, SpotRepository};
use crate::request::{ParkingRequest, RequestState};

/// Tunable exchange rules.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Minimum duration, in hours, a leftover segment must reach to be
    /// re-offered after a partial acceptance. Shorter slivers are dropped
    /// so unusably short slots never reach the listing.
    pub min_segment_hours: f64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { min_segment_hours: 4.0 }
    }
}

/// The parking slot exchange engine. Residents offer a spot for a time
/// window; other residents accept part or all of it. Partial acceptance
/// splits the remainder into still-usable sub-offers.
pub struct ParkingExchange {
    offers: Arc<dyn OfferRepository>,
    requests: Arc<dyn RequestRepository>,
    spots: Arc<dyn SpotRepository>,
    config: ExchangeConfig,
}

impl ParkingExchange {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        requests: Arc<dyn RequestRepository>,
        spots: Arc<dyn SpotRepository>,
        config: ExchangeConfig,
    ) -> Self {
        Self { offers, requests, spots, config }
    }

    /// Publish a new `activa` offer for one of the caller's spots.
    pub async fn create_offer(
        &self,
        caller_family: &str,
        spot_code: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<ParkingOffer, ExchangeError> {
        if spot_code.is_empty() {
            return Err(ExchangeError::Validation("a parking spot must be selected".into()));
        }
        if !interval::is_valid_range(window_start, window_end) {
            return Err(ExchangeError::Validation("the offered window is not a valid range".into()));
        }

        let spot = self
            .spots
            .get(spot_code)
            .await?
            .filter(|s| s.owner_family_code == caller_family)
            .ok_or_else(|| {
                ExchangeError::Authorization(
                    "the selected spot does not belong to your family unit".into(),
                )
            })?;

        if self
            .offers
            .has_active_overlap(spot_code, window_start, window_end)
            .await?
        {
            return Err(ExchangeError::Conflict(
                "an active offer for this spot already overlaps that window".into(),
            ));
        }

        let offer = ParkingOffer::new(&spot, window_start, window_end);
        self.offers.insert(&offer).await?;
        tracing::info!(offer_id = %offer.id, spot = %offer.spot_code, "parking offer created");
        Ok(offer)
    }

    /// All `activa` offers, soonest window first.
    pub async fn list_active_offers(&self) -> Result<Vec<ParkingOffer>, ExchangeError> {
        self.offers.list_active().await
    }

    /// Withdraw an offer. Idempotent on already-cancelled offers; an
    /// occupied offer can no longer be withdrawn.
    pub async fn cancel_offer(
        &self,
        caller_family: &str,
        offer_id: Uuid,
    ) -> Result<ParkingOffer, ExchangeError> {
        let mut offer = self
            .offers
            .get(offer_id)
            .await?
            .ok_or_else(|| ExchangeError::NotFound("offer does not exist".into()))?;

        if offer.owner_family_code != caller_family {
            return Err(ExchangeError::Authorization("you cannot withdraw this offer".into()));
        }

        match offer.state {
            OfferState::Cancelada => Ok(offer),
            OfferState::Ocupada => {
                Err(ExchangeError::State("the offer has already been occupied".into()))
            }
            OfferState::Activa => {
                if !self
                    .offers
                    .transition(offer.id, OfferState::Activa, OfferState::Cancelada)
                    .await?
                {
                    return Err(ExchangeError::State("the offer is no longer active".into()));
                }
                offer.state = OfferState::Cancelada;
                offer.updated_at = Utc::now();
                tracing::info!(offer_id = %offer.id, "parking offer cancelled");
                Ok(offer)
            }
        }
    }

    /// File a standalone "I need a spot" request, created `pendiente`.
    pub async fn create_need_request(
        &self,
        caller_family: &str,
        requested_floor: i32,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<ParkingRequest, ExchangeError> {
        if !interval::is_valid_range(window_start, window_end) {
            return Err(ExchangeError::Validation("the requested window is not a valid range".into()));
        }

        let request = ParkingRequest::need(caller_family, requested_floor, window_start, window_end);
        self.requests.insert(&request).await?;
        tracing::info!(request_id = %request.id, floor = requested_floor, "parking request created");
        Ok(request)
    }

    /// The caller's non-cancelled requests, newest first.
    pub async fn list_own_requests(
        &self,
        caller_family: &str,
    ) -> Result<Vec<ParkingRequest>, ExchangeError> {
        self.requests.list_for_family(caller_family).await
    }

    /// Cancel a standalone request. Idempotent on already-cancelled ones;
    /// acceptance records are not cancellable through this path.
    pub async fn cancel_request(
        &self,
        caller_family: &str,
        request_id: Uuid,
    ) -> Result<ParkingRequest, ExchangeError> {
        let mut request = self
            .requests
            .get(request_id)
            .await?
            .ok_or_else(|| ExchangeError::NotFound("request does not exist".into()))?;

        if request.requester_family_code != caller_family {
            return Err(ExchangeError::Authorization("you cannot cancel this request".into()));
        }

        match request.state {
            RequestState::Cancelada => Ok(request),
            RequestState::Aceptada => {
                Err(ExchangeError::State("acceptance records cannot be cancelled".into()))
            }
            RequestState::Pendiente => {
                if !self
                    .requests
                    .transition(request.id, RequestState::Pendiente, RequestState::Cancelada)
                    .await?
                {
                    return Err(ExchangeError::State("the request is no longer pending".into()));
                }
                request.state = RequestState::Cancelada;
                request.updated_at = Utc::now();
                Ok(request)
            }
        }
    }

    /// Accept a sub-window of an active offer.
    ///
    /// The offer is claimed with a single conditional write (`activa` →
    /// `ocupada`) before the acceptance record is inserted, so of two
    /// concurrent callers exactly one wins; the loser observes the state
    /// error. Leftover segments of at least `min_segment_hours` are
    /// re-offered; shorter slivers are dropped. A failure to re-offer a
    /// leftover is logged but does not undo the acceptance.
    pub async fn accept_offer(
        &self,
        caller_family: &str,
        offer_id: Uuid,
        accept_start: DateTime<Utc>,
        accept_end: DateTime<Utc>,
    ) -> Result<ParkingRequest, ExchangeError> {
        if !interval::is_valid_range(accept_start, accept_end) {
            return Err(ExchangeError::Validation("the selected window is not a valid range".into()));
        }

        let offer = self
            .offers
            .get(offer_id)
            .await?
            .ok_or_else(|| ExchangeError::NotFound("offer does not exist".into()))?;

        if offer.state != OfferState::Activa {
            return Err(ExchangeError::State("the offer is no longer available".into()));
        }
        if offer.owner_family_code == caller_family {
            return Err(ExchangeError::Authorization("you cannot accept your own offer".into()));
        }
        if accept_start < offer.window_start || accept_end > offer.window_end {
            return Err(ExchangeError::Validation(
                "the selected window falls outside the offer".into(),
            ));
        }

        // Claim the offer first; the read above is advisory only.
        if !self
            .offers
            .transition(offer.id, OfferState::Activa, OfferState::Ocupada)
            .await?
        {
            return Err(ExchangeError::State("the offer is no longer available".into()));
        }

        let acceptance = ParkingRequest::acceptance(&offer, caller_family, accept_start, accept_end);
        self.requests.insert(&acceptance).await?;

        let mut leftovers = Vec::new();
        if offer.window_start < accept_start {
            leftovers.push((offer.window_start, accept_start));
        }
        if accept_end < offer.window_end {
            leftovers.push((accept_end, offer.window_end));
        }

        for (start, end) in leftovers {
            let hours = interval::segment_hours(start, end);
            if hours < self.config.min_segment_hours {
                tracing::debug!(
                    offer_id = %offer.id,
                    hours,
                    "dropping leftover segment below the minimum duration"
                );
                continue;
            }
            let reoffer = ParkingOffer::split_from(&offer, start, end);
            if let Err(err) = self.offers.insert(&reoffer).await {
                tracing::warn!(
                    offer_id = %offer.id,
                    segment_id = %reoffer.id,
                    %err,
                    "failed to re-offer leftover segment"
                );
            }
        }

        tracing::info!(
            offer_id = %offer.id,
            acceptance_id = %acceptance.id,
            "parking offer accepted"
        );
        Ok(acceptance)
    }
}
