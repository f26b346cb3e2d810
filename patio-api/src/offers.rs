use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patio_domain::{OfferState, ParkingOffer};

use crate::auth::FamilyUnit;
use crate::error::AppError;
use crate::requests::RequestResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    pub spot_code: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptOfferRequest {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub spot_code: String,
    pub owner_family_code: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub state: OfferState,
    pub floor: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ParkingOffer> for OfferResponse {
    fn from(offer: ParkingOffer) -> Self {
        Self {
            id: offer.id,
            spot_code: offer.spot_code,
            owner_family_code: offer.owner_family_code,
            window_start: offer.window_start,
            window_end: offer.window_end,
            state: offer.state,
            floor: offer.floor,
            created_at: offer.created_at,
            updated_at: offer.updated_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/parking/offers", post(create_offer).get(list_offers))
        .route("/v1/parking/offers/{id}/accept", post(accept_offer))
        .route("/v1/parking/offers/{id}", delete(cancel_offer))
}

/// POST /v1/parking/offers
async fn create_offer(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
    Json(req): Json<CreateOfferRequest>,
) -> Result<(StatusCode, Json<OfferResponse>), AppError> {
    let offer = state
        .exchange
        .create_offer(&family, &req.spot_code, req.window_start, req.window_end)
        .await?;

    Ok((StatusCode::CREATED, Json(offer.into())))
}

/// GET /v1/parking/offers
async fn list_offers(
    State(state): State<AppState>,
    Extension(FamilyUnit(_)): Extension<FamilyUnit>,
) -> Result<Json<Vec<OfferResponse>>, AppError> {
    let offers = state.exchange.list_active_offers().await?;
    Ok(Json(offers.into_iter().map(OfferResponse::from).collect()))
}

/// POST /v1/parking/offers/{id}/accept
async fn accept_offer(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
    Path(offer_id): Path<Uuid>,
    Json(req): Json<AcceptOfferRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), AppError> {
    let acceptance = state
        .exchange
        .accept_offer(&family, offer_id, req.window_start, req.window_end)
        .await?;

    Ok((StatusCode::CREATED, Json(acceptance.into())))
}

/// DELETE /v1/parking/offers/{id}
async fn cancel_offer(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
    Path(offer_id): Path<Uuid>,
) -> Result<Json<OfferResponse>, AppError> {
    let offer = state.exchange.cancel_offer(&family, offer_id).await?;
    Ok(Json(offer.into()))
}
