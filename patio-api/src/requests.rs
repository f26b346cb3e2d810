use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use patio_domain::{ParkingRequest, RequestState};

use crate::auth::FamilyUnit;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateNeedRequest {
    pub requested_floor: Option<i32>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RequestResponse {
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

impl From<ParkingRequest> for RequestResponse {
    fn from(request: ParkingRequest) -> Self {
        Self {
            id: request.id,
            linked_offer_id: request.linked_offer_id,
            requester_family_code: request.requester_family_code,
            requested_floor: request.requested_floor,
            window_start: request.window_start,
            window_end: request.window_end,
            state: request.state,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/parking/requests", post(create_request).get(list_requests))
        .route("/v1/parking/requests/{id}", delete(cancel_request))
}

/// POST /v1/parking/requests
async fn create_request(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
    Json(req): Json<CreateNeedRequest>,
) -> Result<(StatusCode, Json<RequestResponse>), AppError> {
    let floor = req
        .requested_floor
        .ok_or_else(|| AppError::ValidationError("a floor must be supplied".to_string()))?;

    let request = state
        .exchange
        .create_need_request(&family, floor, req.window_start, req.window_end)
        .await?;

    Ok((StatusCode::CREATED, Json(request.into())))
}

/// GET /v1/parking/requests
async fn list_requests(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let requests = state.exchange.list_own_requests(&family).await?;
    Ok(Json(requests.into_iter().map(RequestResponse::from).collect()))
}

/// DELETE /v1/parking/requests/{id}
async fn cancel_request(
    State(state): State<AppState>,
    Extension(FamilyUnit(family)): Extension<FamilyUnit>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, AppError> {
    let request = state.exchange.cancel_request(&family, request_id).await?;
    Ok(Json(request.into()))
}
