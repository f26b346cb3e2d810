use std::sync::Arc;

use patio_domain::repository::FamilyDirectory;
use patio_domain::ParkingExchange;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub exchange: Arc<ParkingExchange>,
    pub directory: Arc<dyn FamilyDirectory>,
    pub auth: AuthConfig,
}
