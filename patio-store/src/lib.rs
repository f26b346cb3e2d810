pub mod app_config;
pub mod database;
pub mod directory_repo;
pub mod offer_repo;
pub mod request_repo;
pub mod spot_repo;

pub use database::DbClient;
pub use directory_repo::PostgresFamilyDirectory;
pub use offer_repo::PostgresOfferRepository;
pub use request_repo::PostgresRequestRepository;
pub use spot_repo::PostgresSpotRepository;

use patio_domain::ExchangeError;

pub(crate) fn storage_err(err: sqlx::Error) -> ExchangeError {
    ExchangeError::Storage(err.to_string())
}
