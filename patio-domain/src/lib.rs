pub mod error;
pub mod exchange;
pub mod interval;
pub mod memory;
pub mod offer;
pub mod repository;
pub mod request;
pub mod spot;

pub use error::ExchangeError;
pub use exchange::{ExchangeConfig, ParkingExchange};
pub use offer::{OfferState, ParkingOffer};
pub use request::{ParkingRequest, RequestState};
pub use spot::ParkingSpot;
