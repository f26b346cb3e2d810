use serde::{Deserialize, Serialize};

/// A physical parking spot. Reference data owned by the wider portal;
/// the engine only reads it for ownership checks and floor display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSpot {
    pub code: String,
    pub owner_family_code: String,
    pub floor: i32,
}
