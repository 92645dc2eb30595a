//! Great-circle distance and the movement filter

mod distance;
mod filter;

pub use distance::{haversine_meters, EARTH_RADIUS_METERS};
pub use filter::{MovementFilter, MOVEMENT_THRESHOLD_METERS};
