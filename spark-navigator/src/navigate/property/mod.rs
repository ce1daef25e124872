pub mod direction;
pub mod distance;
pub mod gap;
pub mod zone;
