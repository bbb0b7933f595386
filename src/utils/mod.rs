pub mod marker;
pub mod rng;

pub use marker::EpochMarker;
pub use rng::RandomNumberGenerator;
