pub mod crew;
pub mod prediction;
