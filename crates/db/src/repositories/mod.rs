//! Repository layer: one zero-sized struct per table with async associated functions.

pub mod crew_repo;
pub mod prediction_repo;

pub use crew_repo::CrewRepo;
pub use prediction_repo::PredictionRepo;
