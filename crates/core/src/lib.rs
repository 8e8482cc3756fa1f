//! Domain core for crew risk generation.
//!
//! Holds the value types and scoring rules, the [`store::RecordStore`] and
//! [`scoring::Scorer`] seams, and the write-once generation gate in
//! [`generation`]. Read-side dashboard figures live in [`dashboard`].

pub mod dashboard;
pub mod error;
pub mod generation;
pub mod records;
pub mod risk;
pub mod scoring;
pub mod store;
pub mod types;
