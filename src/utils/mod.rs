//! Pure helpers shared across services: geography, statistics, time and
//! input validation.

pub mod geo;
pub mod stats;
pub mod time;
pub mod validation;
