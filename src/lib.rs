//! Taxi Trips Library
//!
//! A Rust library for ingesting taxi trip CSV datasets and analysing the
//! trips they contain.
//!
//! This library provides tools for:
//! - Reading CSV sources in fixed-size chunks with bounded memory
//! - Cleaning rows (missing values, sentinel coordinates, duration outliers)
//! - Committing each chunk in its own store transaction, isolating failures
//! - Range queries and grouped analytics (hourly demand, popular routes,
//!   peak hours, distance distribution) on a polars aggregation engine
//! - Caching, rate limiting and request metrics around every query

pub mod config;
pub mod constants;
pub mod error;
pub mod utils;

// Core application modules
pub mod app {
    pub mod gateway;
    pub mod middleware;
    pub mod models;
    pub mod store;
    pub mod services {
        pub mod analytics;
        pub mod csv_reader;
        pub mod ingestion;
        pub mod record_cleaner;
        pub mod trip_query;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::gateway::QueryGateway;
pub use app::models::{TaxiTrip, TripSchema};
pub use config::Settings;
pub use error::{Error, Result};
