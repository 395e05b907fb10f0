pub mod clock;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod prices;
pub mod queries;
pub mod stats;
