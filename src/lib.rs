//! parkfinder library
//!
//! Scrapes nps.gov for national sites by state and looks up places near a
//! chosen site, caching every response in a single JSON file.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod error;

pub use app::{App, AppState};
pub use error::AppError;
