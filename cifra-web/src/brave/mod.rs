//! Brave Search API (web vertical).
pub mod client;
pub mod types;

pub use client::BraveApi;
