//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver-backed browser used to load chord pages
//! the way a visitor would, including pages the user navigated to by hand.
//!
//! - [`browser::driver::CifraDriver`]: WebDriver client wrapper
//! - [`browser::page::CifraPage`]: navigation and page source helpers
//! - [`browser::behavioral::BehavioralEngine`]: human-like timings
//! - [`browser::stealth`]: stealth profiles, launch options and JS evasions
pub mod browser;

pub use browser::driver::{CifraDriver, DriverOptions};
pub use browser::page::CifraPage;
pub use browser::stealth::StealthProfile;
