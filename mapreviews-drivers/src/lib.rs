//! Driver layer for browser automation.
//!
//! This crate exposes the page-collaborator traits the harvester is written
//! against, plus a WebDriver implementation of them.
//!
//! - [`traits`]: [`Browser`], [`Page`], [`PageElement`]
//! - [`browser::driver::FantocciniBrowser`]: one WebDriver session per page
//! - [`browser::page::FantocciniPage`]: DOM helpers over a `fantoccini` client
//! - [`browser::behavioral::BehavioralEngine`]: human‑like timings and typing
pub mod browser;
pub mod traits;

pub use traits::{Browser, Page, PageElement};
