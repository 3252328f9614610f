//! Bus lookup server.
//!
//! Answers "which buses stop here, and when do they come next?" from a
//! read-only transit schedule database, over JSON and server-rendered HTML.
//! The [`client`] module holds the matching HTTP client and the front-end
//! session logic used by the `bus-board` terminal front-end.

pub mod client;
pub mod config;
pub mod domain;
pub mod locator;
pub mod schedule;
pub mod store;
pub mod suggest;
pub mod web;
