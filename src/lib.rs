//! # connpass-raffle
//!
//! Raffle drawing over a connpass event's participant export.
//!
//! Participants and prizes are loaded from CSV exports. Winners are drawn
//! uniformly at random without replacement and the winner set is written
//! back to disk after every draw, so a restarted raffle picks up exactly
//! where it stopped. A thin REST layer exposes the raffle over HTTP.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── RaffleManager (service/)
//!     │       pool · winners · prizes
//!     │
//!     ├── Participant / Prize records (domain/)
//!     │
//!     └── CSV sources + winner file (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;

#[cfg(test)]
mod test_support;
