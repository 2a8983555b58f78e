//! Service layer: the raffle state machine.
//!
//! [`RaffleManager`] owns the participant pool, the winner set and the
//! prize list, and persists the winner set through
//! [`crate::persistence::WinnerStore`] after every mutation.

pub mod raffle_manager;

pub use raffle_manager::{RaffleManager, RaffleSnapshot, RaffleSources};
