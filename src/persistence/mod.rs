//! Persistence layer: CSV sources and the winner file.
//!
//! Participant and prize exports are read-only inputs. The winner file is
//! the only durable state the raffle owns; it is rewritten in full after
//! every mutation.

pub mod csv_store;

pub use csv_store::{WinnerStore, read_records, winner_path_for};
