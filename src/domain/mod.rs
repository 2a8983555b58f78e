//! Domain layer: participant and prize records, identities, and the
//! logging collaborator used by the raffle core.

pub mod draw_log;
pub mod participant;
pub mod prize;
pub mod user_id;

pub use draw_log::{DrawLog, TracingLog};
pub use participant::{Participant, ParticipationStatus};
pub use prize::Prize;
pub use user_id::UserId;
