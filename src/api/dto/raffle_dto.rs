//! Raffle DTOs for draws and list endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Participant, ParticipationStatus, Prize, UserId};

/// Participant as returned by the API, with its classified status.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantDto {
    /// connpass user name.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Registration frame.
    pub frame_name: String,
    /// Classified participation status.
    pub status: ParticipationStatus,
    /// Receipt number.
    pub receipt_number: u64,
}

impl From<&Participant> for ParticipantDto {
    fn from(p: &Participant) -> Self {
        Self {
            user_id: p.user_id.clone(),
            display_name: p.display_name.clone(),
            frame_name: p.frame_name.clone(),
            status: p.status(),
            receipt_number: p.receipt_number,
        }
    }
}

/// Response body for `GET /participants` and `GET /winners`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantListResponse {
    /// Participants in pool order or draw order.
    pub data: Vec<ParticipantDto>,
    /// Number of entries in `data`.
    pub total: usize,
}

impl ParticipantListResponse {
    /// Builds a list response from a slice of records.
    #[must_use]
    pub fn from_records(records: &[Participant]) -> Self {
        Self {
            data: records.iter().map(ParticipantDto::from).collect(),
            total: records.len(),
        }
    }
}

/// Response body for `GET /prizes`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeListResponse {
    /// Prizes in list order.
    pub data: Vec<Prize>,
    /// Number of prizes.
    pub total: usize,
}

/// Response body for `POST /draws` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    /// 1-based position of this winner in draw order.
    pub draw_number: usize,
    /// The drawn participant.
    pub winner: ParticipantDto,
    /// Participants left in the pool.
    pub remaining: usize,
    /// Server timestamp of the draw.
    pub drawn_at: DateTime<Utc>,
}
