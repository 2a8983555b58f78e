//! Participant record as exported by connpass.
//!
//! A [`Participant`] is parsed from one CSV row of the event's
//! participant export and written back, field for field, into the
//! winner file. Identity is the [`UserId`] alone.

use std::hash::{Hash, Hasher};

use serde::Serialize;
use utoipa::ToSchema;

use super::UserId;
use crate::error::RecordError;

/// Number of leading fields a participant row must carry.
pub const PARTICIPANT_FIELDS: usize = 11;

/// Substring connpass puts in the participation status of a cancelled
/// registration.
pub const CANCELLED_MARKER: &str = "キャンセル";

/// Status labels connpass uses for an attending registration.
const ACTIVE_LABELS: [&str; 2] = ["参加者", "参加"];

/// Classified participation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    /// Registered and attending (`参加者`).
    Active,
    /// Registration was cancelled. Never eligible for a draw.
    Cancelled,
    /// Anything else, e.g. the waiting list (`補欠者`).
    Other,
}

impl ParticipationStatus {
    /// Classifies a raw status field.
    ///
    /// A status is cancelled exactly when it contains [`CANCELLED_MARKER`],
    /// so `"参加者 (キャンセル)"` is [`ParticipationStatus::Cancelled`].
    /// Active requires an exact `参加者` or `参加` label; `不参加` and the
    /// waiting list are [`ParticipationStatus::Other`].
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        if raw.contains(CANCELLED_MARKER) {
            Self::Cancelled
        } else if ACTIVE_LABELS.contains(&raw.trim()) {
            Self::Active
        } else {
            Self::Other
        }
    }
}

/// One registered participant.
///
/// Equality and hashing compare [`Participant::user_id`] only; every other
/// field may drift between exports without changing who the record is.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Participant {
    /// Registration frame (参加枠), e.g. `"一般枠"`.
    pub frame_name: String,
    /// connpass user name; the record identity.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Registration date as exported.
    pub registered_at: String,
    /// Free-text comment left at registration.
    pub comment: String,
    /// Raw participation status text. See [`Participant::status`].
    pub participation: String,
    /// Raw attendance status text.
    pub attendance: String,
    /// Payment transaction id, absent for free events.
    pub payment_id: Option<String>,
    /// Invoice id, absent for free events.
    pub invoice_id: Option<String>,
    /// Last update timestamp as exported.
    pub updated_at: String,
    /// Receipt (sequence) number.
    pub receipt_number: u64,
}

impl Participant {
    /// Parses a participant from the fields of one CSV row.
    ///
    /// Fields past the eleventh are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TooFewFields`] if the row is shorter than
    /// [`PARTICIPANT_FIELDS`], or [`RecordError::InvalidNumber`] if the
    /// receipt number is not an unsigned integer.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RecordError> {
        let [
            frame_name,
            user_id,
            display_name,
            registered_at,
            comment,
            participation,
            attendance,
            payment_id,
            invoice_id,
            updated_at,
            receipt_number,
            ..,
        ] = row
        else {
            return Err(RecordError::TooFewFields {
                expected: PARTICIPANT_FIELDS,
                found: row.len(),
            });
        };

        let receipt_raw = receipt_number.as_ref().trim();
        let receipt_number = receipt_raw
            .parse::<u64>()
            .map_err(|_| RecordError::InvalidNumber {
                field: "receipt_number",
                value: receipt_raw.to_string(),
            })?;

        Ok(Self {
            frame_name: frame_name.as_ref().to_string(),
            user_id: UserId::new(user_id.as_ref()),
            display_name: display_name.as_ref().to_string(),
            registered_at: registered_at.as_ref().to_string(),
            comment: comment.as_ref().to_string(),
            participation: participation.as_ref().to_string(),
            attendance: attendance.as_ref().to_string(),
            payment_id: optional(payment_id.as_ref()),
            invoice_id: optional(invoice_id.as_ref()),
            updated_at: updated_at.as_ref().to_string(),
            receipt_number,
        })
    }

    /// Projects the record onto the fixed 11-field row layout used by the
    /// winner file.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.frame_name.clone(),
            self.user_id.to_string(),
            self.display_name.clone(),
            self.registered_at.clone(),
            self.comment.clone(),
            self.participation.clone(),
            self.attendance.clone(),
            self.payment_id.clone().unwrap_or_default(),
            self.invoice_id.clone().unwrap_or_default(),
            self.updated_at.clone(),
            self.receipt_number.to_string(),
        ]
    }

    /// Returns the classified participation status.
    #[must_use]
    pub fn status(&self) -> ParticipationStatus {
        ParticipationStatus::classify(&self.participation)
    }

    /// Returns `true` if the registration was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status() == ParticipationStatus::Cancelled
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.user_id == other.user_id
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.user_id.hash(state);
    }
}

fn optional(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn row(user: &str, status: &str) -> Vec<String> {
        vec![
            "一般枠".to_string(),
            user.to_string(),
            format!("{user} san"),
            "2019/04/01 10:00".to_string(),
            String::new(),
            status.to_string(),
            "未設定".to_string(),
            String::new(),
            "INV-1".to_string(),
            "2019/04/02 11:00".to_string(),
            " 42 ".to_string(),
        ]
    }

    #[test]
    fn parses_full_row() {
        let Ok(p) = Participant::from_row(&row("alice", "参加者")) else {
            panic!("valid row");
        };
        assert_eq!(p.user_id.as_str(), "alice");
        assert_eq!(p.display_name, "alice san");
        assert_eq!(p.payment_id, None);
        assert_eq!(p.invoice_id.as_deref(), Some("INV-1"));
        assert_eq!(p.receipt_number, 42);
        assert_eq!(p.status(), ParticipationStatus::Active);
    }

    #[test]
    fn short_row_is_rejected() {
        let short = ["一般枠", "alice", "Alice"];
        let Err(err) = Participant::from_row(&short) else {
            panic!("short row must fail");
        };
        assert_eq!(
            err,
            RecordError::TooFewFields {
                expected: PARTICIPANT_FIELDS,
                found: 3
            }
        );
    }

    #[test]
    fn non_numeric_receipt_is_rejected() {
        let mut bad = row("alice", "参加者");
        if let Some(receipt) = bad.last_mut() {
            *receipt = "n/a".to_string();
        }
        let Err(err) = Participant::from_row(&bad) else {
            panic!("non-numeric receipt must fail");
        };
        assert!(matches!(err, RecordError::InvalidNumber { field: "receipt_number", .. }));
    }

    #[test]
    fn extra_fields_are_ignored() {
        let mut long = row("bob", "参加者");
        long.push("trailing".to_string());
        assert!(Participant::from_row(&long).is_ok());
    }

    #[test]
    fn to_row_projects_every_field() {
        let Ok(p) = Participant::from_row(&row("carol", "補欠者")) else {
            panic!("valid row");
        };
        let out = p.to_row();
        assert_eq!(out.len(), PARTICIPANT_FIELDS);
        assert_eq!(out.get(1).map(String::as_str), Some("carol"));
        assert_eq!(out.get(7).map(String::as_str), Some(""));
        assert_eq!(out.last().map(String::as_str), Some("42"));

        let Ok(back) = Participant::from_row(&out) else {
            panic!("projected row must parse");
        };
        assert_eq!(back.to_row(), out);
    }

    #[test]
    fn equality_is_by_identity() {
        let Ok(a) = Participant::from_row(&row("alice", "参加者")) else {
            panic!("valid row");
        };
        let Ok(mut b) = Participant::from_row(&row("alice", "キャンセル")) else {
            panic!("valid row");
        };
        b.display_name = "someone else".to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn status_classification() {
        assert_eq!(ParticipationStatus::classify("キャンセル"), ParticipationStatus::Cancelled);
        assert_eq!(
            ParticipationStatus::classify("参加者 (キャンセル)"),
            ParticipationStatus::Cancelled
        );
        assert_eq!(ParticipationStatus::classify("参加者"), ParticipationStatus::Active);
        assert_eq!(ParticipationStatus::classify(" 参加者 "), ParticipationStatus::Active);
        assert_eq!(ParticipationStatus::classify("補欠者"), ParticipationStatus::Other);
    }

    #[test]
    fn only_the_marker_means_cancelled() {
        assert_eq!(
            ParticipationStatus::classify("Attending (no cancellation)"),
            ParticipationStatus::Other
        );
        assert_eq!(ParticipationStatus::classify("Cancelled"), ParticipationStatus::Other);
        let Ok(p) = Participant::from_row(&row("dave", "Attending (no cancellation)")) else {
            panic!("valid row");
        };
        assert!(!p.is_cancelled());
    }

    #[test]
    fn not_attending_is_not_active() {
        assert_eq!(ParticipationStatus::classify("不参加"), ParticipationStatus::Other);
    }
}
