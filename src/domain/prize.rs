//! Prize record loaded from the item list.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::RecordError;

/// Number of leading fields a prize row must carry.
pub const PRIZE_FIELDS: usize = 3;

/// One prize on offer. Prizes are never bound to winners by the raffle
/// itself; the host hands them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Prize {
    /// Item identifier.
    pub id: String,
    /// Sponsor or provider of the item.
    pub provider: String,
    /// Item name.
    pub name: String,
}

impl Prize {
    /// Parses a prize from the fields of one CSV row.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::TooFewFields`] if the row is shorter than
    /// [`PRIZE_FIELDS`].
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, RecordError> {
        let [id, provider, name, ..] = row else {
            return Err(RecordError::TooFewFields {
                expected: PRIZE_FIELDS,
                found: row.len(),
            });
        };
        Ok(Self {
            id: id.as_ref().to_string(),
            provider: provider.as_ref().to_string(),
            name: name.as_ref().to_string(),
        })
    }
}
