//! Raffle manager: participant pool, winner set and their persistence.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{DrawLog, Participant, Prize, TracingLog, UserId};
use crate::error::RaffleError;
use crate::persistence::{WinnerStore, read_records};

/// Input files of a raffle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleSources {
    /// connpass participant export (with header row).
    pub participants: PathBuf,
    /// Prize list (with header row).
    pub prizes: PathBuf,
}

impl RaffleSources {
    /// Creates a new source pair.
    #[must_use]
    pub fn new(participants: impl Into<PathBuf>, prizes: impl Into<PathBuf>) -> Self {
        Self {
            participants: participants.into(),
            prizes: prizes.into(),
        }
    }
}

/// Point-in-time summary of the raffle, safe to hand out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RaffleSnapshot {
    /// Participants still eligible to be drawn.
    pub pool_size: usize,
    /// Winners drawn so far.
    pub winner_count: usize,
    /// Prizes on the list.
    pub prize_count: usize,
    /// Winner identifiers in draw order.
    pub winners: Vec<UserId>,
}

/// Fully loaded collections. Built off to the side and swapped in whole,
/// so a failed load never leaves a partially populated manager behind.
#[derive(Debug, Default)]
struct RaffleState {
    pool: Vec<Participant>,
    winners: Vec<Participant>,
    winner_ids: HashSet<UserId>,
    prizes: Vec<Prize>,
}

/// Owns the raffle state and keeps the winner file in step with it.
///
/// Every mutation follows the pattern: change memory → persist the whole
/// winner set → on failure undo the change in memory → return. A call that
/// returns `Ok` has already reached durable storage.
///
/// # Invariants
///
/// - No cancelled participant is ever in the pool.
/// - No identifier is both in the pool and in the winner set.
/// - Winner identifiers are unique; the winner set is in draw order.
#[derive(Debug)]
pub struct RaffleManager {
    sources: RaffleSources,
    store: WinnerStore,
    state: RaffleState,
    log: Arc<dyn DrawLog>,
    rng: StdRng,
}

impl RaffleManager {
    /// Loads a raffle from `participants` and `prizes`, logging through
    /// `tracing` and drawing with an OS-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns a [`RaffleError`] if any source cannot be read or holds a
    /// malformed row.
    pub fn new(
        participants: impl Into<PathBuf>,
        prizes: impl Into<PathBuf>,
    ) -> Result<Self, RaffleError> {
        Self::open(
            RaffleSources::new(participants, prizes),
            Arc::new(TracingLog),
            StdRng::from_os_rng(),
        )
    }

    /// Loads a raffle with an explicit log sink and random generator.
    ///
    /// Load order: persisted winners (if the winner file exists), then the
    /// participant export minus cancelled registrations and prior winners,
    /// then the prize list.
    ///
    /// # Errors
    ///
    /// Returns a [`RaffleError`] if any source cannot be read or holds a
    /// malformed row. No manager exists in that case.
    pub fn open(
        sources: RaffleSources,
        log: Arc<dyn DrawLog>,
        rng: StdRng,
    ) -> Result<Self, RaffleError> {
        let store = WinnerStore::for_participants(&sources.participants);
        let state = load_state(&sources, &store, log.as_ref())?;
        Ok(Self {
            sources,
            store,
            state,
            log,
            rng,
        })
    }

    /// Re-reads all three files and replaces the in-memory state.
    ///
    /// On failure the current state is kept as it was.
    ///
    /// # Errors
    ///
    /// Returns a [`RaffleError`] if any source cannot be read or holds a
    /// malformed row.
    pub fn reload(&mut self) -> Result<(), RaffleError> {
        self.state = load_state(&self.sources, &self.store, self.log.as_ref())?;
        Ok(())
    }

    /// Draws one participant uniformly at random and records them as a
    /// winner.
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::EmptyPool`] if nobody is left to draw, or
    /// [`RaffleError::Persistence`] if the winner file cannot be written.
    /// Neither leaves any change behind.
    pub fn pick(&mut self) -> Result<Participant, RaffleError> {
        if self.state.pool.is_empty() {
            return Err(RaffleError::EmptyPool);
        }
        let index = self.rng.random_range(0..self.state.pool.len());
        let winner = self.state.pool.remove(index);
        let drawn = winner.clone();
        self.state.winner_ids.insert(winner.user_id.clone());
        self.state.winners.push(winner);

        if let Err(e) = self.save() {
            if let Some(winner) = self.state.winners.pop() {
                self.state.winner_ids.remove(&winner.user_id);
                self.state.pool.insert(index, winner);
            }
            return Err(e);
        }

        self.log.debug(&format!("Draw: {}", drawn.user_id));
        Ok(drawn)
    }

    /// Removes `user_id` from the winner set and persists the change.
    ///
    /// Returns `Ok(false)` without touching anything when `user_id` is not
    /// a winner. The removed participant does not go back into the pool;
    /// they become eligible again only after a [`RaffleManager::reload`].
    ///
    /// # Errors
    ///
    /// Returns [`RaffleError::Persistence`] if the winner file cannot be
    /// written; the winner stays in place.
    pub fn remove_winner(&mut self, user_id: &str) -> Result<bool, RaffleError> {
        let Some(position) = self
            .state
            .winners
            .iter()
            .position(|w| w.user_id.as_str() == user_id)
        else {
            return Ok(false);
        };

        self.log.debug(&format!("Remove {user_id} from winner list"));
        let removed = self.state.winners.remove(position);
        self.state.winner_ids.remove(&removed.user_id);

        if let Err(e) = self.save() {
            self.state.winner_ids.insert(removed.user_id.clone());
            self.state.winners.insert(position, removed);
            return Err(e);
        }
        Ok(true)
    }

    /// Participants still eligible to be drawn, in source order.
    #[must_use]
    pub fn pool(&self) -> &[Participant] {
        &self.state.pool
    }

    /// Winners in draw order.
    #[must_use]
    pub fn winners(&self) -> &[Participant] {
        &self.state.winners
    }

    /// Prize list in source order.
    #[must_use]
    pub fn prizes(&self) -> &[Prize] {
        &self.state.prizes
    }

    /// Returns `true` if `user_id` is in the winner set.
    #[must_use]
    pub fn is_winner(&self, user_id: &str) -> bool {
        self.state.winner_ids.contains(user_id)
    }

    /// Input files this raffle was loaded from.
    #[must_use]
    pub fn sources(&self) -> &RaffleSources {
        &self.sources
    }

    /// Path of the persisted winner file.
    #[must_use]
    pub fn winner_path(&self) -> &Path {
        self.store.path()
    }

    /// Returns a summary of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RaffleSnapshot {
        RaffleSnapshot {
            pool_size: self.state.pool.len(),
            winner_count: self.state.winners.len(),
            prize_count: self.state.prizes.len(),
            winners: self
                .state
                .winners
                .iter()
                .map(|w| w.user_id.clone())
                .collect(),
        }
    }

    fn save(&self) -> Result<(), RaffleError> {
        self.log
            .debug(&format!("Save: {}", self.store.path().display()));
        self.store.save(&self.state.winners)
    }
}

fn load_state(
    sources: &RaffleSources,
    store: &WinnerStore,
    log: &dyn DrawLog,
) -> Result<RaffleState, RaffleError> {
    let mut state = RaffleState::default();

    if store.path().is_file() {
        log.debug(&format!("Load: {}", store.path().display()));
    }
    for winner in store.load()? {
        if state.winner_ids.insert(winner.user_id.clone()) {
            state.winners.push(winner);
        } else {
            log.debug(&format!("Skip duplicate winner {}", winner.user_id));
        }
    }

    log.debug(&format!("Load: {}", sources.participants.display()));
    let mut seen = HashSet::new();
    for participant in read_records(&sources.participants, true, |row| {
        Participant::from_row(row)
    })? {
        if participant.is_cancelled() || state.winner_ids.contains(&participant.user_id) {
            continue;
        }
        if seen.insert(participant.user_id.clone()) {
            state.pool.push(participant);
        }
    }

    log.debug(&format!("Load: {}", sources.prizes.display()));
    state.prizes = read_records(&sources.prizes, true, |row| Prize::from_row(row))?;

    Ok(state)
}
