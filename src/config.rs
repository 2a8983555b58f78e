//! Raffle configuration loaded from environment variables.
//!
//! All settings come from environment variables (or a `.env` file via
//! `dotenvy`).
//!
//! | Variable                  | Default            |
//! |---------------------------|--------------------|
//! | `LISTEN_ADDR`             | `127.0.0.1:3000`   |
//! | `RAFFLE_PARTICIPANTS_CSV` | `participants.csv` |
//! | `RAFFLE_PRIZES_CSV`       | `items.csv`        |
//! | `RAFFLE_SEED`             | unset (OS entropy) |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::service::RaffleSources;

/// Top-level raffle configuration.
///
/// Loaded once at startup via [`RaffleConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RaffleConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// connpass participant export.
    pub participants_csv: PathBuf,

    /// Prize list.
    pub prizes_csv: PathBuf,

    /// Fixed seed for reproducible draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl RaffleConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as a
    /// [`SocketAddr`], or if `RAFFLE_SEED` is set but is not a `u64`.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()?;

        let participants_csv = env_path("RAFFLE_PARTICIPANTS_CSV", "participants.csv");
        let prizes_csv = env_path("RAFFLE_PRIZES_CSV", "items.csv");

        let seed = match std::env::var("RAFFLE_SEED") {
            Ok(raw) => Some(raw.trim().parse::<u64>()?),
            Err(_) => None,
        };

        Ok(Self {
            listen_addr,
            participants_csv,
            prizes_csv,
            seed,
        })
    }

    /// Source files as a [`RaffleSources`] pair.
    #[must_use]
    pub fn sources(&self) -> RaffleSources {
        RaffleSources::new(self.participants_csv.clone(), self.prizes_csv.clone())
    }
}

/// Reads an environment variable as a path, returning `default` when it is
/// missing or empty.
fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map_or_else(|| PathBuf::from(default), PathBuf::from)
}
