#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Deck Defence.
//!
//! [`Session`] runs the fixed per-tick pipeline over the world and its
//! systems. [`SessionController`] shares one session between foreground
//! commands and the [`SimulationClock`] thread behind a single lock, and
//! persists the best wave through a [`BestWaveStore`].

mod clock;
mod config;
mod controller;
mod persistence;
mod session;

pub use clock::SimulationClock;
pub use config::{ConfigError, SessionConfig, SimulationConfig};
pub use controller::{SessionController, SessionPoisoned};
pub use persistence::{BestWaveStore, JsonBestWaveStore, MemoryBestWaveStore, ScoreStoreError};
pub use session::{Session, TickReport, MAX_PENDING_EVENTS};
