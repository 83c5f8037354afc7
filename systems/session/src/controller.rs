//! Thread-safe front door to a [`Session`] shared with the simulation clock.

use std::sync::{Arc, Mutex, MutexGuard};

use deck_defence_core::{
    CellCoord, CommandError, DefenderId, DefenderInfo, DefenderKind, Event, HudSnapshot,
    SessionSnapshot,
};
use thiserror::Error;

use crate::{
    config::SessionConfig,
    persistence::BestWaveStore,
    session::{Session, TickReport},
};

/// Raised when a panic left the session state in an unknown condition.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("session lock poisoned by a panicking holder")]
pub struct SessionPoisoned;

/// Serializes foreground commands against the background tick.
#[derive(Clone, Debug)]
pub struct SessionController {
    session: Arc<Mutex<Session>>,
    store: Arc<dyn BestWaveStore>,
}

impl SessionController {
    /// Creates a controller, reading the best wave from `store`.
    ///
    /// An unreadable store is logged and treated as no record.
    pub fn new(config: &SessionConfig, store: Arc<dyn BestWaveStore>) -> Self {
        let best_wave = store.load().unwrap_or_else(|error| {
            log::warn!("best wave unavailable, starting from zero: {error}");
            0
        });
        Self::with_session(Session::new(config, best_wave), store)
    }

    /// Wraps an existing session.
    pub fn with_session(session: Session, store: Arc<dyn BestWaveStore>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            store,
        }
    }

    /// Starts the next wave.
    pub fn start_wave(&self) -> Result<u32, CommandError> {
        self.lock().start_wave()
    }

    /// Places a defender.
    pub fn build(&self, kind: DefenderKind, cell: CellCoord) -> Result<DefenderId, CommandError> {
        self.lock().build(kind, cell)
    }

    /// Upgrades a defender and returns its new level.
    pub fn upgrade(&self, defender: DefenderId) -> Result<u32, CommandError> {
        self.lock().upgrade(defender)
    }

    /// Resets the session while keeping the best wave.
    pub fn restart(&self) {
        self.lock().restart();
    }

    /// Runs one tick and persists a new best wave once the lock is released.
    pub fn tick(&self) -> Result<TickReport, SessionPoisoned> {
        let report = self
            .session
            .lock()
            .map_err(|_| SessionPoisoned)?
            .tick();

        if let Some(best) = report.new_best {
            match self.store.save(best) {
                Ok(()) => log::info!("saved best wave {best}"),
                Err(error) => log::warn!("failed to save best wave {best}: {error}"),
            }
        }
        Ok(report)
    }

    /// Frame snapshot for presentation.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Heads-up display scalars.
    pub fn hud(&self) -> HudSnapshot {
        self.lock().hud()
    }

    /// Scaled damage and next upgrade price of a defender.
    pub fn defender_info(&self, defender: DefenderId) -> Option<DefenderInfo> {
        self.lock().defender_info(defender)
    }

    /// Takes every event emitted since the previous drain, newest
    /// [`MAX_PENDING_EVENTS`](crate::MAX_PENDING_EVENTS) at most.
    pub fn drain_events(&self) -> Vec<Event> {
        self.lock().drain_events()
    }

    /// Best wave reached so far.
    pub fn best_wave(&self) -> u32 {
        self.lock().best_wave()
    }

    /// Runs `read` against the locked session.
    pub fn inspect<R>(&self, read: impl FnOnce(&Session) -> R) -> R {
        read(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| {
            log::warn!("recovering session state after a panic");
            poisoned.into_inner()
        })
    }
}
