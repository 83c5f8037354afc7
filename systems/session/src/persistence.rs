//! Storage for the best wave reached across sessions.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use serde_json::Value;
use thiserror::Error;

const DEFAULT_SCORE_KEY: &str = "tower";

/// Failures raised by best-wave stores.
#[derive(Debug, Error)]
pub enum ScoreStoreError {
    /// The score file could not be read or written.
    #[error("score file i/o failed at {}", path.display())]
    Io {
        /// Location of the score file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The score file does not hold a JSON object.
    #[error("score file is not a json object")]
    Json(#[from] serde_json::Error),
}

/// Persistent record of the best wave reached.
pub trait BestWaveStore: Send + Sync + fmt::Debug {
    /// Reads the stored best wave; zero when nothing was recorded yet.
    fn load(&self) -> Result<u32, ScoreStoreError>;

    /// Records a new best wave.
    fn save(&self, wave: u32) -> Result<(), ScoreStoreError>;
}

/// JSON score file shaped as `{ "<game>": <best> }`, shared with other games.
#[derive(Clone, Debug)]
pub struct JsonBestWaveStore {
    path: PathBuf,
    key: String,
}

impl JsonBestWaveStore {
    /// Creates a store backed by the provided file under the default key.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_key(path, DEFAULT_SCORE_KEY)
    }

    /// Creates a store backed by the provided file and entry key.
    #[must_use]
    pub fn with_key(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Location of the score file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_scores(&self) -> Result<BTreeMap<String, Value>, ScoreStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(ScoreStoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(serde_json::from_str(&contents)?)
    }
}

impl BestWaveStore for JsonBestWaveStore {
    fn load(&self) -> Result<u32, ScoreStoreError> {
        let scores = self.read_scores()?;
        let best = scores
            .get(&self.key)
            .and_then(Value::as_u64)
            .map_or(0, |value| u32::try_from(value).unwrap_or(u32::MAX));
        Ok(best)
    }

    fn save(&self, wave: u32) -> Result<(), ScoreStoreError> {
        let mut scores = self.read_scores().unwrap_or_else(|error| {
            log::warn!("discarding unreadable score file: {error}");
            BTreeMap::new()
        });
        let _ = scores.insert(self.key.clone(), Value::from(wave));

        let io_error = |source| ScoreStoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let contents = serde_json::to_string_pretty(&scores)?;
        fs::write(&self.path, contents).map_err(io_error)?;
        Ok(())
    }
}

/// In-memory store, cloned handles share the same record.
#[derive(Clone, Debug, Default)]
pub struct MemoryBestWaveStore {
    best: Arc<AtomicU32>,
    saves: Arc<AtomicU32>,
}

impl MemoryBestWaveStore {
    /// Creates a store pre-loaded with `best`.
    #[must_use]
    pub fn with_best(best: u32) -> Self {
        Self {
            best: Arc::new(AtomicU32::new(best)),
            saves: Arc::default(),
        }
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }
}

impl BestWaveStore for MemoryBestWaveStore {
    fn load(&self) -> Result<u32, ScoreStoreError> {
        Ok(self.best.load(Ordering::SeqCst))
    }

    fn save(&self, wave: u32) -> Result<(), ScoreStoreError> {
        self.best.store(wave, Ordering::SeqCst);
        let _ = self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
