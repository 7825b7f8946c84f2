//! Save record persistence
//!
//! Features:
//! - Versioned camelCase JSON record
//! - Field-by-field repair on load (load never fails)
//! - Throttled writes with a forced path for terminal events
//! - Failed writes are kept dirty and retried once the throttle window passes

pub mod backend;
pub mod record;

pub use backend::{MemoryBackend, SaveBackend, StorageError, StorageResult};
#[cfg(not(target_arch = "wasm32"))]
pub use backend::FileBackend;
pub use record::{Repaired, SAVE_VERSION, SaveRecord, repair};

use crate::consts::SAVE_THROTTLE_MS;

/// Result of a save attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the backend
    Written,
    /// Kept in memory; a write happened less than the throttle window ago
    Throttled,
    /// The backend refused; kept in memory and retried by a later flush
    Failed,
}

/// Owns the authoritative in-memory record and its backend
#[derive(Debug)]
pub struct SaveStore<B: SaveBackend> {
    backend: B,
    record: SaveRecord,
    /// Time of the last write attempt, successful or not
    last_attempt_ms: Option<f64>,
    dirty: bool,
}

impl<B: SaveBackend> SaveStore<B> {
    /// Load (and repair) the stored record. A missing or unreadable save
    /// starts from defaults.
    pub fn open(backend: B, now: f64) -> Self {
        let (record, dirty) = match backend.read() {
            Ok(Some(text)) => {
                let repaired = record::parse(&text, now);
                if !repaired.is_clean() {
                    log::warn!(
                        "Repaired {} save field(s): {:?}",
                        repaired.repaired_fields.len(),
                        repaired.repaired_fields
                    );
                }
                let dirty = !repaired.is_clean();
                (repaired.record, dirty)
            }
            Ok(None) => {
                log::info!("No save data found, starting fresh");
                (SaveRecord::default_at(now), false)
            }
            Err(e) => {
                log::error!("Failed to read save data: {e}");
                (SaveRecord::default_at(now), false)
            }
        };

        log::info!(
            "Save loaded: max stage {}, {} Rebirth Stones, attack level {}",
            record.max_stage,
            record.rebirth_stones,
            record.attack_level
        );

        Self {
            backend,
            record,
            last_attempt_ms: None,
            dirty,
        }
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    /// In-memory changes not yet written
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn throttled(&self, now: f64) -> bool {
        match self.last_attempt_ms {
            Some(last) => now - last < SAVE_THROTTLE_MS,
            None => false,
        }
    }

    /// Replace the record and persist it. Max stage never goes down; version
    /// and timestamps are stamped here. `force` ignores the throttle.
    pub fn commit(&mut self, mut record: SaveRecord, now: f64, force: bool) -> SaveOutcome {
        record.max_stage = record.max_stage.max(self.record.max_stage).max(1);
        record.version = SAVE_VERSION.to_string();
        record.last_played = now;
        self.record = record;
        self.dirty = true;

        if !force && self.throttled(now) {
            return SaveOutcome::Throttled;
        }
        self.write(now)
    }

    /// Write pending changes if the throttle allows. `None` when clean.
    pub fn flush(&mut self, now: f64) -> Option<SaveOutcome> {
        if !self.dirty {
            return None;
        }
        if self.throttled(now) {
            return Some(SaveOutcome::Throttled);
        }
        Some(self.write(now))
    }

    /// Delete the stored save and return to defaults
    pub fn reset(&mut self, now: f64) -> StorageResult<()> {
        self.record = SaveRecord::default_at(now);
        self.dirty = false;
        self.last_attempt_ms = None;
        self.backend.remove()?;
        log::info!("Save data reset");
        Ok(())
    }

    fn write(&mut self, now: f64) -> SaveOutcome {
        // A refusing backend is not hammered every frame
        self.last_attempt_ms = Some(now);
        self.record.last_saved = now;
        let result = serde_json::to_string(&self.record)
            .map_err(StorageError::from)
            .and_then(|json| self.backend.write(&json));

        match result {
            Ok(()) => {
                self.dirty = false;
                log::info!("Game saved (max stage {})", self.record.max_stage);
                SaveOutcome::Written
            }
            Err(e) => {
                log::error!("Failed to save game: {e}");
                SaveOutcome::Failed
            }
        }
    }
}
