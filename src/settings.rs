//! Debug overrides
//!
//! Persisted separately from the save record in LocalStorage. Values scale the
//! computed game values multiplicatively and never go below their minimum.

use serde::{Deserialize, Serialize};

/// Smallest accepted value for any override
pub const MIN_OVERRIDE: f64 = 0.1;

/// Tuning knobs for testing balance in a live run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOverrides {
    /// Multiplier on every hit
    pub attack_multiplier: f64,
    /// Multiplier on the spawn interval
    pub spawn_interval_scale: f32,
    /// Multiplier on the auto-attack interval
    pub auto_interval_scale: f32,
}

impl Default for DebugOverrides {
    fn default() -> Self {
        Self {
            attack_multiplier: 1.0,
            spawn_interval_scale: 1.0,
            auto_interval_scale: 1.0,
        }
    }
}

fn floor_override(value: f64) -> f64 {
    if value.is_finite() {
        value.max(MIN_OVERRIDE)
    } else {
        1.0
    }
}

impl DebugOverrides {
    pub fn set_attack_multiplier(&mut self, value: f64) {
        self.attack_multiplier = floor_override(value);
    }

    pub fn set_spawn_interval_scale(&mut self, value: f32) {
        self.spawn_interval_scale = floor_override(value as f64) as f32;
    }

    pub fn set_auto_interval_scale(&mut self, value: f32) {
        self.auto_interval_scale = floor_override(value as f64) as f32;
    }

    /// Copy with every field forced into range (for values read from storage)
    pub fn sanitized(self) -> Self {
        let mut out = Self::default();
        out.set_attack_multiplier(self.attack_multiplier);
        out.set_spawn_interval_scale(self.spawn_interval_scale);
        out.set_auto_interval_scale(self.auto_interval_scale);
        out
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "infiniteRebirthBreaker_debug";

    /// Load overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Self>(&json) {
                    Ok(overrides) => {
                        log::info!("Loaded debug overrides from LocalStorage");
                        return overrides.sanitized();
                    }
                    Err(e) => log::warn!("Ignoring malformed debug overrides: {e}"),
                }
            }
        }

        Self::default()
    }

    /// Save overrides to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::error!("Failed to save debug overrides");
                } else {
                    log::info!("Debug overrides saved");
                }
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimums() {
        let mut d = DebugOverrides::default();
        d.set_attack_multiplier(0.0);
        d.set_spawn_interval_scale(-3.0);
        d.set_auto_interval_scale(0.05);
        assert_eq!(d.attack_multiplier, 0.1);
        assert!((d.spawn_interval_scale - 0.1).abs() < 1e-6);
        assert!((d.auto_interval_scale - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_resets() {
        let mut d = DebugOverrides::default();
        d.set_attack_multiplier(f64::NAN);
        assert_eq!(d.attack_multiplier, 1.0);
    }

    #[test]
    fn test_sanitize_from_json() {
        let d: DebugOverrides = serde_json::from_str(r#"{"attack_multiplier": 0.0}"#).unwrap();
        let d = d.sanitized();
        assert_eq!(d.attack_multiplier, 0.1);
        assert_eq!(d.spawn_interval_scale, 1.0);
        assert!(!d.is_default());
    }
}
