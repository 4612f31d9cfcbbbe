//! Best-effort persistence of the four player preferences.
//!
//! Values are stored as plain strings under configurable keys. A missing
//! entry, a corrupt entry and an unavailable substrate all read as
//! "use the default"; writes that fail are skipped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::config::{clamp_rate, clamp_skip_step, PlayerConfig};
use crate::error::StorageError;
use crate::utils::{clamp, format_number, parse_bool, parse_number};

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

/// A string key-value substrate.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Outcome of a raw read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Present(String),
    Absent,
}

impl StoredValue {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            StoredValue::Present(value) => Some(value.as_str()),
            StoredValue::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Skipped,
}

/// Typed preference access shared by every player on the page.
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Rc<dyn StorageBackend>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

impl PreferenceStore {
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStorage::default()))
    }

    /// Browser `localStorage`.
    #[cfg(target_arch = "wasm32")]
    pub fn local() -> Self {
        Self::new(Rc::new(LocalStorageBackend))
    }

    pub fn read_raw(&self, key: &str) -> StoredValue {
        match self.backend.get_item(key) {
            Ok(Some(value)) => StoredValue::Present(value),
            Ok(None) => StoredValue::Absent,
            Err(err) => {
                debug!(key, %err, "preference read failed, using default");
                StoredValue::Absent
            }
        }
    }

    pub fn write_raw(&self, key: &str, value: &str) -> WriteOutcome {
        match self.backend.set_item(key, value) {
            Ok(()) => WriteOutcome::Written,
            Err(err) => {
                debug!(key, %err, "preference write skipped");
                WriteOutcome::Skipped
            }
        }
    }

    /// Stored volume in [0,1], if present and numeric.
    pub fn read_volume(&self, config: &PlayerConfig) -> Option<f64> {
        let raw = self.read_raw(&config.volume_key);
        let value = parse_number(raw.as_deref(), f64::NAN);
        value.is_finite().then(|| clamp(value, 0.0, 1.0))
    }

    /// Stored mute flag, if present and recognisable.
    pub fn read_muted(&self, config: &PlayerConfig) -> Option<bool> {
        let raw = self.read_raw(&config.muted_key);
        let raw = raw.as_deref()?;
        let on = parse_bool(Some(raw), true);
        let off = parse_bool(Some(raw), false);
        // Both fallbacks agree only when the value actually parsed.
        (on == off).then_some(on)
    }

    /// Stored skip-step or the configured one.
    pub fn read_skip_step(&self, config: &PlayerConfig) -> u32 {
        let raw = self.read_raw(&config.skip_key);
        let value = parse_number(raw.as_deref(), f64::NAN);
        if value.is_finite() {
            clamp_skip_step(value)
        } else {
            config.skip_step
        }
    }

    /// Stored playback rate or the configured one.
    pub fn read_rate(&self, config: &PlayerConfig) -> f64 {
        let raw = self.read_raw(&config.rate_key);
        clamp_rate(parse_number(raw.as_deref(), config.rate))
    }

    pub fn write_volume(&self, config: &PlayerConfig, volume: f64, muted: bool) -> WriteOutcome {
        let first = self.write_raw(&config.volume_key, &format_number(clamp(volume, 0.0, 1.0)));
        let second = self.write_muted(config, muted);
        if first == WriteOutcome::Written && second == WriteOutcome::Written {
            WriteOutcome::Written
        } else {
            WriteOutcome::Skipped
        }
    }

    pub fn write_muted(&self, config: &PlayerConfig, muted: bool) -> WriteOutcome {
        self.write_raw(&config.muted_key, if muted { "true" } else { "false" })
    }

    pub fn write_skip_step(&self, config: &PlayerConfig, step: u32) -> WriteOutcome {
        self.write_raw(&config.skip_key, &step.to_string())
    }

    pub fn write_rate(&self, config: &PlayerConfig, rate: f64) -> WriteOutcome {
        self.write_raw(&config.rate_key, &format_number(rate))
    }
}

/// In-process storage; can simulate a disabled substrate.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn unavailable() -> Self {
        Self {
            entries: RefCell::default(),
            unavailable: true,
        }
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            unavailable: false,
        }
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries.borrow().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`, read and written as raw strings so values stay
/// readable by other scripts on the page.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageBackend;

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        // `raw()` panics when storage is disabled; probe the window first.
        let available = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some();
        if !available {
            return Err(StorageError::Unavailable);
        }
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| StorageError::Rejected(format!("{e:?}")))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let available = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .is_some();
        if !available {
            return Err(StorageError::Unavailable);
        }
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(entries: &[(&str, &str)]) -> (PreferenceStore, Rc<MemoryStorage>) {
        let backend = Rc::new(MemoryStorage::with_entries(entries.iter().copied()));
        (PreferenceStore::new(backend.clone()), backend)
    }

    #[test]
    fn absent_values_use_defaults() {
        let (store, _) = store_with(&[]);
        let config = PlayerConfig::default();
        assert_eq!(store.read_volume(&config), None);
        assert_eq!(store.read_muted(&config), None);
        assert_eq!(store.read_skip_step(&config), 10);
        assert_eq!(store.read_rate(&config), 1.0);
    }

    #[test]
    fn corrupt_skip_step_falls_back() {
        let (store, _) = store_with(&[("vc_skip_v1", "abc")]);
        assert_eq!(store.read_skip_step(&PlayerConfig::default()), 10);
    }

    #[test]
    fn stored_values_are_clamped() {
        let (store, _) = store_with(&[
            ("vc_volume_v1", "3.5"),
            ("vc_muted_v1", "true"),
            ("vc_skip_v1", "0"),
            ("vc_rate_v1", "10"),
        ]);
        let config = PlayerConfig::default();
        assert_eq!(store.read_volume(&config), Some(1.0));
        assert_eq!(store.read_muted(&config), Some(true));
        assert_eq!(store.read_skip_step(&config), 1);
        assert_eq!(store.read_rate(&config), 4.0);
    }

    #[test]
    fn unrecognised_mute_is_ignored() {
        let (store, _) = store_with(&[("vc_muted_v1", "sometimes")]);
        assert_eq!(store.read_muted(&PlayerConfig::default()), None);
    }

    #[test]
    fn writes_use_string_representation() {
        let (store, backend) = store_with(&[]);
        let config = PlayerConfig::default();
        assert_eq!(store.write_volume(&config, 0.35, false), WriteOutcome::Written);
        assert_eq!(store.write_skip_step(&config, 30), WriteOutcome::Written);
        assert_eq!(store.write_rate(&config, 1.5), WriteOutcome::Written);
        let snapshot = backend.snapshot();
        assert_eq!(snapshot["vc_volume_v1"], "0.35");
        assert_eq!(snapshot["vc_muted_v1"], "false");
        assert_eq!(snapshot["vc_skip_v1"], "30");
        assert_eq!(snapshot["vc_rate_v1"], "1.5");
    }

    #[test]
    fn unavailable_storage_degrades_silently() {
        let store = PreferenceStore::new(Rc::new(MemoryStorage::unavailable()));
        let config = PlayerConfig::default();
        assert_eq!(store.read_raw("vc_volume_v1"), StoredValue::Absent);
        assert_eq!(store.read_skip_step(&config), 10);
        assert_eq!(store.write_rate(&config, 2.0), WriteOutcome::Skipped);
    }
}
