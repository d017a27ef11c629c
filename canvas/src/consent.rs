//! Cookie-consent flags persisted under the `cookie-consent` key.
//!
//! Strictly necessary cookies cannot be declined: every constructor and every
//! save forces `necessary = true`.

#[cfg(test)]
#[path = "consent_test.rs"]
mod consent_test;

use serde::{Deserialize, Serialize};

use crate::consts::CONSENT_KEY;
use crate::storage::{KeyValueStorage, StorageError, load_json, save_json};

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPreferences {
    pub necessary: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub marketing: bool,
    #[serde(default)]
    pub functional: bool,
}

impl Default for ConsentPreferences {
    fn default() -> Self {
        Self::necessary_only()
    }
}

impl ConsentPreferences {
    #[must_use]
    pub fn accept_all() -> Self {
        Self { necessary: true, analytics: true, marketing: true, functional: true }
    }

    #[must_use]
    pub fn necessary_only() -> Self {
        Self { necessary: true, analytics: false, marketing: false, functional: false }
    }

    /// The stored answer, or `None` if the visitor has not answered yet.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored flags cannot be read or parsed.
    pub fn load<S: KeyValueStorage + ?Sized>(storage: &S) -> Result<Option<Self>, StorageError> {
        let stored: Option<Self> = load_json(storage, CONSENT_KEY)?;
        Ok(stored.map(|prefs| Self { necessary: true, ..prefs }))
    }

    /// Persist these flags with `necessary` forced on and return what was
    /// written.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn save<S: KeyValueStorage + ?Sized>(self, storage: &mut S) -> Result<Self, StorageError> {
        let prefs = Self { necessary: true, ..self };
        save_json(storage, CONSENT_KEY, &prefs)?;
        Ok(prefs)
    }
}
