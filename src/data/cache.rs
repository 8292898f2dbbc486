use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;

use super::loader::{LoadOptions, LoadOutcome, LoadedTable, load};
use super::source::SourceLocation;

type Slot = Arc<OnceCell<Arc<LoadedTable>>>;

// ---------------------------------------------------------------------------
// SourceCache – memoized loads keyed by location
// ---------------------------------------------------------------------------

/// Process-wide memo of loaded tables.
///
/// The map lock is only held long enough to fetch the per-location slot;
/// the load itself runs inside that slot's `OnceCell`, so concurrent callers
/// for the same location wait for a single load while other locations
/// proceed. Failed loads leave the slot empty and are retried next time.
#[derive(Default)]
pub struct SourceCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memo key for `location` read with `options`. The series probe depends
    /// on the column schema, so the schema is part of the key.
    pub fn key_for(location: &SourceLocation, options: &LoadOptions) -> String {
        let mut hasher = DefaultHasher::new();
        options.schema.hash(&mut hasher);
        format!("{}#{:016x}", location.key(), hasher.finish())
    }

    /// Load `location`, or return the table loaded for it earlier.
    pub fn load(&self, location: &SourceLocation, options: &LoadOptions) -> LoadOutcome {
        self.get_or_load_with(&Self::key_for(location, options), || {
            load(location, options)
        })
    }

    /// Drop the memoized table for `location` read with `options`.
    pub fn forget(&self, location: &SourceLocation, options: &LoadOptions) -> bool {
        self.invalidate(&Self::key_for(location, options))
    }

    /// Memoize the outcome of `compute` under `key`; only successes stick.
    pub fn get_or_load_with<F>(&self, key: &str, compute: F) -> LoadOutcome
    where
        F: FnOnce() -> LoadOutcome,
    {
        let slot = self.slot(key);

        if let Some(hit) = slot.get() {
            log::debug!("cache hit for {key}");
            return LoadOutcome::Loaded(hit.clone());
        }

        let result = slot.get_or_try_init(|| match compute() {
            LoadOutcome::Loaded(table) => Ok(table),
            failed => Err(failed),
        });

        match result {
            Ok(table) => LoadOutcome::Loaded(table.clone()),
            Err(failed) => failed,
        }
    }

    /// Drop the memoized table for `key` so the next load re-reads it.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    fn slot(&self, key: &str) -> Slot {
        self.lock().entry(key.to_string()).or_default().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        // Slots are only inserted or removed under the lock, so a panic
        // elsewhere cannot leave the map half-updated.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}
