use crate::error::{AppError, AppResult, CeremonyKind};
use crate::store::models::{PendingCeremony, PendingEntry};
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// In-flight ceremonies keyed by user handle, at most one per user
///
/// The lock only ever guards map operations; no verification work happens
/// while it is held.
#[derive(Debug)]
pub struct CeremonyStore {
    ttl: Duration,
    entries: Mutex<HashMap<Uuid, PendingEntry>>,
}

impl CeremonyStore {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::weeks(52)),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Store a begun ceremony, replacing whatever was pending for the user
    pub fn put(&self, handle: Uuid, ceremony: PendingCeremony) {
        let entry = PendingEntry::new(ceremony, self.ttl);
        if let Some(previous) = self.entries.lock().insert(handle, entry) {
            tracing::debug!(
                "Discarding pending {} ceremony for {} begun at {}",
                previous.ceremony.kind(),
                handle,
                previous.created_at
            );
        }
    }

    /// Remove and return the pending ceremony for `handle`
    ///
    /// The entry is gone after this call whatever it returns: a second
    /// caller for the same handle always gets `SessionNotFound`. Expired
    /// entries, and entries of the other ceremony kind, are consumed and
    /// reported as `SessionNotFound` as well.
    pub fn take(&self, handle: &Uuid, expected: CeremonyKind) -> AppResult<PendingCeremony> {
        let entry = self
            .entries
            .lock()
            .remove(handle)
            .ok_or(AppError::SessionNotFound(expected))?;

        if entry.is_expired(Utc::now()) {
            tracing::debug!("Pending {} ceremony for {} expired", entry.ceremony.kind(), handle);
            return Err(AppError::SessionNotFound(expected));
        }
        if entry.ceremony.kind() != expected {
            tracing::debug!(
                "Pending ceremony for {} is {}, not {}",
                handle,
                entry.ceremony.kind(),
                expected
            );
            return Err(AppError::SessionNotFound(expected));
        }

        Ok(entry.ceremony)
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub fn contains(&self, handle: &Uuid) -> bool {
        self.entries.lock().contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
