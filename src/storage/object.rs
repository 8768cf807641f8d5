//! Stored Objects and the Owner-Side Object Map
//!
//! This module holds the data model of the store: a [`StoredObject`] is an
//! immutable payload with an insertion time and an expiry deadline, and an
//! [`ObjectMap`] is the key → object mapping owned by the engine's command loop.
//!
//! ## Expiry Rules
//!
//! An object is live while `now < expires_at`. Once an object is observed
//! expired it is removed, whether the observer is a read (lazy eviction) or the
//! periodic sweep (active eviction). Both paths go through
//! [`ObjectMap::evict_if_expired`] so they can never disagree about what
//! "expired" means.
//!
//! `ObjectMap` is not thread-safe and does not need to be: only the command
//! loop ever touches it.

use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Longest lifetime an object can have; larger TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// An immutable payload stored under a key.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// The key this object was stored under
    pub key: String,
    /// The payload bytes (opaque to the store)
    pub payload: Bytes,
    /// When this object was inserted
    pub created_at: Instant,
    /// The first instant at which this object is no longer readable
    pub expires_at: Instant,
}

impl StoredObject {
    /// Creates a new object inserted at `now` that lives for `ttl`.
    ///
    /// A zero TTL produces an object that is already expired.
    pub fn new(key: String, payload: Bytes, ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            payload,
            created_at: now,
            expires_at: now + ttl.min(MAX_TTL),
        }
    }

    /// Checks if this object has expired at the given instant.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Outcome of a lookup against the object map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// A live object was found
    Hit(Bytes),
    /// Nothing was stored under the key
    Absent,
    /// An object was found but had expired, and was evicted
    Expired,
}

/// The key → object mapping owned by the command loop.
#[derive(Debug, Default)]
pub struct ObjectMap {
    objects: HashMap<String, StoredObject>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an object, fully replacing any previous object under the same key.
    ///
    /// Returns `true` if the key was new.
    pub fn insert(&mut self, key: String, payload: Bytes, ttl: Duration, now: Instant) -> bool {
        let object = StoredObject::new(key.clone(), payload, ttl, now);
        self.objects.insert(key, object).is_none()
    }

    /// Looks up a key, evicting the object if it has expired.
    pub fn lookup(&mut self, key: &str, now: Instant) -> Lookup {
        if self.evict_if_expired(key, now) {
            return Lookup::Expired;
        }

        match self.objects.get(key) {
            Some(object) => Lookup::Hit(object.payload.clone()),
            None => Lookup::Absent,
        }
    }

    /// Removes the object under `key` if it has expired at `now`.
    ///
    /// This is the single deletion routine shared by the read path and the sweep.
    /// Returns `true` if an object was evicted.
    pub fn evict_if_expired(&mut self, key: &str, now: Instant) -> bool {
        let expired = self
            .objects
            .get(key)
            .map(|object| object.is_expired_at(now))
            .unwrap_or(false);

        if expired {
            self.objects.remove(key);
        }

        expired
    }

    /// Removes every expired object.
    ///
    /// Returns the keys that were evicted.
    pub fn sweep(&mut self, now: Instant) -> Vec<String> {
        let candidates: Vec<String> = self
            .objects
            .values()
            .filter(|object| object.is_expired_at(now))
            .map(|object| object.key.clone())
            .collect();

        candidates
            .into_iter()
            .filter(|key| self.evict_if_expired(key, now))
            .collect()
    }

    /// Returns the number of objects held, expired or not.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
