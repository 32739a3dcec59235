//! In-memory TTL cache with an injectable clock.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
};

/// Source of the current time for cache stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone, Debug)]
pub struct Cached<T> {
    pub value: T,
    pub stored_at: SystemTime,
}

impl<T> Cached<T> {
    pub fn new(value: T, stored_at: SystemTime) -> Self {
        Self { value, stored_at }
    }

    /// Age relative to `now`. A clock that went backwards counts as zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.stored_at).unwrap_or_default()
    }

    /// An entry expires the moment its age reaches the TTL.
    pub fn is_expired(&self, now: SystemTime, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }

    /// Human-readable age string.
    pub fn age_string(&self, now: SystemTime) -> String {
        let secs = self.age(now).as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// String-keyed cache whose entries are dropped once they reach `ttl`,
/// regardless of how often they are read.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: HashMap<String, Cached<T>>,
    ttl: Duration,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Fresh entry for `key`, if any.
    pub fn get(&self, key: &str, now: SystemTime) -> Option<&Cached<T>> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now, self.ttl))
    }

    /// Store `value`. An existing entry under `key` is replaced, not updated.
    pub fn insert(&mut self, key: String, value: T, now: SystemTime) {
        self.entries.insert(key, Cached::new(value, now));
    }

    /// Delete every expired entry and return how many were removed.
    pub fn purge_expired(&mut self, now: SystemTime) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
