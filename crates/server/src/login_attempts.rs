//! Login lockout bookkeeping.
//!
//! The server only talks to [`LoginAttemptStore`]; the in-memory store is the
//! default and fits a single process. A deployment with several server
//! processes plugs in a shared implementation instead.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, TimeDelta, Utc};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

/// Tracks failed logins per key (the normalized email).
pub trait LoginAttemptStore: Send + Sync {
    /// Returns the end of the current lock, if `key` is locked at `now`.
    fn locked_until(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// Records a failed attempt and returns the lock end if this attempt
    /// locked the key.
    fn record_failure(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>>;

    /// Forgets every failure recorded for `key`.
    fn reset(&self, key: &str);
}

#[derive(Debug, Default)]
struct Attempts {
    failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct InMemoryLoginAttempts {
    max_attempts: u32,
    lockout: TimeDelta,
    entries: Mutex<HashMap<String, Attempts>>,
}

impl Default for InMemoryLoginAttempts {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            TimeDelta::minutes(DEFAULT_LOCKOUT_MINUTES),
        )
    }
}

impl InMemoryLoginAttempts {
    pub fn new(max_attempts: u32, lockout: TimeDelta) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            lockout,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl LoginAttemptStore for InMemoryLoginAttempts {
    fn locked_until(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let until = entries.get(key)?.locked_until?;
        if until > now {
            return Some(until);
        }
        // Expired lock: the key starts over.
        entries.remove(key);
        None
    }

    fn record_failure(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key.to_string()).or_default();
        if entry.locked_until.is_some_and(|until| until <= now) {
            *entry = Attempts::default();
        }
        entry.failures += 1;
        if entry.failures >= self.max_attempts {
            let until = now + self.lockout;
            entry.locked_until = Some(until);
            entry.failures = 0;
            tracing::warn!(key, %until, "login locked after repeated failures");
            return Some(until);
        }
        None
    }

    fn reset(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn locks_on_fifth_failure() {
        let store = InMemoryLoginAttempts::default();
        for _ in 0..4 {
            assert_eq!(store.record_failure("a@b.c", t0()), None);
        }
        assert_eq!(store.locked_until("a@b.c", t0()), None);

        let until = store.record_failure("a@b.c", t0()).unwrap();
        assert_eq!(until, t0() + TimeDelta::minutes(15));
        assert_eq!(store.locked_until("a@b.c", t0()), Some(until));
        assert_eq!(store.locked_until("other@b.c", t0()), None);
    }

    #[test]
    fn lock_expires() {
        let store = InMemoryLoginAttempts::new(2, TimeDelta::minutes(15));
        store.record_failure("a@b.c", t0());
        store.record_failure("a@b.c", t0());

        let later = t0() + TimeDelta::minutes(15);
        assert_eq!(store.locked_until("a@b.c", later), None);
        assert_eq!(store.record_failure("a@b.c", later), None);
    }

    #[test]
    fn reset_clears_failures() {
        let store = InMemoryLoginAttempts::new(2, TimeDelta::minutes(15));
        store.record_failure("a@b.c", t0());
        store.reset("a@b.c");
        assert_eq!(store.record_failure("a@b.c", t0()), None);
    }
}
