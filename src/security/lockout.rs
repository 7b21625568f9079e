//! Brute-force lockout bookkeeping for admin logins.
//!
//! One record per normalized client IP. A record appears on the first failure,
//! is updated on every later failure and disappears on success or bypass.
//! Nothing purges stale records; a restart clears them all.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::AdminConfig;

/// Thresholds of the lockout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Failures within one window that trigger a lock.
    pub max_failures: u32,
    /// Failures older than this no longer count.
    pub window: Duration,
    /// How long a locked IP is rejected.
    pub lock: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 8,
            window: Duration::from_secs(15 * 60),
            lock: Duration::from_secs(30 * 60),
        }
    }
}

impl From<&AdminConfig> for LockoutPolicy {
    fn from(config: &AdminConfig) -> Self {
        Self {
            max_failures: config.max_failures,
            window: config.window(),
            lock: config.lock_duration(),
        }
    }
}

/// Failure history of a single IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    pub failure_count: u32,
    pub window_start: Instant,
    pub locked_until: Option<Instant>,
}

impl AttemptRecord {
    fn new(now: Instant) -> Self {
        Self {
            failure_count: 0,
            window_start: now,
            locked_until: None,
        }
    }

    /// Time left on an active lock.
    pub fn lock_remaining(&self, now: Instant) -> Option<Duration> {
        self.locked_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }
}

/// Keyed attempt table. Updates to one key are serialized by the map shard lock.
#[derive(Debug)]
pub struct AttemptStore {
    records: DashMap<String, AttemptRecord>,
    policy: LockoutPolicy,
}

impl AttemptStore {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            records: DashMap::new(),
            policy,
        }
    }

    /// Count a failure for `ip` and return the updated record.
    pub fn register_failure(&self, ip: &str, now: Instant) -> AttemptRecord {
        let mut entry = self
            .records
            .entry(ip.to_string())
            .or_insert_with(|| AttemptRecord::new(now));
        let record = entry.value_mut();

        if now.saturating_duration_since(record.window_start) > self.policy.window {
            *record = AttemptRecord::new(now);
        }

        record.failure_count += 1;
        if record.failure_count >= self.policy.max_failures {
            record.locked_until = Some(now + self.policy.lock);
        }
        *record
    }

    /// Forget `ip`. Returns whether a record existed.
    pub fn register_success(&self, ip: &str) -> bool {
        self.records.remove(ip).is_some()
    }

    pub fn lock_remaining(&self, ip: &str, now: Instant) -> Option<Duration> {
        self.records.get(ip).and_then(|r| r.lock_remaining(now))
    }

    /// Attempts left before the lock threshold is reached.
    pub fn remaining_attempts(&self, record: &AttemptRecord) -> u32 {
        self.policy.max_failures.saturating_sub(record.failure_count)
    }

    pub fn get(&self, ip: &str) -> Option<AttemptRecord> {
        self.records.get(ip).map(|r| *r.value())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Whole seconds left, rounded up.
pub fn ceil_secs(remaining: Duration) -> u64 {
    let millis = remaining.as_millis();
    u64::try_from(millis.div_ceil(1000)).unwrap_or(u64::MAX)
}
