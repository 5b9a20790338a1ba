/// Restore Session Table
///
/// In-memory map from one-time restore code to the identity it was issued
/// for. A single mutex serializes every operation, so `put`, `get`,
/// `remove` and `sweep` are totally ordered. The lock is never held across
/// an await or while hashing.
///
/// Invariants:
/// - at most one record per identity
/// - a record is live iff `now - created_at < ttl`; `get` never returns a
///   record that is no longer live, whether or not a sweep has run

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRecord {
    pub code: String,
    pub identity: String,
    pub created_at: DateTime<Utc>,
}

impl RestoreRecord {
    pub fn is_live_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl
    }
}

pub struct RestoreSessionTable {
    records: Mutex<HashMap<String, RestoreRecord>>,
    ttl: Duration,
}

impl RestoreSessionTable {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, RestoreRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record for `identity`, replacing any earlier record for the
    /// same identity in the same critical section.
    pub fn put(&self, code: String, identity: &str) -> RestoreRecord {
        self.put_at(code, identity, Utc::now())
    }

    pub fn put_at(&self, code: String, identity: &str, created_at: DateTime<Utc>) -> RestoreRecord {
        let record = RestoreRecord {
            code: code.clone(),
            identity: identity.to_string(),
            created_at,
        };

        let mut records = self.records();
        records.retain(|_, existing| existing.identity != identity);
        records.insert(code, record.clone());

        record
    }

    /// Live record for `code`, if any.
    pub fn get(&self, code: &str) -> Option<RestoreRecord> {
        self.get_at(code, Utc::now())
    }

    pub fn get_at(&self, code: &str, now: DateTime<Utc>) -> Option<RestoreRecord> {
        self.records()
            .get(code)
            .filter(|record| record.is_live_at(now, self.ttl))
            .cloned()
    }

    /// Delete `code`. Deleting an absent code is a no-op.
    pub fn remove(&self, code: &str) -> Option<RestoreRecord> {
        self.records().remove(code)
    }

    /// Remove and return the record for `code` if it is live and bound to
    /// `identity`. At most one caller can claim a given code; a code the
    /// sweeper already evicted cannot be claimed.
    pub fn claim(&self, code: &str, identity: &str) -> Option<RestoreRecord> {
        self.claim_at(code, identity, Utc::now())
    }

    pub fn claim_at(
        &self,
        code: &str,
        identity: &str,
        now: DateTime<Utc>,
    ) -> Option<RestoreRecord> {
        let mut records = self.records();
        match records.get(code) {
            Some(record) if record.identity == identity && record.is_live_at(now, self.ttl) => {
                records.remove(code)
            }
            _ => None,
        }
    }

    /// Put back a previously claimed record, keeping its `created_at`.
    /// Returns `false` and leaves the table unchanged if a newer record for
    /// the same identity exists.
    pub fn reinstate(&self, record: RestoreRecord) -> bool {
        let mut records = self.records();
        if records.values().any(|existing| existing.identity == record.identity) {
            return false;
        }
        records.insert(record.code.clone(), record);
        true
    }

    /// Drop every record whose age is at least the TTL. Returns how many
    /// records were evicted.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| record.is_live_at(now, self.ttl));
        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}
