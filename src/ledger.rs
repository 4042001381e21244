//! Per-user download ledger
//!
//! Remembers which documents have already been delivered to which user so a
//! document is handed out at most once per user. Records live only in process
//! memory and are lost on restart.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Platform-assigned user identity
pub type UserId = i64;

/// Counters exposed by the `/stats` command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    /// Users with at least one recorded download
    pub users: usize,
    /// Total (user, document) pairs recorded
    pub records: usize,
}

/// Interface for download ledgers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DownloadLedger: Send + Sync {
    /// Returns true if `document` was already delivered to `user`
    async fn has_downloaded(&self, user: UserId, document: &str) -> bool;

    /// Records that `document` was delivered to `user`; no-op if already present
    async fn record_download(&self, user: UserId, document: &str);

    /// Records the pair only if absent, as a single atomic step
    ///
    /// Returns `true` if the pair was newly recorded and `false` if it was
    /// already present.
    async fn try_record(&self, user: UserId, document: &str) -> bool;

    /// Returns current ledger counters
    async fn stats(&self) -> LedgerStats;
}

/// In-memory ledger, reset on every process start
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<HashMap<UserId, HashSet<String>>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_bot::ledger::{DownloadLedger, InMemoryLedger};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let ledger = InMemoryLedger::new();
    /// assert!(!ledger.has_downloaded(42, "guide.pdf").await);
    /// # }
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DownloadLedger for InMemoryLedger {
    async fn has_downloaded(&self, user: UserId, document: &str) -> bool {
        self.records
            .read()
            .await
            .get(&user)
            .is_some_and(|docs| docs.contains(document))
    }

    async fn record_download(&self, user: UserId, document: &str) {
        self.try_record(user, document).await;
    }

    async fn try_record(&self, user: UserId, document: &str) -> bool {
        let mut records = self.records.write().await;
        let docs = records.entry(user).or_default();
        if docs.contains(document) {
            return false;
        }
        docs.insert(document.to_string())
    }

    async fn stats(&self) -> LedgerStats {
        let records = self.records.read().await;
        LedgerStats {
            users: records.len(),
            records: records.values().map(HashSet::len).sum(),
        }
    }
}
