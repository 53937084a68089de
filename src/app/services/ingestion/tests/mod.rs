//! Tests for the ingestion pipeline and upload boundary

pub mod upload_tests;

use crate::app::models::TripFilter;
use crate::app::store::{GroupQuery, GroupRow, MemoryStore, StoreTransaction, TripStore};
use crate::app::models::TaxiTrip;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub use crate::app::services::csv_reader::tests::{DETAILED_HEADER, detailed_csv, reader_for};

/// Memory store whose n-th transactions (0-based) fail on insert or commit,
/// counting every transaction call it sees
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_insert: HashSet<usize>,
    fail_commit: HashSet<usize>,
    calls: Arc<TransactionCalls>,
}

/// Transaction calls seen by a [`FailingStore`]
#[derive(Debug, Default)]
pub struct TransactionCalls {
    begun: AtomicUsize,
    inserts: AtomicUsize,
    commits: AtomicUsize,
    failed_commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Plain copy of [`TransactionCalls`] for assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub begun: usize,
    pub inserts: usize,
    pub commits: usize,
    pub failed_commits: usize,
    pub rollbacks: usize,
}

impl FailingStore {
    pub fn failing(transactions: &[usize]) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_insert: transactions.iter().copied().collect(),
            fail_commit: HashSet::new(),
            calls: Arc::default(),
        }
    }

    pub fn failing_commits(transactions: &[usize]) -> Self {
        Self {
            fail_commit: transactions.iter().copied().collect(),
            ..Self::failing(&[])
        }
    }

    pub fn calls(&self) -> CallCounts {
        let load = |counter: &AtomicUsize| counter.load(Ordering::SeqCst);
        CallCounts {
            begun: load(&self.calls.begun),
            inserts: load(&self.calls.inserts),
            commits: load(&self.calls.commits),
            failed_commits: load(&self.calls.failed_commits),
            rollbacks: load(&self.calls.rollbacks),
        }
    }
}

impl TripStore for FailingStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        let n = self.calls.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingTransaction {
            inner: self.inner.begin()?,
            fail_insert: self.fail_insert.contains(&n),
            fail_commit: self.fail_commit.contains(&n),
            calls: self.calls.clone(),
        }))
    }

    fn query_trips(&self, filter: &TripFilter, limit: Option<usize>) -> Result<Vec<TaxiTrip>> {
        self.inner.query_trips(filter, limit)
    }

    fn count(&self, filter: &TripFilter) -> Result<usize> {
        self.inner.count(filter)
    }

    fn average_duration(&self, filter: &TripFilter) -> Result<Option<f64>> {
        self.inner.average_duration(filter)
    }

    fn group_aggregate(&self, query: &GroupQuery) -> Result<Vec<GroupRow>> {
        self.inner.group_aggregate(query)
    }
}

struct FailingTransaction<'a> {
    inner: Box<dyn StoreTransaction + 'a>,
    fail_insert: bool,
    fail_commit: bool,
    calls: Arc<TransactionCalls>,
}

impl StoreTransaction for FailingTransaction<'_> {
    fn bulk_insert(&mut self, trips: Vec<TaxiTrip>) -> Result<()> {
        self.calls.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(Error::store("forced insert failure"));
        }
        self.inner.bulk_insert(trips)
    }

    fn commit(&mut self) -> Result<usize> {
        let result = if self.fail_commit {
            Err(Error::store("forced commit failure"))
        } else {
            self.inner.commit()
        };
        let counter = match result {
            Ok(_) => &self.calls.commits,
            Err(_) => &self.calls.failed_commits,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn rollback(&mut self) -> Result<()> {
        self.calls.rollbacks.fetch_add(1, Ordering::SeqCst);
        self.inner.rollback()
    }
}
