//! Record store abstraction for persisted taxi trips
//!
//! The store owns persisted trips. Writers go through a [`StoreTransaction`]
//! so a failed chunk leaves no partial rows behind; readers use the range,
//! count, average and grouped aggregate queries on [`TripStore`].
//!
//! # Architecture
//!
//! - [`memory`] - In-process store guarded by a read/write lock
//! - [`aggregate`] - Grouped aggregation plan shared by store implementations
//!
//! # Example Usage
//!
//! ```rust
//! use taxi_trips::app::models::TripFilter;
//! use taxi_trips::app::store::{GroupKey, GroupQuery, MemoryStore, TripStore};
//!
//! # fn example() -> taxi_trips::Result<()> {
//! let store = MemoryStore::new();
//! let mut txn = store.begin()?;
//! txn.commit()?;
//!
//! assert_eq!(store.count(&TripFilter::all())?, 0);
//! assert!(store.group_aggregate(&GroupQuery::new(GroupKey::Hour))?.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod memory;

#[cfg(test)]
pub mod tests;

pub use aggregate::{GroupKey, GroupOrder, GroupQuery, GroupRow, GroupValue, group_trips};
pub use memory::MemoryStore;

use crate::Result;
use crate::app::models::{TaxiTrip, TripFilter};

/// A unit of work against a store
///
/// Rows added with [`bulk_insert`](StoreTransaction::bulk_insert) become
/// visible to readers only when the transaction commits.
pub trait StoreTransaction: Send {
    /// Stage a batch of trips
    fn bulk_insert(&mut self, trips: Vec<TaxiTrip>) -> Result<()>;

    /// Persist every staged trip; returns the number written
    ///
    /// A failed commit writes nothing and keeps the staged trips, so the
    /// caller still owes a [`rollback`](StoreTransaction::rollback).
    fn commit(&mut self) -> Result<usize>;

    /// Discard every staged trip
    fn rollback(&mut self) -> Result<()>;
}

/// Persistent collection of taxi trips
pub trait TripStore: Send + Sync {
    /// Start a transaction
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>>;

    /// Trips with pickup inside the filter, ascending by pickup time
    fn query_trips(&self, filter: &TripFilter, limit: Option<usize>) -> Result<Vec<TaxiTrip>>;

    /// Number of trips with pickup inside the filter
    fn count(&self, filter: &TripFilter) -> Result<usize>;

    /// Mean duration over matching trips that track one; None when none do
    fn average_duration(&self, filter: &TripFilter) -> Result<Option<f64>>;

    /// Grouped count and mean duration
    fn group_aggregate(&self, query: &GroupQuery) -> Result<Vec<GroupRow>>;
}
