//! In-memory trip store

use super::aggregate::{GroupQuery, GroupRow, group_trips};
use super::{StoreTransaction, TripStore};
use crate::app::models::{TaxiTrip, TripFilter};
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

#[derive(Debug)]
struct StoreState {
    /// Trips in commit order
    trips: Vec<TaxiTrip>,
    /// Next id handed to a detailed trip
    next_id: i64,
    /// Ids of persisted compact trips
    compact_ids: HashSet<String>,
}

/// Trip store held in process memory
///
/// Detailed trips get sequential ids starting at 1 on commit. Compact trip
/// ids must be unique; a commit that would duplicate one fails as a whole.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState {
                trips: Vec::new(),
                next_id: 1,
                compact_ids: HashSet::new(),
            }),
        }
    }

    /// Number of persisted trips
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.trips.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| Error::store("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| Error::store("store lock poisoned"))
    }

    /// Write every pending trip, or none of them on a duplicate id
    fn apply(&self, pending: &mut Vec<TaxiTrip>) -> Result<usize> {
        let mut state = self.write()?;

        {
            let mut staged_ids = HashSet::new();
            for trip in pending.iter() {
                if let TaxiTrip::Compact(compact) = trip {
                    if state.compact_ids.contains(&compact.id) || !staged_ids.insert(&compact.id) {
                        return Err(Error::store(format!(
                            "duplicate key value violates unique constraint: id '{}'",
                            compact.id
                        )));
                    }
                }
            }
        }

        let written = pending.len();
        for mut trip in pending.drain(..) {
            match &mut trip {
                TaxiTrip::Detailed(detailed) => {
                    detailed.id = Some(state.next_id);
                    state.next_id += 1;
                }
                TaxiTrip::Compact(compact) => {
                    state.compact_ids.insert(compact.id.clone());
                }
            }
            state.trips.push(trip);
        }

        debug!(
            "Committed {} trips ({} stored)",
            written,
            state.trips.len()
        );
        Ok(written)
    }
}

impl TripStore for MemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        Ok(Box::new(MemoryTransaction {
            store: self,
            pending: Vec::new(),
        }))
    }

    fn query_trips(&self, filter: &TripFilter, limit: Option<usize>) -> Result<Vec<TaxiTrip>> {
        let state = self.read()?;
        let mut matching: Vec<&TaxiTrip> = state
            .trips
            .iter()
            .filter(|trip| filter.matches(trip.pickup_datetime()))
            .collect();

        // Stable: ties keep commit order
        matching.sort_by_key(|trip| trip.pickup_datetime());

        let limit = limit.unwrap_or(usize::MAX);
        Ok(matching.into_iter().take(limit).cloned().collect())
    }

    fn count(&self, filter: &TripFilter) -> Result<usize> {
        let state = self.read()?;
        Ok(state
            .trips
            .iter()
            .filter(|trip| filter.matches(trip.pickup_datetime()))
            .count())
    }

    fn average_duration(&self, filter: &TripFilter) -> Result<Option<f64>> {
        let state = self.read()?;
        let (sum, count) = state
            .trips
            .iter()
            .filter(|trip| filter.matches(trip.pickup_datetime()))
            .filter_map(TaxiTrip::trip_duration)
            .fold((0i64, 0usize), |(sum, count), duration| {
                (sum + duration, count + 1)
            });

        Ok((count > 0).then(|| sum as f64 / count as f64))
    }

    fn group_aggregate(&self, query: &GroupQuery) -> Result<Vec<GroupRow>> {
        let state = self.read()?;
        group_trips(&state.trips, query)
    }
}

/// Transaction staging trips for a [`MemoryStore`]
struct MemoryTransaction<'a> {
    store: &'a MemoryStore,
    pending: Vec<TaxiTrip>,
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn bulk_insert(&mut self, trips: Vec<TaxiTrip>) -> Result<()> {
        trace!("Staging {} trips", trips.len());
        self.pending.extend(trips);
        Ok(())
    }

    fn commit(&mut self) -> Result<usize> {
        self.store.apply(&mut self.pending)
    }

    fn rollback(&mut self) -> Result<()> {
        trace!("Discarding {} staged trips", self.pending.len());
        self.pending.clear();
        Ok(())
    }
}
