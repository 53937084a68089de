//! Grouped aggregation over trip records
//!
//! Key columns are derived per trip, then a polars lazy plan groups them,
//! counts each group, averages the durations, applies the minimum-count
//! filter, sorts and truncates.

use crate::app::models::{Coordinates, TaxiTrip, TripFilter};
use crate::utils::geo::{planar_distance_km, round_to_tenth};
use crate::Result;
use chrono::{Datelike, Timelike};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

const COUNT_COLUMN: &str = "trip_count";
const DURATION_COLUMN: &str = "trip_duration";
const AVG_DURATION_COLUMN: &str = "avg_duration";

/// What trips are grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Pickup hour of day, 0..=23
    Hour,
    /// Pickup day of week (Sunday = 0) and hour
    DayOfWeekHour,
    /// Pickup latitude, pickup longitude, dropoff latitude, dropoff longitude
    Route,
    /// Planar trip distance rounded to 0.1 km
    PlanarDistance,
}

impl GroupKey {
    fn column_names(&self) -> &'static [&'static str] {
        match self {
            GroupKey::Hour => &["hour"],
            GroupKey::DayOfWeekHour => &["day_of_week", "hour"],
            GroupKey::Route => &[
                "pickup_latitude",
                "pickup_longitude",
                "dropoff_latitude",
                "dropoff_longitude",
            ],
            GroupKey::PlanarDistance => &["distance_km"],
        }
    }
}

/// Ordering applied to aggregated groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Key columns ascending
    KeyAscending,
    /// Count descending, ties by key ascending
    CountDescending,
}

/// A grouped aggregate request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupQuery {
    pub filter: TripFilter,
    pub key: GroupKey,
    /// Groups with fewer trips are dropped
    pub min_count: usize,
    pub order: GroupOrder,
    pub limit: Option<usize>,
}

impl GroupQuery {
    pub fn new(key: GroupKey) -> Self {
        Self {
            filter: TripFilter::all(),
            key,
            min_count: 1,
            order: GroupOrder::KeyAscending,
            limit: None,
        }
    }

    pub fn with_filter(mut self, filter: TripFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// One component of a group key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupValue {
    Int(i64),
    Float(f64),
}

impl GroupValue {
    pub fn as_i64(&self) -> i64 {
        match *self {
            GroupValue::Int(value) => value,
            GroupValue::Float(value) => value as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            GroupValue::Int(value) => value as f64,
            GroupValue::Float(value) => value,
        }
    }
}

/// One aggregated group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    /// Key components in [`GroupKey`] order
    pub key: Vec<GroupValue>,
    pub count: usize,
    /// Mean duration of the group's trips that track one
    pub avg_duration: Option<f64>,
}

/// Run a grouped aggregate over the trips matching the query's filter
pub fn group_trips<'a, I>(trips: I, query: &GroupQuery) -> Result<Vec<GroupRow>>
where
    I: IntoIterator<Item = &'a TaxiTrip>,
{
    let matching: Vec<&TaxiTrip> = trips
        .into_iter()
        .filter(|trip| query.filter.matches(trip.pickup_datetime()))
        .collect();

    if matching.is_empty() {
        return Ok(Vec::new());
    }

    let frame = key_frame(&matching, query.key)?;
    let key_names = query.key.column_names();
    let key_exprs: Vec<Expr> = key_names.iter().map(|name| col(*name)).collect();

    let mut plan = frame
        .lazy()
        .group_by(key_exprs.clone())
        .agg([
            len().cast(DataType::Int64).alias(COUNT_COLUMN),
            col(DURATION_COLUMN).mean().alias(AVG_DURATION_COLUMN),
        ])
        .filter(col(COUNT_COLUMN).gt_eq(lit(query.min_count as i64)));

    plan = match query.order {
        GroupOrder::KeyAscending => plan.sort_by_exprs(key_exprs, SortMultipleOptions::default()),
        GroupOrder::CountDescending => {
            let mut by = vec![col(COUNT_COLUMN)];
            by.extend(key_exprs);
            let descending = std::iter::once(true).chain(key_names.iter().map(|_| false));
            plan.sort_by_exprs(
                by,
                SortMultipleOptions::default().with_order_descending_multi(descending),
            )
        }
    };

    if let Some(limit) = query.limit {
        plan = plan.limit(IdxSize::try_from(limit).unwrap_or(IdxSize::MAX));
    }

    let result = plan.collect()?;
    debug!(
        "Grouped {} trips by {:?} into {} groups",
        matching.len(),
        query.key,
        result.height()
    );

    extract_rows(&result, query.key)
}

/// Build the frame of key columns plus the nullable duration column
fn key_frame(trips: &[&TaxiTrip], key: GroupKey) -> Result<DataFrame> {
    let durations: Vec<Option<i64>> = trips.iter().map(|trip| trip.trip_duration()).collect();
    let mut columns = Vec::with_capacity(5);

    match key {
        GroupKey::Hour => {
            let hours: Vec<i64> = trips
                .iter()
                .map(|trip| trip.pickup_datetime().hour() as i64)
                .collect();
            columns.push(Column::new("hour".into(), hours));
        }
        GroupKey::DayOfWeekHour => {
            let (days, hours): (Vec<i64>, Vec<i64>) = trips
                .iter()
                .map(|trip| {
                    let pickup = trip.pickup_datetime();
                    (
                        pickup.weekday().num_days_from_sunday() as i64,
                        pickup.hour() as i64,
                    )
                })
                .unzip();
            columns.push(Column::new("day_of_week".into(), days));
            columns.push(Column::new("hour".into(), hours));
        }
        GroupKey::Route => {
            columns.push(coordinate_column("pickup_latitude", trips, |c| c.pickup_latitude));
            columns.push(coordinate_column("pickup_longitude", trips, |c| c.pickup_longitude));
            columns.push(coordinate_column("dropoff_latitude", trips, |c| c.dropoff_latitude));
            columns.push(coordinate_column("dropoff_longitude", trips, |c| {
                c.dropoff_longitude
            }));
        }
        GroupKey::PlanarDistance => {
            let distances: Vec<f64> = trips
                .iter()
                .map(|trip| round_to_tenth(planar_distance_km(trip.coordinates())))
                .collect();
            columns.push(Column::new("distance_km".into(), distances));
        }
    }

    columns.push(Column::new(DURATION_COLUMN.into(), durations));
    Ok(DataFrame::new(columns)?)
}

fn coordinate_column<F>(name: &str, trips: &[&TaxiTrip], select: F) -> Column
where
    F: Fn(&Coordinates) -> f64,
{
    let values: Vec<f64> = trips.iter().map(|trip| select(trip.coordinates())).collect();
    Column::new(name.into(), values)
}

fn extract_rows(frame: &DataFrame, key: GroupKey) -> Result<Vec<GroupRow>> {
    let height = frame.height();
    let mut keys: Vec<Vec<GroupValue>> = vec![Vec::with_capacity(4); height];

    for name in key.column_names() {
        let series = frame.column(name)?.as_materialized_series();
        match key {
            GroupKey::Route | GroupKey::PlanarDistance => {
                for (row, value) in series.f64()?.into_iter().enumerate() {
                    keys[row].push(GroupValue::Float(value.unwrap_or_default()));
                }
            }
            GroupKey::Hour | GroupKey::DayOfWeekHour => {
                for (row, value) in series.i64()?.into_iter().enumerate() {
                    keys[row].push(GroupValue::Int(value.unwrap_or_default()));
                }
            }
        }
    }

    let counts = frame
        .column(COUNT_COLUMN)?
        .as_materialized_series()
        .i64()?
        .into_iter();
    let averages = frame
        .column(AVG_DURATION_COLUMN)?
        .as_materialized_series()
        .f64()?
        .into_iter();

    Ok(keys
        .into_iter()
        .zip(counts.zip(averages))
        .map(|(key, (count, avg_duration))| GroupRow {
            key,
            count: count.unwrap_or_default().max(0) as usize,
            avg_duration,
        })
        .collect())
}
