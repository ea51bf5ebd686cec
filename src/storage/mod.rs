//! Time-series storage seam.
//!
//! Collectors publish their measurements into a `MetricStore`: a set of
//! series (charts), each holding named dimensions whose values are set once
//! per collection cycle and then committed together. The collector only ever
//! finds, creates, sets and commits; what the store does with committed
//! values (rates, retention, export) is its own business.
//!
//! - `MetricStore` - the trait collectors write through
//! - `memory` - `MemoryStore`, an in-memory implementation

pub mod memory;

use serde::Serialize;

pub use memory::{Dimension, MemoryStore, Series};

/// Handle to a series inside a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SeriesId(pub usize);

/// How a series is meant to be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Stacked,
}

/// How the collected values of a dimension are turned into stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Store the collected value as is.
    Absolute,
    /// Store the per-second rate of change of a monotonic counter.
    Incremental,
}

/// Definition of a series, given once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesDef {
    /// Category the series belongs to (e.g. `system`, `cpu`).
    pub category: String,
    /// Identifier, unique within its category.
    pub id: String,
    /// Grouping shown to users.
    pub family: String,
    /// Series sharing a context have the same shape and units.
    pub context: String,
    pub title: String,
    pub units: String,
    /// Display order; lower comes first.
    pub priority: u32,
    /// Expected seconds between commits.
    pub update_every: u32,
    pub chart_type: ChartType,
}

/// Definition of a dimension, given once when it is added to a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionDef {
    /// Key used to set values.
    pub id: String,
    /// Label shown to users.
    pub name: String,
    pub multiplier: i64,
    pub divisor: i64,
    pub algorithm: Algorithm,
}

impl DimensionDef {
    /// A monotonic counter published as a rate, unscaled.
    pub fn counter(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            multiplier: 1,
            divisor: 1,
            algorithm: Algorithm::Incremental,
        }
    }
}

/// Write interface of a time-series store.
pub trait MetricStore {
    /// Looks up an existing series.
    fn find_series(&self, category: &str, id: &str) -> Option<SeriesId>;

    /// Creates a series. Creating a series that already exists returns the
    /// existing one unchanged.
    fn create_series(&mut self, def: SeriesDef) -> SeriesId;

    /// Starts a new collection cycle on an existing series.
    fn next(&mut self, series: SeriesId);

    /// Adds a dimension. Adding an id that already exists is a no-op.
    fn add_dimension(&mut self, series: SeriesId, dimension: DimensionDef);

    /// Sets the collected value of a dimension for the current cycle.
    ///
    /// Returns `false` if the series has no such dimension.
    fn set_dimension(&mut self, series: SeriesId, id: &str, value: u64) -> bool;

    /// Commits the values collected in the current cycle.
    fn done(&mut self, series: SeriesId);
}
