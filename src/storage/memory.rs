//! In-memory time-series store.
//!
//! Keeps every series with its dimensions and the last committed value of
//! each dimension. Incremental dimensions also keep the per-second rate
//! computed at the last commit. No history is retained beyond that.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use super::{Algorithm, DimensionDef, MetricStore, SeriesDef, SeriesId};

/// One dimension of a series.
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    def: DimensionDef,
    /// Value set during the current cycle, not yet committed.
    #[serde(skip)]
    collected: Option<u64>,
    /// Last committed raw value.
    value: Option<u64>,
    /// Stored value computed at the last commit that updated this dimension.
    rate: Option<f64>,
    /// Whether the last commit updated this dimension.
    updated: bool,
}

impl Dimension {
    fn new(def: DimensionDef) -> Self {
        Self {
            def,
            collected: None,
            value: None,
            rate: None,
            updated: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &DimensionDef {
        &self.def
    }

    /// Last committed raw value, if any commit ever updated it.
    pub fn value(&self) -> Option<u64> {
        self.value
    }

    /// Stored value of the last commit: the value itself for absolute
    /// dimensions, the per-second rate for incremental ones. Incremental
    /// dimensions have no rate on their first commit or after a counter
    /// reset.
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    /// Whether the last commit of the series updated this dimension.
    pub fn updated(&self) -> bool {
        self.updated
    }

    fn commit(&mut self, elapsed_secs: Option<f64>) {
        let Some(value) = self.collected.take() else {
            self.updated = false;
            return;
        };

        let scale = self.def.multiplier as f64 / self.def.divisor.max(1) as f64;
        self.rate = match self.def.algorithm {
            Algorithm::Absolute => Some(value as f64 * scale),
            Algorithm::Incremental => match (self.value, elapsed_secs) {
                (Some(prev), Some(secs)) if value >= prev && secs > 0.0 => {
                    Some((value - prev) as f64 * scale / secs)
                }
                _ => None,
            },
        };
        self.value = Some(value);
        self.updated = true;
    }
}

/// A series and its dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    def: SeriesDef,
    dimensions: Vec<Dimension>,
    /// Number of committed cycles.
    commits: u64,
    last_commit: Option<DateTime<Utc>>,
    #[serde(skip)]
    dimension_index: HashMap<String, usize>,
}

impl Series {
    fn new(def: SeriesDef) -> Self {
        Self {
            def,
            dimensions: Vec::new(),
            commits: 0,
            last_commit: None,
            dimension_index: HashMap::new(),
        }
    }

    pub fn def(&self) -> &SeriesDef {
        &self.def
    }

    /// Dimensions in creation order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimension_index
            .get(id)
            .map(|&idx| &self.dimensions[idx])
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub fn last_commit(&self) -> Option<DateTime<Utc>> {
        self.last_commit
    }
}

/// In-memory implementation of [`MetricStore`].
#[derive(Debug, Default, Serialize)]
pub struct MemoryStore {
    series: Vec<Series>,
    #[serde(skip)]
    series_index: HashMap<(String, String), usize>,
    /// Writes to dimensions that do not exist.
    unknown_writes: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All series in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Looks up a series by category and id.
    pub fn series(&self, category: &str, id: &str) -> Option<&Series> {
        self.find_series(category, id).map(|sid| &self.series[sid.0])
    }

    /// Number of `set_dimension` calls that named an unknown dimension.
    pub fn unknown_writes(&self) -> u64 {
        self.unknown_writes
    }

    /// Commits the current cycle of `series` as of `now`.
    ///
    /// Rates are computed against the previous commit time.
    pub fn done_at(&mut self, series: SeriesId, now: DateTime<Utc>) {
        let Some(s) = self.series.get_mut(series.0) else {
            return;
        };

        let elapsed_secs = s
            .last_commit
            .map(|prev| (now - prev).num_microseconds().unwrap_or(0) as f64 / 1e6);
        for dimension in &mut s.dimensions {
            dimension.commit(elapsed_secs);
        }
        s.commits += 1;
        s.last_commit = Some(now);

        trace!(
            category = %s.def.category,
            id = %s.def.id,
            commits = s.commits,
            "series committed"
        );
    }
}

impl MetricStore for MemoryStore {
    fn find_series(&self, category: &str, id: &str) -> Option<SeriesId> {
        self.series_index
            .get(&(category.to_string(), id.to_string()))
            .map(|&idx| SeriesId(idx))
    }

    fn create_series(&mut self, def: SeriesDef) -> SeriesId {
        if let Some(existing) = self.find_series(&def.category, &def.id) {
            return existing;
        }

        debug!(category = %def.category, id = %def.id, "creating series");
        let idx = self.series.len();
        self.series_index
            .insert((def.category.clone(), def.id.clone()), idx);
        self.series.push(Series::new(def));
        SeriesId(idx)
    }

    fn next(&mut self, series: SeriesId) {
        // Values set but never committed belong to an abandoned cycle
        if let Some(s) = self.series.get_mut(series.0) {
            for dimension in &mut s.dimensions {
                dimension.collected = None;
            }
        }
    }

    fn add_dimension(&mut self, series: SeriesId, dimension: DimensionDef) {
        let Some(s) = self.series.get_mut(series.0) else {
            return;
        };
        if s.dimension_index.contains_key(&dimension.id) {
            return;
        }
        s.dimension_index
            .insert(dimension.id.clone(), s.dimensions.len());
        s.dimensions.push(Dimension::new(dimension));
    }

    fn set_dimension(&mut self, series: SeriesId, id: &str, value: u64) -> bool {
        let slot = match self.series.get_mut(series.0) {
            Some(s) => match s.dimension_index.get(id) {
                Some(&idx) => Some(&mut s.dimensions[idx]),
                None => None,
            },
            None => None,
        };

        match slot {
            Some(dimension) => {
                dimension.collected = Some(value);
                true
            }
            None => {
                self.unknown_writes += 1;
                false
            }
        }
    }

    fn done(&mut self, series: SeriesId) {
        self.done_at(series, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChartType;
    use chrono::Duration;

    fn def(category: &str, id: &str) -> SeriesDef {
        SeriesDef {
            category: category.to_string(),
            id: id.to_string(),
            family: "interrupts".to_string(),
            context: format!("{}.interrupts", category),
            title: "Test".to_string(),
            units: "interrupts/s".to_string(),
            priority: 1000,
            update_every: 1,
            chart_type: ChartType::Stacked,
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_find_or_create() {
        let mut store = MemoryStore::new();
        assert!(store.find_series("system", "interrupts").is_none());

        let id = store.create_series(def("system", "interrupts"));
        assert_eq!(store.find_series("system", "interrupts"), Some(id));
        assert!(store.find_series("cpu", "interrupts").is_none());

        // Creating again returns the same series
        assert_eq!(store.create_series(def("system", "interrupts")), id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_dimension_is_ignored() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("0", "timer_0"));
        store.add_dimension(id, DimensionDef::counter("0", "other"));

        let series = store.series("system", "interrupts").unwrap();
        assert_eq!(series.dimensions().len(), 1);
        assert_eq!(series.dimension("0").unwrap().name(), "timer_0");
    }

    #[test]
    fn test_incremental_rate() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("LOC", "LOC"));

        assert!(store.set_dimension(id, "LOC", 1000));
        store.done_at(id, t0());
        let dim = store.series("system", "interrupts").unwrap().dimension("LOC").unwrap();
        assert_eq!(dim.value(), Some(1000));
        assert_eq!(dim.rate(), None);

        store.next(id);
        store.set_dimension(id, "LOC", 1500);
        store.done_at(id, t0() + Duration::seconds(2));
        let dim = store.series("system", "interrupts").unwrap().dimension("LOC").unwrap();
        assert_eq!(dim.value(), Some(1500));
        assert_eq!(dim.rate(), Some(250.0));
    }

    #[test]
    fn test_counter_reset_has_no_rate() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("0", "timer_0"));

        store.set_dimension(id, "0", 500);
        store.done_at(id, t0());
        store.next(id);
        store.set_dimension(id, "0", 100);
        store.done_at(id, t0() + Duration::seconds(1));

        let dim = store.series("system", "interrupts").unwrap().dimension("0").unwrap();
        assert_eq!(dim.value(), Some(100));
        assert_eq!(dim.rate(), None);
    }

    #[test]
    fn test_absolute_dimension() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "gauge"));
        store.add_dimension(
            id,
            DimensionDef {
                algorithm: Algorithm::Absolute,
                multiplier: 1,
                divisor: 4,
                ..DimensionDef::counter("g", "g")
            },
        );
        store.set_dimension(id, "g", 10);
        store.done_at(id, t0());

        let dim = store.series("system", "gauge").unwrap().dimension("g").unwrap();
        assert_eq!(dim.rate(), Some(2.5));
    }

    #[test]
    fn test_unset_dimension_keeps_value() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("a", "a"));
        store.add_dimension(id, DimensionDef::counter("b", "b"));

        store.set_dimension(id, "a", 1);
        store.set_dimension(id, "b", 2);
        store.done_at(id, t0());

        store.next(id);
        store.set_dimension(id, "a", 3);
        store.done_at(id, t0() + Duration::seconds(1));

        let series = store.series("system", "interrupts").unwrap();
        assert!(series.dimension("a").unwrap().updated());
        assert!(!series.dimension("b").unwrap().updated());
        assert_eq!(series.dimension("b").unwrap().value(), Some(2));
        assert_eq!(series.commits(), 2);
    }

    #[test]
    fn test_unknown_dimension_write() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        assert!(!store.set_dimension(id, "missing", 5));
        assert_eq!(store.unknown_writes(), 1);
    }

    #[test]
    fn test_next_discards_uncommitted_values() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("a", "a"));

        store.set_dimension(id, "a", 7);
        store.next(id);
        store.done_at(id, t0());

        let dim = store.series("system", "interrupts").unwrap().dimension("a").unwrap();
        assert_eq!(dim.value(), None);
        assert!(!dim.updated());
    }

    #[test]
    fn test_serialize_store() {
        let mut store = MemoryStore::new();
        let id = store.create_series(def("system", "interrupts"));
        store.add_dimension(id, DimensionDef::counter("0", "timer_0"));
        store.set_dimension(id, "0", 44);
        store.done_at(id, t0());

        let json = serde_json::to_value(&store).unwrap();
        let series = &json["series"][0];
        assert_eq!(series["def"]["chart_type"], "stacked");
        assert_eq!(series["dimensions"][0]["def"]["name"], "timer_0");
        assert_eq!(series["dimensions"][0]["value"], 44);
    }
}
