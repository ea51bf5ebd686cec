//! Publishing the interrupt table as time series.
//!
//! Two passes read the parsed table: one system-wide series with the total
//! of every interrupt, and optionally one series per CPU. A series gets its
//! dimensions when it is first created; after that, each pass only sets
//! values. Rows that are not in use are never touched, so an interrupt that
//! disappears keeps its last committed value.

use crate::collector::procfs::interrupts::{InterruptRecord, InterruptTable};
use crate::storage::{ChartType, DimensionDef, MetricStore, SeriesDef, SeriesId};

/// Priority of the system-wide series.
const SYSTEM_PRIORITY: u32 = 1000;
/// Priority of the CPU 0 series; CPU `n` gets this plus `n`.
const PER_CPU_PRIORITY: u32 = 1100;

/// Definition of the system-wide interrupts series.
pub fn system_series(update_every: u32) -> SeriesDef {
    SeriesDef {
        category: "system".to_string(),
        id: "interrupts".to_string(),
        family: "interrupts".to_string(),
        context: "system.interrupts".to_string(),
        title: "System interrupts".to_string(),
        units: "interrupts/s".to_string(),
        priority: SYSTEM_PRIORITY,
        update_every,
        chart_type: ChartType::Stacked,
    }
}

/// Definition of the interrupts series of one CPU.
pub fn cpu_series(cpu: usize, update_every: u32) -> SeriesDef {
    SeriesDef {
        category: "cpu".to_string(),
        id: format!("cpu{}_interrupts", cpu),
        family: "interrupts".to_string(),
        context: "cpu.interrupts".to_string(),
        title: format!("CPU{} Interrupts", cpu),
        units: "interrupts/s".to_string(),
        priority: PER_CPU_PRIORITY.saturating_add(cpu as u32),
        update_every,
        chart_type: ChartType::Stacked,
    }
}

/// Publishes the total of every interrupt in use.
pub fn emit_system<S: MetricStore>(store: &mut S, table: &InterruptTable, update_every: u32) {
    emit_series(store, table, system_series(update_every), |record| {
        record.total
    });
}

/// Publishes one series per CPU with that CPU's share of every interrupt.
pub fn emit_per_cpu<S: MetricStore>(store: &mut S, table: &InterruptTable, update_every: u32) {
    for cpu in 0..table.cpus() {
        emit_series(store, table, cpu_series(cpu, update_every), |record| {
            record.values.get(cpu).copied().unwrap_or(0)
        });
    }
}

fn emit_series<S, V>(store: &mut S, table: &InterruptTable, def: SeriesDef, value: V)
where
    S: MetricStore,
    V: Fn(&InterruptRecord) -> u64,
{
    let series = find_or_create(store, table, def);

    for record in table.used() {
        store.set_dimension(series, &record.id, value(record));
    }
    store.done(series);
}

fn find_or_create<S: MetricStore>(store: &mut S, table: &InterruptTable, def: SeriesDef) -> SeriesId {
    if let Some(series) = store.find_series(&def.category, &def.id) {
        store.next(series);
        return series;
    }

    let series = store.create_series(def);
    for record in table.used() {
        store.add_dimension(series, DimensionDef::counter(&record.id, &record.name));
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Algorithm, MemoryStore};

    fn table(rows: &[(&str, &str, Vec<u64>)]) -> InterruptTable {
        let cpus = rows.first().map_or(0, |(_, _, values)| values.len());
        let mut table = InterruptTable::new();
        table.ensure_capacity(rows.len() + 1, cpus);
        for (i, (id, name, values)) in rows.iter().enumerate() {
            let record = table.get_mut(i + 1).unwrap();
            record.used = true;
            record.id = id.to_string();
            record.name = name.to_string();
            record.values.copy_from_slice(values);
            record.total = values.iter().sum();
        }
        table
    }

    #[test]
    fn test_series_definitions() {
        let system = system_series(1);
        assert_eq!(system.category, "system");
        assert_eq!(system.id, "interrupts");
        assert_eq!(system.priority, 1000);
        assert_eq!(system.chart_type, ChartType::Stacked);

        let cpu3 = cpu_series(3, 5);
        assert_eq!(cpu3.category, "cpu");
        assert_eq!(cpu3.id, "cpu3_interrupts");
        assert_eq!(cpu3.title, "CPU3 Interrupts");
        assert_eq!(cpu3.context, "cpu.interrupts");
        assert_eq!(cpu3.priority, 1103);
        assert_eq!(cpu3.update_every, 5);
    }

    #[test]
    fn test_emit_system_creates_dimensions() {
        let table = table(&[("0", "timer_0", vec![44, 0]), ("NMI", "NMI", vec![1, 2])]);
        let mut store = MemoryStore::new();
        emit_system(&mut store, &table, 1);

        let series = store.series("system", "interrupts").unwrap();
        assert_eq!(series.dimensions().len(), 2);

        let timer = series.dimension("0").unwrap();
        assert_eq!(timer.name(), "timer_0");
        assert_eq!(timer.def().algorithm, Algorithm::Incremental);
        assert_eq!(timer.value(), Some(44));
        assert_eq!(series.dimension("NMI").unwrap().value(), Some(3));
    }

    #[test]
    fn test_emit_per_cpu() {
        let table = table(&[("0", "timer_0", vec![44, 5]), ("NMI", "NMI", vec![1, 2])]);
        let mut store = MemoryStore::new();
        emit_per_cpu(&mut store, &table, 1);

        assert_eq!(store.len(), 2);
        let cpu0 = store.series("cpu", "cpu0_interrupts").unwrap();
        assert_eq!(cpu0.dimension("0").unwrap().value(), Some(44));
        assert_eq!(cpu0.dimension("NMI").unwrap().value(), Some(1));
        let cpu1 = store.series("cpu", "cpu1_interrupts").unwrap();
        assert_eq!(cpu1.dimension("0").unwrap().value(), Some(5));
        assert_eq!(cpu1.dimension("NMI").unwrap().value(), Some(2));
    }

    #[test]
    fn test_second_pass_only_updates() {
        let mut store = MemoryStore::new();
        emit_system(&mut store, &table(&[("0", "timer_0", vec![10])]), 1);
        emit_system(&mut store, &table(&[("0", "renamed", vec![20])]), 1);

        let series = store.series("system", "interrupts").unwrap();
        assert_eq!(series.commits(), 2);
        assert_eq!(series.dimensions().len(), 1);
        // Names are fixed at creation
        assert_eq!(series.dimension("0").unwrap().name(), "timer_0");
        assert_eq!(series.dimension("0").unwrap().value(), Some(20));
    }

    #[test]
    fn test_unused_rows_are_skipped() {
        let mut table = table(&[("0", "timer_0", vec![10]), ("1", "i8042_1", vec![5])]);
        table.get_mut(2).unwrap().used = false;

        let mut store = MemoryStore::new();
        emit_system(&mut store, &table, 1);

        let series = store.series("system", "interrupts").unwrap();
        assert!(series.dimension("1").is_none());
        assert_eq!(store.unknown_writes(), 0);
    }

    #[test]
    fn test_duplicate_ids_share_a_dimension() {
        let table = table(&[("7", "a_7", vec![1]), ("7", "b_7", vec![9])]);
        let mut store = MemoryStore::new();
        emit_system(&mut store, &table, 1);

        let series = store.series("system", "interrupts").unwrap();
        assert_eq!(series.dimensions().len(), 1);
        assert_eq!(series.dimension("7").unwrap().value(), Some(9));
    }
}
