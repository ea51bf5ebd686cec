//! Per-interrupt records and the grow-only table that holds them.
//!
//! The table is allocated once the CPU count is known and then reused on
//! every tick. Each record owns a value vector sized to the CPU count, so
//! every slot has the same shape whether it is in use or not.

/// Upper bound on the length of an interrupt display name, in characters.
pub const MAX_INTERRUPT_NAME: usize = 50;

/// One row of `/proc/interrupts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterruptRecord {
    /// Whether this row held interrupt data in the current tick.
    pub used: bool,
    /// Series key: the first column with its trailing `:` removed.
    pub id: String,
    /// Display name, at most [`MAX_INTERRUPT_NAME`] characters.
    pub name: String,
    /// Sum of `values`.
    pub total: u64,
    /// Interrupt count per CPU. Always exactly one entry per CPU.
    pub values: Vec<u64>,
}

impl InterruptRecord {
    fn with_cpus(cpus: usize) -> Self {
        Self {
            values: vec![0; cpus],
            ..Self::default()
        }
    }

    /// Marks the record unused and resets its total.
    pub fn reset(&mut self) {
        self.used = false;
        self.total = 0;
    }
}

/// Grow-only table of interrupt records, indexed by line number.
///
/// Slot 0 corresponds to the header line and is never in use. Slots past
/// [`len()`](Self::len) are leftovers from a longer previous tick; they are
/// kept allocated but always marked unused.
#[derive(Debug, Default)]
pub struct InterruptTable {
    records: Vec<InterruptRecord>,
    cpus: usize,
    rows: usize,
}

impl InterruptTable {
    /// Creates an empty table with no allocated slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes room for `rows` records of `cpus` values each.
    ///
    /// Slots are only ever added, never removed. The CPU count is fixed by
    /// the first call that allocates slots and must not change afterwards.
    /// The header slot and all slots at or beyond `rows` are marked unused.
    pub fn ensure_capacity(&mut self, rows: usize, cpus: usize) -> &mut Self {
        if self.records.is_empty() {
            self.cpus = cpus;
        }
        debug_assert_eq!(
            self.cpus, cpus,
            "interrupt table cannot change its CPU count"
        );

        if rows > self.records.len() {
            let cpus = self.cpus;
            self.records
                .resize_with(rows, || InterruptRecord::with_cpus(cpus));
        }
        self.rows = rows;

        if let Some(header) = self.records.first_mut() {
            header.reset();
        }
        for stale in &mut self.records[rows..] {
            stale.reset();
        }

        self
    }

    /// Number of allocated record slots.
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Number of rows in the current tick, header included.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Returns `true` if the current tick has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of values held by each record.
    pub fn cpus(&self) -> usize {
        self.cpus
    }

    /// Record for line `row` of the current tick.
    pub fn get(&self, row: usize) -> Option<&InterruptRecord> {
        self.records[..self.rows].get(row)
    }

    /// Mutable record for line `row` of the current tick.
    pub fn get_mut(&mut self, row: usize) -> Option<&mut InterruptRecord> {
        self.records[..self.rows].get_mut(row)
    }

    /// Records of the current tick, unused ones included.
    pub fn records(&self) -> &[InterruptRecord] {
        &self.records[..self.rows]
    }

    /// Records that hold data in the current tick, in line order.
    pub fn used(&self) -> impl Iterator<Item = &InterruptRecord> {
        self.records().iter().filter(|record| record.used)
    }
}
