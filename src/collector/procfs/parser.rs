//! Parsers for `/proc/interrupts`.
//!
//! The file is a table with one header line naming the CPU columns, then
//! one line per interrupt source:
//!
//! ```text
//!            CPU0       CPU1       CPU2       CPU3
//!   0:         44          0          0          0   IO-APIC   2-edge      timer
//!  42:       1000        200         30          4   PCI-MSI 524288-edge      eth0
//! NMI:          1          2          3          4   Non-maskable interrupts
//! ERR:          0
//! ```
//!
//! Numbered lines are hardware IRQs, usually followed by a controller and a
//! device description. Named lines are kernel counters. Rows may be shorter
//! than the header (e.g. `ERR`), and counter columns may be missing for
//! offline CPUs. None of this is an error: missing values count as zero.

use crate::collector::procfs::interrupts::{InterruptRecord, InterruptTable, MAX_INTERRUPT_NAME};
use crate::collector::procfs::reader::TableReader;

/// Counts the CPU columns of the header line.
///
/// Every word starting with `CPU` is one column. Returns 0 if the header
/// does not look like an interrupts table.
pub fn detect_cpu_count<'a>(header: impl IntoIterator<Item = &'a str>) -> usize {
    header
        .into_iter()
        .filter(|word| word.starts_with("CPU"))
        .count()
}

/// Parses a counter the way the kernel text is usually consumed.
///
/// The longest run of leading decimal digits is the value; anything else
/// yields 0. Values too large for 64 bits saturate at `u64::MAX`.
pub fn parse_counter(s: &str) -> u64 {
    let digits = s.bytes().take_while(u8::is_ascii_digit);
    let mut value: u64 = 0;
    for d in digits {
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(d - b'0')))
        {
            Some(v) => v,
            None => return u64::MAX,
        };
    }
    value
}

/// Builds the display name of an interrupt.
///
/// Numbered interrupts that carry a trailing description are named after
/// it, with the number appended: `eth0` and `42` give `eth0_42`. The number
/// is only appended if the description leaves room for at least the
/// separator and one character. Everything else is named after its id.
/// The result never exceeds `max_len` characters.
pub fn compose_name(
    is_numeric_id: bool,
    description: Option<&str>,
    id: &str,
    max_len: usize,
) -> String {
    match description {
        Some(description) if is_numeric_id => {
            let mut name = truncated(description, max_len);
            if name.chars().count() + 1 < max_len {
                name.push('_');
                name.push_str(id);
                truncate_chars(&mut name, max_len);
            }
            name
        }
        _ => truncated(id, max_len),
    }
}

/// Fills `record` from line `line` of the table.
///
/// Returns `true` if the line held an interrupt. Blank lines and lines
/// without an id leave the record unused.
pub fn parse_interrupt_row(record: &mut InterruptRecord, reader: &TableReader, line: usize) -> bool {
    record.reset();

    let words = reader.word_count(line);
    if words == 0 {
        return false;
    }

    let raw_id = reader.word(line, 0);
    if raw_id.is_empty() {
        return false;
    }
    let id = raw_id.strip_suffix(':').unwrap_or(raw_id);
    record.id.clear();
    record.id.push_str(id);

    let cpus = record.values.len();
    for (cpu, value) in record.values.iter_mut().enumerate() {
        *value = if cpu + 1 < words {
            parse_counter(reader.word(line, cpu + 1))
        } else {
            0
        };
        record.total = record.total.saturating_add(*value);
    }

    // Assumes a single id column before the CPU columns: any word after
    // them is taken as a description, the last one naming the device.
    let is_numeric_id = id.starts_with(|c: char| c.is_ascii_digit());
    let description = (words > cpus + 2).then(|| reader.word(line, words - 1));
    record.name = compose_name(is_numeric_id, description, id, MAX_INTERRUPT_NAME);

    record.used = true;
    true
}

/// Fills every row of `table` from the reader's current contents.
///
/// The table must already be sized for the reader's line count. Returns
/// the number of rows that held an interrupt.
pub fn parse_interrupts(table: &mut InterruptTable, reader: &TableReader) -> usize {
    let mut used = 0;
    for line in 1..table.len() {
        if let Some(record) = table.get_mut(line)
            && parse_interrupt_row(record, reader, line)
        {
            used += 1;
        }
    }
    used
}

fn truncated(s: &str, max_len: usize) -> String {
    let mut s = s.to_string();
    truncate_chars(&mut s, max_len);
    s
}

fn truncate_chars(s: &mut String, max_len: usize) {
    if let Some((idx, _)) = s.char_indices().nth(max_len) {
        s.truncate(idx);
    }
}
