//! Collectors for the Linux `/proc/interrupts` table.
//!
//! This module provides the table reader, the per-interrupt records and
//! the parsers that fill them from the kernel text.

pub mod interrupts;
pub mod parser;
pub mod reader;

pub use interrupts::{InterruptRecord, InterruptTable, MAX_INTERRUPT_NAME};
pub use parser::{compose_name, detect_cpu_count, parse_interrupt_row, parse_interrupts};
pub use reader::TableReader;
