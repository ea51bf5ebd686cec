//! irqstat - interrupt accounting collector library.
//!
//! Provides:
//! - `collector` - `/proc/interrupts` reader, parser and per-tick collector
//! - `storage` - time-series store seam and an in-memory store
//!
//! The `irqstatd` daemon drives the collector on a fixed interval.

pub mod collector;
pub mod storage;
