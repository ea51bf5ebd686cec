//! Interrupt metrics collector for Linux.
//!
//! This module reads the kernel interrupt accounting table
//! (`/proc/interrupts`) on every tick and publishes it as time series, with
//! support for mocking for testing on macOS.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   InterruptsCollector                       │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────┐  │
//! │  │ TableReader  │─▶│ CPU detector │─▶│  InterruptTable   │  │
//! │  │ (every tick) │  │ (first tick) │  │  (grow-only)      │  │
//! │  └──────┬───────┘  └──────────────┘  └─────────┬─────────┘  │
//! │         │                                      │ parser     │
//! │         │                              ┌───────▼────────┐   │
//! │         │                              │ emit (system,  │   │
//! │         │                              │   per CPU)     │   │
//! │         │                              └───────┬────────┘   │
//! └─────────┼──────────────────────────────────────┼────────────┘
//!    ┌──────▼──────┐                        ┌──────▼──────┐
//!    │  FileSystem │ (trait)                │ MetricStore │ (trait)
//!    └──────┬──────┘                        └──────┬──────┘
//!      ┌────┴─────┐                                │
//!  ┌───▼───┐ ┌────▼───┐                     ┌──────▼──────┐
//!  │ RealFs│ │ MockFs │                     │ MemoryStore │
//!  └───────┘ └────────┘                     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use irqstat::collector::{InterruptsCollector, MapConfig, RealFs};
//! use irqstat::storage::MemoryStore;
//!
//! let mut collector = InterruptsCollector::new(RealFs::new(), &MapConfig::new(), "");
//! let mut store = MemoryStore::new();
//! collector.collect(&mut store, 1, std::time::Duration::from_secs(1));
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use irqstat::collector::{CollectStatus, InterruptsCollector, MapConfig, MockFs};
//! use irqstat::storage::MemoryStore;
//!
//! let fs = MockFs::typical_interrupts();
//! let mut collector = InterruptsCollector::new(fs, &MapConfig::new(), "");
//! let mut store = MemoryStore::new();
//! let status = collector.collect(&mut store, 1, std::time::Duration::from_secs(1));
//! assert_eq!(status, CollectStatus::Collected);
//! assert!(store.series("system", "interrupts").is_some());
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod config;
pub mod emit;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{CollectError, CollectStatus, CollectorTiming, InterruptsCollector};
pub use config::{Config, InterruptsOptions, MapConfig};
pub use mock::MockFs;
pub use traits::{FileSystem, RealFs};
