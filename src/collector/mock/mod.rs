//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing
//! collectors without requiring actual Linux `/proc` filesystem access.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
pub use scenarios::{
    INTERRUPTS_2CPU_IRREGULAR, INTERRUPTS_4CPU, INTERRUPTS_4CPU_GROWN, INTERRUPTS_4CPU_SHRUNK,
    INTERRUPTS_NO_CPUS, INTERRUPTS_PATH,
};
