//! Configuration lookup for collectors.
//!
//! Collectors read their options through the `Config` trait, by section and
//! key, with a default for anything the user did not set. `MapConfig` is the
//! in-memory implementation used by the daemon and by tests.

use std::collections::HashMap;
use std::path::PathBuf;

/// Section holding the interrupts collector options.
pub const INTERRUPTS_SECTION: &str = "plugin:proc:/proc/interrupts";
/// Whether to publish one series per CPU.
pub const KEY_PER_CORE: &str = "interrupts per core";
/// Overrides the path of the interrupts table.
pub const KEY_FILENAME: &str = "filename to monitor";

/// Source of collector options.
pub trait Config {
    /// Looks up a boolean option, falling back to `default`.
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Looks up a string option, falling back to `default`.
    fn get_string(&self, section: &str, key: &str, default: &str) -> String;
}

/// In-memory configuration keyed by `(section, key)`.
///
/// Values are stored as text. Booleans accept `yes`/`no`, `true`/`false`,
/// `on`/`off` and `1`/`0`; any other text yields the default.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<(String, String), String>,
}

impl MapConfig {
    /// Creates an empty configuration where every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.values
            .insert((section.to_string(), key.to_string()), value.into());
    }

    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, section: &str, key: &str, value: impl Into<String>) -> Self {
        self.set(section, key, value);
        self
    }

    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(section.to_string(), key.to_string()))
            .map(String::as_str)
    }
}

impl Config for MapConfig {
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get(section, key).map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes")
                || v.eq_ignore_ascii_case("true")
                || v.eq_ignore_ascii_case("on")
                || v == "1" =>
            {
                true
            }
            Some(v) if v.eq_ignore_ascii_case("no")
                || v.eq_ignore_ascii_case("false")
                || v.eq_ignore_ascii_case("off")
                || v == "0" =>
            {
                false
            }
            _ => default,
        }
    }

    fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_string()
    }
}

/// Options of the interrupts collector, resolved once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterruptsOptions {
    /// Publish one stacked series per CPU besides the system-wide one.
    pub per_core: bool,
    /// Location of the interrupts table.
    pub filename: PathBuf,
}

impl InterruptsOptions {
    /// Resolves the options from `config`.
    ///
    /// The default table location is `/proc/interrupts` under `host_prefix`,
    /// which lets a containerized collector read the host's `/proc` mounted
    /// elsewhere. An empty prefix means the local `/proc`.
    pub fn load(config: &impl Config, host_prefix: &str) -> Self {
        let per_core = config.get_bool(INTERRUPTS_SECTION, KEY_PER_CORE, true);
        let default_filename = format!("{}/proc/interrupts", host_prefix.trim_end_matches('/'));
        let filename = config.get_string(INTERRUPTS_SECTION, KEY_FILENAME, &default_filename);
        Self {
            per_core,
            filename: PathBuf::from(filename),
        }
    }
}

impl Default for InterruptsOptions {
    fn default() -> Self {
        Self::load(&MapConfig::new(), "")
    }
}
