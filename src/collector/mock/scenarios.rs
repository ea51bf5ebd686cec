//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc/interrupts` tables for testing
//! the collector across ticks: a typical x86 table, the same table after new
//! devices appeared, a trimmed-down table, and malformed tables.

use super::filesystem::MockFs;

/// Default location of the interrupts table in a mock filesystem.
pub const INTERRUPTS_PATH: &str = "/proc/interrupts";

/// Typical 4-CPU x86 interrupts table.
pub const INTERRUPTS_4CPU: &str = "\
           CPU0       CPU1       CPU2       CPU3
  0:         44          0          0          0   IO-APIC   2-edge      timer
  1:          0          0          9          0   IO-APIC   1-edge      i8042
  8:          0          0          0          1   IO-APIC   8-edge      rtc0
  9:          0          4          0          0   IO-APIC   9-fasteoi   acpi
 12:          0          0          0        144   IO-APIC  12-edge      i8042
 42:       1000        200         30          4   PCI-MSI 524288-edge      eth0
NMI:          1          2          3          4   Non-maskable interrupts
LOC:     123456     234567     345678     456789   Local timer interrupts
RES:       5000       6000       7000       8000   Rescheduling interrupts
ERR:          0
MIS:          0
";

/// The 4-CPU table one tick later: counters advanced and two MSI
/// interrupts appeared for a newly probed NVMe controller.
pub const INTERRUPTS_4CPU_GROWN: &str = "\
           CPU0       CPU1       CPU2       CPU3
  0:         45          0          0          0   IO-APIC   2-edge      timer
  1:          0          0         10          0   IO-APIC   1-edge      i8042
  8:          0          0          0          1   IO-APIC   8-edge      rtc0
  9:          0          5          0          0   IO-APIC   9-fasteoi   acpi
 12:          0          0          0        150   IO-APIC  12-edge      i8042
 42:       1100        210         31          4   PCI-MSI 524288-edge      eth0
 43:          7          0          0          0   PCI-MSI 1048576-edge      nvme0q0
 44:          0         12          0          0   PCI-MSI 1048577-edge      nvme0q1
NMI:          1          2          3          4   Non-maskable interrupts
LOC:     123556     234667     345778     456889   Local timer interrupts
RES:       5010       6010       7010       8010   Rescheduling interrupts
ERR:          0
MIS:          0
";

/// The 4-CPU table after the ethernet device and the legacy interrupts
/// were removed.
pub const INTERRUPTS_4CPU_SHRUNK: &str = "\
           CPU0       CPU1       CPU2       CPU3
  0:         46          0          0          0   IO-APIC   2-edge      timer
NMI:          1          2          3          4   Non-maskable interrupts
LOC:     123656     234767     345878     456989   Local timer interrupts
";

/// A 2-CPU table with irregular rows: a short row, a blank line, a row
/// with a non-numeric counter and a row without a trailing colon.
pub const INTERRUPTS_2CPU_IRREGULAR: &str = "\
           CPU0       CPU1
  3:         17
  4:        abc         20   IO-APIC   4-edge      ttyS0

PIW          5          6
";

/// A table whose header carries no CPU columns.
pub const INTERRUPTS_NO_CPUS: &str = "\
      garbage header
  0:         44          0   IO-APIC   2-edge      timer
";

impl MockFs {
    /// Creates a mock filesystem holding the given interrupts table at
    /// [`INTERRUPTS_PATH`].
    pub fn with_interrupts(content: &str) -> Self {
        let mut fs = Self::new();
        fs.add_file(INTERRUPTS_PATH, content);
        fs
    }

    /// Creates a typical 4-CPU x86 system.
    pub fn typical_interrupts() -> Self {
        Self::with_interrupts(INTERRUPTS_4CPU)
    }

    /// Replaces the interrupts table, as the kernel would between ticks.
    pub fn set_interrupts(&mut self, content: &str) {
        self.add_file(INTERRUPTS_PATH, content);
    }
}
