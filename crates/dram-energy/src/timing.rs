//! DRAM timing parameters.

/// DRAM timing parameters, in clock cycles.
///
/// Values are floats since timings derived from datasheet nanosecond specs
/// are often fractional (e.g. tRP of 12.5 cycles at a given data rate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Row-to-row activate delay (tRRD).
    pub rrd: f64,
    /// Row active time (tRAS).
    pub ras: f64,
    /// Row precharge time (tRP).
    pub rp: f64,
    /// Refresh cycle time (tRFC).
    pub rfc: f64,
    /// Average refresh interval (tREFI).
    pub refi: f64,
}
