//! Per-rail energy model based on datasheet IDD currents.

use crate::error::{Error, Result};
use crate::timing::Timing;

/// Numeric tolerance used when matching a supply voltage against the fixed
/// per-technology voltage tables.
pub(crate) const VOLTAGE_TOLERANCE: f64 = 1e-5;

/// Returns whether a supplied voltage matches an expected rail voltage.
pub(crate) fn matches_rail(vdd: f64, expected: f64) -> bool {
    (vdd - expected).abs() < VOLTAGE_TOLERANCE
}

/// Datasheet current-draw (IDD) values of one voltage rail, one value per
/// operating mode.
///
/// The constructor enforces the physical monotonicity of the currents across
/// increasingly active states: precharge standby draws no more than active
/// standby, powered-down clocking draws no more than active clocking, and the
/// activate, burst, and refresh currents dominate the active-standby
/// baseline. A profile violating any of these cannot be constructed, which
/// keeps the downstream energy formulas total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Idds {
    idd0: f64,
    idd2n: f64,
    idd2p: f64,
    idd3n: f64,
    idd3p: f64,
    idd4r: f64,
    idd4w: f64,
    idd5: f64,
}

impl Idds {
    /// Creates a validated IDD profile.
    ///
    /// * `idd0` - One-bank activate-precharge current.
    /// * `idd2n` - Precharge standby current, clock enabled.
    /// * `idd2p` - Precharge power-down current.
    /// * `idd3n` - Active standby current, clock enabled.
    /// * `idd3p` - Active power-down current.
    /// * `idd4r` - Read burst current.
    /// * `idd4w` - Write burst current.
    /// * `idd5` - Refresh current.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        idd0: f64,
        idd2n: f64,
        idd2p: f64,
        idd3n: f64,
        idd3p: f64,
        idd4r: f64,
        idd4w: f64,
        idd5: f64,
    ) -> Result<Self> {
        let values = [
            ("idd0", idd0),
            ("idd2n", idd2n),
            ("idd2p", idd2p),
            ("idd3n", idd3n),
            ("idd3p", idd3p),
            ("idd4r", idd4r),
            ("idd4w", idd4w),
            ("idd5", idd5),
        ];
        for (field, value) in values {
            if !(value >= 0.) {
                return Err(Error::invalid(
                    field,
                    format!("current must be non-negative, got {value}"),
                ));
            }
        }
        let orderings = [
            ("idd2n", idd2n, "idd2p", idd2p),
            ("idd3n", idd3n, "idd3p", idd3p),
            ("idd3n", idd3n, "idd2n", idd2n),
            ("idd3p", idd3p, "idd2p", idd2p),
            ("idd0", idd0, "idd3n", idd3n),
            ("idd4r", idd4r, "idd3n", idd3n),
            ("idd4w", idd4w, "idd3n", idd3n),
            ("idd5", idd5, "idd3n", idd3n),
        ];
        for (field, value, baseline_field, baseline) in orderings {
            if value < baseline {
                return Err(Error::invalid(
                    field,
                    format!("{field} ({value}) must be >= {baseline_field} ({baseline})"),
                ));
            }
        }
        Ok(Self {
            idd0,
            idd2n,
            idd2p,
            idd3n,
            idd3p,
            idd4r,
            idd4w,
            idd5,
        })
    }

    /// Returns the one-bank activate-precharge current.
    pub fn idd0(&self) -> f64 {
        self.idd0
    }

    /// Returns the precharge standby current.
    pub fn idd2n(&self) -> f64 {
        self.idd2n
    }

    /// Returns the precharge power-down current.
    pub fn idd2p(&self) -> f64 {
        self.idd2p
    }

    /// Returns the active standby current.
    pub fn idd3n(&self) -> f64 {
        self.idd3n
    }

    /// Returns the active power-down current.
    pub fn idd3p(&self) -> f64 {
        self.idd3p
    }

    /// Returns the read burst current.
    pub fn idd4r(&self) -> f64 {
        self.idd4r
    }

    /// Returns the write burst current.
    pub fn idd4w(&self) -> f64 {
        self.idd4w
    }

    /// Returns the refresh current.
    pub fn idd5(&self) -> f64 {
        self.idd5
    }
}

/// Energy model of a single voltage rail of a DRAM device.
///
/// Converts operation counts into energy using current-difference formulas
/// over a validated [`Idds`] profile. Energies are reported in the product of
/// the caller's voltage, current, and time units (e.g. V x mA x ns = pJ).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageDomain {
    tck: f64,
    vdd: f64,
    idds: Idds,
    chipcnt: u32,
    burstcycles: u32,
}

impl VoltageDomain {
    /// Creates a voltage domain.
    ///
    /// * `tck` - Clock period, must be positive.
    /// * `vdd` - Supply voltage, must be non-negative.
    /// * `idds` - Datasheet current profile for this rail.
    /// * `chipcnt` - Number of chips in the rank, at least 1.
    /// * `burstcycles` - Clock cycles of burst current per read/write
    ///   command, at least 1 (e.g. 4 for a BL8 transfer at double data rate).
    pub fn new(tck: f64, vdd: f64, idds: Idds, chipcnt: u32, burstcycles: u32) -> Result<Self> {
        if !(tck > 0.) {
            return Err(Error::invalid(
                "tck",
                format!("clock period must be positive, got {tck}"),
            ));
        }
        if !(vdd >= 0.) {
            return Err(Error::invalid(
                "vdd",
                format!("supply voltage must be non-negative, got {vdd}"),
            ));
        }
        if chipcnt == 0 {
            return Err(Error::invalid("chipcnt", "chip count must be at least 1"));
        }
        if burstcycles == 0 {
            return Err(Error::invalid(
                "burstcycles",
                "burst cycle count must be at least 1",
            ));
        }
        Ok(Self {
            tck,
            vdd,
            idds,
            chipcnt,
            burstcycles,
        })
    }

    /// Returns the clock period.
    pub fn tck(&self) -> f64 {
        self.tck
    }

    /// Returns the supply voltage.
    pub fn vdd(&self) -> f64 {
        self.vdd
    }

    /// Returns the IDD profile.
    pub fn idds(&self) -> &Idds {
        &self.idds
    }

    /// Returns the chip count.
    pub fn chipcnt(&self) -> u32 {
        self.chipcnt
    }

    /// Returns the burst cycle count.
    pub fn burstcycles(&self) -> u32 {
        self.burstcycles
    }

    /// Converts a current-cycle product into energy for all chips.
    fn energy(&self, current_cycles: f64) -> f64 {
        current_cycles * self.vdd * self.tck * f64::from(self.chipcnt)
    }

    /// Returns the background energy over the given cycle counts, one count
    /// per idle mode: banks precharged with CKE low/high, and banks active
    /// with CKE low/high.
    pub fn background_energy(
        &self,
        cycles_bankpre_ckelo: u64,
        cycles_bankpre_ckehi: u64,
        cycles_bankact_ckelo: u64,
        cycles_bankact_ckehi: u64,
    ) -> f64 {
        self.energy(
            self.idds.idd2p * cycles_bankpre_ckelo as f64
                + self.idds.idd2n * cycles_bankpre_ckehi as f64
                + self.idds.idd3p * cycles_bankact_ckelo as f64
                + self.idds.idd3n * cycles_bankact_ckehi as f64,
        )
    }

    /// Returns the energy of `num_act` activate-precharge command pairs.
    ///
    /// An activate-precharge cycle draws IDD0 for tRAS active cycles plus
    /// tRP precharge cycles; the standby draw over the same window (IDD3N
    /// while active, IDD2N while precharged) is subtracted so only the delta
    /// attributable to the command itself is charged here.
    pub fn activate_energy(&self, timing: &Timing, num_act: u64) -> f64 {
        let cycles_rc = timing.ras + timing.rp;
        self.energy(
            num_act as f64
                * (self.idds.idd0 * cycles_rc
                    - self.idds.idd3n * timing.ras
                    - self.idds.idd2n * timing.rp),
        )
    }

    /// Returns the energy of `num_rd` read bursts and `num_wr` write bursts,
    /// as the burst-current delta above active standby over the burst cycles.
    pub fn readwrite_energy(&self, num_rd: u64, num_wr: u64) -> f64 {
        self.energy(
            f64::from(self.burstcycles)
                * ((self.idds.idd4r - self.idds.idd3n) * num_rd as f64
                    + (self.idds.idd4w - self.idds.idd3n) * num_wr as f64),
        )
    }

    /// Returns the energy of `num_ref` refresh commands, as the refresh
    /// current delta above active standby over tRFC cycles.
    pub fn refresh_energy(&self, timing: &Timing, num_ref: u64) -> f64 {
        self.energy(timing.rfc * (self.idds.idd5 - self.idds.idd3n) * num_ref as f64)
    }
}
