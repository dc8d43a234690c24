//! Energy model for DDR2, DDR3(L), and DDR4 devices.

use crate::error::{Error, Result};
use crate::timing::Timing;
use crate::voltage_domain::{matches_rail, Idds, VoltageDomain};

/// Energy model for one DDR2/DDR3/DDR3L/DDR4 rank.
///
/// Selects the technology variant by matching the supplied voltage(s)
/// against the fixed per-generation tables, then composes one voltage
/// domain (DDR2/3) or two (DDR4, which adds the VPP pump rail). Energy
/// queries sum over all composed rails.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyDdr {
    kind: &'static str,
    timing: Timing,
    vdoms: Vec<VoltageDomain>,
}

impl EnergyDdr {
    /// Creates a DDR2, DDR3, or DDR3L energy model.
    ///
    /// * `tck` - Clock period.
    /// * `timing` - Timing parameters in cycles.
    /// * `vdd` - Supply voltage; 1.8 V for DDR2, 1.5 V for DDR3, or 1.35 V
    ///   for DDR3L.
    /// * `idds` - Datasheet current profile.
    /// * `chipcnt` - Number of chips in the rank.
    /// * `ddr` - DDR generation, 2 or 3. DDR4 needs the VPP rail and is
    ///   created with [`EnergyDdr::with_vpp`] instead.
    pub fn new(
        tck: f64,
        timing: Timing,
        vdd: f64,
        idds: Idds,
        chipcnt: u32,
        ddr: u32,
    ) -> Result<Self> {
        let (kind, burstcycles) = match ddr {
            2 if matches_rail(vdd, 1.8) => ("DDR2", 2),
            2 => {
                return Err(Error::invalid(
                    "vdd",
                    format!("expected 1.8 V for DDR2, got {vdd}"),
                ))
            }
            3 if matches_rail(vdd, 1.5) => ("DDR3", 4),
            3 if matches_rail(vdd, 1.35) => ("DDR3L", 4),
            3 => {
                return Err(Error::invalid(
                    "vdd",
                    format!("expected 1.5 V for DDR3 or 1.35 V for DDR3L, got {vdd}"),
                ))
            }
            4 => {
                return Err(Error::invalid(
                    "vpp",
                    "DDR4 requires a VPP rail, use EnergyDdr::with_vpp",
                ))
            }
            _ => {
                return Err(Error::invalid(
                    "ddr",
                    format!("unsupported DDR generation {ddr}"),
                ))
            }
        };
        let vdom = VoltageDomain::new(tck, vdd, idds, chipcnt, burstcycles)?;
        Ok(Self {
            kind,
            timing,
            vdoms: vec![vdom],
        })
    }

    /// Creates a DDR4 energy model from the VDD core rail and the VPP
    /// wordline pump rail. Both rails must be supplied: `vdd` must be 1.2 V
    /// and `vpp` 2.5 V.
    pub fn with_vpp(
        tck: f64,
        timing: Timing,
        vdd: f64,
        idds: Idds,
        vpp: f64,
        idds_vpp: Idds,
        chipcnt: u32,
    ) -> Result<Self> {
        if !matches_rail(vdd, 1.2) {
            return Err(Error::invalid(
                "vdd",
                format!("expected 1.2 V for DDR4, got {vdd}"),
            ));
        }
        if !matches_rail(vpp, 2.5) {
            return Err(Error::invalid(
                "vpp",
                format!("expected 2.5 V for DDR4, got {vpp}"),
            ));
        }
        let vdoms = vec![
            VoltageDomain::new(tck, vdd, idds, chipcnt, 4)?,
            VoltageDomain::new(tck, vpp, idds_vpp, chipcnt, 4)?,
        ];
        Ok(Self {
            kind: "DDR4",
            timing,
            vdoms,
        })
    }

    /// Returns the technology name, e.g. `"DDR3L"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the timing parameters.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Returns the composed voltage domains, core rail first.
    pub fn voltage_domains(&self) -> &[VoltageDomain] {
        &self.vdoms
    }

    /// Returns the background energy over the given cycle counts, summed
    /// over all rails. See [`VoltageDomain::background_energy`].
    pub fn background_energy(
        &self,
        cycles_bankpre_ckelo: u64,
        cycles_bankpre_ckehi: u64,
        cycles_bankact_ckelo: u64,
        cycles_bankact_ckehi: u64,
    ) -> f64 {
        self.vdoms
            .iter()
            .map(|v| {
                v.background_energy(
                    cycles_bankpre_ckelo,
                    cycles_bankpre_ckehi,
                    cycles_bankact_ckelo,
                    cycles_bankact_ckehi,
                )
            })
            .sum()
    }

    /// Returns the energy of `num_act` activations, summed over all rails.
    pub fn activate_energy(&self, num_act: u64) -> f64 {
        self.vdoms
            .iter()
            .map(|v| v.activate_energy(&self.timing, num_act))
            .sum()
    }

    /// Returns the energy of the given read and write bursts, summed over
    /// all rails.
    pub fn readwrite_energy(&self, num_rd: u64, num_wr: u64) -> f64 {
        self.vdoms
            .iter()
            .map(|v| v.readwrite_energy(num_rd, num_wr))
            .sum()
    }

    /// Returns the energy of `num_ref` refreshes, summed over all rails.
    pub fn refresh_energy(&self, num_ref: u64) -> f64 {
        self.vdoms
            .iter()
            .map(|v| v.refresh_energy(&self.timing, num_ref))
            .sum()
    }
}
