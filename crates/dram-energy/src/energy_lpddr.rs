//! Energy model for LPDDR2, LPDDR3, and LPDDR4 devices.

use crate::error::{Error, Result};
use crate::timing::Timing;
use crate::voltage_domain::{matches_rail, Idds, VoltageDomain};

/// Energy model for one LPDDR2/LPDDR3/LPDDR4 rank.
///
/// LPDDR devices split their current draw over three rails: VDD1 (core
/// supply), VDD2 (core logic), and VDDCAQ (command/address and DQ I/O).
/// Each rail carries its own IDD profile; energy queries sum all three.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyLpddr {
    kind: &'static str,
    timing: Timing,
    vdoms: Vec<VoltageDomain>,
}

impl EnergyLpddr {
    /// Creates an LPDDR energy model.
    ///
    /// Rail voltages must match the generation: 1.8/1.2/1.2 V for LPDDR2
    /// and LPDDR3, 1.8/1.1/1.1 V for LPDDR4.
    ///
    /// * `tck` - Clock period.
    /// * `timing` - Timing parameters in cycles.
    /// * `vdd1`, `idds1` - VDD1 rail voltage and current profile.
    /// * `vdd2`, `idds2` - VDD2 rail voltage and current profile.
    /// * `vddcaq`, `iddscaq` - VDDCAQ rail voltage and current profile.
    /// * `chipcnt` - Number of chips in the rank.
    /// * `ddr` - LPDDR generation, 2, 3, or 4.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tck: f64,
        timing: Timing,
        vdd1: f64,
        idds1: Idds,
        vdd2: f64,
        idds2: Idds,
        vddcaq: f64,
        iddscaq: Idds,
        chipcnt: u32,
        ddr: u32,
    ) -> Result<Self> {
        let (kind, exp_vdd2) = match ddr {
            2 => ("LPDDR2", 1.2),
            3 => ("LPDDR3", 1.2),
            4 => ("LPDDR4", 1.1),
            _ => {
                return Err(Error::invalid(
                    "ddr",
                    format!("unsupported LPDDR generation {ddr}"),
                ))
            }
        };
        if !matches_rail(vdd1, 1.8) {
            return Err(Error::invalid(
                "vdd1",
                format!("expected 1.8 V for {kind}, got {vdd1}"),
            ));
        }
        if !matches_rail(vdd2, exp_vdd2) {
            return Err(Error::invalid(
                "vdd2",
                format!("expected {exp_vdd2} V for {kind}, got {vdd2}"),
            ));
        }
        if !matches_rail(vddcaq, exp_vdd2) {
            return Err(Error::invalid(
                "vddcaq",
                format!("expected {exp_vdd2} V for {kind}, got {vddcaq}"),
            ));
        }
        let vdoms = vec![
            VoltageDomain::new(tck, vdd1, idds1, chipcnt, 4)?,
            VoltageDomain::new(tck, vdd2, idds2, chipcnt, 4)?,
            VoltageDomain::new(tck, vddcaq, iddscaq, chipcnt, 4)?,
        ];
        Ok(Self {
            kind,
            timing,
            vdoms,
        })
    }

    /// Returns the technology name, e.g. `"LPDDR3"`.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the timing parameters.
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Returns the composed voltage domains: VDD1, VDD2, VDDCAQ.
    pub fn voltage_domains(&self) -> &[VoltageDomain] {
        &self.vdoms
    }

    /// Returns the background energy over the given cycle counts, summed
    /// over all three rails. See [`VoltageDomain::background_energy`].
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
