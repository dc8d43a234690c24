//! Resistive termination power model, solved via nodal-voltage analysis.

use std::fmt;
use std::str::FromStr;

use log::debug;
use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// Resistances at or below this value are rejected as invalid.
const MIN_RESISTANCE: f64 = 1e-4;

/// Termination resistance values of one chip and its channel, in ohms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermResistance {
    rz_dev: f64,
    rz_mc: f64,
    rtt_nom: f64,
    rtt_wr: f64,
    rtt_mc: f64,
    rs: f64,
}

impl TermResistance {
    /// Creates a validated set of termination resistances. All six values
    /// must be strictly positive.
    ///
    /// * `rz_dev` - DRAM device output driver impedance.
    /// * `rz_mc` - Memory controller output driver impedance.
    /// * `rtt_nom` - Nominal on-die termination (R_TT,nom).
    /// * `rtt_wr` - Dynamic write termination (R_TT(WR)).
    /// * `rtt_mc` - Memory controller termination.
    /// * `rs` - Trace (channel) impedance.
    pub fn new(
        rz_dev: f64,
        rz_mc: f64,
        rtt_nom: f64,
        rtt_wr: f64,
        rtt_mc: f64,
        rs: f64,
    ) -> Result<Self> {
        let values = [
            ("rz_dev", rz_dev),
            ("rz_mc", rz_mc),
            ("rtt_nom", rtt_nom),
            ("rtt_wr", rtt_wr),
            ("rtt_mc", rtt_mc),
            ("rs", rs),
        ];
        for (field, value) in values {
            if !(value > MIN_RESISTANCE) {
                return Err(Error::invalid(
                    field,
                    format!("resistance must be positive, got {value}"),
                ));
            }
        }
        Ok(Self {
            rz_dev,
            rz_mc,
            rtt_nom,
            rtt_wr,
            rtt_mc,
            rs,
        })
    }

    /// Returns the DRAM device output driver impedance.
    pub fn rz_dev(&self) -> f64 {
        self.rz_dev
    }

    /// Returns the memory controller output driver impedance.
    pub fn rz_mc(&self) -> f64 {
        self.rz_mc
    }

    /// Returns the nominal on-die termination.
    pub fn rtt_nom(&self) -> f64 {
        self.rtt_nom
    }

    /// Returns the dynamic write termination.
    pub fn rtt_wr(&self) -> f64 {
        self.rtt_wr
    }

    /// Returns the memory controller termination.
    pub fn rtt_mc(&self) -> f64 {
        self.rtt_mc
    }

    /// Returns the trace impedance.
    pub fn rs(&self) -> f64 {
        self.rs
    }
}

/// Rail a termination resistor connects to.
///
/// Determines the Thevenin-equivalent source voltage seen by a terminating
/// node and, for [`TermLevel::Low`], the reference voltage the driver pulls
/// toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermLevel {
    /// Single resistor pulled up to VDD (pseudo-open-drain signaling, DDR4).
    High,
    /// Single resistor down to ground; the driver pulls up to VDD instead
    /// (low-voltage swing terminated logic, LPDDR4).
    Low,
    /// Split termination with a 2R pull-up and a 2R pull-down leg centered
    /// at VDD/2 (center-tap termination, DDR2/DDR3).
    #[default]
    Mid,
}

impl TermLevel {
    /// Thevenin-equivalent source voltage behind a terminating node.
    fn equivalent_voltage(self, vdd: f64) -> f64 {
        match self {
            Self::High => vdd,
            Self::Low => 0.,
            Self::Mid => vdd / 2.,
        }
    }

    /// Reference voltage the driving node pulls toward.
    fn driver_voltage(self, vdd: f64) -> f64 {
        match self {
            Self::Low => vdd,
            Self::High | Self::Mid => 0.,
        }
    }

    /// Power dissipated in the termination resistor(s) of a node held at
    /// voltage `v` with nominal termination `r`. For [`TermLevel::Mid`] both
    /// 2R legs dissipate; for the single-leg levels only one resistor does.
    fn termination_power(self, v: f64, vdd: f64, r: f64) -> f64 {
        match self {
            Self::High => (v - vdd).powi(2) / r,
            Self::Low => v * v / r,
            Self::Mid => (v - vdd).powi(2) / (2. * r) + v * v / (2. * r),
        }
    }
}

impl FromStr for TermLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "mid" => Ok(Self::Mid),
            other => Err(Error::invalid(
                "level",
                format!("unknown termination level `{other}`, expected `high`, `low`, or `mid`"),
            )),
        }
    }
}

impl fmt::Display for TermLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Low => write!(f, "low"),
            Self::Mid => write!(f, "mid"),
        }
    }
}

/// Data pin topology of one device, used to scale the per-pin termination
/// power to a whole chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPins {
    /// Data bus width; 0, 4, 8, 16, or 32. Width 0 selects normalized
    /// single-pin mode where all flags are ignored.
    pub width: u32,
    /// Whether differential data strobe (DQS) pins are present, 2 per group
    /// of up to 8 data pins.
    pub with_dqs: bool,
    /// Whether data mask (DM) pins are present, 1 per group of up to 8 data
    /// pins; these switch only on writes.
    pub with_dm: bool,
    /// Whether data bus inversion is used, which on average halves the
    /// switching data pins at the cost of 1 DBI pin per group.
    pub with_dbi: bool,
}

impl Default for DataPins {
    /// Normalized single-pin mode with DQS and DM present, as in a typical
    /// DDR3 device.
    fn default() -> Self {
        Self {
            width: 0,
            with_dqs: true,
            with_dm: true,
            with_dbi: false,
        }
    }
}

impl DataPins {
    /// Derives the effective (read, write) pin counts.
    ///
    /// For a x8 device with DQS and DM, the read count covers 8 DQ plus 2
    /// DQS for a total of 10; the write count adds the data mask for 11.
    /// See Micron TN-41-01.
    fn pin_counts(&self) -> Result<(u32, u32)> {
        if self.width == 0 {
            return Ok((1, 1));
        }
        if !matches!(self.width, 4 | 8 | 16 | 32) {
            return Err(Error::invalid(
                "width",
                format!("bus width must be 0, 4, 8, 16, or 32, got {}", self.width),
            ));
        }
        let groups = (self.width / 8).max(1);
        let data = if self.with_dbi {
            self.width / 2 + groups
        } else {
            self.width
        };
        let rd = data + if self.with_dqs { 2 * groups } else { 0 };
        let wr = rd + if self.with_dm { groups } else { 0 };
        Ok((rd, wr))
    }
}

/// Role of a bus node in one transfer direction.
struct NodeRole {
    /// Driver impedance or termination resistance of this node.
    resistance: f64,
    /// Whether this node drives the bus in this direction.
    driving: bool,
}

impl NodeRole {
    fn driver(resistance: f64) -> Self {
        Self {
            resistance,
            driving: true,
        }
    }

    fn terminator(resistance: f64) -> Self {
        Self {
            resistance,
            driving: false,
        }
    }
}

/// Termination power model of the data bus connecting `rankcnt` DRAM ranks
/// to one memory controller.
///
/// Node `0` is the target rank of the access, nodes `1..rankcnt-1` are the
/// idle ranks, and node `rankcnt` is the controller; every rank reaches the
/// controller node through a series trace resistance. Construction solves
/// the resulting DC network once per direction (read: the target rank drives
/// and everyone else terminates; write: the controller drives) and freezes
/// the per-node dissipated power, scaled by the effective pin counts. All
/// queries are pure reductions over the frozen vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Termination {
    vdd: f64,
    rankcnt: usize,
    resistance: TermResistance,
    level: TermLevel,
    rdpincnt: u32,
    wrpincnt: u32,
    rd_power: Vec<f64>,
    wr_power: Vec<f64>,
}

impl Termination {
    /// Creates a termination model from the pin topology of the device.
    ///
    /// * `vdd` - Signal supply voltage, must be non-negative.
    /// * `rankcnt` - Number of ranks on the bus, at least 1.
    /// * `resistance` - Driver and termination resistance values.
    /// * `pins` - Data pin topology; derives the effective pin counts.
    /// * `level` - Rail(s) the termination resistors connect to.
    pub fn new(
        vdd: f64,
        rankcnt: usize,
        resistance: TermResistance,
        pins: DataPins,
        level: TermLevel,
    ) -> Result<Self> {
        let (rdpincnt, wrpincnt) = pins.pin_counts()?;
        Self::build(vdd, rankcnt, resistance, rdpincnt, wrpincnt, level)
    }

    /// Creates a termination model from explicit read/write pin counts, with
    /// center-tap (mid) termination. Convenience for callers that already
    /// know the effective pin counts; equivalent to [`Termination::new`]
    /// with a matching topology.
    pub fn with_pin_counts(
        vdd: f64,
        rankcnt: usize,
        resistance: TermResistance,
        rdpincnt: u32,
        wrpincnt: u32,
    ) -> Result<Self> {
        if rdpincnt == 0 {
            return Err(Error::invalid(
                "rdpincnt",
                "read pin count must be at least 1",
            ));
        }
        if wrpincnt == 0 {
            return Err(Error::invalid(
                "wrpincnt",
                "write pin count must be at least 1",
            ));
        }
        Self::build(vdd, rankcnt, resistance, rdpincnt, wrpincnt, TermLevel::Mid)
    }

    fn build(
        vdd: f64,
        rankcnt: usize,
        resistance: TermResistance,
        rdpincnt: u32,
        wrpincnt: u32,
        level: TermLevel,
    ) -> Result<Self> {
        if !(vdd >= 0.) {
            return Err(Error::invalid(
                "vdd",
                format!("supply voltage must be non-negative, got {vdd}"),
            ));
        }
        if rankcnt == 0 {
            return Err(Error::invalid("rankcnt", "rank count must be at least 1"));
        }

        // Read: the target rank drives through rz_dev, the controller
        // terminates with rtt_mc.
        let mut rd_power = solve_direction(
            vdd,
            rankcnt,
            &resistance,
            level,
            NodeRole::driver(resistance.rz_dev),
            NodeRole::terminator(resistance.rtt_mc),
        )?;
        // Write: the controller drives through rz_mc, the target rank
        // terminates with the dynamic write termination rtt_wr.
        let mut wr_power = solve_direction(
            vdd,
            rankcnt,
            &resistance,
            level,
            NodeRole::terminator(resistance.rtt_wr),
            NodeRole::driver(resistance.rz_mc),
        )?;

        for p in rd_power.iter_mut() {
            *p *= f64::from(rdpincnt);
        }
        for p in wr_power.iter_mut() {
            *p *= f64::from(wrpincnt);
        }

        Ok(Self {
            vdd,
            rankcnt,
            resistance,
            level,
            rdpincnt,
            wrpincnt,
            rd_power,
            wr_power,
        })
    }

    /// Returns the signal supply voltage.
    pub fn vdd(&self) -> f64 {
        self.vdd
    }

    /// Returns the rank count.
    pub fn rankcnt(&self) -> usize {
        self.rankcnt
    }

    /// Returns the resistance values.
    pub fn resistance(&self) -> &TermResistance {
        &self.resistance
    }

    /// Returns the termination level.
    pub fn level(&self) -> TermLevel {
        self.level
    }

    /// Returns the effective read pin count.
    pub fn rdpincnt(&self) -> u32 {
        self.rdpincnt
    }

    /// Returns the effective write pin count.
    pub fn wrpincnt(&self) -> u32 {
        self.wrpincnt
    }

    /// Returns the total read termination power over all nodes.
    pub fn read_power_total(&self) -> f64 {
        self.rd_power.iter().sum()
    }

    /// Returns the total write termination power over all nodes.
    pub fn write_power_total(&self) -> f64 {
        self.wr_power.iter().sum()
    }

    /// Returns the read termination power at the memory controller.
    pub fn read_power_memctlr(&self) -> f64 {
        self.rd_power[self.rankcnt]
    }

    /// Returns the write termination power at the memory controller.
    pub fn write_power_memctlr(&self) -> f64 {
        self.wr_power[self.rankcnt]
    }

    /// Returns the read termination power at all DRAM ranks.
    pub fn read_power_devices(&self) -> f64 {
        self.rd_power[..self.rankcnt].iter().sum()
    }

    /// Returns the write termination power at all DRAM ranks.
    pub fn write_power_devices(&self) -> f64 {
        self.wr_power[..self.rankcnt].iter().sum()
    }

    /// Returns the read termination power at the target rank.
    pub fn read_power_target_rank(&self) -> f64 {
        self.rd_power[0]
    }

    /// Returns the write termination power at the target rank.
    pub fn write_power_target_rank(&self) -> f64 {
        self.wr_power[0]
    }

    /// Returns the read termination power at the non-target ranks; 0 for a
    /// single-rank bus.
    pub fn read_power_other_ranks(&self) -> f64 {
        self.rd_power[1..self.rankcnt].iter().sum()
    }

    /// Returns the write termination power at the non-target ranks; 0 for a
    /// single-rank bus.
    pub fn write_power_other_ranks(&self) -> f64 {
        self.wr_power[1..self.rankcnt].iter().sum()
    }
}

/// Solves the node voltages of one transfer direction and derives the
/// per-node dissipated power, unscaled by pin count.
///
/// Builds the conductance matrix of the network by Kirchhoff's current law:
/// every node balances the current into its own driver or termination
/// resistor against the current through its trace to the shared controller
/// node. The system is diagonally dominant for positive resistances, so the
/// dense LU solve cannot fail for validated inputs.
fn solve_direction(
    vdd: f64,
    rankcnt: usize,
    resistance: &TermResistance,
    level: TermLevel,
    rank0: NodeRole,
    memctlr: NodeRole,
) -> Result<Vec<f64>> {
    let n = rankcnt;
    let rs = resistance.rs;
    let rtt_nom = resistance.rtt_nom;
    let v_eq = level.equivalent_voltage(vdd);
    let v_drv = level.driver_voltage(vdd);
    let source = |role: &NodeRole| if role.driving { v_drv } else { v_eq };

    let mut coef = DMatrix::zeros(n + 1, n + 1);
    let mut rhs = DVector::zeros(n + 1);

    // Target rank.
    coef[(0, 0)] = 1. / rank0.resistance + 1. / rs;
    coef[(0, n)] = -1. / rs;
    rhs[0] = source(&rank0) / rank0.resistance;
    // Idle ranks terminate with rtt_nom.
    for idx in 1..n {
        coef[(idx, idx)] = 1. / rtt_nom + 1. / rs;
        coef[(idx, n)] = -1. / rs;
        rhs[idx] = v_eq / rtt_nom;
    }
    // Controller, reached by every rank through its trace.
    for jdx in 0..n {
        coef[(n, jdx)] = -1. / rs;
    }
    coef[(n, n)] = 1. / memctlr.resistance + n as f64 / rs;
    rhs[n] = source(&memctlr) / memctlr.resistance;

    let vnodes = coef
        .lu()
        .solve(&rhs)
        .ok_or_else(|| Error::Internal("singular conductance matrix".to_string()))?;
    debug!("solved node voltages: {:?}", vnodes.as_slice());

    let v_mc = vnodes[n];
    let mut power = vec![0.; n + 1];
    power[0] = if rank0.driving {
        (vnodes[0] - v_drv).powi(2) / rank0.resistance
    } else {
        level.termination_power(vnodes[0], vdd, rank0.resistance)
    } + (vnodes[0] - v_mc).powi(2) / rs;
    for idx in 1..n {
        power[idx] = level.termination_power(vnodes[idx], vdd, rtt_nom)
            + (vnodes[idx] - v_mc).powi(2) / rs;
    }
    // Trace loss is charged to the rank side of each trace, so the
    // controller node contributes only its own resistor.
    power[n] = if memctlr.driving {
        (v_mc - v_drv).powi(2) / memctlr.resistance
    } else {
        level.termination_power(v_mc, vdd, memctlr.resistance)
    };
    Ok(power)
}
