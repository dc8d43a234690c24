//! Tests for IDD profiles and the voltage domain energy model.
//!
//! Reference values compare with the Micron DDR3 power calculator, based on
//! a DDR3, 2 Gb, x8, -125E, fast-exit device.

use approx::assert_abs_diff_eq;

use super::invalid_field;
use crate::timing::Timing;
use crate::voltage_domain::{Idds, VoltageDomain};

const TCK: f64 = 1000. / 800.;
const VDD: f64 = 1.575;

fn ddr3_idds() -> Idds {
    Idds::new(95., 42., 35., 45., 40., 180., 185., 215.).unwrap()
}

fn ddr3_timing() -> Timing {
    Timing {
        rrd: 6.,
        ras: 35.,
        rp: 47.5 - 35.,
        rfc: 160.,
        refi: 7800.,
    }
}

#[test]
fn idds_accessors() {
    let idds = Idds::new(115., 65., 25., 75., 45., 220., 240., 255.).unwrap();
    assert_eq!(idds.idd0(), 115.);
    assert_eq!(idds.idd2n(), 65.);
    assert_eq!(idds.idd2p(), 25.);
    assert_eq!(idds.idd3n(), 75.);
    assert_eq!(idds.idd3p(), 45.);
    assert_eq!(idds.idd4r(), 220.);
    assert_eq!(idds.idd4w(), 240.);
    assert_eq!(idds.idd5(), 255.);
}

#[test]
fn idds_rejects_negative_current() {
    let err = Idds::new(115., 65., -25., 75., 45., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd2p");
}

#[test]
fn idds_rejects_idd2n_below_idd2p() {
    let err = Idds::new(115., 15., 25., 75., 45., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd2n");
}

#[test]
fn idds_rejects_idd3n_below_idd3p() {
    let err = Idds::new(115., 65., 25., 75., 95., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd3n");
}

#[test]
fn idds_rejects_idd3n_below_idd2n() {
    let err = Idds::new(115., 65., 25., 55., 45., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd3n");
}

#[test]
fn idds_rejects_idd3p_below_idd2p() {
    let err = Idds::new(115., 65., 25., 75., 15., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd3p");
}

#[test]
fn idds_rejects_idd0_below_idd3n() {
    let err = Idds::new(15., 65., 25., 75., 45., 220., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd0");
}

#[test]
fn idds_rejects_idd4r_below_idd3n() {
    let err = Idds::new(115., 65., 25., 75., 45., 70., 240., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd4r");
}

#[test]
fn idds_rejects_idd4w_below_idd3n() {
    let err = Idds::new(115., 65., 25., 75., 45., 220., 70., 255.).unwrap_err();
    assert_eq!(invalid_field(err), "idd4w");
}

#[test]
fn idds_rejects_idd5_below_idd3n() {
    let err = Idds::new(115., 65., 25., 75., 45., 220., 240., 70.).unwrap_err();
    assert_eq!(invalid_field(err), "idd5");
}

#[test]
fn voltage_domain_accessors() {
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();
    assert_eq!(vdom.tck(), TCK);
    assert_eq!(vdom.vdd(), VDD);
    assert_eq!(*vdom.idds(), ddr3_idds());
    assert_eq!(vdom.chipcnt(), 1);
    assert_eq!(vdom.burstcycles(), 4);
}

#[test]
fn voltage_domain_rejects_invalid_tck() {
    let err = VoltageDomain::new(-1., VDD, ddr3_idds(), 1, 4).unwrap_err();
    assert_eq!(invalid_field(err), "tck");
    let err = VoltageDomain::new(0., VDD, ddr3_idds(), 1, 4).unwrap_err();
    assert_eq!(invalid_field(err), "tck");
}

#[test]
fn voltage_domain_rejects_invalid_vdd() {
    let err = VoltageDomain::new(TCK, -1.2, ddr3_idds(), 1, 4).unwrap_err();
    assert_eq!(invalid_field(err), "vdd");
}

#[test]
fn voltage_domain_rejects_invalid_chipcnt() {
    let err = VoltageDomain::new(TCK, VDD, ddr3_idds(), 0, 4).unwrap_err();
    assert_eq!(invalid_field(err), "chipcnt");
}

#[test]
fn voltage_domain_rejects_invalid_burstcycles() {
    let err = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 0).unwrap_err();
    assert_eq!(invalid_field(err), "burstcycles");
}

#[test]
fn background_energy() {
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();

    // Average power draw per idle mode, in mW.
    let pds_pre_lo = vdom.background_energy(1, 0, 0, 0) / vdom.tck();
    assert_abs_diff_eq!(pds_pre_lo, 55.1, epsilon = 0.1);

    let pds_pre_hi = vdom.background_energy(0, 1, 0, 0) / vdom.tck();
    assert_abs_diff_eq!(pds_pre_hi, 66.2, epsilon = 0.1);

    let pds_act_lo = vdom.background_energy(0, 0, 1, 0) / vdom.tck();
    assert_abs_diff_eq!(pds_act_lo, 63.0, epsilon = 0.1);

    let pds_act_hi = vdom.background_energy(0, 0, 0, 1) / vdom.tck();
    assert_abs_diff_eq!(pds_act_hi, 70.9, epsilon = 0.1);
}

#[test]
fn activate_energy() {
    let timing = ddr3_timing();
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();

    let eact = vdom.activate_energy(&timing, 1);
    let pds_act = eact / (timing.ras + timing.rp) / vdom.tck();
    assert_abs_diff_eq!(pds_act, 80.0, epsilon = 0.1);
}

#[test]
fn readwrite_energy() {
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();

    let erd = vdom.readwrite_energy(1, 0);
    assert_abs_diff_eq!(erd / 4. / vdom.tck(), 212.6, epsilon = 0.1);

    let ewr = vdom.readwrite_energy(0, 1);
    assert_abs_diff_eq!(ewr / 4. / vdom.tck(), 220.5, epsilon = 0.1);
}

#[test]
fn refresh_energy() {
    let timing = ddr3_timing();
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();

    let eref = vdom.refresh_energy(&timing, 1);
    assert_abs_diff_eq!(eref / timing.refi / vdom.tck(), 5.5, epsilon = 0.1);
}

#[test]
fn energy_scales_with_counts_and_chips() {
    let timing = ddr3_timing();
    let vdom = VoltageDomain::new(TCK, VDD, ddr3_idds(), 1, 4).unwrap();
    let vdom2 = VoltageDomain::new(TCK, VDD, ddr3_idds(), 2, 4).unwrap();

    assert_abs_diff_eq!(
        vdom.activate_energy(&timing, 3),
        3. * vdom.activate_energy(&timing, 1),
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        vdom2.refresh_energy(&timing, 1),
        2. * vdom.refresh_energy(&timing, 1),
        epsilon = 1e-9
    );
}
