#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod energy_ddr;
pub mod energy_lpddr;
pub mod error;
pub mod termination;
pub mod timing;
pub mod voltage_domain;

#[cfg(test)]
mod tests;
