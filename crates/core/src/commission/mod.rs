//! Employee commission computation.

pub mod calculator;

#[cfg(test)]
mod calculator_props;

pub use calculator::{CommissionCalculator, CommissionInput};
