//! Storage device models.

/// Home battery storage with charge/discharge losses.
pub mod battery;

pub use battery::{BatteryStorage, ChargeOutcome, DischargeOutcome};
