/// Payback aggregation over simulated days.
pub mod amortization;
pub mod engine;
pub mod types;

pub use amortization::{AmortizationResult, Tariff};
pub use engine::{BatterySimulationEngine, simulate};
pub use types::{DailySimulationOutcome, SimulationParams};
