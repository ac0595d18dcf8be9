//! Core simulation types: validated parameters and per-day outcomes.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result};

/// Validated battery parameters for one simulation run.
///
/// Loss percentages are stored as given (e.g. `5.0` for 5%); the engine
/// converts them to fractions when it builds the storage model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Usable battery capacity (kWh, > 0).
    pub capacity_kwh: f64,
    /// Charging loss in percent, in [0, 100).
    pub charge_loss_pct: f64,
    /// Discharging loss in percent, in [0, 100).
    pub discharge_loss_pct: f64,
}

impl SimulationParams {
    /// Validates and bundles the battery parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the capacity is not a positive
    /// finite number or a loss percentage is outside `[0, 100)`.
    pub fn new(capacity_kwh: f64, charge_loss_pct: f64, discharge_loss_pct: f64) -> Result<Self> {
        if !capacity_kwh.is_finite() || capacity_kwh <= 0.0 {
            return Err(Error::InvalidParameter {
                field: "capacity_kwh",
                message: format!("must be > 0, got {capacity_kwh}"),
            });
        }
        check_loss_pct("charge_loss_pct", charge_loss_pct)?;
        check_loss_pct("discharge_loss_pct", discharge_loss_pct)?;

        Ok(Self {
            capacity_kwh,
            charge_loss_pct,
            discharge_loss_pct,
        })
    }

    pub fn charge_loss(&self) -> f64 {
        self.charge_loss_pct / 100.0
    }

    pub fn discharge_loss(&self) -> f64 {
        self.discharge_loss_pct / 100.0
    }
}

fn check_loss_pct(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..100.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            field,
            message: format!("must be in [0, 100), got {value}"),
        })
    }
}

/// Complete record of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySimulationOutcome {
    /// Simulated calendar day.
    pub date: NaiveDate,
    /// Stored energy at the start of the day (kWh).
    pub charge_start_kwh: f64,
    /// Stored energy at the end of the day (kWh).
    pub charge_end_kwh: f64,
    /// Stored energy withdrawn to cover grid draw (kWh).
    pub discharged_kwh: f64,
    /// Energy stored from surplus feed-in (kWh).
    pub charged_kwh: f64,
    /// Grid draw without a battery (kWh).
    pub original_draw_kwh: f64,
    /// Grid draw with the battery (kWh).
    pub draw_after_kwh: f64,
    /// Grid feed-in without a battery (kWh).
    pub original_feed_kwh: f64,
    /// Grid feed-in with the battery (kWh).
    pub feed_after_kwh: f64,
}

impl DailySimulationOutcome {
    /// Grid purchase avoided by discharging (kWh).
    pub fn energy_saved_kwh(&self) -> f64 {
        self.original_draw_kwh - self.draw_after_kwh
    }

    /// Feed-in diverted into the battery (kWh).
    pub fn energy_used_for_charging_kwh(&self) -> f64 {
        self.original_feed_kwh - self.feed_after_kwh
    }
}

impl fmt::Display for DailySimulationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | battery {:>6.2} -> {:>6.2} kWh | out={:.2} in={:.2} | \
             draw {:.2} -> {:.2} kWh | feed {:.2} -> {:.2} kWh",
            self.date.format("%d.%m.%Y"),
            self.charge_start_kwh,
            self.charge_end_kwh,
            self.discharged_kwh,
            self.charged_kwh,
            self.original_draw_kwh,
            self.draw_after_kwh,
            self.original_feed_kwh,
            self.feed_after_kwh,
        )
    }
}
