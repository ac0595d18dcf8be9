//! Post-hoc payback computation from simulation outcomes.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::record::EnergyRecord;

use super::types::DailySimulationOutcome;

/// Days per year used to extrapolate the observed daily savings.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Grid prices in currency per kWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tariff {
    /// Price paid per kWh drawn from the grid.
    pub purchase_price_per_kwh: f64,
    /// Remuneration per kWh fed into the grid.
    pub feed_price_per_kwh: f64,
}

impl Tariff {
    pub fn new(purchase_price_per_kwh: f64, feed_price_per_kwh: f64) -> Self {
        Self {
            purchase_price_per_kwh,
            feed_price_per_kwh,
        }
    }

    /// Net grid cost for a day's draw and feed-in.
    pub fn net_cost(&self, draw_kwh: f64, feed_kwh: f64) -> f64 {
        draw_kwh * self.purchase_price_per_kwh - feed_kwh * self.feed_price_per_kwh
    }
}

/// Aggregate economics of one battery over the simulated period.
///
/// Computed post-hoc from the daily outcomes so that the reported figures
/// always agree with the per-day data they carry.
#[derive(Debug, Clone, Serialize)]
pub struct AmortizationResult {
    /// Battery purchase price.
    pub battery_price: f64,
    /// Cost difference without vs. with battery over the whole period.
    pub total_savings: f64,
    /// Daily average savings extrapolated to 365 days.
    pub annual_savings: f64,
    /// Years until savings cover the battery price (`inf` if never).
    pub payback_years: f64,
    /// Grid purchase avoided by discharging (kWh).
    pub total_energy_saved_kwh: f64,
    /// Feed-in diverted into the battery (kWh).
    pub total_energy_used_for_charging_kwh: f64,
    /// Simulated days whose date had no original record and were skipped.
    pub unmatched_days: usize,
    /// Every simulated day in order.
    pub daily: Vec<DailySimulationOutcome>,
}

impl AmortizationResult {
    /// Joins the outcomes back to the original records and aggregates savings.
    ///
    /// Outcomes whose date has no original record contribute nothing, but
    /// still count towards the number of simulated days used for the annual
    /// extrapolation. They are counted in [`Self::unmatched_days`].
    ///
    /// # Arguments
    ///
    /// * `outcomes` - Simulation outcomes in date order
    /// * `original_records` - The records the simulation was run on
    /// * `tariff` - Grid purchase and feed-in prices
    /// * `battery_price` - Purchase price of the battery
    pub fn calculate(
        outcomes: Vec<DailySimulationOutcome>,
        original_records: &[EnergyRecord],
        tariff: &Tariff,
        battery_price: f64,
    ) -> Self {
        let mut by_date: HashMap<NaiveDate, &EnergyRecord> =
            HashMap::with_capacity(original_records.len());
        for record in original_records {
            by_date.entry(record.date).or_insert(record);
        }

        let mut total_savings = 0.0_f64;
        let mut energy_saved = 0.0_f64;
        let mut energy_charged = 0.0_f64;
        let mut unmatched = 0_usize;

        for outcome in &outcomes {
            let Some(original) = by_date.get(&outcome.date) else {
                unmatched += 1;
                continue;
            };

            let without_battery =
                tariff.net_cost(original.drawn_from_grid_kwh(), original.fed_to_grid_kwh());
            let with_battery = tariff.net_cost(outcome.draw_after_kwh, outcome.feed_after_kwh);
            total_savings += without_battery - with_battery;

            energy_saved += outcome.energy_saved_kwh();
            energy_charged += outcome.energy_used_for_charging_kwh();
        }

        if unmatched > 0 {
            warn!(
                unmatched,
                days = outcomes.len(),
                "simulated days without a matching record were skipped"
            );
        }

        let annual_savings = if outcomes.is_empty() {
            0.0
        } else {
            total_savings / outcomes.len() as f64 * DAYS_PER_YEAR
        };

        let payback_years = if annual_savings > 0.0 {
            battery_price / annual_savings
        } else {
            f64::INFINITY
        };

        info!(
            days = outcomes.len(),
            total_savings, annual_savings, payback_years, "amortization computed"
        );

        Self {
            battery_price,
            total_savings,
            annual_savings,
            payback_years,
            total_energy_saved_kwh: energy_saved,
            total_energy_used_for_charging_kwh: energy_charged,
            unmatched_days: unmatched,
            daily: outcomes,
        }
    }

    /// Payback period in months (`inf` if never).
    pub fn payback_months(&self) -> f64 {
        self.payback_years * 12.0
    }

    pub fn simulation_days(&self) -> usize {
        self.daily.len()
    }

    /// Pretty-printed JSON of the whole result, daily outcomes included.
    ///
    /// An infinite payback period serializes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether the battery saves money at all.
    pub fn is_profitable(&self) -> bool {
        self.annual_savings > 0.0
    }
}

impl fmt::Display for AmortizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Amortization Report ---")?;
        writeln!(f, "Simulated days:        {}", self.simulation_days())?;
        if self.unmatched_days > 0 {
            writeln!(f, "Unmatched days:        {}", self.unmatched_days)?;
        }
        writeln!(f, "Battery price:         {:.2}", self.battery_price)?;
        writeln!(f, "Total savings:         {:.2}", self.total_savings)?;
        writeln!(f, "Annual savings:        {:.2}", self.annual_savings)?;
        writeln!(
            f,
            "Energy from battery:   {:.2} kWh",
            self.total_energy_saved_kwh
        )?;
        writeln!(
            f,
            "Energy into battery:   {:.2} kWh",
            self.total_energy_used_for_charging_kwh
        )?;
        if self.payback_years.is_finite() {
            write!(
                f,
                "Payback period:        {:.1} years ({:.0} months)",
                self.payback_years,
                self.payback_months()
            )
        } else {
            write!(f, "Payback period:        never")
        }
    }
}
