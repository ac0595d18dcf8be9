//! Day-by-day battery simulation over historical energy records.

use tracing::debug;

use crate::devices::BatteryStorage;
use crate::error::Result;
use crate::record::EnergyRecord;

use super::types::{DailySimulationOutcome, SimulationParams};

/// Replays a household's grid draw and feed-in through a virtual battery.
///
/// The only state carried between days is the stored energy, which starts
/// at zero. Within a day the battery first discharges against that day's
/// grid draw and then charges from that day's feed-in, so energy fed in on
/// a given day can only offset draw from the next day onwards.
#[derive(Debug, Clone)]
pub struct BatterySimulationEngine {
    params: SimulationParams,
}

impl BatterySimulationEngine {
    pub fn new(params: SimulationParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Executes one day against `battery` and returns its outcome.
    fn step(battery: &mut BatteryStorage, record: &EnergyRecord) -> DailySimulationOutcome {
        let charge_start_kwh = battery.charge_kwh();
        let original_draw_kwh = record.drawn_from_grid_kwh();
        let original_feed_kwh = record.fed_to_grid_kwh();

        // 1. Discharge against grid draw
        let discharge = battery.discharge(original_draw_kwh);

        // 2. Charge from grid feed-in
        let charge = battery.charge(original_feed_kwh);

        // 3. Guard against float drift
        battery.clamp();

        DailySimulationOutcome {
            date: record.date,
            charge_start_kwh,
            charge_end_kwh: battery.charge_kwh(),
            discharged_kwh: discharge.withdrawn_kwh,
            charged_kwh: charge.stored_kwh,
            original_draw_kwh,
            draw_after_kwh: original_draw_kwh - discharge.delivered_kwh,
            original_feed_kwh,
            feed_after_kwh: original_feed_kwh - charge.consumed_kwh,
        }
    }

    /// Simulates every record in date order and returns one outcome per record.
    ///
    /// Records are stably sorted by date first; days sharing a date are kept
    /// and simulated in input order.
    pub fn simulate(&self, records: &[EnergyRecord]) -> Vec<DailySimulationOutcome> {
        let mut ordered: Vec<&EnergyRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.date);

        let mut battery = BatteryStorage::new(
            self.params.capacity_kwh,
            self.params.charge_loss(),
            self.params.discharge_loss(),
        );

        let outcomes: Vec<DailySimulationOutcome> = ordered
            .into_iter()
            .map(|record| Self::step(&mut battery, record))
            .collect();

        if let (Some(first), Some(last)) = (outcomes.first(), outcomes.last()) {
            debug!(
                days = outcomes.len(),
                from = %first.date,
                to = %last.date,
                final_charge_kwh = last.charge_end_kwh,
                "battery simulation finished"
            );
        }

        outcomes
    }
}

/// Validates the parameters and simulates `records` in one call.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidParameter`] for a non-positive capacity or
/// a loss percentage outside `[0, 100)`; nothing is simulated in that case.
pub fn simulate(
    records: &[EnergyRecord],
    capacity_kwh: f64,
    charge_loss_pct: f64,
    discharge_loss_pct: f64,
) -> Result<Vec<DailySimulationOutcome>> {
    let params = SimulationParams::new(capacity_kwh, charge_loss_pct, discharge_loss_pct)?;
    Ok(BatterySimulationEngine::new(params).simulate(records))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap_or_default()
    }

    /// Record with grid draw and feed-in given in kWh.
    fn record(d: u32, draw_kwh: f64, feed_kwh: f64) -> EnergyRecord {
        EnergyRecord::new(day(d), 0.0, 0.0, 0.0, feed_kwh * 1000.0, draw_kwh * 1000.0)
    }

    fn lossless(capacity_kwh: f64) -> BatterySimulationEngine {
        BatterySimulationEngine::new(
            SimulationParams::new(capacity_kwh, 0.0, 0.0).unwrap_or_else(|e| panic!("{e}")),
        )
    }

    #[test]
    fn single_day_charges_after_discharge() {
        let outcomes = lossless(5.0).simulate(&[record(1, 3.0, 2.0)]);
        assert_eq!(outcomes.len(), 1);
        let o = &outcomes[0];
        assert_eq!(o.charge_start_kwh, 0.0);
        assert_eq!(o.discharged_kwh, 0.0);
        assert_eq!(o.draw_after_kwh, 3.0);
        assert_eq!(o.charged_kwh, 2.0);
        assert_eq!(o.feed_after_kwh, 0.0);
        assert_eq!(o.charge_end_kwh, 2.0);
    }

    #[test]
    fn charge_carries_over_to_next_day() {
        let outcomes = lossless(5.0).simulate(&[record(1, 0.0, 4.0), record(2, 3.0, 0.0)]);
        assert_eq!(outcomes[0].charge_end_kwh, 4.0);
        assert_eq!(outcomes[1].charge_start_kwh, 4.0);
        assert_eq!(outcomes[1].discharged_kwh, 3.0);
        assert_eq!(outcomes[1].draw_after_kwh, 0.0);
        assert_eq!(outcomes[1].charge_end_kwh, 1.0);
    }

    #[test]
    fn out_of_order_input_is_simulated_by_date() {
        let outcomes = lossless(5.0).simulate(&[record(2, 3.0, 0.0), record(1, 0.0, 4.0)]);
        assert_eq!(outcomes[0].date, day(1));
        assert_eq!(outcomes[1].date, day(2));
        assert_eq!(outcomes[1].draw_after_kwh, 0.0);
    }

    #[test]
    fn duplicate_dates_are_not_merged() {
        let outcomes = lossless(5.0).simulate(&[record(1, 0.0, 2.0), record(1, 0.0, 2.0)]);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].charge_end_kwh, 4.0);
    }

    #[test]
    fn surplus_beyond_capacity_stays_on_grid() {
        let outcomes = lossless(5.0).simulate(&[record(1, 0.0, 8.0)]);
        assert_eq!(outcomes[0].charged_kwh, 5.0);
        assert_eq!(outcomes[0].feed_after_kwh, 3.0);
    }

    #[test]
    fn losses_reduce_delivered_energy() {
        let engine = BatterySimulationEngine::new(
            SimulationParams::new(10.0, 10.0, 10.0).unwrap_or_else(|e| panic!("{e}")),
        );
        let outcomes = engine.simulate(&[record(1, 0.0, 5.0), record(2, 10.0, 0.0)]);
        // 5 kWh feed stores 4.5 kWh; 4.5 * 0.9 = 4.05 kWh delivered
        assert!((outcomes[0].charge_end_kwh - 4.5).abs() < 1e-9);
        assert!((outcomes[1].energy_saved_kwh() - 4.05).abs() < 1e-9);
        assert!((outcomes[1].discharged_kwh - 4.5).abs() < 1e-9);
        assert!(outcomes[1].charge_end_kwh.abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_no_outcomes() {
        assert!(lossless(5.0).simulate(&[]).is_empty());
    }

    #[test]
    fn simulate_rejects_bad_parameters_up_front() {
        assert!(simulate(&[record(1, 1.0, 1.0)], 0.0, 5.0, 5.0).is_err());
        assert!(simulate(&[record(1, 1.0, 1.0)], 5.0, 100.0, 5.0).is_err());
        assert!(simulate(&[record(1, 1.0, 1.0)], 5.0, 5.0, -1.0).is_err());
        assert!(simulate(&[record(1, 1.0, 1.0)], 5.0, 5.0, 5.0).is_ok());
    }
}
