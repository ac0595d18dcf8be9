//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use battery_payback::record::EnergyRecord;
use battery_payback::sim::types::SimulationParams;
use chrono::{Days, NaiveDate};

/// First day of every generated series (2024-06-01).
pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default()
}

/// `start_date() + offset` days.
pub fn day(offset: u64) -> NaiveDate {
    start_date()
        .checked_add_days(Days::new(offset))
        .unwrap_or_default()
}

/// Record with the given grid feed and draw (kWh) and no other flows.
pub fn record(offset: u64, feed_kwh: f64, draw_kwh: f64) -> EnergyRecord {
    EnergyRecord::new(
        day(offset),
        0.0,
        0.0,
        0.0,
        feed_kwh * 1000.0,
        draw_kwh * 1000.0,
    )
}

/// Consecutive days built from `(feed_kwh, draw_kwh)` pairs.
pub fn records(days: &[(f64, f64)]) -> Vec<EnergyRecord> {
    days.iter()
        .enumerate()
        .map(|(i, &(feed, draw))| record(i as u64, feed, draw))
        .collect()
}

/// A summer month followed by a winter month: large surplus early, deficits later.
pub fn two_seasons() -> Vec<EnergyRecord> {
    (0..60)
        .map(|i| {
            if i < 30 {
                record(i, 12.0 + (i % 5) as f64, 3.0 + (i % 3) as f64)
            } else {
                record(i, 1.0 + (i % 2) as f64, 9.0 + (i % 4) as f64)
            }
        })
        .collect()
}

/// Default parameters (10 kWh, 5% charge and discharge loss).
pub fn default_params() -> SimulationParams {
    SimulationParams {
        capacity_kwh: 10.0,
        charge_loss_pct: 5.0,
        discharge_loss_pct: 5.0,
    }
}

/// Fronius Solar.web daily export with a units row.
pub const FRONIUS_EXPORT: &str = "\
Datum und Uhrzeit,Gesamt Erzeugung,Gesamt Verbrauch,Eigenverbrauch,Energie ins Netz eingespeist,Energie vom Netz bezogen
[dd.MM.yyyy],[Wh],[Wh],[Wh],[Wh],[Wh]
01.06.2024,21500,9800,4100,17400,5700
02.06.2024,18000,10200,3900,14100,6300
03.06.2024,6400,11800,3300,3100,8500
04.06.2024,3200,12500,2600,600,9900
";

/// A generic export whose columns need manual mapping for the grid flows.
pub const GENERIC_EXPORT: &str = "\
day,produced,used,out,in
2024-06-01,21500,9800,17400,5700
2024-06-02,3200,12500,600,9900
";
