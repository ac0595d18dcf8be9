//! Daily energy measurements as supplied by the ingestion layer.

use chrono::NaiveDate;
use serde::Serialize;

/// Watt-hours per kilowatt-hour.
pub const WH_PER_KWH: f64 = 1000.0;

/// One day of household energy measurements.
///
/// All quantities are stored in watt-hours, as exported by the inverter
/// portals. The `*_kwh` accessors are pure conversions.
///
/// # Examples
///
/// ```
/// use battery_payback::record::EnergyRecord;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let record = EnergyRecord::new(day, 21_500.0, 9_800.0, 4_100.0, 17_400.0, 5_700.0);
/// assert_eq!(record.fed_to_grid_kwh(), 17.4);
/// assert_eq!(record.drawn_from_grid_kwh(), 5.7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRecord {
    /// Calendar day of the measurement (time of day is discarded).
    pub date: NaiveDate,
    /// Total generation (Wh).
    pub total_generation_wh: f64,
    /// Total consumption (Wh).
    pub total_consumption_wh: f64,
    /// Generated energy consumed on site (Wh).
    pub self_consumption_wh: f64,
    /// Energy exported to the grid (Wh).
    pub fed_to_grid_wh: f64,
    /// Energy imported from the grid (Wh).
    pub drawn_from_grid_wh: f64,
}

impl EnergyRecord {
    pub fn new(
        date: NaiveDate,
        total_generation_wh: f64,
        total_consumption_wh: f64,
        self_consumption_wh: f64,
        fed_to_grid_wh: f64,
        drawn_from_grid_wh: f64,
    ) -> Self {
        Self {
            date,
            total_generation_wh,
            total_consumption_wh,
            self_consumption_wh,
            fed_to_grid_wh,
            drawn_from_grid_wh,
        }
    }

    pub fn total_generation_kwh(&self) -> f64 {
        self.total_generation_wh / WH_PER_KWH
    }

    pub fn total_consumption_kwh(&self) -> f64 {
        self.total_consumption_wh / WH_PER_KWH
    }

    pub fn self_consumption_kwh(&self) -> f64 {
        self.self_consumption_wh / WH_PER_KWH
    }

    pub fn fed_to_grid_kwh(&self) -> f64 {
        self.fed_to_grid_wh / WH_PER_KWH
    }

    pub fn drawn_from_grid_kwh(&self) -> f64 {
        self.drawn_from_grid_wh / WH_PER_KWH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kwh_view_round_trips_stored_wh() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default();
        let values = [0.0, 1.0, 999.0, 12_345.0, 4_000_000.0];
        for wh in values {
            let r = EnergyRecord::new(day, wh, wh, wh, wh, wh);
            assert_eq!(r.total_generation_kwh() * WH_PER_KWH, wh);
            assert_eq!(r.fed_to_grid_kwh() * WH_PER_KWH, wh);
            assert_eq!(r.drawn_from_grid_kwh() * WH_PER_KWH, wh);
            // the view never touches the stored quantity
            assert_eq!(r.drawn_from_grid_kwh(), r.drawn_from_grid_kwh());
            assert_eq!(r.drawn_from_grid_wh, wh);
        }
    }
}
