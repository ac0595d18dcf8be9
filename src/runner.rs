//! End-to-end calculation: ingest an export, simulate the battery and
//! compute its payback.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::CalculatorConfig;
use crate::error::{Error, Result};
use crate::io::mapping::ColumnMapping;
use crate::io::table::{parse_records, read_headers};
use crate::price::{PriceLookup, PriceSource};
use crate::record::EnergyRecord;
use crate::sim::amortization::{AmortizationResult, Tariff};
use crate::sim::engine::BatterySimulationEngine;
use crate::sim::types::SimulationParams;
use crate::vendor::{BatteryModel, Vendor};

/// Everything a calculation resolved along the way, plus its result.
#[derive(Debug)]
pub struct Calculation {
    pub vendor: Vendor,
    pub mapping: ColumnMapping,
    pub battery: BatteryModel,
    pub params: SimulationParams,
    pub records: Vec<EnergyRecord>,
    pub result: AmortizationResult,
}

/// Resolves the configured battery for the detected `vendor`.
///
/// A model is looked up only in the catalog of the vendor forced by
/// `input.vendor`; with auto-detection the detected vendor's catalog is
/// searched first, then every other one. A configured price always
/// replaces the catalog's.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] if no eligible catalog has the
/// model and [`Error::Config`] for an unknown forced vendor.
pub fn resolve_battery(config: &CalculatorConfig, vendor: Vendor) -> Result<BatteryModel> {
    let bat = &config.battery;
    let forced = config.vendor_override()?;
    let mut battery = match &bat.model {
        Some(name) => {
            let found = match forced {
                Some(forced) => forced.find_battery(name),
                None => vendor
                    .find_battery(name)
                    .or_else(|| Vendor::ALL.iter().find_map(|v| v.find_battery(name))),
            };
            found.ok_or_else(|| Error::InvalidParameter {
                field: "battery.model",
                message: format!("no catalog battery named \"{name}\""),
            })?
        }
        None => BatteryModel::custom("Custom", bat.capacity_kwh, None, None),
    };
    if bat.price.is_some() {
        battery.price = bat.price;
    }
    Ok(battery)
}

/// Runs a calculation over CSV `input` with the given price lookup.
///
/// # Arguments
///
/// * `config` - Validated calculation configuration
/// * `input` - Full text of the energy export
/// * `filename` - Name of the export, used as a vendor hint
/// * `prices` - Price lookup used when the configuration has no price
///
/// # Errors
///
/// Returns an error if the export cannot be parsed, the battery or its
/// price cannot be resolved, or the simulation parameters are invalid.
pub fn run_calculation_with<S: PriceSource>(
    config: &CalculatorConfig,
    input: &str,
    filename: Option<&str>,
    prices: &mut PriceLookup<S>,
) -> Result<Calculation> {
    let headers = read_headers(input.as_bytes())?;
    let vendor = match config.vendor_override()? {
        Some(vendor) => vendor,
        None => Vendor::detect(&headers, filename),
    };
    let mapping = ColumnMapping::detect(&headers).with_overrides(&config.columns);
    info!(%vendor, ?mapping, "input format resolved");

    let records = parse_records(input.as_bytes(), &mapping)?;

    let battery = resolve_battery(config, vendor)?;
    let price = prices
        .price_for(&battery)
        .ok_or_else(|| Error::UnknownBatteryPrice {
            model: battery.name.clone(),
        })?;

    let profile = vendor.profile();
    let params = SimulationParams::new(
        battery.capacity_kwh(),
        config
            .losses
            .charge_pct
            .unwrap_or(profile.charge_loss_pct),
        config
            .losses
            .discharge_pct
            .unwrap_or(profile.discharge_loss_pct),
    )?;
    info!(battery = %battery.name, price, ?params, "battery resolved");

    let outcomes = BatterySimulationEngine::new(params).simulate(&records);
    let tariff = Tariff::new(
        config.tariff.purchase_price_per_kwh,
        config.tariff.feed_price_per_kwh,
    );
    let result = AmortizationResult::calculate(outcomes, &records, &tariff, price);

    Ok(Calculation {
        vendor,
        mapping,
        battery,
        params,
        records,
        result,
    })
}

/// Runs a calculation over CSV `input` using the offline price lookup.
///
/// # Errors
///
/// See [`run_calculation_with`].
pub fn run_calculation(
    config: &CalculatorConfig,
    input: &str,
    filename: Option<&str>,
) -> Result<Calculation> {
    run_calculation_with(config, input, filename, &mut PriceLookup::default())
}

/// Reads the export at `path` and runs a calculation over it.
///
/// # Errors
///
/// Returns [`Error::Read`] if the file cannot be read, otherwise see
/// [`run_calculation_with`].
pub fn run_file(config: &CalculatorConfig, path: &Path) -> Result<Calculation> {
    let input = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path.file_name().and_then(|n| n.to_str());
    run_calculation(config, &input, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Datum und Uhrzeit,Gesamt Erzeugung,Gesamt Verbrauch,Eigenverbrauch,Energie ins Netz eingespeist,Energie vom Netz bezogen
[dd.MM.yyyy],[Wh],[Wh],[Wh],[Wh],[Wh]
01.06.2024,20000,12000,6000,14000,6000
02.06.2024,5000,15000,4000,1000,11000
";

    fn no_loss_config() -> CalculatorConfig {
        let mut cfg = CalculatorConfig::baseline();
        cfg.losses.charge_pct = Some(0.0);
        cfg.losses.discharge_pct = Some(0.0);
        cfg
    }

    #[test]
    fn detects_vendor_and_runs() {
        let calc = run_calculation(&no_loss_config(), EXPORT, None);
        let Ok(calc) = calc else {
            panic!("calculation should succeed: {:?}", calc.err());
        };
        assert_eq!(calc.vendor, Vendor::Fronius);
        assert_eq!(calc.records.len(), 2);
        assert_eq!(calc.result.simulation_days(), 2);

        // day 1 charges 10 kWh of the 14 kWh surplus, day 2 spends it all
        let d1 = &calc.result.daily[0];
        let d2 = &calc.result.daily[1];
        assert!((d1.charge_end_kwh - 10.0).abs() < 1e-9);
        assert!((d2.discharged_kwh - 10.0).abs() < 1e-9);
        assert!((d2.draw_after_kwh - 1.0).abs() < 1e-9);
    }

    #[test]
    fn forced_vendor_overrides_detection() {
        let mut cfg = no_loss_config();
        cfg.input.vendor = "custom".to_string();
        let calc = run_calculation(&cfg, EXPORT, Some("fronius.csv"));
        assert_eq!(calc.map(|c| c.vendor).ok(), Some(Vendor::Custom));
    }

    #[test]
    fn vendor_losses_apply_without_overrides() {
        let calc = run_calculation(&CalculatorConfig::baseline(), EXPORT, None);
        let params = calc.map(|c| c.params).ok();
        assert_eq!(params.map(|p| p.charge_loss_pct), Some(5.0));
        assert_eq!(params.map(|p| p.discharge_loss_pct), Some(5.0));
    }

    #[test]
    fn catalog_battery_without_price_fails_offline() {
        let cfg = CalculatorConfig::from_preset("fronius-hvs-7.7").unwrap_or_default();
        let err = run_calculation(&cfg, EXPORT, None);
        assert!(matches!(err, Err(Error::UnknownBatteryPrice { model }) if model == "HVS 7.7"));
    }

    #[test]
    fn configured_price_replaces_lookup() {
        let mut cfg = CalculatorConfig::from_preset("fronius-hvs-7.7").unwrap_or_default();
        cfg.battery.price = Some(5000.0);
        let calc = run_calculation(&cfg, EXPORT, None);
        let calc = calc.ok();
        assert_eq!(calc.as_ref().map(|c| c.result.battery_price), Some(5000.0));
        assert_eq!(calc.map(|c| c.battery.capacity_wh), Some(7_700.0));
    }

    #[test]
    fn deterministic_results() {
        let cfg = CalculatorConfig::baseline();
        let a = run_calculation(&cfg, EXPORT, None).map(|c| c.result.total_savings).ok();
        let b = run_calculation(&cfg, EXPORT, None).map(|c| c.result.total_savings).ok();
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_model_is_rejected() {
        let mut cfg = CalculatorConfig::baseline();
        cfg.battery.model = Some("Powerwall".to_string());
        assert!(matches!(
            resolve_battery(&cfg, Vendor::Fronius),
            Err(Error::InvalidParameter { field: "battery.model", .. })
        ));
    }

    #[test]
    fn forced_vendor_restricts_catalog_like_validation() {
        let mut cfg = CalculatorConfig::baseline();
        cfg.battery.model = Some("HVS 7.7".to_string());
        assert!(resolve_battery(&cfg, Vendor::Custom).is_ok());

        cfg.input.vendor = "custom".to_string();
        assert!(cfg.validate().iter().any(|e| e.field == "battery.model"));
        assert!(matches!(
            resolve_battery(&cfg, Vendor::Custom),
            Err(Error::InvalidParameter { field: "battery.model", .. })
        ));
        assert!(matches!(
            run_calculation(&cfg, EXPORT, None),
            Err(Error::InvalidParameter { field: "battery.model", .. })
        ));

        cfg.input.vendor = "fronius".to_string();
        assert!(cfg.validate().is_empty());
        let battery = resolve_battery(&cfg, Vendor::Fronius).ok();
        assert_eq!(battery.map(|b| b.capacity_wh), Some(7_700.0));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = run_file(&CalculatorConfig::baseline(), Path::new("/nonexistent/export.csv"));
        assert!(matches!(err, Err(Error::Read { .. })));
    }
}
