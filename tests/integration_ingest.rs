//! End-to-end tests from CSV text and TOML config to an amortization result.

mod common;

use std::fs;

use battery_payback::Error;
use battery_payback::config::CalculatorConfig;
use battery_payback::io::export::write_csv;
use battery_payback::runner::{run_calculation, run_file};
use battery_payback::vendor::Vendor;

#[test]
fn fronius_export_runs_with_vendor_defaults() {
    let calc = run_calculation(&CalculatorConfig::baseline(), common::FRONIUS_EXPORT, None);
    let Ok(calc) = calc else {
        panic!("calculation should succeed: {:?}", calc.err());
    };
    assert_eq!(calc.vendor, Vendor::Fronius);
    assert!(calc.mapping.is_valid());
    assert_eq!(calc.mapping.self_consumption, Some(3));
    assert_eq!(calc.records.len(), 4);
    assert_eq!(calc.params.charge_loss_pct, 5.0);
    assert_eq!(calc.result.simulation_days(), 4);
    assert_eq!(calc.result.unmatched_days, 0);
    assert_eq!(calc.result.battery_price, 6000.0);
    assert!(calc.result.total_savings > 0.0);
}

#[test]
fn generic_export_needs_manual_columns() {
    let cfg = CalculatorConfig::baseline();
    let err = run_calculation(&cfg, common::GENERIC_EXPORT, None);
    assert!(matches!(err, Err(Error::InvalidMapping { .. })));

    let toml = r#"
[battery]
capacity_kwh = 5.0
price = 3000.0

[losses]
charge_pct = 0.0
discharge_pct = 0.0

[columns]
date = 0
total_generation = 1
total_consumption = 2
fed_to_grid = 3
drawn_from_grid = 4
"#;
    let cfg = CalculatorConfig::from_toml_str(toml).unwrap_or_default();
    assert!(cfg.validate().is_empty());
    let calc = run_calculation(&cfg, common::GENERIC_EXPORT, Some("export.csv")).ok();
    assert_eq!(calc.as_ref().map(|c| c.vendor), Some(Vendor::Custom));

    // day 1 fills 5 kWh from 17.4 kWh feed, day 2 covers 5 of 9.9 kWh draw
    let daily = calc.map(|c| c.result.daily).unwrap_or_default();
    assert_eq!(daily.len(), 2);
    assert!((daily[0].charge_end_kwh - 5.0).abs() < 1e-9);
    assert!((daily[1].draw_after_kwh - 4.9).abs() < 1e-9);
}

#[test]
fn filename_hint_selects_vendor() {
    let mut cfg = CalculatorConfig::baseline();
    cfg.columns.date = Some(0);
    cfg.columns.total_generation = Some(1);
    cfg.columns.total_consumption = Some(2);
    cfg.columns.fed_to_grid = Some(3);
    cfg.columns.drawn_from_grid = Some(4);
    let calc = run_calculation(&cfg, common::GENERIC_EXPORT, Some("Fronius_2024.csv"));
    assert_eq!(calc.map(|c| c.vendor).ok(), Some(Vendor::Fronius));
}

#[test]
fn structural_errors_abort() {
    let cfg = CalculatorConfig::baseline();
    assert!(matches!(
        run_calculation(&cfg, "", None),
        Err(Error::MissingHeader)
    ));
    let header_only = common::FRONIUS_EXPORT.lines().take(2).collect::<Vec<_>>().join("\n");
    assert!(matches!(
        run_calculation(&cfg, &header_only, None),
        Err(Error::NoValidRows)
    ));
}

#[test]
fn file_based_config_and_input() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let csv_path = dir.path().join("solarweb_daily.csv");
    fs::write(&csv_path, common::FRONIUS_EXPORT).expect("write csv");
    let cfg_path = dir.path().join("payback.toml");
    fs::write(
        &cfg_path,
        format!(
            "[input]\npath = {:?}\n\n[battery]\nmodel = \"HVS 5.1\"\nprice = 4100.0\n",
            csv_path.display().to_string()
        ),
    )
    .expect("write config");

    let cfg = CalculatorConfig::from_toml_file(&cfg_path).expect("config should parse");
    assert!(cfg.validate().is_empty());
    let input = cfg.input.path.clone().expect("input path set");
    let calc = run_file(&cfg, &input).expect("calculation should succeed");

    assert_eq!(calc.vendor, Vendor::Fronius);
    assert_eq!(calc.battery.name, "HVS 5.1");
    assert!((calc.params.capacity_kwh - 5.1).abs() < 1e-9);
    assert_eq!(calc.result.battery_price, 4100.0);
}

#[test]
fn exported_outcomes_match_result() {
    let calc = run_calculation(&CalculatorConfig::baseline(), common::FRONIUS_EXPORT, None)
        .expect("calculation should succeed");
    let mut buf = Vec::new();
    write_csv(&calc.result.daily, &mut buf).expect("write csv");
    let text = String::from_utf8(buf).expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("01.06.2024,0.0000,"));
}

#[test]
fn result_serializes_to_json() {
    let calc = run_calculation(&CalculatorConfig::baseline(), common::FRONIUS_EXPORT, None)
        .expect("calculation should succeed");
    let json = serde_json::to_value(&calc.result).expect("serialize");
    assert_eq!(json["daily"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["battery_price"].as_f64(), Some(6000.0));
    assert_eq!(json["unmatched_days"].as_u64(), Some(0));
}

#[test]
fn non_finite_cells_keep_savings_finite() {
    let csv = "\
Datum und Uhrzeit,Gesamt Erzeugung,Gesamt Verbrauch,Eigenverbrauch,Energie ins Netz eingespeist,Energie vom Netz bezogen
01.06.2024,21500,9800,4100,17400,5700
02.06.2024,1,2,NaN,inf,3
03.06.2024,6400,11800,3300,infinity,8500
";
    let calc = run_calculation(&CalculatorConfig::baseline(), csv, None)
        .expect("calculation should succeed");
    assert_eq!(calc.records.len(), 3);
    assert!(calc.records.iter().all(|r| r.fed_to_grid_wh.is_finite()
        && r.self_consumption_wh.is_finite()));
    for o in &calc.result.daily {
        assert!(o.charged_kwh <= o.original_feed_kwh + 1e-9, "{o}");
    }
    assert!(calc.result.total_savings.is_finite());
    assert!(calc.result.annual_savings.is_finite());
}
