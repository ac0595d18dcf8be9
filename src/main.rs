//! Battery payback calculator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;

use battery_payback::cli::{self, CliOptions};
use battery_payback::config::CalculatorConfig;
use battery_payback::io::export::export_csv;
use battery_payback::logging;
use battery_payback::runner::run_file;

fn load_config(cli: &CliOptions) -> CalculatorConfig {
    // --config takes priority, then --preset
    let loaded = if let Some(ref path) = cli.config {
        CalculatorConfig::from_toml_file(path)
    } else {
        CalculatorConfig::from_preset(cli.preset.as_deref().unwrap_or("baseline"))
    };
    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    if let Some(ref input) = cli.input {
        config.input.path = Some(input.clone());
    }
    if let Some(ref vendor) = cli.vendor {
        config.input.vendor = vendor.clone();
    }
    if let Some(price) = cli.price {
        config.battery.price = Some(price);
    }
    config
}

fn main() {
    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    logging::init(cli.verbosity);

    let config = load_config(&cli);

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let Some(ref input) = config.input.path else {
        eprintln!("error: no input file, pass --input or set input.path");
        process::exit(1);
    };

    let calculation = match run_file(&config, input) {
        Ok(calc) => calc,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        match calculation.result.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize result: {e}");
                process::exit(1);
            }
        }
    } else {
        println!(
            "Vendor: {}  Battery: {} ({:.1} kWh)",
            calculation.vendor,
            calculation.battery.name,
            calculation.battery.capacity_kwh()
        );
        println!("{}", calculation.result);
    }

    if let Some(ref path) = cli.export {
        if let Err(e) = export_csv(&calculation.result.daily, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Daily outcomes written to {}", path.display());
    }
}
