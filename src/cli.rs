use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub input: Option<PathBuf>,
    pub vendor: Option<String>,
    pub price: Option<f64>,
    pub export: Option<PathBuf>,
    pub json: bool,
    pub verbosity: u8,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut preset = None;
    let mut input = None;
    let mut vendor = None;
    let mut price = None;
    let mut export = None;
    let mut json = false;
    let mut verbosity = 0u8;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--input" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --input (expected a CSV file path)")?;
                if input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--vendor" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --vendor (expected auto, fronius or custom)",
                )?;
                if vendor.replace(name.to_string()).is_some() {
                    return Err("--vendor provided more than once".to_string());
                }
            }
            "--price" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --price (expected a number)")?;
                let parsed = value
                    .parse::<f64>()
                    .map_err(|_| format!("--price value \"{value}\" is not a valid number"))?;
                if price.replace(parsed).is_some() {
                    return Err("--price provided more than once".to_string());
                }
            }
            "--export" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --export (expected a file path)")?;
                if export.replace(PathBuf::from(path)).is_some() {
                    return Err("--export provided more than once".to_string());
                }
            }
            "--json" => json = true,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if config.is_some() && preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if config.is_none() && preset.is_none() {
        preset = Some("baseline".to_string());
    }

    Ok(CliOptions {
        config,
        preset,
        input,
        vendor,
        price,
        export,
        json,
        verbosity,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("battery-payback: estimate the payback period of a home battery");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  battery-payback [--config <path> | --preset <name>] [--input <csv>] [--vendor <auto|fronius|custom>]"
    );
    eprintln!("                  [--price <amount>] [--export <path>] [--json] [-v]...");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
    eprintln!("--input, --vendor and --price override the corresponding config values.");
}
