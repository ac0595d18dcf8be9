//! TOML-based calculation configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::io::mapping::ColumnMapping;
use crate::vendor::Vendor;

/// Top-level calculation configuration parsed from TOML.
///
/// All fields have defaults matching the baseline calculation. Load from
/// TOML with [`CalculatorConfig::from_toml_file`] or use
/// [`CalculatorConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculatorConfig {
    /// Energy export location and format.
    #[serde(default)]
    pub input: InputConfig,
    /// Battery selection and purchase price.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Overrides of the vendor's default loss percentages.
    #[serde(default)]
    pub losses: LossConfig,
    /// Grid prices.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Manual column indices, replacing the detected ones role by role.
    #[serde(default)]
    pub columns: ColumnMapping,
}

/// Energy export location and format.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Path of the CSV export.
    pub path: Option<PathBuf>,
    /// `"auto"` to detect from the file, or `"fronius"` / `"custom"`.
    pub vendor: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            vendor: "auto".to_string(),
        }
    }
}

/// Battery selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Catalog model name (e.g. `"HVS 10.2"`); `capacity_kwh` applies when unset.
    pub model: Option<String>,
    /// Usable capacity of a custom battery (kWh).
    pub capacity_kwh: f64,
    /// Purchase price; when unset the price is looked up for catalog models.
    pub price: Option<f64>,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            model: None,
            capacity_kwh: 10.0,
            price: Some(6000.0),
        }
    }
}

/// Loss percentages in `[0, 100)`; unset values use the vendor defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossConfig {
    pub charge_pct: Option<f64>,
    pub discharge_pct: Option<f64>,
}

/// Grid prices per kWh.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Price paid for energy drawn from the grid.
    pub purchase_price_per_kwh: f64,
    /// Compensation received for energy fed into the grid.
    pub feed_price_per_kwh: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            purchase_price_per_kwh: 0.30,
            feed_price_per_kwh: 0.08,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl CalculatorConfig {
    /// Returns the baseline calculation: a 10 kWh custom battery at 6000.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// A Fronius catalog battery with vendor losses and a looked-up price.
    fn fronius(model: &str) -> Self {
        Self {
            input: InputConfig {
                vendor: "fronius".to_string(),
                ..InputConfig::default()
            },
            battery: BatteryConfig {
                model: Some(model.to_string()),
                price: None,
                ..BatteryConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &[
        "baseline",
        "fronius-hvs-5.1",
        "fronius-hvs-7.7",
        "fronius-hvs-10.2",
        "fronius-hvs-12.8",
    ];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "fronius-hvs-5.1" => Ok(Self::fronius("HVS 5.1")),
            "fronius-hvs-7.7" => Ok(Self::fronius("HVS 7.7")),
            "fronius-hvs-10.2" => Ok(Self::fronius("HVS 10.2")),
            "fronius-hvs-12.8" => Ok(Self::fronius("HVS 12.8")),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// The vendor forced by `input.vendor`, or `None` to auto-detect.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown vendor name.
    pub fn vendor_override(&self) -> Result<Option<Vendor>, ConfigError> {
        match self.input.vendor.trim() {
            v if v.eq_ignore_ascii_case("auto") => Ok(None),
            v => v.parse().map(Some).map_err(|message| ConfigError {
                field: "input.vendor".into(),
                message,
            }),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let vendor = match self.vendor_override() {
            Ok(v) => v,
            Err(e) => {
                errors.push(e);
                None
            }
        };

        let bat = &self.battery;
        match &bat.model {
            Some(model) => {
                let known = match vendor {
                    Some(v) => v.find_battery(model).is_some(),
                    None => Vendor::ALL.iter().any(|v| v.find_battery(model).is_some()),
                };
                if !known {
                    errors.push(ConfigError {
                        field: "battery.model".into(),
                        message: format!("no catalog battery named \"{model}\""),
                    });
                }
            }
            None => {
                if !bat.capacity_kwh.is_finite() || bat.capacity_kwh <= 0.0 {
                    errors.push(ConfigError {
                        field: "battery.capacity_kwh".into(),
                        message: "must be > 0".into(),
                    });
                }
            }
        }
        if bat.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            errors.push(ConfigError {
                field: "battery.price".into(),
                message: "must be >= 0".into(),
            });
        }

        for (field, pct) in [
            ("losses.charge_pct", self.losses.charge_pct),
            ("losses.discharge_pct", self.losses.discharge_pct),
        ] {
            if pct.is_some_and(|p| !(0.0..100.0).contains(&p)) {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be in [0.0, 100.0)".into(),
                });
            }
        }

        let t = &self.tariff;
        for (field, price) in [
            ("tariff.purchase_price_per_kwh", t.purchase_price_per_kwh),
            ("tariff.feed_price_per_kwh", t.feed_price_per_kwh),
        ] {
            if !price.is_finite() || price < 0.0 {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be >= 0".into(),
                });
            }
        }

        errors
    }
}
