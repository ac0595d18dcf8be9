//! Home battery payback calculator.
//!
//! Replays a household's daily energy export through a simulated battery
//! and derives how long the battery takes to pay for itself.

pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
pub mod io;
pub mod logging;
pub mod price;
pub mod record;
pub mod runner;
/// Battery simulation and amortization.
pub mod sim;
pub mod vendor;

pub use error::{Error, Result};
