//! CSV export for daily simulation outcomes.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::DailySimulationOutcome;

/// Column header for the daily outcome export.
const HEADER: &str = "date,charge_start_kwh,charge_end_kwh,discharged_kwh,charged_kwh,\
                      original_draw_kwh,draw_after_kwh,original_feed_kwh,feed_after_kwh";

/// Exports daily outcomes to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(outcomes: &[DailySimulationOutcome], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(outcomes, buf)
}

/// Writes daily outcomes as CSV to any writer.
///
/// Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(outcomes: &[DailySimulationOutcome], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for o in outcomes {
        wtr.write_record(&[
            o.date.format("%d.%m.%Y").to_string(),
            format!("{:.4}", o.charge_start_kwh),
            format!("{:.4}", o.charge_end_kwh),
            format!("{:.4}", o.discharged_kwh),
            format!("{:.4}", o.charged_kwh),
            format!("{:.4}", o.original_draw_kwh),
            format!("{:.4}", o.draw_after_kwh),
            format!("{:.4}", o.original_feed_kwh),
            format!("{:.4}", o.feed_after_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
