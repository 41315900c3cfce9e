//! Tabular export of a level result.

use std::borrow::Cow;
use std::io::Write;

use crate::error::{LevelnetError, LevelnetResult};
use crate::trace::LevelResult;

/// Writes `result` as CSV: a `time,<ids...>` header, then one row per time
/// index. A cell is empty where the level is unavailable.
///
/// # Errors
///
/// Returns an internal error if writing fails.
pub fn write_csv<W: Write>(result: &LevelResult, mut out: W) -> LevelnetResult<()> {
    let ids = result.reactant_ids();
    let io = |e: std::io::Error| LevelnetError::internal(format!("write csv: {e}"));

    let mut header = String::from("time");
    for id in &ids {
        header.push(',');
        header.push_str(&quote(id.as_str()));
    }
    writeln!(out, "{header}").map_err(io)?;

    for time in result.time_indices() {
        let mut row = time.to_string();
        for id in &ids {
            row.push(',');
            if let Some(level) = result.concentration_if_available(id.as_str(), time) {
                row.push_str(&level.to_string());
            }
        }
        writeln!(out, "{row}").map_err(io)?;
    }
    out.flush().map_err(io)
}

/// Quotes a field that holds a separator, a quote or a line break,
/// doubling embedded quotes.
fn quote(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
