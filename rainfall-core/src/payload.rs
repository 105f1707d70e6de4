use thiserror::Error;
use tracing::warn;

use crate::model::ObservationRecord;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to read CSV header row")]
    Header(#[source] csv::Error),
}

/// One window's CSV response, decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    pub columns: Vec<String>,
    pub records: Vec<ObservationRecord>,
}

/// Decode a CSV observations payload.
///
/// Rows that cannot be decoded at all (e.g. broken quoting) are logged and
/// dropped; the remaining rows are returned in payload order.
pub fn parse_observations(body: &str) -> Result<ObservationTable, PayloadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let columns = reader
        .headers()
        .map_err(PayloadError::Header)?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut records = Vec::new();
    for row in reader.deserialize::<ObservationRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(err) => {
                let line = err.position().map(|p| p.line());
                warn!(?line, error = %err, "Skipping undecodable CSV row");
            }
        }
    }

    Ok(ObservationTable { columns, records })
}
