use crate::data::bar::Bar;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

//accepted timestamp layouts, tried in order
const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "time",
        alias = "date",
        alias = "datetime",
        alias = "Date",
        alias = "DateTime"
    )]
    timestamp: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume")]
    volume: f64,
}

//parses a timestamp string against the accepted layouts
fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    anyhow::bail!("Unrecognized timestamp format: '{}'", raw)
}

//loads bars from a csv file
//header names are normalized: time/date/datetime and lower- or
//title-case ohlcv columns are all accepted
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.context(format!("Failed to parse CSV record at line {}", index + 2))?;

        //parse timestamp
        let timestamp = parse_timestamp(&record.timestamp).context(format!(
            "Failed to parse timestamp '{}' at line {}",
            record.timestamp,
            index + 2
        ))?;

        //create bar
        let bar = Bar::new_unchecked(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        );

        bars.push(bar);
    }

    //sort by timestamp to ensure chronological order
    bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    Ok(bars)
}
