use std::path::PathBuf;

use serde::Deserialize;

use crate::types::Interval;

/// One (ticker, date range) tuple describing a single download task.
///
/// The date strings are kept verbatim. They name the output file exactly as
/// written in the config; only the fetch itself parses them as dates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FetchRequest {
    /// Instrument symbol understood by the provider, e.g. `AAPL` or `BRK.B`.
    pub ticker: String,
    /// Inclusive start of the range, `YYYY-MM-DD`.
    pub start_date: String,
    /// Exclusive end of the range, `YYYY-MM-DD`.
    pub end_date: String,
    /// Candle width for the downloaded rows.
    #[serde(default)]
    pub interval: Interval,
}

/// Wrapper for config formats that cannot express a top-level list (TOML).
#[derive(Deserialize, Clone)]
pub struct RequestList {
    pub requests: Vec<FetchRequest>,
}

#[derive(Clone)]
pub struct Config {
    /// The download tasks, processed sequentially in order.
    pub requests: Vec<FetchRequest>,
    /// The folder to save the results. One CSV per successful request,
    /// named `$ticker_$start_to_$end.csv`. Must already exist.
    pub output_dir: PathBuf,
}
