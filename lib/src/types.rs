use chrono::{DateTime, NaiveDate};
use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The width of each candle returned by the chart endpoint.
#[derive(
    Debug,
    Default,
    Deserialize,
    Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
)]
pub enum Interval {
    #[default]
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    Day,
    #[serde(rename = "1wk")]
    #[strum(serialize = "1wk")]
    Week,
    #[serde(rename = "1mo")]
    #[strum(serialize = "1mo")]
    Month,
}

#[derive(Builder)]
pub struct HistoryRequest<'a> {
    pub(crate) ticker: &'a str,
    /// Inclusive start of the range.
    pub(crate) start: NaiveDate,
    /// Exclusive end of the range.
    pub(crate) end: NaiveDate,
    #[builder(default)]
    pub(crate) interval: Interval,
}

/// One date-indexed row of the downloaded history, serialized to CSV with the
/// provider's native column headers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HistoryRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Decimal,
    #[serde(rename = "High")]
    pub high: Decimal,
    #[serde(rename = "Low")]
    pub low: Decimal,
    #[serde(rename = "Close")]
    pub close: Decimal,
    /// Close adjusted for splits and dividends. Absent for some instruments.
    #[serde(rename = "Adj Close")]
    pub adj_close: Option<Decimal>,
    #[serde(rename = "Volume")]
    pub volume: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ProviderError>,
}

/// The error object Yahoo embeds in the body instead of always using an HTTP
/// error status.
#[derive(Debug, Deserialize)]
pub struct ProviderError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Unix second timestamps for the start of each candle.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteBlock>,
    #[serde(default)]
    pub adjclose: Vec<AdjCloseBlock>,
}

/// Parallel arrays aligned with `ChartResult::timestamp`. Entries are null for
/// sessions the provider has no data for.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteBlock {
    #[serde(default)]
    pub open: Vec<Option<Decimal>>,
    #[serde(default)]
    pub high: Vec<Option<Decimal>>,
    #[serde(default)]
    pub low: Vec<Option<Decimal>>,
    #[serde(default)]
    pub close: Vec<Option<Decimal>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
pub struct AdjCloseBlock {
    #[serde(default)]
    pub adjclose: Vec<Option<Decimal>>,
}

impl ChartResponse {
    /// Flatten the chart payload into date-indexed rows. Rows with any null
    /// OHLC value are dropped, matching the provider's own CSV export.
    pub fn records(self) -> Vec<HistoryRecord> {
        self.chart
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(ChartResult::into_records)
            .unwrap_or_default()
    }
}

impl ChartResult {
    fn into_records(self) -> Vec<HistoryRecord> {
        let quote = self.indicators.quote.into_iter().next().unwrap_or_default();
        let adjclose = self
            .indicators
            .adjclose
            .into_iter()
            .next()
            .map(|block| block.adjclose)
            .unwrap_or_default();

        self.timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(HistoryRecord {
                    date,
                    open: quote.open.get(i).copied().flatten()?,
                    high: quote.high.get(i).copied().flatten()?,
                    low: quote.low.get(i).copied().flatten()?,
                    close: quote.close.get(i).copied().flatten()?,
                    adj_close: adjclose.get(i).copied().flatten(),
                    volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
                })
            })
            .collect()
    }
}
