use std::{fs::File, path::PathBuf};

use chrono::NaiveDate;
use csv::WriterBuilder;
use tracing::{error, info, instrument, warn};

use crate::{
    client::Client,
    config::{Config, FetchRequest},
    error::{self, Error},
    types::HistoryRequestBuilder,
};

/// The result of processing a single fetch request. An `Empty` range is a
/// no-op, not an error; a `Failed` request never aborts the batch.
#[derive(Debug)]
pub enum FetchOutcome {
    Saved { rows: usize, path: PathBuf },
    Empty,
    Failed(Error),
}

/// Tallies for one full pass over the configured requests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub empty: usize,
    pub failed: usize,
}

pub struct Service {
    client: Client,
    config: Config,
}

impl Service {
    pub fn new(config: Config) -> Result<Self, Error> {
        let client = Client::new()?;
        Ok(Self { client, config })
    }

    pub fn with_client(config: Config, client: Client) -> Self {
        Self { client, config }
    }

    /// Process every configured request in order, one at a time. Per-item
    /// failures are logged and counted, never propagated.
    #[instrument(skip_all)]
    pub async fn run(&self) -> BatchSummary {
        info!(
            num_requests = self.config.requests.len(),
            output_dir = ?self.config.output_dir,
            "Starting to fetch data..."
        );

        let mut summary = BatchSummary::default();
        for request in &self.config.requests {
            info!(
                ticker = %request.ticker,
                start = %request.start_date,
                end = %request.end_date,
                "Fetching data for ticker"
            );
            match self.fetch_and_save(request).await {
                FetchOutcome::Saved { rows, path } => {
                    info!(ticker = %request.ticker, rows, path = ?path, "Saved data");
                    summary.saved += 1;
                }
                FetchOutcome::Empty => {
                    warn!(ticker = %request.ticker, "No data found in the given date range");
                    summary.empty += 1;
                }
                FetchOutcome::Failed(e) => {
                    error!(error = %e, ticker = %request.ticker, "Failed to fetch or save data");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Fetch one request and write the rows to disk, folding every error into
    /// the returned outcome.
    #[instrument(skip_all, fields(ticker = %request.ticker))]
    pub async fn fetch_and_save(&self, request: &FetchRequest) -> FetchOutcome {
        match self.try_fetch_and_save(request).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    async fn try_fetch_and_save(
        &self,
        request: &FetchRequest,
    ) -> Result<FetchOutcome, Error> {
        let start = request.start_date.parse::<NaiveDate>()?;
        let end = request.end_date.parse::<NaiveDate>()?;
        let history_request = HistoryRequestBuilder::default()
            .ticker(&request.ticker)
            .start(start)
            .end(end)
            .interval(request.interval)
            .build()?;

        let response = self.client.get_history(&history_request).await?;
        let records = response.records();
        if records.is_empty() {
            return Ok(FetchOutcome::Empty);
        }

        let path = self.config.output_dir.join(output_filename(request));
        let file = File::create(&path).map_err(error::FileIo::CreateFile)?;
        let mut writer = WriterBuilder::new().from_writer(file);
        for record in &records {
            writer.serialize(record).map_err(error::FileIo::Csv)?;
        }
        writer.flush().map_err(error::FileIo::FileWrite)?;

        Ok(FetchOutcome::Saved {
            rows: records.len(),
            path,
        })
    }
}

/// Replace any character that is invalid in a filename with an underscore.
pub fn sanitize_ticker(ticker: &str) -> String {
    ticker
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn output_filename(request: &FetchRequest) -> String {
    format!(
        "{}_{}_to_{}.csv",
        sanitize_ticker(&request.ticker),
        request.start_date,
        request.end_date
    )
}
