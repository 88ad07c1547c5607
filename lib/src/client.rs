use std::str::FromStr;

use chrono::NaiveTime;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, instrument};
use url::Url;

use crate::{
    error::{self, Error},
    types::{ChartResponse, HistoryRequest},
};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
// Yahoo rejects requests carrying reqwest's default user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new() -> Result<Self, error::Init> {
        Self::with_base_url(BASE_URL)
    }

    /// Build a client against a non-default endpoint, e.g. a mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, error::Init> {
        Url::parse(base_url)
            .map_err(|_| error::Init::InvalidBaseUrl(base_url.to_string()))?;
        let headers = HeaderMap::from_iter([
            (header::ACCEPT, HeaderValue::from_static("application/json")),
            (header::USER_AGENT, HeaderValue::from_static(USER_AGENT)),
        ]);
        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(error::Init::ClientInitialization)?;
        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip_all, err, fields(ticker = %request.ticker))]
    pub async fn get_history(
        &self,
        request: &HistoryRequest<'_>,
    ) -> Result<ChartResponse, Error> {
        let HistoryRequest {
            ticker,
            start,
            end,
            interval,
        } = request;
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        let mut url = Url::from_str(&format!(
            "{}/v8/finance/chart/{ticker}",
            self.base_url
        ))?;
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", &interval.to_string())
            .append_pair("events", "div,splits");

        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(Error::SendRequest)?;
        let status = response.status();
        let response: ChartResponse = response
            .error_for_status()
            .map_err(Error::UnexpectedStatus)?
            .json()
            .await
            .map_err(Error::Deserialization)?;
        if let Some(provider_error) = &response.chart.error {
            return Err(Error::Provider {
                code: provider_error.code.clone(),
                description: provider_error.description.clone(),
            });
        }
        debug!(status = %status, "Got chart response");
        Ok(response)
    }
}
