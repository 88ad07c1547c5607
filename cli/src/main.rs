use std::{fs, path::Path, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt, fmt::MakeWriter, layer::SubscriberExt, prelude::*, EnvFilter,
};
use yahoo_history::{
    config::{Config, FetchRequest, RequestList},
    service::Service,
};

const DEFAULT_CONFIG: &str = "config.json";
const OUTPUT_DIR: &str = "historical_data";

/// CLI tool to download historical price data from Yahoo Finance
#[derive(Parser, Debug)]
struct Args {
    /// File path to a config file that lists the tickers and date ranges to
    /// download data for
    #[clap(short, long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(std::io::stdout);

    let requests = parse_config(&args.config)?;
    info!(
        num_requests = requests.len(),
        config = ?args.config,
        "Loaded fetch requests"
    );

    let output_dir = PathBuf::from(OUTPUT_DIR);
    fs::create_dir_all(&output_dir).with_context(|| {
        format!("Failed to create output directory: {OUTPUT_DIR}")
    })?;

    if requests.is_empty() {
        warn!("No fetch requests found in the configuration");
        return Ok(());
    }

    let config = Config {
        requests,
        output_dir,
    };
    let service = Service::new(config)?;
    let summary = service.run().await;
    info!(
        saved = summary.saved,
        empty = summary.empty,
        failed = summary.failed,
        "All data fetching tasks complete"
    );
    Ok(())
}

/// Configure the process-wide subscriber once, with an explicit destination.
fn init_logging<W>(writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn parse_config(path: &Path) -> Result<Vec<FetchRequest>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {:?}", path))?;

    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    let requests: Vec<FetchRequest> = match extension {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| "Failed to parse YAML")?,
        "toml" => {
            toml::from_str::<RequestList>(&contents)
                .with_context(|| "Failed to parse TOML")?
                .requests
        }
        "json" => serde_json::from_str(&contents)
            .with_context(|| "Failed to parse JSON")?,
        _ => {
            bail!("Unknown extension")
        }
    };
    validate(&requests)?;
    Ok(requests)
}

fn validate(requests: &[FetchRequest]) -> Result<()> {
    for (index, request) in requests.iter().enumerate() {
        for (field, value) in [
            ("ticker", &request.ticker),
            ("start_date", &request.start_date),
            ("end_date", &request.end_date),
        ] {
            if value.trim().is_empty() {
                bail!("Invalid request {index}: `{field}` must not be empty");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;
    use yahoo_history::types::Interval;

    use super::*;

    fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn json_config_preserves_order_and_fields() {
        let file = config_file(
            ".json",
            r#"[
                { "ticker": "BRK.B", "start_date": "2020-01-01", "end_date": "2020-12-31" },
                { "ticker": "AAPL", "start_date": "2021-01-01", "end_date": "2021-06-30", "interval": "1wk" }
            ]"#,
        );
        let requests = parse_config(file.path()).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].ticker, "BRK.B");
        assert_eq!(requests[0].start_date, "2020-01-01");
        assert_eq!(requests[0].end_date, "2020-12-31");
        assert_eq!(requests[0].interval, Interval::Day);
        assert_eq!(requests[1].ticker, "AAPL");
        assert_eq!(requests[1].interval, Interval::Week);
    }

    #[test]
    fn yaml_config_is_supported() {
        let file = config_file(
            ".yaml",
            "- ticker: MSFT\n  start_date: '2020-01-01'\n  end_date: '2020-02-01'\n",
        );
        let requests = parse_config(file.path()).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ticker, "MSFT");
    }

    #[test]
    fn toml_config_is_supported() {
        let file = config_file(
            ".toml",
            "[[requests]]\nticker = \"MSFT\"\nstart_date = \"2020-01-01\"\nend_date = \"2020-02-01\"\n",
        );
        let requests = parse_config(file.path()).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ticker, "MSFT");
    }

    #[test]
    fn duplicate_requests_are_kept() {
        let file = config_file(
            ".json",
            r#"[
                { "ticker": "AAPL", "start_date": "2020-01-01", "end_date": "2020-02-01" },
                { "ticker": "AAPL", "start_date": "2020-01-01", "end_date": "2020-02-01" }
            ]"#,
        );
        let requests = parse_config(file.path()).unwrap();
        assert_eq!(requests[0], requests[1]);
    }

    #[test]
    fn missing_field_fails_the_whole_load() {
        let file = config_file(
            ".json",
            r#"[
                { "ticker": "AAPL", "start_date": "2020-01-01", "end_date": "2020-02-01" },
                { "ticker": "MSFT", "start_date": "2020-01-01" }
            ]"#,
        );
        assert!(parse_config(file.path()).is_err());
    }

    #[test]
    fn blank_field_fails_the_whole_load() {
        let file = config_file(
            ".json",
            r#"[{ "ticker": " ", "start_date": "2020-01-01", "end_date": "2020-02-01" }]"#,
        );
        assert!(parse_config(file.path()).is_err());
    }

    #[test]
    fn non_list_config_is_rejected() {
        let file = config_file(
            ".json",
            r#"{ "ticker": "AAPL", "start_date": "2020-01-01", "end_date": "2020-02-01" }"#,
        );
        assert!(parse_config(file.path()).is_err());
    }

    #[test]
    fn invalid_json_is_rejected() {
        let file = config_file(".json", "[{");
        assert!(parse_config(file.path()).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = config_file(".ini", "[requests]");
        assert!(parse_config(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_config(Path::new("does-not-exist.json")).is_err());
    }

    #[test]
    fn empty_list_loads_successfully() {
        let file = config_file(".json", "[]");
        assert!(parse_config(file.path()).unwrap().is_empty());
    }
}
