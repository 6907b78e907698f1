// Entrypoint for `grafana-api`: one request against the Grafana HTTP API.
// Credentials come from GRAFANA_URL and GRAFANA_API_KEY.

use anyhow::Result;
use clap::Parser;
use projkit::api::{self, ApiClient, ApiRequest, HttpMethod, DEFAULT_CONTENT_TYPE};
use projkit::config::ApiConfig;
use projkit::{logging, output};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "grafana-api",
    version,
    about = "Grafana HTTP API helper (uses GRAFANA_URL + GRAFANA_API_KEY)."
)]
struct Cli {
    /// HTTP method
    #[arg(value_enum)]
    method: HttpMethod,
    /// API path, e.g. /api/health
    path: String,
    /// Query param in key=value form (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,
    /// Raw request body (string). Use --content-type to override.
    #[arg(long)]
    data: Option<String>,
    /// Path to a file to use as the request body.
    #[arg(long)]
    data_file: Option<PathBuf>,
    /// Content-Type for request body
    #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
    content_type: String,
    /// Print raw response instead of pretty JSON.
    #[arg(long)]
    raw: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };
    logging::init();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &ApiConfig) -> Result<()> {
    let query = api::parse_query(cli.query.as_slice())?;
    let url = api::build_url(&config.base_url, &cli.path, &query)?;
    let body = api::read_payload(cli.data.as_deref(), cli.data_file.as_deref())?;
    let request = ApiRequest {
        method: cli.method,
        url,
        body,
        content_type: cli.content_type.clone(),
    };

    let client = ApiClient::new(config)?;
    let response = client.send(&request)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&output::render_response(&response, cli.raw))?;
    stdout.flush()?;
    Ok(())
}
