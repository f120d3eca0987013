//! layered-fetch: send one request through a configured client.
//!
//! ```text
//! layered-fetch [-c client.toml] [-X POST] [-H "name: value"]... [-d body] URL
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use hyper::Method;

use layered_client::config::{load_config, ClientConfig};
use layered_client::observability::{logging, metrics};
use layered_client::{Client, Compose};

#[derive(Parser)]
#[command(name = "layered-fetch")]
#[command(about = "Send an HTTP request through a layered client", long_about = None)]
struct Cli {
    /// Absolute URL, or a path when the config sets base_url.
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Header as NAME:VALUE (repeatable).
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request body sent as text.
    #[arg(short = 'd', long)]
    data: Option<String>,

    /// Client configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides timeouts.request_ms from the config.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print response headers.
    #[arg(short = 'i', long)]
    include: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(ms) = cli.timeout_ms {
        config.timeouts.request_ms = ms;
    }

    logging::init(&config.observability.log_level);
    metrics::set_enabled(config.observability.metrics_enabled);

    let client = Client::from_config(&config)?;
    let method: Method = cli.method.to_ascii_uppercase().parse()?;

    let mut request = client.request().method(method).url(&cli.url);
    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("invalid header `{header}`, expected NAME:VALUE"))?;
        request = request.set_header(name.trim(), value.trim());
    }
    if let Some(data) = cli.data {
        request = request.body_text(data);
    }

    tracing::debug!(url = %cli.url, timeout = ?Duration::from_millis(config.timeouts.request_ms), "Sending request");
    let response = request.send().await?;

    println!("{}", response.status);
    if cli.include {
        for (name, value) in &response.headers {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
        println!();
    }
    println!("{}", String::from_utf8_lossy(&response.body));
    Ok(())
}
