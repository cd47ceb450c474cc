use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use friendly_curl::{
    url_parameters, ClientConfig, FriendlyCurl, HttpMethod, RequestOptions, ResponseHead, Upload,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fcurl")]
#[command(about = "Fetch a URL through friendly-curl", long_about = None)]
struct Cli {
    url: String,

    /// GET, HEAD, POST, PUT or DELETE
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Extra request header, `Name: value`
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter, `key=value`
    #[arg(short = 'q', long = "query")]
    query: Vec<String>,

    /// Inline request body
    #[arg(short, long, conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    data_file: Option<PathBuf>,

    #[arg(long)]
    content_type: Option<String>,

    /// Accept self-signed certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Do not follow redirects
    #[arg(long)]
    no_location: bool,

    /// Log the transfer at debug level
    #[arg(short, long)]
    verbose: bool,

    /// TOML client configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the response head before the body
    #[arg(short, long)]
    include: bool,

    /// Print the response head as JSON and skip the body
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "friendly_curl=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let mut curl = FriendlyCurl::with_config(config);

    let opts = request_options(&cli)?;

    let mut query = Vec::new();
    for pair in &cli.query {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("query parameter {pair:?} is not `key=value`"))?;
        query.push((key, value));
    }
    let url = url_parameters(&cli.url, query);

    let mut file = match &cli.data_file {
        Some(path) => Some(File::open(path)?),
        None => None,
    };
    let upload = match (&cli.data, file.as_mut()) {
        (Some(data), _) => Some(Upload::bytes(data.as_bytes())),
        (None, Some(file)) => Some(Upload::file(file, None)?),
        (None, None) => None,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    // With -i or --json the head has to come first, so the body waits.
    let streaming = !cli.include && !cli.json;
    let mut buffered = Vec::new();
    let head = {
        let sink: &mut dyn Write = if streaming { &mut out } else { &mut buffered };
        match HttpMethod::parse(&cli.method.to_ascii_uppercase()) {
            HttpMethod::Get => curl.get_url_into(&url, &opts, sink)?,
            HttpMethod::Head => curl.head_url(&url, &opts)?,
            HttpMethod::Post => {
                let upload = upload.unwrap_or_else(|| Upload::bytes(b""));
                curl.post_url_into(&url, upload, &opts, sink)?
            }
            HttpMethod::Put => {
                let response = curl.put_url(&url, upload.unwrap_or_else(|| Upload::bytes(b"")), &opts)?;
                sink.write_all(&response.body)?;
                response.head
            }
            HttpMethod::Delete => {
                let response = curl.delete_url(&url, &opts)?;
                sink.write_all(&response.body)?;
                response.head
            }
            HttpMethod::Custom(method) => return Err(format!("unsupported method {method}").into()),
        }
    };

    if cli.json {
        serde_json::to_writer_pretty(&mut out, &head)?;
        writeln!(out)?;
        return Ok(());
    }
    if cli.include {
        print_head(&mut out, &head)?;
        out.write_all(&buffered)?;
    }
    out.flush()?;
    Ok(())
}

/// Switches are only overridden when their flag is given, so the config
/// file decides otherwise.
fn request_options(cli: &Cli) -> Result<RequestOptions, String> {
    let mut opts = RequestOptions::new();
    if cli.insecure {
        opts = opts.accept_self_signed(true);
    }
    if cli.no_location {
        opts = opts.follow_location(false);
    }
    if cli.verbose {
        opts = opts.debug(true);
    }
    for header in &cli.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header {header:?} is not `Name: value`"))?;
        opts = opts.header(name.trim(), value.trim());
    }
    if let Some(content_type) = &cli.content_type {
        opts = opts.content_type(content_type.clone());
    }
    Ok(opts)
}

fn print_head(out: &mut impl Write, head: &ResponseHead) -> io::Result<()> {
    writeln!(out, "status: {}", head.status)?;
    for (name, value) in &head.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)
}
