use crate::{
    parse_duration, Config, LineSink, Pipeline, PipelineOptions, RequestExecutor, RunSummary,
    Sinks,
};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "param-miner")]
#[command(about = "Extract fuzzable parameters from web pages and rebuild candidate URLs")]
#[command(version)]
pub struct Cli {
    #[arg(short = 'H', long = "header", help = "Custom header in the form 'key: value' (repeatable)")]
    pub headers: Vec<String>,

    #[arg(long, help = "HTTP proxy in the form 'http://127.0.0.1:8080'")]
    pub proxy: Option<String>,

    #[arg(short, long, help = "Output file for extracted parameters [default: extracted_params.txt]")]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Number of concurrent workers [default: 10]")]
    pub concurrency: Option<usize>,

    #[arg(short, long, value_parser = parse_duration, help = "HTTP request timeout, e.g. 30s, 500ms, 1m [default: 30s]")]
    pub timeout: Option<Duration>,

    #[arg(short, long, help = "Quiet mode (suppress non-output console messages)")]
    pub quiet: bool,

    #[arg(short, long, help = "Verbose mode (print extracted parameters)")]
    pub verbose: bool,

    #[arg(
        short = 'r',
        long = "follow-redirects",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Follow HTTP redirects; -r=false stops at the first redirect [default: true]"
    )]
    pub follow_redirects: Option<bool>,

    #[arg(long, help = "HTTP request method [default: GET]")]
    pub method: Option<String>,

    #[arg(long = "baseurl", help = "Base URL to prepend to input URLs")]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Input file containing URLs (one per line); stdin when omitted")]
    pub input: Option<PathBuf>,

    #[arg(short, long = "error-log", help = "Error log file; stderr when omitted")]
    pub error_log: Option<PathBuf>,

    #[arg(long, help = "Configuration file path (JSON)")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Override `config` with every option given on the command line.
    pub fn apply(&self, config: &mut Config) {
        if !self.headers.is_empty() {
            config.headers.extend(self.headers.iter().cloned());
        }
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.quiet {
            config.quiet = true;
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Some(follow) = self.follow_redirects {
            config.follow_redirects = follow;
        }
        if let Some(method) = &self.method {
            config.method = method.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(error_log) = &self.error_log {
            config.error_log = Some(error_log.clone());
        }
    }
}

/// Build the effective configuration: file (if any), then flags, then validation.
pub async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Error reading config file {}", config_path.display()))?;
        serde_json::from_str(&config_content)
            .with_context(|| format!("Error parsing config file {}", config_path.display()))?
    } else {
        Config::default()
    };

    args.apply(&mut config);
    config.validate()?;

    Ok(config)
}

pub struct CliRunner {
    pub config: Config,
}

impl CliRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Open the sinks and input, then run the pipeline to completion.
    ///
    /// Failing to create the output or error log file aborts before any URL
    /// is fetched.
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let config = &self.config;

        let output = LineSink::create(&config.output)
            .await
            .with_context(|| format!("Error creating output file {}", config.output.display()))?;

        let errors = match &config.error_log {
            Some(path) => LineSink::create(path)
                .await
                .with_context(|| format!("Error creating error log file {}", path.display()))?,
            None => LineSink::stderr(),
        };

        let sinks = Sinks {
            output,
            errors,
            console: LineSink::stdout(),
        };

        let fetcher = Arc::new(RequestExecutor::new(Arc::new(config.request_config())));
        let pipeline = Pipeline::new(fetcher, PipelineOptions::from(config), sinks);

        let summary = match &config.input {
            Some(path) => {
                let file = fs::File::open(path)
                    .await
                    .with_context(|| format!("Error opening input file {}", path.display()))?;
                info!("Reading URLs from {}", path.display());
                pipeline.run(BufReader::new(file)).await
            }
            None => {
                info!("Reading URLs from stdin");
                pipeline.run(BufReader::new(tokio::io::stdin())).await
            }
        }
        .context("Error reading input")?;

        info!("Results written to {}", config.output.display());
        Ok(summary)
    }
}

pub fn setup_logging(verbose: bool, quiet: bool) -> anyhow::Result<()> {
    let level = if quiet {
        tracing::Level::ERROR
    } else if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
