//! Bounded worker pool turning a stream of URLs into rewritten URLs
//!
//! A single producer feeds input lines into a bounded channel; a fixed set of
//! workers share the receiving end. Each worker fetches, extracts and
//! rewrites one URL at a time and reports through the shared sinks.

use crate::{
    format_error_line, rewrite, Config, Fetcher, LineSink, Metrics, Outcome, ParameterExtractor,
    ParameterMap, ProcessError, RunSummary,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

/// Reporting and sizing options of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub concurrency: usize,
    pub quiet: bool,
    pub verbose: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            quiet: config.quiet,
            verbose: config.verbose,
        }
    }
}

/// Destinations of a run.
pub struct Sinks {
    /// Machine-facing: one rewritten URL per line.
    pub output: LineSink,
    /// One line per failed URL.
    pub errors: LineSink,
    /// Human-facing verbose listing.
    pub console: LineSink,
}

/// What processing one URL produced, before it is reported.
#[derive(Debug)]
pub enum ProcessingResult {
    Rewritten {
        url: String,
        rewritten: String,
        params: ParameterMap,
    },
    NoParameters {
        url: String,
    },
    Failed {
        url: String,
        error: ProcessError,
    },
}

struct Shared {
    fetcher: Arc<dyn Fetcher>,
    options: PipelineOptions,
    sinks: Sinks,
    metrics: Metrics,
}

pub struct ParamWorker {
    id: usize,
    extractor: ParameterExtractor,
    shared: Arc<Shared>,
}

impl ParamWorker {
    fn new(id: usize, shared: Arc<Shared>) -> Self {
        Self {
            id,
            extractor: ParameterExtractor::new(),
            shared,
        }
    }

    async fn run_with_shared_receiver(&self, urls: Arc<Mutex<mpsc::Receiver<String>>>) {
        debug!("Starting worker {}", self.id);

        loop {
            let url = {
                let mut receiver = urls.lock().await;
                receiver.recv().await
            };

            match url {
                Some(url) => {
                    let result = self.process(url).await;
                    let outcome = self.report(result).await;
                    self.shared.metrics.record_outcome(outcome);
                }
                None => break,
            }
        }

        debug!("Worker {} stopped", self.id);
    }

    /// Fetch, extract and rewrite one URL.
    pub async fn process(&self, url: String) -> ProcessingResult {
        debug!("Worker {} processing {}", self.id, url);

        let body = match self.shared.fetcher.fetch(&url).await {
            Ok(body) => body,
            Err(e) => {
                return ProcessingResult::Failed {
                    url,
                    error: e.into(),
                }
            }
        };

        let params = self.extractor.extract(&String::from_utf8_lossy(&body));
        if params.is_empty() {
            return ProcessingResult::NoParameters { url };
        }

        match rewrite(&url, &params) {
            Ok(rewritten) => ProcessingResult::Rewritten {
                url,
                rewritten,
                params,
            },
            Err(e) => ProcessingResult::Failed {
                url,
                error: e.into(),
            },
        }
    }

    async fn report(&self, result: ProcessingResult) -> Outcome {
        let sinks = &self.shared.sinks;

        match result {
            ProcessingResult::Rewritten {
                url,
                rewritten,
                params,
            } => {
                if let Err(e) = sinks.output.write_line(&rewritten).await {
                    return self.report_failure(&url, e.into()).await;
                }

                if self.shared.options.verbose {
                    if let Err(e) = sinks.console.write_lines(&verbose_lines(&url, &params)).await {
                        warn!("Failed to print parameters for {}: {}", url, e);
                    }
                }

                debug!("Worker {} wrote {}", self.id, rewritten);
                Outcome::Written
            }
            ProcessingResult::NoParameters { url } => {
                debug!("Worker {} found no parameters at {}", self.id, url);
                Outcome::Skipped
            }
            ProcessingResult::Failed { url, error } => self.report_failure(&url, error).await,
        }
    }

    async fn report_failure(&self, url: &str, error: ProcessError) -> Outcome {
        debug!("Worker {} failed on {}: {}", self.id, url, error);
        let outcome = Outcome::Failed(error.kind());

        if !self.shared.options.quiet {
            let line = format_error_line(url, &error);
            if let Err(e) = self.shared.sinks.errors.write_line(&line).await {
                warn!("Failed to write error log: {}", e);
            }
        }

        outcome
    }
}

/// Console listing for one URL: a header line, then `name: v1, v2`.
pub fn verbose_lines(url: &str, params: &ParameterMap) -> Vec<String> {
    let mut lines = vec![format!("Extracted parameters from URL {url}:")];
    lines.extend(
        params
            .iter()
            .map(|(name, values)| format!("{}: {}", name, values.join(", "))),
    );
    lines
}

/// Runs a fixed pool of workers over an input stream of URLs.
///
/// # Examples
///
/// ```rust,no_run
/// use param_miner::{LineSink, Pipeline, PipelineOptions, RequestConfig, RequestExecutor, Sinks};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let fetcher = Arc::new(RequestExecutor::new(Arc::new(RequestConfig::default())));
///     let sinks = Sinks {
///         output: LineSink::create("params.txt".as_ref()).await?,
///         errors: LineSink::stderr(),
///         console: LineSink::stdout(),
///     };
///     let pipeline = Pipeline::new(fetcher, PipelineOptions::default(), sinks);
///
///     let input = tokio::io::BufReader::new(tokio::io::stdin());
///     let summary = pipeline.run(input).await?;
///     println!("{summary}");
///     Ok(())
/// }
/// ```
pub struct Pipeline {
    shared: Arc<Shared>,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, options: PipelineOptions, sinks: Sinks) -> Self {
        Self {
            shared: Arc::new(Shared {
                fetcher,
                options,
                sinks,
                metrics: Metrics::new(),
            }),
        }
    }

    /// Process every line of `input` and wait for all workers to finish.
    ///
    /// Lines are decoded lossily, so a line that is not valid UTF-8 only
    /// fails its own URL. An I/O error on `input` stops enqueueing; URLs
    /// already queued are still processed before the error is returned.
    pub async fn run<R>(&self, input: R) -> std::io::Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let worker_count = self.shared.options.concurrency.max(1);
        let (url_sender, url_receiver) = mpsc::channel::<String>(worker_count);
        let shared_receiver = Arc::new(Mutex::new(url_receiver));

        info!("Starting {} workers", worker_count);

        let handles: Vec<_> = (0..worker_count)
            .map(|id| {
                let worker = ParamWorker::new(id, self.shared.clone());
                let rx = shared_receiver.clone();
                tokio::spawn(async move {
                    worker.run_with_shared_receiver(rx).await;
                })
            })
            .collect();

        let read_result = self.enqueue(input, &url_sender).await;
        drop(url_sender);

        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Worker task failed: {}", e);
            }
        }

        let sinks = &self.shared.sinks;
        for sink in [&sinks.output, &sinks.errors, &sinks.console] {
            if let Err(e) = sink.flush().await {
                warn!("Failed to flush output: {}", e);
            }
        }

        let summary = self.shared.metrics.summary();
        info!("{}", summary);

        read_result.map(|_| summary)
    }

    async fn enqueue<R>(&self, mut input: R, urls: &mpsc::Sender<String>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();

        loop {
            line.clear();
            if input.read_until(b'\n', &mut line).await? == 0 {
                break;
            }

            // Invalid UTF-8 is replaced rather than rejected; the URL then
            // fails on its own without stopping the rest of the input.
            let decoded = String::from_utf8_lossy(&line);
            let url = decoded.trim();
            if url.is_empty() {
                continue;
            }

            self.shared.metrics.record_read();
            if urls.send(url.to_string()).await.is_err() {
                error!("All workers stopped before the input was consumed");
                break;
            }
        }

        Ok(())
    }
}
