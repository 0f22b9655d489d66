use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Line-oriented writer shared by all workers.
///
/// Every call holds the lock for the whole write, so lines from different
/// workers never interleave.
pub struct LineSink {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl LineSink {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Create (truncate) a file sink.
    pub async fn create(path: &Path) -> std::io::Result<Self> {
        let file = tokio::fs::File::create(path).await?;
        Ok(Self::new(file))
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new(tokio::io::stderr())
    }

    pub async fn write_line(&self, line: &str) -> std::io::Result<()> {
        self.write_lines(std::slice::from_ref(&line)).await
    }

    /// Write several lines as one uninterrupted block.
    pub async fn write_lines<S: AsRef<str>>(&self, lines: &[S]) -> std::io::Result<()> {
        let mut buffer = String::new();
        for line in lines {
            buffer.push_str(line.as_ref());
            buffer.push('\n');
        }

        let mut writer = self.writer.lock().await;
        writer.write_all(buffer.as_bytes()).await?;
        writer.flush().await
    }

    pub async fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().await.flush().await
    }
}

/// One error-log line: `ERROR: 2024/01/31 12:00:00 <url>: <message>`.
pub fn format_error_line(url: &str, error: &dyn std::error::Error) -> String {
    format!(
        "ERROR: {} {}: {}",
        chrono::Local::now().format("%Y/%m/%d %H:%M:%S"),
        url,
        error
    )
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.ends_with(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = duration.subsec_millis();

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else if seconds > 0 {
        format!("{}.{}s", seconds, millis / 100)
    } else {
        format!("{millis}ms")
    }
}
