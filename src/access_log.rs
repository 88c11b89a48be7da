//! Access and error log files.
//!
//! One record per completed request. Statuses in `[200, 400)` go to the
//! access file with the body size; everything else goes to the error file
//! with the status reason. Each record is appended with a single write while
//! holding the file's lock, so concurrent connections never interleave.

use std::net::IpAddr;
use std::path::Path;
use std::time::SystemTime;

use anyhow::Context;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::http::response::StatusCode;

/// A completed request, as handed to the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub request_line: String,
    pub client: IpAddr,
    pub date: SystemTime,
    pub status: StatusCode,
    pub body_size: u64,
}

impl LogRecord {
    pub fn is_access(&self) -> bool {
        (200..400).contains(&self.status.as_u16())
    }

    /// The record as it is written to disk, trailing blank line included.
    pub fn format(&self) -> String {
        let mut out = format!(
            "Request={}\nIP={}\nDate={}\n",
            self.request_line,
            self.client,
            httpdate::fmt_http_date(self.date)
        );

        if self.is_access() {
            out.push_str(&format!("Code={}\nSize={}\n", self.status.as_u16(), self.body_size));
        } else {
            out.push_str(&format!("Error={}\n", self.status.reason()));
        }

        out.push('\n');
        out
    }
}

#[derive(Debug)]
pub struct AccessLog {
    access: Mutex<File>,
    errors: Mutex<File>,
}

async fn open_append(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("opening log file {}", path.display()))
}

impl AccessLog {
    /// Opens both files for appending, creating them and their directory
    /// if needed.
    pub async fn open(access_path: &Path, error_path: &Path) -> anyhow::Result<Self> {
        for dir in [access_path.parent(), error_path.parent()].into_iter().flatten() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating log directory {}", dir.display()))?;
            }
        }

        Ok(Self {
            access: Mutex::new(open_append(access_path).await?),
            errors: Mutex::new(open_append(error_path).await?),
        })
    }

    /// Appends `record` to the file matching its status.
    pub async fn record(&self, record: &LogRecord) -> std::io::Result<()> {
        let target = if record.is_access() { &self.access } else { &self.errors };
        let line = record.format();

        let mut file = target.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Like [`AccessLog::record`] but only reports failures; the response
    /// has already been sent by the time a record is written.
    pub async fn record_or_warn(&self, record: &LogRecord) {
        if let Err(e) = self.record(record).await {
            warn!(error = %e, request = %record.request_line, "failed to write log record");
        }
    }
}
