//! Pluggable sources of historical observations
//!
//! The engine never reads files or runs programs itself: callers pick a
//! provider at startup and wrap it in [`FallbackProvider`] so a broken source
//! still yields a series the dashboard can render.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{info, warn};
use serde::Deserialize;

use super::data::{normalize_series, reference_series, YearlyObservation, LONOKE_REGION};
use super::loader::load_series;
use super::HistoryError;

/// Default bound on how long an external data command may run
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies yearly observations for a region, ascending by year
pub trait HistoricalDataProvider: Send + Sync {
    /// Short label for logs and export metadata
    fn name(&self) -> &str;

    /// Ordered series for `region`; an empty series is valid
    fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, HistoryError>;
}

fn check_region(expected: &str, region: &str) -> Result<(), HistoryError> {
    if expected == region {
        Ok(())
    } else {
        Err(HistoryError::UnknownRegion(region.to_string()))
    }
}

/// The compiled-in county reference table
#[derive(Debug, Clone, Default)]
pub struct EmbeddedProvider;

impl HistoricalDataProvider for EmbeddedProvider {
    fn name(&self) -> &str {
        "embedded"
    }

    fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, HistoryError> {
        check_region(LONOKE_REGION, region)?;
        Ok(reference_series())
    }
}

/// A trend CSV export on disk, holding one region
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
    region: String,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>, region: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            region: region.into(),
        }
    }
}

impl HistoricalDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, HistoryError> {
        check_region(&self.region, region)?;
        load_series(&self.path)
    }
}

/// Output of an external data command: `{"data": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommandOutput {
    Wrapped { data: Vec<YearlyObservation> },
    Bare(Vec<YearlyObservation>),
}

/// An external program printing the series as JSON on stdout.
///
/// The region id is appended as the last argument. The child is killed if it
/// outlives the timeout.
#[derive(Debug, Clone)]
pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, region: &str) -> Result<Vec<u8>, HistoryError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(region)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HistoryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain pipes on helper threads so a chatty child can't block on a full pipe
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if started.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(HistoryError::Timeout {
                            program: self.program.clone(),
                            timeout: self.timeout,
                        });
                    }
                    thread::sleep(Duration::from_millis(50));
                }
                Err(source) => {
                    return Err(HistoryError::Spawn {
                        program: self.program.clone(),
                        source,
                    })
                }
            }
        };

        // A grandchild can keep the pipes open after the child exits
        let stdout = self.collect(stdout, started)?;
        let stderr = self.collect(stderr, started)?;

        if !status.success() {
            return Err(HistoryError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }

    /// Wait for a drained pipe within what is left of the timeout
    fn collect(&self, pipe: Option<Receiver<Vec<u8>>>, started: Instant) -> Result<Vec<u8>, HistoryError> {
        let Some(rx) = pipe else {
            return Ok(Vec::new());
        };
        let remaining = self.timeout.saturating_sub(started.elapsed());
        match rx.recv_timeout(remaining) {
            Ok(buf) => Ok(buf),
            Err(RecvTimeoutError::Disconnected) => Ok(Vec::new()),
            Err(RecvTimeoutError::Timeout) => Err(HistoryError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            }),
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

impl HistoricalDataProvider for CommandProvider {
    fn name(&self) -> &str {
        "command"
    }

    fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, HistoryError> {
        let stdout = self.run(region)?;
        let series = match serde_json::from_slice::<CommandOutput>(&stdout)? {
            CommandOutput::Wrapped { data } => data,
            CommandOutput::Bare(data) => data,
        };
        normalize_series(series)
    }
}

/// Degrades any failure of the inner provider to a fixed fallback series
pub struct FallbackProvider {
    inner: Box<dyn HistoricalDataProvider>,
    fallback: Vec<YearlyObservation>,
}

/// Where a resolved series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    Primary,
    Fallback,
}

impl FallbackProvider {
    /// Wrap `inner`, falling back to the county reference table
    pub fn new(inner: Box<dyn HistoricalDataProvider>) -> Self {
        Self::with_fallback(inner, reference_series())
    }

    pub fn with_fallback(inner: Box<dyn HistoricalDataProvider>, fallback: Vec<YearlyObservation>) -> Self {
        Self { inner, fallback }
    }

    /// Resolve a series, reporting whether the fallback was used.
    ///
    /// An empty primary series also falls back, since there is nothing to render.
    pub fn resolve(&self, region: &str) -> (Vec<YearlyObservation>, SeriesOrigin) {
        match self.inner.get_series(region) {
            Ok(series) if !series.is_empty() => {
                info!("Loaded {} observations for {} from {}", series.len(), region, self.inner.name());
                (series, SeriesOrigin::Primary)
            }
            Ok(_) => {
                warn!("{} returned no observations for {}, using fallback series", self.inner.name(), region);
                (self.fallback.clone(), SeriesOrigin::Fallback)
            }
            Err(e) => {
                warn!("{} failed for {}: {}; using fallback series", self.inner.name(), region, e);
                (self.fallback.clone(), SeriesOrigin::Fallback)
            }
        }
    }

    pub fn inner_name(&self) -> &str {
        self.inner.name()
    }
}

impl HistoricalDataProvider for FallbackProvider {
    fn name(&self) -> &str {
        "fallback"
    }

    fn get_series(&self, region: &str) -> Result<Vec<YearlyObservation>, HistoryError> {
        Ok(self.resolve(region).0)
    }
}
