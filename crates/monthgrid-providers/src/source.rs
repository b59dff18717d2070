//! FeedSource trait definition.
//!
//! A [`FeedSource`] hands the engine one already-resolved snapshot of raw
//! records. Sources are synchronous: the layout core never waits on them,
//! and retry or timeout policy belongs to whatever produced the data.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use monthgrid_core::{EventClassifier, RawEventRecord, Snapshot, TimezoneMode};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::google::{DecodedListing, decode_listing};

/// The raw records of one provider query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// Name of the source that produced the snapshot.
    pub source: String,
    /// Calendar name, if the provider sent one.
    pub calendar_name: Option<String>,
    /// Calendar timezone (IANA identifier), if the provider sent one.
    pub time_zone: Option<String>,
    /// Records in feed order.
    pub records: Vec<RawEventRecord>,
}

impl FeedSnapshot {
    /// Creates an empty snapshot for `source`.
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Creates a snapshot from a decoded listing.
    pub fn from_listing(source: impl Into<String>, listing: DecodedListing) -> Self {
        Self {
            source: source.into(),
            calendar_name: listing.calendar_name,
            time_zone: listing.time_zone,
            records: listing.records,
        }
    }

    /// Returns true if the snapshot holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Classifies the records with the given timezone mode.
    pub fn classify(&self, mode: TimezoneMode) -> Snapshot {
        EventClassifier::new(mode).classify(&self.records)
    }
}

/// The abstraction for calendar data sources.
pub trait FeedSource {
    /// Returns the name/type of this source (e.g., "file", "static").
    fn name(&self) -> &str;

    /// Fetches a snapshot of raw records.
    ///
    /// # Errors
    ///
    /// Returns a `DataUnavailable` error when nothing could be fetched and
    /// an `InvalidResponse` error when the data is malformed.
    fn fetch(&self) -> ProviderResult<FeedSnapshot>;
}

/// Fetches from `source`, turning `DataUnavailable` into an empty snapshot.
///
/// # Errors
///
/// Propagates every other provider error.
pub fn fetch_or_empty(source: &dyn FeedSource) -> ProviderResult<FeedSnapshot> {
    match source.fetch() {
        Ok(snapshot) => Ok(snapshot),
        Err(err) if err.is_data_unavailable() => {
            warn!("{}; showing an empty month", err);
            Ok(FeedSnapshot::empty(source.name()))
        }
        Err(err) => Err(err),
    }
}

/// Reads a saved Google Calendar `events.list` response from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the feed path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FeedSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch(&self) -> ProviderResult<FeedSnapshot> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            let message = match e.kind() {
                io::ErrorKind::NotFound => format!("feed not found: {}", self.path.display()),
                _ => format!("failed to read feed {}: {}", self.path.display(), e),
            };
            ProviderError::data_unavailable(message)
                .with_provider(self.name())
                .with_source(e)
        })?;

        let listing = decode_listing(&content).map_err(|e| e.with_provider(self.name()))?;
        debug!(
            "loaded {} records from {}",
            listing.records.len(),
            self.path.display()
        );
        Ok(FeedSnapshot::from_listing(self.name(), listing))
    }
}

/// A source serving records held in memory.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    records: Vec<RawEventRecord>,
}

impl StaticSource {
    /// Creates a source always returning `records`.
    pub fn new(name: impl Into<String>, records: Vec<RawEventRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl FeedSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> ProviderResult<FeedSnapshot> {
        Ok(FeedSnapshot {
            source: self.name.clone(),
            records: self.records.clone(),
            ..FeedSnapshot::default()
        })
    }
}

/// A source that always returns an error.
///
/// Stands in for a source that failed to initialize.
#[derive(Debug)]
pub struct ErrorSource {
    name: String,
    code: ProviderErrorCode,
    message: String,
}

impl ErrorSource {
    /// Creates a new error source.
    pub fn new(name: impl Into<String>, error: &ProviderError) -> Self {
        Self {
            name: name.into(),
            code: error.code(),
            message: error.message().to_string(),
        }
    }
}

impl FeedSource for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> ProviderResult<FeedSnapshot> {
        Err(ProviderError::new(self.code, &self.message).with_provider(&self.name))
    }
}
