//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/monthgrid/config.toml` by default:
//!
//! ```toml
//! [calendar]
//! use_calendar_timezone = true
//! viewer_timezone = "Europe/Paris"
//! feed_path = "~/calendars/team.json"
//!
//! [layout]
//! max_instances = 1000
//! max_title_length = 24
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use monthgrid_core::{DEFAULT_MAX_INSTANCES, LayoutOptions, TimeError, TimezoneMode};

use crate::error::{ClientError, ClientResult};

/// Configuration for the monthgrid client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Calendar source and timezone settings.
    pub calendar: CalendarSettings,

    /// Layout settings.
    pub layout: LayoutSettings,
}

/// Calendar source and timezone settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Keep the offsets the calendar declared on each event.
    pub use_calendar_timezone: bool,

    /// IANA zone to convert to when the calendar timezone is not used.
    /// Unset means the system local zone.
    pub viewer_timezone: Option<String>,

    /// Saved `events.list` response to lay out. A leading `~/` is the home
    /// directory.
    pub feed_path: Option<PathBuf>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            use_calendar_timezone: true,
            viewer_timezone: None,
            feed_path: None,
        }
    }
}

impl CalendarSettings {
    /// Returns the feed path with a leading `~` expanded.
    pub fn feed_path(&self) -> Option<PathBuf> {
        self.feed_path.as_deref().map(expand_home)
    }

    /// Builds the timezone mode used during classification.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownTimezone`] for an unknown viewer zone.
    pub fn timezone_mode(&self) -> Result<TimezoneMode, TimeError> {
        TimezoneMode::from_settings(
            self.use_calendar_timezone,
            self.viewer_timezone.as_deref(),
        )
    }
}

/// Layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Cap on generated dates per recurring event.
    pub max_instances: usize,

    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
            max_title_length: None,
        }
    }
}

impl LayoutSettings {
    /// Returns the engine options.
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            max_instances: self.max_instances,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::Config(format!("failed to parse config: {}", e)))
    }

    /// Checks the settings that are only interpreted later.
    pub fn validate(&self) -> ClientResult<()> {
        self.calendar.timezone_mode()?;
        if self.layout.max_instances == 0 {
            return Err(ClientError::Config(
                "layout.max_instances must be at least 1".to_string(),
            ));
        }
        match self.calendar.feed_path() {
            Some(feed) if !feed.is_file() => Err(ClientError::Config(format!(
                "calendar.feed_path does not exist: {}",
                feed.display()
            ))),
            _ => Ok(()),
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("monthgrid")
    }
}

/// Replaces a leading `~` component with the home directory.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
