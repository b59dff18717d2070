//! The layout command.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use monthgrid_core::{
    LayoutOptions, MonthLayout, OutputFormat, TextOptions, TimezoneMode, VisibleMonth,
    render_text,
};
use monthgrid_providers::{FeedSnapshot, JsonFileSource, fetch_or_empty};

use crate::cli::LayoutArgs;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Settings of one layout run, after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRequest {
    pub month: VisibleMonth,
    pub feed: Option<PathBuf>,
    pub mode: TimezoneMode,
    pub options: LayoutOptions,
    pub format: OutputFormat,
    pub text: TextOptions,
}

impl LayoutRequest {
    /// Merges command-line flags over the configuration.
    pub fn new(args: &LayoutArgs, config: &ClientConfig) -> ClientResult<Self> {
        let today = Local::now().date_naive();
        let month = match args.month {
            Some(ref month) => parse_month(month, today)?,
            None => VisibleMonth::containing(today),
        };
        let mode = match args.timezone {
            Some(ref zone) => TimezoneMode::from_settings(false, Some(zone))?,
            None => config.calendar.timezone_mode()?,
        };

        let mut options = config.layout.options();
        if let Some(max_instances) = args.max_instances {
            options.max_instances = max_instances;
        }

        Ok(Self {
            month,
            feed: args
                .feed
                .clone()
                .or_else(|| config.calendar.feed_path()),
            mode,
            options,
            format: args.output_format(),
            text: TextOptions {
                max_title_length: args.max_title_length.or(config.layout.max_title_length),
                show_warnings: !args.no_warnings,
            },
        })
    }
}

/// Parses `YYYY-MM`, or `prev` / `next` relative to the month of `today`.
pub fn parse_month(value: &str, today: NaiveDate) -> ClientResult<VisibleMonth> {
    let current = VisibleMonth::containing(today);
    match value.trim() {
        "prev" | "previous" => Ok(current.prev()),
        "next" => Ok(current.next()),
        "current" => Ok(current),
        other => Ok(other.parse::<VisibleMonth>()?),
    }
}

/// Loads the feed named by the request.
///
/// No feed, or a feed that cannot be read, gives an empty snapshot.
pub fn load_snapshot(request: &LayoutRequest) -> ClientResult<FeedSnapshot> {
    match request.feed {
        Some(ref path) => Ok(fetch_or_empty(&JsonFileSource::new(path))?),
        None => {
            info!("no feed configured; showing an empty month");
            Ok(FeedSnapshot::empty("none"))
        }
    }
}

/// Classifies the snapshot and computes the month layout.
pub fn compute(request: &LayoutRequest, feed: &FeedSnapshot) -> MonthLayout {
    let snapshot = feed.classify(request.mode);
    let layout = MonthLayout::compute(&snapshot, request.month, &request.options);
    debug!(
        month = %request.month,
        events = snapshot.len(),
        placements = layout.placements.len(),
        "layout computed"
    );
    layout
}

/// Renders the layout in the requested format.
pub fn render(
    request: &LayoutRequest,
    feed: &FeedSnapshot,
    layout: &MonthLayout,
) -> ClientResult<String> {
    match request.format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(layout)?),
        OutputFormat::Text => {
            let mut out = format!("timezone: {}\n", describe_zone(request.mode, feed));
            out.push_str(&render_text(layout, &request.text));
            Ok(out)
        }
    }
}

/// Names the zone the layout's wall-clock times are shown in.
fn describe_zone(mode: TimezoneMode, feed: &FeedSnapshot) -> String {
    match mode {
        TimezoneMode::Calendar => feed
            .time_zone
            .clone()
            .unwrap_or_else(|| "calendar".to_string()),
        TimezoneMode::Local => "local".to_string(),
        TimezoneMode::Named(tz) => tz.name().to_string(),
    }
}

/// Runs the layout command and prints the result.
pub fn run(args: &LayoutArgs, config: &ClientConfig) -> ClientResult<()> {
    let request = LayoutRequest::new(args, config)?;
    let feed = load_snapshot(&request)?;
    let layout = compute(&request, &feed);
    println!("{}", render(&request, &feed, &layout)?);
    Ok(())
}
