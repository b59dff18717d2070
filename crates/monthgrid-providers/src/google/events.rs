//! Google Calendar `events.list` decoding.
//!
//! The listing must be requested with `singleEvents=false` so recurring
//! events arrive as one master record (carrying `recurrence`) plus one
//! record per moved or cancelled instance (carrying `recurringEventId` and
//! `originalStartTime`).

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use monthgrid_core::{RawEventRecord, RawEventTime, RecordStatus};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    /// Calendar name.
    summary: Option<String>,
    /// Calendar timezone (IANA identifier).
    time_zone: Option<String>,
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A saved listing: one page, or every page of a paginated fetch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListingDocument {
    Page(EventListResponse),
    Pages(Vec<EventListResponse>),
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    status: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    recurrence: Option<Vec<String>>,
    recurring_event_id: Option<String>,
    original_start_time: Option<ApiEventTime>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
    time_zone: Option<String>,
}

/// The records of a decoded listing plus calendar metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedListing {
    /// Calendar name, from the first page that has one.
    pub calendar_name: Option<String>,
    /// Calendar timezone, from the first page that has one.
    pub time_zone: Option<String>,
    /// Records in feed order.
    pub records: Vec<RawEventRecord>,
}

/// Decodes a saved `events.list` response (one page or an array of pages).
///
/// # Errors
///
/// Returns [`ProviderError`] with code `InvalidResponse` if the JSON is not an
/// events listing.
pub fn decode_listing(json: &str) -> ProviderResult<DecodedListing> {
    let document: ListingDocument = serde_json::from_str(json).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse events listing: {}", e))
            .with_source(e)
    })?;
    let pages = match document {
        ListingDocument::Page(page) => vec![page],
        ListingDocument::Pages(pages) => pages,
    };

    let mut listing = DecodedListing::default();
    for page in pages {
        if listing.calendar_name.is_none() {
            listing.calendar_name = page.summary;
        }
        if listing.time_zone.is_none() {
            listing.time_zone = page.time_zone;
        }
        if let Some(token) = &page.next_page_token {
            debug!("page has a next page token {}", token);
        }
        listing
            .records
            .extend(page.items.into_iter().filter_map(convert_event));
    }

    debug!(
        records = listing.records.len(),
        time_zone = listing.time_zone.as_deref().unwrap_or("unset"),
        "decoded events listing"
    );
    Ok(listing)
}

/// Converts an API event to a raw record.
///
/// Unparsable times are dropped with a warning; the classifier then reports
/// the record as unrecognized.
fn convert_event(event: ApiEvent) -> Option<RawEventRecord> {
    let Some(id) = event.id else {
        warn!("skipping event without id");
        return None;
    };

    let mut record = RawEventRecord::new(&id);
    record.status = event.status.as_deref().map(RecordStatus::from_provider);
    record.summary = event.summary;
    record.description = event.description;
    record.location = event.location;
    record.start = event.start.and_then(|t| parse_time(&id, "start", &t));
    record.end = event.end.and_then(|t| parse_time(&id, "end", &t));
    record.recurrence = event.recurrence.unwrap_or_default();
    record.recurring_event_id = event.recurring_event_id;
    record.original_start = event
        .original_start_time
        .and_then(|t| parse_time(&id, "originalStartTime", &t));

    Some(record)
}

fn parse_time(id: &str, field: &str, time: &ApiEventTime) -> Option<RawEventTime> {
    let parsed = match (&time.date_time, &time.date) {
        (Some(dt), _) => RawEventTime::parse(dt)
            .ok()
            .or_else(|| floating_in_zone(dt, time.time_zone.as_deref()?)),
        (None, Some(date)) => RawEventTime::parse(date).ok(),
        (None, None) => None,
    };
    if parsed.is_none() {
        warn!("event {} has an unusable {} time", id, field);
    }
    parsed
}

/// Resolves a date-time without offset in the zone named next to it.
fn floating_in_zone(value: &str, zone: &str) -> Option<RawEventTime> {
    let tz: Tz = zone.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()?;
    let local: DateTime<Tz> = tz.from_local_datetime(&naive).earliest()?;
    Some(RawEventTime::DateTime(local.fixed_offset()))
}
