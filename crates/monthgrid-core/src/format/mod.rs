//! Output formatting for computed month layouts.
//!
//! The text format lists every non-empty day cell on one line:
//!
//! ```text
//! Mon 11 | [0] ~ | [1] Sprint | 09:00 Standup
//! ```
//!
//! Lane rows come first (`[lane] title` on the first day of a segment, `~`
//! on its later days, `.` for a placeholder), then single-day occurrences.
//! `<<` and `>>` mark spans that continue beyond the visible month.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::event::Occurrence;
use crate::layout::{DayCell, DayRow, MonthLayout};

/// The output format of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// The serialized [`MonthLayout`].
    Json,
}

/// Options of the text format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Maximum length for titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Whether to append collected warnings.
    pub show_warnings: bool,
}

/// Truncates a string to the specified length, adding ellipsis if needed.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }
    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }
    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}

/// Renders a layout as text.
pub fn render_text(layout: &MonthLayout, options: &TextOptions) -> String {
    let mut lines = vec![
        layout.month.first_day().format("%B %Y").to_string(),
        format!(
            "{} rows, {} leading, {} trailing",
            layout.grid.rows, layout.grid.leading_blank_days, layout.grid.trailing_blank_days
        ),
    ];

    for cell in layout.days.iter().filter(|c| !c.is_empty()) {
        lines.push(render_cell(layout, cell, options));
    }

    if options.show_warnings {
        for warning in layout.diagnostics.warnings() {
            lines.push(format!("warning: {}", warning));
        }
    }

    lines.join("\n")
}

fn render_cell(layout: &MonthLayout, cell: &DayCell, options: &TextOptions) -> String {
    let weekday = layout
        .month
        .date(cell.day)
        .map(|d| d.format("%a").to_string())
        .unwrap_or_default();

    let mut items: Vec<String> = cell
        .rows
        .iter()
        .enumerate()
        .map(|(lane, row)| match row {
            DayRow::Placeholder => format!("[{}] .", lane),
            DayRow::Continuation { .. } => format!("[{}] ~", lane),
            DayRow::Start { segment } => {
                let Some(segment) = layout.segments.get(*segment) else {
                    return format!("[{}] ?", lane);
                };
                let title = layout
                    .occurrence_of(segment)
                    .map(|o| title(o, options))
                    .unwrap_or_default();
                format!(
                    "[{}] {}{}{}",
                    lane,
                    if segment.continues_before { "<< " } else { "" },
                    title,
                    if segment.continues_after { " >>" } else { "" }
                )
            }
        })
        .collect();

    items.extend(cell.singles.iter().map(|o| {
        if o.all_day {
            format!("all-day {}", title(o, options))
        } else {
            format!("{} {}", o.start.naive().format("%H:%M"), title(o, options))
        }
    }));

    format!("{} {:02} | {}", weekday, cell.day, items.join(" | "))
}

fn title<'a>(occurrence: &'a Occurrence, options: &TextOptions) -> Cow<'a, str> {
    match options.max_title_length {
        Some(max) => ellipsis(&occurrence.title, max),
        None => Cow::Borrowed(&occurrence.title),
    }
}
