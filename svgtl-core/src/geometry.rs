//! Model validation and derivation of the scalar quantities the drawing
//! passes depend on: time origin, maximum span, scale and content dimensions

use chrono::{NaiveDateTime, TimeDelta};
use log::debug;

use crate::model::{Config, Row, Timeline};

/// Vertical gap between the tick marks and their labels
pub(crate) const TICK_LABEL_MARGIN: u32 = 15;

/// Model-level validation failure; generation aborts with no output
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("event durations cannot be negative")]
    NegativeDuration,
    #[error("when a start time is set on any event, it must be set on all of them")]
    InconsistentTimeMode,
    #[error("none of the events has a positive duration")]
    NoPositiveDuration,
    #[error("the timeline has no rows")]
    EmptyTimeline,
}

/// Validate the timeline before any drawing occurs.
///
/// Every event duration must be nonnegative, start times must be set on
/// either all events or none, at least one row must exist and at least one
/// event must carry a positive duration.
pub fn validate(timeline: &Timeline) -> Result<(), GenerateError> {
    let mut has_time = false;
    let mut has_no_time = false;
    let mut total = TimeDelta::zero();

    for row in timeline.rows() {
        for event in row.events() {
            if event.duration < TimeDelta::zero() {
                return Err(GenerateError::NegativeDuration);
            }
            total = total + event.duration;
            match event.time {
                Some(_) => has_time = true,
                None => has_no_time = true,
            }
        }
    }

    if has_time && has_no_time {
        return Err(GenerateError::InconsistentTimeMode);
    }
    if timeline.rows().is_empty() {
        return Err(GenerateError::EmptyTimeline);
    }
    if total == TimeDelta::zero() {
        return Err(GenerateError::NoPositiveDuration);
    }
    Ok(())
}

/// Resolved geometry of a validated timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Earliest explicit start time across all events; `None` means events
    /// are placed sequentially within their row
    pub origin: Option<NaiveDateTime>,
    /// Largest end-to-end span across all rows; denominator of all
    /// horizontal scaling
    pub max_span: TimeDelta,
    /// Drawable width in pixels (configured width minus side margins)
    pub content_width: f64,
    /// Sum of row heights and separators
    pub content_height: u32,
    /// Full document height including margins, ticks and tick labels
    pub total_height: u32,
    /// Vertical position of the time axis line
    pub axis_y: u32,
}

impl Geometry {
    /// Validate the timeline and derive its geometry
    pub fn resolve(timeline: &Timeline, config: &Config) -> Result<Self, GenerateError> {
        validate(timeline)?;

        let origin = earliest_time(timeline);
        let max_span = timeline
            .rows()
            .iter()
            .map(|row| row_span(row, origin))
            .max()
            .unwrap_or_else(TimeDelta::zero);
        let content_height: u32 = timeline
            .rows()
            .iter()
            .map(|row| row.height() + row.separator_height())
            .sum();
        let content_width = f64::from(config.width)
            - f64::from(config.margin_left)
            - f64::from(config.margin_right);
        let total_height = content_height
            + config.margin_top
            + config.margin_bottom
            + config.tick_height
            + TICK_LABEL_MARGIN;
        let axis_y = config.margin_top + content_height + config.tick_height;

        debug!(
            rows = timeline.rows().len(),
            max_span_ns = max_span.num_nanoseconds().unwrap_or(i64::MAX),
            content_width = content_width;
            "resolved timeline geometry"
        );

        Ok(Self {
            origin,
            max_span,
            content_width,
            content_height,
            total_height,
            axis_y,
        })
    }

    /// Width in pixels of a time span under the resolved scale.
    ///
    /// A non-positive maximum span yields zero; validation already rules it
    /// out, so this path only serves degenerate callers and keeps rendering
    /// from dividing by zero.
    pub fn scale(&self, span: TimeDelta) -> f64 {
        let max = delta_nanos(self.max_span);
        if max <= 0.0 {
            return 0.0;
        }
        self.content_width * delta_nanos(span) / max
    }
}

/// Earliest explicit start time across all events
fn earliest_time(timeline: &Timeline) -> Option<NaiveDateTime> {
    timeline
        .rows()
        .iter()
        .flat_map(|row| row.events())
        .filter_map(|event| event.time)
        .min()
}

/// End-to-end span of a row: the larger of cumulative packing and explicit
/// placement
fn row_span(row: &Row, origin: Option<NaiveDateTime>) -> TimeDelta {
    let mut total = TimeDelta::zero();
    let mut by_time = TimeDelta::zero();

    for event in row.events() {
        total = total + event.duration;
        if let (Some(origin), Some(time)) = (origin, event.time) {
            let end = time - origin + event.duration;
            if end > by_time {
                by_time = end;
            }
        }
    }
    total.max(by_time)
}

/// Nanoseconds as f64, degrading to microsecond resolution for spans too
/// large for an i64 of nanoseconds
fn delta_nanos(delta: TimeDelta) -> f64 {
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64,
        None => delta.num_microseconds().unwrap_or(i64::MAX) as f64 * 1e3,
    }
}
