//! Line-oriented config parser: a small stateful grammar that builds the
//! same model the programmatic API does
//!
//! The grammar is UTF-8 text with `#` comments, `@timeline` / `@row` /
//! `@era` / `@task` section markers and `key=value` lines scoped to the
//! current section. The first error aborts parsing with a 1-based line
//! number.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

use crate::duration::parse_duration;
use crate::model::{Config, Event, EventKind, Timeline};

/// Row height when the `@row` directive omits it
const DEFAULT_ROW_HEIGHT: u32 = 30;
/// Separator height when the `@row` directive omits it
const DEFAULT_ROW_SEPARATOR: u32 = 5;

/// Line-numbered config parse failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: cannot add an event without a row")]
    EventWithoutRow { line: usize },
    #[error("line {line}: unknown section '{section}'")]
    UnknownSection { line: usize, section: String },
    #[error("line {line}: expected 'key=value', got '{text}'")]
    MalformedLine { line: usize, text: String },
    #[error("line {line}: '{key}' does not belong to any section")]
    KeyOutsideSection { line: usize, key: String },
    #[error("line {line}: unknown timeline property '{key}'")]
    UnknownTimelineKey { line: usize, key: String },
    #[error("line {line}: rows have no configuration options")]
    RowKey { line: usize },
    #[error("line {line}: unknown event property '{key}'")]
    UnknownEventKey { line: usize, key: String },
    #[error("line {line}: invalid number '{value}' for '{key}'")]
    InvalidNumber {
        line: usize,
        key: String,
        value: String,
    },
    #[error("line {line}: invalid duration '{value}'")]
    InvalidDuration { line: usize, value: String },
    #[error("line {line}: unrecognized time '{value}'")]
    InvalidTime { line: usize, value: String },
}

/// Section the scanner is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Timeline,
    Row,
    Event,
}

/// Parser state threaded through each line. The pending event is flushed
/// into the last row on every section switch and at end of input.
#[derive(Debug)]
struct ParserState {
    timeline: Timeline,
    config: Config,
    section: Section,
    pending: Option<Event>,
}

impl ParserState {
    fn new() -> Self {
        Self {
            timeline: Timeline::new(),
            config: Config::default(),
            section: Section::None,
            pending: None,
        }
    }

    /// Append the pending event, if any, to the last row
    fn flush_pending(mut self, line: usize) -> Result<Self, ParseError> {
        if let Some(event) = self.pending.take() {
            match self.timeline.last_row_mut() {
                Some(row) => row.add_event(event),
                None => return Err(ParseError::EventWithoutRow { line }),
            }
        }
        Ok(self)
    }

    /// Handle a `@section` marker line
    fn directive(self, line: usize, text: &str) -> Result<Self, ParseError> {
        let mut state = self.flush_pending(line)?;
        let mut parts = text.split_whitespace();
        let marker = parts.next().unwrap_or(text);

        match marker {
            "@timeline" => state.section = Section::Timeline,
            "@row" => {
                let height = int_or_default(parts.next(), DEFAULT_ROW_HEIGHT);
                let separator = int_or_default(parts.next(), DEFAULT_ROW_SEPARATOR);
                state.timeline.add_row(height, separator);
                state.section = Section::Row;
            }
            "@era" => {
                state.pending = Some(Event::new(EventKind::Era));
                state.section = Section::Event;
            }
            "@task" => {
                state.pending = Some(Event::new(EventKind::Task));
                state.section = Section::Event;
            }
            other => {
                return Err(ParseError::UnknownSection {
                    line,
                    section: other.to_string(),
                })
            }
        }
        Ok(state)
    }

    /// Handle a `key=value` line in the current section
    fn keyvalue(mut self, line: usize, text: &str) -> Result<Self, ParseError> {
        let Some((key, value)) = text.split_once('=') else {
            return Err(ParseError::MalformedLine {
                line,
                text: text.to_string(),
            });
        };
        let key = key.trim();
        let value = value.trim();

        match self.section {
            Section::None => Err(ParseError::KeyOutsideSection {
                line,
                key: key.to_string(),
            }),
            Section::Timeline => {
                match key {
                    "id" => self.config.id = Some(value.to_string()),
                    "width" => {
                        // zero means unset and keeps the default width
                        let width = parse_u32(line, key, value)?;
                        if width > 0 {
                            self.config.width = width;
                        }
                    }
                    "num_ticks" => self.config.num_ticks = parse_u32(line, key, value)?,
                    "tick_height" => self.config.tick_height = parse_u32(line, key, value)?,
                    "margin_top" => self.config.margin_top = parse_u32(line, key, value)?,
                    "margin_right" => self.config.margin_right = parse_u32(line, key, value)?,
                    "margin_bottom" => self.config.margin_bottom = parse_u32(line, key, value)?,
                    "margin_left" => self.config.margin_left = parse_u32(line, key, value)?,
                    _ => {
                        return Err(ParseError::UnknownTimelineKey {
                            line,
                            key: key.to_string(),
                        })
                    }
                }
                Ok(self)
            }
            Section::Row => Err(ParseError::RowKey { line }),
            Section::Event => {
                // a pending event always exists while in an event section
                let Some(event) = self.pending.as_mut() else {
                    return Err(ParseError::KeyOutsideSection {
                        line,
                        key: key.to_string(),
                    });
                };
                match key {
                    "id" => event.id = Some(value.to_string()),
                    "class" => event.class = Some(value.to_string()),
                    "text" => event.text = Some(value.to_string()),
                    "title" => event.title = Some(value.to_string()),
                    "duration" => {
                        event.duration =
                            parse_duration(value).map_err(|_| ParseError::InvalidDuration {
                                line,
                                value: value.to_string(),
                            })?;
                    }
                    "time" => {
                        event.time = Some(parse_time(value).ok_or_else(|| {
                            ParseError::InvalidTime {
                                line,
                                value: value.to_string(),
                            }
                        })?);
                    }
                    _ => {
                        return Err(ParseError::UnknownEventKey {
                            line,
                            key: key.to_string(),
                        })
                    }
                }
                Ok(self)
            }
        }
    }
}

/// Parse config text into a timeline and its generation configuration
pub fn parse_config(input: &str) -> Result<(Timeline, Config), ParseError> {
    let mut state = ParserState::new();
    let mut last_line = 0;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        last_line = line;
        let text = raw.trim();

        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        state = if text.starts_with('@') {
            state.directive(line, text)?
        } else {
            state.keyvalue(line, text)?
        };
    }

    let state = state.flush_pending(last_line)?;
    debug!(rows = state.timeline.rows().len(); "parsed timeline config");
    Ok((state.timeline, state.config))
}

/// Parse an optional directive argument, falling back to a default when the
/// argument is missing or unparsable
fn int_or_default(part: Option<&str>, default: u32) -> u32 {
    part.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn parse_u32(line: usize, key: &str, value: &str) -> Result<u32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Datetime layouts, most specific first
const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%a %b %e %H:%M:%S %Y",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];
const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d %b %Y", "%d-%b-%Y"];
const TIME_LAYOUTS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Try an ordered list of layouts, from full timestamps down to time-only
/// forms. Only the offset from the earliest event matters, so date-only
/// values start at midnight and time-only values share a fixed reference
/// date.
fn parse_time(value: &str) -> Option<NaiveDateTime> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Some(time.naive_utc());
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(time) = NaiveDateTime::parse_from_str(value, layout) {
            return Some(time);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(value, layout) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    for layout in TIME_LAYOUTS {
        if let Ok(time) = NaiveTime::parse_from_str(value, layout) {
            return Some(NaiveDateTime::UNIX_EPOCH.date().and_time(time));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_config() {
        let input = "\
# request lifecycle
@timeline
id=trace-1
width=800
num_ticks=4
tick_height=3
margin_left=20

@row 40 10
@era
class=ctl-request
text=request
duration=10s

@row
@task
id=fetch
text=Fetch
title=origin fetch
duration=1.5s
@task
text=Process
duration=2s
";
        let (timeline, config) = parse_config(input).unwrap();

        assert_eq!(config.id.as_deref(), Some("trace-1"));
        assert_eq!(config.width, 800);
        assert_eq!(config.num_ticks, 4);
        assert_eq!(config.tick_height, 3);
        assert_eq!(config.margin_left, 20);
        // untouched keys keep their defaults
        assert_eq!(config.margin_right, 30);

        assert_eq!(timeline.rows().len(), 2);
        let first = &timeline.rows()[0];
        assert_eq!((first.height(), first.separator_height()), (40, 10));
        assert_eq!(first.events().len(), 1);
        assert_eq!(first.events()[0].kind, EventKind::Era);
        assert_eq!(first.events()[0].duration, TimeDelta::seconds(10));

        let second = &timeline.rows()[1];
        assert_eq!((second.height(), second.separator_height()), (30, 5));
        assert_eq!(second.events().len(), 2);
        assert_eq!(second.events()[0].id.as_deref(), Some("fetch"));
        assert_eq!(second.events()[0].title.as_deref(), Some("origin fetch"));
        assert_eq!(second.events()[0].duration, TimeDelta::milliseconds(1500));
        assert_eq!(second.events()[1].text.as_deref(), Some("Process"));
    }

    #[test]
    fn test_zero_width_keeps_default() {
        // the original treats a zero width as unset rather than producing a
        // chart narrower than its margins
        let (_, config) = parse_config("@timeline\nwidth=0\n@row\n@task\nduration=1s\n").unwrap();
        assert_eq!(config.width, 1000);
    }

    #[test]
    fn test_row_arguments_default_when_unparsable() {
        let (timeline, _) = parse_config("@row abc\n@task\nduration=1s\n").unwrap();
        let row = &timeline.rows()[0];
        assert_eq!((row.height(), row.separator_height()), (30, 5));
    }

    #[test]
    fn test_event_without_row() {
        // an @era with no preceding @row cannot be attached anywhere
        let err = parse_config("@era\nduration=1s\n@row\n").unwrap_err();
        assert_eq!(err, ParseError::EventWithoutRow { line: 3 });
        assert!(err.to_string().contains("cannot add an event without a row"));
    }

    #[test]
    fn test_event_without_row_at_end_of_input() {
        let err = parse_config("@task\nduration=1s\n").unwrap_err();
        assert_eq!(err, ParseError::EventWithoutRow { line: 2 });
    }

    #[test]
    fn test_row_section_takes_no_keys() {
        let err = parse_config("@row\nheight=40\n").unwrap_err();
        assert_eq!(err, ParseError::RowKey { line: 2 });
    }

    #[test]
    fn test_unknown_keys() {
        let err = parse_config("@timeline\ncolor=red\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownTimelineKey {
                line: 2,
                key: "color".to_string()
            }
        );

        let err = parse_config("@row\n@task\nwidth=3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownEventKey {
                line: 3,
                key: "width".to_string()
            }
        );
    }

    #[test]
    fn test_malformed_and_misplaced_lines() {
        let err = parse_config("@timeline\njust some words\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine {
                line: 2,
                text: "just some words".to_string()
            }
        );

        let err = parse_config("id=x\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::KeyOutsideSection {
                line: 1,
                key: "id".to_string()
            }
        );

        let err = parse_config("@banner\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownSection {
                line: 1,
                section: "@banner".to_string()
            }
        );
    }

    #[test]
    fn test_value_parse_failures_carry_line_numbers() {
        let err = parse_config("@timeline\nwidth=wide\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                line: 2,
                key: "width".to_string(),
                value: "wide".to_string()
            }
        );

        let err = parse_config("@row\n@task\nduration=fast\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidDuration {
                line: 3,
                value: "fast".to_string()
            }
        );

        let err = parse_config("@row\n@task\ntime=yesterday\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidTime {
                line: 3,
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let input = "\n# heading\n\n@row 20 0\n   # indented comment\n@task\nduration=1s\n";
        let (timeline, _) = parse_config(input).unwrap();
        assert_eq!(timeline.rows().len(), 1);
        assert_eq!(timeline.rows()[0].events().len(), 1);
    }

    #[test]
    fn test_time_layout_fallbacks() {
        let full = parse_time("2025-11-01T12:20:50").unwrap();
        assert_eq!(
            full,
            NaiveDate::from_ymd_opt(2025, 11, 1)
                .unwrap()
                .and_hms_opt(12, 20, 50)
                .unwrap()
        );

        let spaced = parse_time("2025-11-01 12:20:50").unwrap();
        assert_eq!(spaced, full);

        let date_only = parse_time("2025-11-01").unwrap();
        assert_eq!(date_only, full.date().and_time(NaiveTime::MIN));

        let european = parse_time("01/11/2025").unwrap();
        assert_eq!(european, date_only);

        let clock = parse_time("12:20:50").unwrap();
        assert_eq!(
            clock,
            NaiveDateTime::UNIX_EPOCH.date().and_hms_opt(12, 20, 50).unwrap()
        );

        let rfc3339 = parse_time("2025-11-01T12:20:50+00:00").unwrap();
        assert_eq!(rfc3339, full);

        assert_eq!(parse_time("not a time"), None);
    }

    #[test]
    fn test_pending_event_flushed_on_section_switch() {
        let input = "@row\n@task\nduration=1s\n@task\nduration=2s\n";
        let (timeline, _) = parse_config(input).unwrap();
        let events = timeline.rows()[0].events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].duration, TimeDelta::seconds(1));
        assert_eq!(events[1].duration, TimeDelta::seconds(2));
    }

    #[test]
    fn test_events_land_in_latest_row() {
        let input = "@row\n@task\nduration=1s\n@row\n@task\nduration=2s\n";
        let (timeline, _) = parse_config(input).unwrap();
        assert_eq!(timeline.rows()[0].events().len(), 1);
        assert_eq!(timeline.rows()[1].events().len(), 1);
    }

    #[test]
    fn test_times_parse_into_events() {
        let input = "@row\n@task\nduration=1s\ntime=2025-11-01 12:20:50\n";
        let (timeline, _) = parse_config(input).unwrap();
        let event = &timeline.rows()[0].events()[0];
        assert_eq!(
            event.time,
            Some(
                NaiveDate::from_ymd_opt(2025, 11, 1)
                    .unwrap()
                    .and_hms_opt(12, 20, 50)
                    .unwrap()
            )
        );
    }
}
