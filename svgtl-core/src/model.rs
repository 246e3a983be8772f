//! Data model for timelines: rows of time-bounded events plus the
//! generation configuration

use chrono::{NaiveDateTime, TimeDelta};

/// The embedded base stylesheet, used when [`Config::style`] is not replaced
pub const DEFAULT_STYLE: &str = include_str!("../assets/default.css");

/// Kind of event; affects how it is drawn on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A discrete unit of work rendered as a rectangle within its row
    Task,
    /// A time period that spans vertically across all rows below it
    Era,
}

/// An atomic drawable unit on the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Kind of the event
    pub kind: EventKind,
    /// Unique element identifier
    pub id: Option<String>,
    /// CSS class appended to the base `tl-event` / `tl-era` class
    pub class: Option<String>,
    /// Text displayed inside the event rectangle if the duration provides
    /// sufficient width
    pub text: Option<String>,
    /// Tooltip text
    pub title: Option<String>,
    /// Event duration; must not be negative
    pub duration: TimeDelta,
    /// Absolute start time; leave `None` to place the event after the
    /// previous one in its row
    pub time: Option<NaiveDateTime>,
}

impl Event {
    /// Create an event of the given kind with zero duration and no
    /// attributes set
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            id: None,
            class: None,
            text: None,
            title: None,
            duration: TimeDelta::zero(),
            time: None,
        }
    }
}

/// A horizontal lane stacking events in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    height: u32,
    separator_height: u32,
    events: Vec<Event>,
}

impl Row {
    pub(crate) fn new(height: u32, separator_height: u32) -> Self {
        Self {
            height,
            separator_height,
            events: Vec::new(),
        }
    }

    /// Append an event to the row
    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Pixel height of the row's band
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Vertical gap drawn after the row
    pub fn separator_height(&self) -> u32 {
        self.separator_height
    }

    /// The row's events in insertion order
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// The entire timeline: an ordered, append-only sequence of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    rows: Vec<Row>,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new row and return it for event insertion
    pub fn add_row(&mut self, height: u32, separator_height: u32) -> &mut Row {
        self.rows.push(Row::new(height, separator_height));
        // just pushed, so the vec is non-empty
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// The rows in top-to-bottom order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The most recently added row, if any
    pub fn last_row_mut(&mut self) -> Option<&mut Row> {
        self.rows.last_mut()
    }
}

/// Generation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Optional `id` attribute of the root `<svg>` element
    pub id: Option<String>,
    /// Target pixel width of the document
    pub width: u32,
    /// Number of tick intervals on the time axis; `num_ticks + 1` marks are
    /// drawn
    pub num_ticks: u32,
    /// Height of the tick marks
    pub tick_height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    /// CSS embedded into the document; see [`DEFAULT_STYLE`]
    pub style: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id: None,
            width: 1000,
            num_ticks: 8,
            tick_height: 5,
            margin_top: 15,
            margin_right: 30,
            margin_bottom: 15,
            margin_left: 10,
            style: DEFAULT_STYLE.to_string(),
        }
    }
}
