//! svgtl-core: a declarative timeline model, config parser and SVG renderer
//!
//! Activities are grouped into horizontal rows and drawn along a shared,
//! linearly scaled time axis. Events are placed sequentially by their
//! durations, or at absolute times when every event carries one.
//!
//! # Example
//!
//! ```
//! use chrono::TimeDelta;
//! use svgtl_core::{generate, Config, Event, EventKind, Timeline};
//!
//! let mut timeline = Timeline::new();
//! let row = timeline.add_row(30, 5);
//! row.add_event(Event {
//!     text: Some("fetch".to_string()),
//!     duration: TimeDelta::seconds(10),
//!     ..Event::new(EventKind::Task)
//! });
//!
//! let svg = generate(&timeline, &Config::default()).unwrap();
//! assert!(svg.starts_with("<svg"));
//! ```
//!
//! # From config text
//!
//! ```
//! use svgtl_core::{generate, parse_config};
//!
//! let input = "\
//! @timeline
//! id=demo
//! @row 30 5
//! @task
//! text=fetch
//! duration=1.5s
//! ";
//!
//! let (timeline, config) = parse_config(input).unwrap();
//! let svg = generate(&timeline, &config).unwrap();
//! println!("{}", svg);
//! ```

pub mod duration;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod render;

pub use duration::{format_duration, parse_duration, DurationParseError};
pub use geometry::{validate, GenerateError, Geometry};
pub use model::{Config, Event, EventKind, Row, Timeline, DEFAULT_STYLE};
pub use parser::{parse_config, ParseError};
pub use render::generate;
