//! SVG layout and rendering: walks the validated model in row order and
//! emits positioned rectangles, labels, the time axis and its ticks

use std::fmt::Write;

use chrono::TimeDelta;
use log::debug;

use crate::duration::format_duration;
use crate::geometry::{GenerateError, Geometry, TICK_LABEL_MARGIN};
use crate::model::{Config, Event, EventKind, Timeline};

/// Shared `<defs>` fragment referenced by the base stylesheet
const DEFS: &str = include_str!("../assets/defs.xml");

/// Fraction of the font size a monospace glyph is assumed to occupy
const TEXT_WIDTH_FACTOR: f64 = 0.7;
/// Labels that would render smaller than this are omitted entirely
const MIN_TEXT_SIZE: i64 = 3;
/// Sub-unit digits kept when rounding tick labels
const TICK_LABEL_DIGITS: u32 = 2;

/// Generate the timeline SVG.
///
/// Validates the model, resolves its geometry and produces the complete
/// document in one deterministic pass. Any validation failure aborts before
/// anything is drawn.
pub fn generate(timeline: &Timeline, config: &Config) -> Result<String, GenerateError> {
    let geometry = Geometry::resolve(timeline, config)?;
    let mut svg = String::new();

    svg.push_str("<svg");
    if let Some(id) = &config.id {
        write!(&mut svg, r#" id="{}""#, escape_xml(id)).unwrap();
    }
    writeln!(
        &mut svg,
        r#" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = config.width,
        h = geometry.total_height
    )
    .unwrap();

    svg.push_str("<defs>\n");
    svg.push_str(DEFS);
    if !config.style.is_empty() {
        writeln!(&mut svg, "<style>\n{}</style>", config.style).unwrap();
    }
    svg.push_str("</defs>\n");

    writeln!(
        &mut svg,
        r#"<rect class="tl-bg" x="0" y="0" width="{w}" height="{h}" fill="none"/>"#,
        w = config.width,
        h = geometry.total_height
    )
    .unwrap();

    render_events(&mut svg, timeline, config, &geometry);
    render_axis(&mut svg, config, &geometry);
    render_ticks(&mut svg, config, &geometry);

    svg.push_str("</svg>");

    debug!(bytes = svg.len(); "generated timeline document");
    Ok(svg)
}

/// Draw every event, row by row
fn render_events(svg: &mut String, timeline: &Timeline, config: &Config, geometry: &Geometry) {
    if geometry.max_span <= TimeDelta::zero() {
        // degenerate model: axis-only document
        return;
    }

    let mut row_y = config.margin_top;
    for row in timeline.rows() {
        let mut cursor = TimeDelta::zero();
        for event in row.events() {
            cursor = render_event(svg, event, row.height(), row_y, cursor, config, geometry);
        }
        row_y += row.height() + row.separator_height();
    }
}

/// Draw one event group and return the advanced sequential cursor
fn render_event(
    svg: &mut String,
    event: &Event,
    row_height: u32,
    row_y: u32,
    cursor: TimeDelta,
    config: &Config,
    geometry: &Geometry,
) -> TimeDelta {
    let elapsed = match (geometry.origin, event.time) {
        (Some(origin), Some(time)) => time - origin,
        _ => cursor,
    };
    let x = f64::from(config.margin_left) + geometry.scale(elapsed);
    let width = geometry.scale(event.duration);

    let base_class = match event.kind {
        EventKind::Task => "tl-event",
        EventKind::Era => "tl-era",
    };

    svg.push_str("<g");
    if let Some(id) = &event.id {
        write!(svg, r#" id="{}""#, escape_xml(id)).unwrap();
    }
    match &event.class {
        Some(class) => write!(svg, r#" class="{base_class} {}""#, escape_xml(class)).unwrap(),
        None => write!(svg, r#" class="{base_class}""#).unwrap(),
    }
    svg.push_str(">\n");

    if let Some(title) = &event.title {
        writeln!(svg, "<title>{}</title>", escape_xml(title)).unwrap();
    }

    match event.kind {
        EventKind::Task => {
            writeln!(
                svg,
                r#"<rect x="{x}" y="{row_y}" width="{width}" height="{row_height}"/>"#
            )
            .unwrap();
        }
        EventKind::Era => {
            // spans down through the bottom margin region; the dash pattern
            // covers exactly the left and right edges, leaving the top and
            // bottom open
            let height = (i64::from(geometry.total_height)
                - i64::from(row_y)
                - i64::from(config.margin_bottom)
                - 3 * i64::from(config.tick_height))
            .max(0);
            writeln!(
                svg,
                r#"<rect x="{x}" y="{row_y}" width="{width}" height="{height}" stroke-dasharray="0,{width},{height},0"/>"#
            )
            .unwrap();
        }
    }

    if let Some(text) = &event.text {
        render_label(svg, text, event.kind, x, width, row_y, row_height);
    }

    svg.push_str("</g>\n");

    match geometry.origin {
        // absolute mode: each event derives its own position
        Some(_) => cursor,
        None => cursor + event.duration,
    }
}

/// Draw an event label, sized to the rectangle, or nothing when it would be
/// illegible
fn render_label(
    svg: &mut String,
    text: &str,
    kind: EventKind,
    x: f64,
    width: f64,
    row_y: u32,
    row_height: u32,
) {
    let chars = text.chars().count();
    if chars == 0 {
        return;
    }

    let cap = f64::from(row_height) / 2.0;
    let per_glyph = width / (chars as f64 * TEXT_WIDTH_FACTOR);
    let mut size = cap.min(per_glyph) as i64;

    // eras anchor in the upper third of the row band, clear of the task
    // labels below, and use one size less to fit the bracket
    let y_offset = match kind {
        EventKind::Task => f64::from(row_height) / 2.0,
        EventKind::Era => {
            size -= 1;
            f64::from(row_height) / 3.0
        }
    };
    if size < MIN_TEXT_SIZE {
        return;
    }

    writeln!(
        svg,
        r#"<text x="{x}" y="{y}" font-size="{size}" font-family="monospace" dominant-baseline="middle" text-anchor="middle">{text}</text>"#,
        x = x + width / 2.0,
        y = f64::from(row_y) + y_offset,
        text = escape_xml(text)
    )
    .unwrap();
}

/// Draw the bottom time axis
fn render_axis(svg: &mut String, config: &Config, geometry: &Geometry) {
    let x1 = f64::from(config.margin_left);
    writeln!(
        svg,
        r#"<line class="tl-axis" x1="{x1}" y1="{y}" x2="{x2}" y2="{y}"/>"#,
        y = geometry.axis_y,
        x2 = x1 + geometry.content_width
    )
    .unwrap();
}

/// Draw evenly spaced tick marks and their duration labels
fn render_ticks(svg: &mut String, config: &Config, geometry: &Geometry) {
    svg.push_str("<g class=\"tl-ticks\">\n");
    if config.num_ticks > 0 && geometry.max_span > TimeDelta::zero() {
        let span_nanos = geometry.max_span.num_nanoseconds().unwrap_or(i64::MAX);
        for i in 0..=config.num_ticks {
            let tick_nanos =
                (i128::from(span_nanos) * i128::from(i) / i128::from(config.num_ticks)) as i64;
            let tick_time = TimeDelta::nanoseconds(tick_nanos);
            let x = f64::from(config.margin_left) + geometry.scale(tick_time);

            // endpoint ticks run the full chart height, interior ticks only
            // straddle the axis
            let top_y = if i == 0 || i == config.num_ticks {
                config.margin_top
            } else {
                geometry.axis_y - config.tick_height
            };
            writeln!(
                svg,
                r#"<line x1="{x}" y1="{top_y}" x2="{x}" y2="{bottom}"/>"#,
                bottom = geometry.axis_y + config.tick_height
            )
            .unwrap();

            writeln!(
                svg,
                r#"<text x="{x}" y="{y}" font-size="12" font-family="monospace" text-anchor="middle">{label}</text>"#,
                y = geometry.axis_y + config.tick_height + TICK_LABEL_MARGIN,
                label = format_duration(tick_time, TICK_LABEL_DIGITS)
            )
            .unwrap();
        }
    }
    svg.push_str("</g>\n");
}

/// Escape the five reserved markup characters in user-supplied text
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
