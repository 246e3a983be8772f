//! Duration literals (`1.5s`, `250ms`, `1m30s`) and the rounded,
//! unit-adapted labels drawn under axis ticks

use chrono::TimeDelta;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{opt, value},
    multi::many1,
    sequence::preceded,
    IResult, Parser,
};

const NANOS_PER_MICRO: f64 = 1e3;
const NANOS_PER_MILLI: f64 = 1e6;
const NANOS_PER_SEC: f64 = 1e9;

/// Failure to parse a duration literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration '{0}'")]
pub struct DurationParseError(pub String);

/// Parse a duration literal: an optional sign followed by one or more
/// number/unit components, e.g. `1.5s`, `300ms` or `1m30s`.
///
/// Recognized units are `ns`, `us`, `µs`, `ms`, `s`, `m` and `h`. The bare
/// literal `0` is accepted without a unit.
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationParseError> {
    let text = input.trim();
    if text == "0" {
        return Ok(TimeDelta::zero());
    }

    let parsed: IResult<&str, (Option<char>, Vec<f64>)> =
        (opt(alt((char('+'), char('-')))), many1(component)).parse(text);
    match parsed {
        Ok(("", (sign, components))) => {
            let nanos: f64 = components.iter().sum();
            let nanos = if sign == Some('-') { -nanos } else { nanos };
            Ok(TimeDelta::nanoseconds(nanos.round() as i64))
        }
        _ => Err(DurationParseError(input.to_string())),
    }
}

/// One `<number><unit>` component, in nanoseconds
fn component(input: &str) -> IResult<&str, f64> {
    let (input, (number, scale)) = (number, unit).parse(input)?;
    Ok((input, number * scale))
}

/// A decimal number with an optional fractional part
fn number(input: &str) -> IResult<&str, f64> {
    let (rest, (integer, fraction)) =
        (digit1, opt(preceded(char('.'), digit1))).parse(input)?;
    let mut text = integer.to_string();
    if let Some(fraction) = fraction {
        text.push('.');
        text.push_str(fraction);
    }
    match text.parse() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

/// A unit suffix, as a nanosecond multiplier. `ms` must come before `m` and
/// the sub-second units before `s` so that the longest suffix wins.
fn unit(input: &str) -> IResult<&str, f64> {
    alt((
        value(1.0, tag("ns")),
        value(NANOS_PER_MICRO, tag("us")),
        value(NANOS_PER_MICRO, tag("µs")),
        value(NANOS_PER_MILLI, tag("ms")),
        value(NANOS_PER_SEC, tag("s")),
        value(60.0 * NANOS_PER_SEC, tag("m")),
        value(3_600.0 * NANOS_PER_SEC, tag("h")),
    ))
    .parse(input)
}

/// Format a span for display using the coarsest unit its magnitude reaches
/// (seconds, then milliseconds, microseconds, nanoseconds), rounded to
/// `digits` sub-unit digits with trailing zeros dropped: `1.25s`, `2.5s`,
/// `250ms`. A zero span formats as `0s`.
pub fn format_duration(delta: TimeDelta, digits: u32) -> String {
    let nanos = match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64,
        None => delta.num_microseconds().unwrap_or(i64::MAX) as f64 * NANOS_PER_MICRO,
    };
    if nanos == 0.0 {
        return "0s".to_string();
    }

    let (scale, unit) = if nanos.abs() >= NANOS_PER_SEC {
        (NANOS_PER_SEC, "s")
    } else if nanos.abs() >= NANOS_PER_MILLI {
        (NANOS_PER_MILLI, "ms")
    } else if nanos.abs() >= NANOS_PER_MICRO {
        (NANOS_PER_MICRO, "µs")
    } else {
        (1.0, "ns")
    };

    let pow = 10f64.powi(digits as i32);
    let rounded = (nanos / scale * pow).round() / pow;
    format!("{rounded}{unit}")
}
