//! Timestamp decoding for service listings
//!
//! OpenStack services do not agree on a timestamp encoding. Even a single
//! field such as Neutron's `heartbeat_timestamp` changes shape between
//! point releases (`2023-03-16 18:35:47` on one node,
//! `2023-03-16 18:35:47.845000+00:00` on another), so every time-valued
//! field is decoded by trying a fixed list of layouts in order.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
use serde::{Deserialize, Deserializer};

/// Whether a layout carries an explicit UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    /// No offset, the value is taken as UTC
    Naive,
    /// `±HH:MM`, or `Z` for UTC
    Offset,
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    format: &'static str,
    zone: Zone,
}

/// Tried in order; the first layout that consumes the whole input wins.
/// `%.f` makes the fraction optional, so `HH:MM:SS` and `HH:MM:SS.ffffff`
/// share a layout.
const LAYOUTS: &[Layout] = &[
    Layout {
        format: "%Y-%m-%d %H:%M:%S%.f%:z",
        zone: Zone::Offset,
    },
    Layout {
        format: "%Y-%m-%d %H:%M:%S%.f",
        zone: Zone::Naive,
    },
    Layout {
        format: "%Y-%m-%dT%H:%M:%S%.f%:z",
        zone: Zone::Offset,
    },
    Layout {
        format: "%Y-%m-%dT%H:%M:%S%.f",
        zone: Zone::Naive,
    },
];

/// Layout used by `Display`; decodes back through the first layout.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

impl Layout {
    fn parse(&self, input: &str) -> Result<DateTime<Utc>, ParseError> {
        match self.zone {
            Zone::Naive => {
                NaiveDateTime::parse_from_str(input, self.format).map(|naive| naive.and_utc())
            }
            Zone::Offset => DateTime::parse_from_str(&expand_zulu(input), self.format)
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

fn expand_zulu(input: &str) -> Cow<'_, str> {
    match input.strip_suffix('Z') {
        Some(stripped) => Cow::Owned(format!("{}+00:00", stripped)),
        None => Cow::Borrowed(input),
    }
}

/// A decoded service timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AnyTime {
    /// The service reported an empty string or `null`
    #[default]
    Absent,
    At(DateTime<Utc>),
}

impl AnyTime {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            AnyTime::Absent => None,
            AnyTime::At(dt) => Some(*dt),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AnyTime::Absent)
    }
}

impl fmt::Display for AnyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyTime::Absent => Ok(()),
            AnyTime::At(dt) => write!(f, "{}", dt.format(DISPLAY_FORMAT)),
        }
    }
}

impl<'de> Deserialize<'de> for AnyTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(AnyTime::Absent),
            Some(raw) => decode(&raw).map_err(serde::de::Error::custom),
        }
    }
}

/// Every layout rejected the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    pub input: String,
    /// One entry per layout, in the order they were tried
    pub attempts: Vec<(&'static str, ParseError)>,
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot parse {:?} as a timestamp", self.input)?;
        for (format, err) in &self.attempts {
            write!(f, "; {}: {}", format, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for TimestampError {}

/// Decode a service timestamp.
///
/// An empty string is [`AnyTime::Absent`]. Anything else must match one of
/// the known layouts in full.
pub fn decode(input: &str) -> Result<AnyTime, TimestampError> {
    if input.is_empty() {
        return Ok(AnyTime::Absent);
    }

    let mut attempts = Vec::with_capacity(LAYOUTS.len());
    for layout in LAYOUTS {
        match layout.parse(input) {
            Ok(dt) => return Ok(AnyTime::At(dt)),
            Err(err) => attempts.push((layout.format, err)),
        }
    }

    Err(TimestampError {
        input: input.to_string(),
        attempts,
    })
}
