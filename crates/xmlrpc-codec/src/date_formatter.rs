//! ISO-8601 encoding and decoding for the `dateTime.iso8601` wire tag.
//!
//! Decoding accepts a relaxed ISO-8601 superset via one fixed-form regular
//! expression: separators are optional, the time / fractional / zone parts
//! are optional, and missing time components default to midnight. When the
//! source string carries no explicit zone offset, the process-local UTC
//! offset at that instant is assumed, matching how XML-RPC peers have
//! historically exchanged zone-less timestamps.
//!
//! Encoding is driven by [`DateFormatterOptions`]; the defaults produce the
//! conventional XML-RPC on-wire form (`19980717T14:08:55` — no hyphens,
//! colon-separated time, local zone, no milliseconds, no offset suffix).

use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use regex::Regex;

use crate::error::{Result, XmlRpcError};

/// Dissects an ISO-8601 string into year/month/day, optional time, optional
/// fractional seconds, and optional zone (either `Z` or `[+-]HH[:MM]`).
static ISO8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})-?(\d{2})-?(\d{2})(?:T(\d{2})(?::?(\d{2}))?(?::?(\d{2}))?(?:\.(\d+))?(Z|[+-]\d{2}(?::?\d{2})?)?)?",
    )
    .expect("ISO-8601 pattern is valid")
});

/// Rendering options for [`DateFormatter::encode_iso8601`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatterOptions {
    /// Separate the time portion with colons.
    pub colons: bool,
    /// Separate the date portion with hyphens.
    pub hyphens: bool,
    /// Render in the process-local zone instead of UTC.
    pub local: bool,
    /// Include milliseconds.
    pub ms: bool,
    /// Append the explicit UTC offset when rendering local time. UTC
    /// renderings always end in `Z`.
    pub offset: bool,
}

impl Default for DateFormatterOptions {
    fn default() -> Self {
        Self {
            colons: true,
            hyphens: false,
            local: true,
            ms: false,
            offset: false,
        }
    }
}

/// Encoder/decoder for the ISO-8601 subset used by `dateTime.iso8601`.
#[derive(Debug, Clone, Default)]
pub struct DateFormatter {
    options: DateFormatterOptions,
}

impl DateFormatter {
    pub fn new(options: DateFormatterOptions) -> Self {
        Self { options }
    }

    /// Replace the encoding options.
    pub fn set_opts(&mut self, options: DateFormatterOptions) {
        self.options = options;
    }

    /// Parse an ISO-8601 timestamp into a calendar instant.
    pub fn decode_iso8601(&self, text: &str) -> Result<DateTime<FixedOffset>> {
        let trimmed = text.trim();
        let bad = || XmlRpcError::ExpectedDateTime(text.to_owned());
        let caps = ISO8601.captures(trimmed).ok_or_else(bad)?;

        let year: i32 = caps[1].parse().map_err(|_| bad())?;
        let month: u32 = caps[2].parse().map_err(|_| bad())?;
        let day: u32 = caps[3].parse().map_err(|_| bad())?;
        let hour: u32 = caps.get(4).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| bad())?;
        let minute: u32 = caps.get(5).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| bad())?;
        let second: u32 = caps.get(6).map_or(Ok(0), |m| m.as_str().parse()).map_err(|_| bad())?;
        let millis = caps.get(7).map_or(0, |m| fraction_to_millis(m.as_str()));

        let naive = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
            .ok_or_else(bad)?;

        match caps.get(8).map(|m| m.as_str()) {
            Some("Z") => Ok(Utc.from_utc_datetime(&naive).fixed_offset()),
            Some(zone) => {
                let offset = parse_offset(zone).ok_or_else(bad)?;
                offset.from_local_datetime(&naive).single().ok_or_else(bad)
            }
            // No explicit zone: assume the process-local offset in effect
            // at that local time.
            None => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(bad),
        }
    }

    /// Render a calendar instant according to the configured options.
    pub fn encode_iso8601(&self, date: &DateTime<FixedOffset>) -> String {
        let o = self.options;
        let (naive, suffix) = if o.local {
            let local = date.with_timezone(&Local);
            let suffix = if o.offset {
                format_offset(local.offset().local_minus_utc())
            } else {
                String::new()
            };
            (local.naive_local(), suffix)
        } else {
            (date.naive_utc(), "Z".to_owned())
        };
        format_naive(&naive, o, &suffix)
    }
}

fn format_naive(naive: &NaiveDateTime, o: DateFormatterOptions, suffix: &str) -> String {
    use chrono::Datelike;
    let dsep = if o.hyphens { "-" } else { "" };
    let tsep = if o.colons { ":" } else { "" };
    let date = naive.date();
    let time = naive.time();
    let mut out = format!(
        "{:04}{dsep}{:02}{dsep}{:02}T{:02}{tsep}{:02}{tsep}{:02}",
        date.year(),
        date.month(),
        date.day(),
        time.hour(),
        time.minute(),
        time.second(),
    );
    if o.ms {
        out.push_str(&format!(".{:03}", time.nanosecond() / 1_000_000));
    }
    out.push_str(suffix);
    out
}

/// Interpret fraction digits as fractional seconds, truncated to millis
/// (`"5"` is half a second, `"0075"` is 7ms).
fn fraction_to_millis(fraction: &str) -> u32 {
    let mut padded = String::with_capacity(3);
    padded.push_str(&fraction[..fraction.len().min(3)]);
    while padded.len() < 3 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

/// Parse `[+-]HH` or `[+-]HH:MM` / `[+-]HHMM` into a fixed offset.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let (sign, rest) = match zone.as_bytes().first()? {
        b'+' => (1, &zone[1..]),
        b'-' => (-1, &zone[1..]),
        _ => return None,
    };
    let hours: i32 = rest.get(..2)?.parse().ok()?;
    let minutes: i32 = match rest.get(2..) {
        None | Some("") => 0,
        Some(tail) => tail.trim_start_matches(':').parse().ok()?,
    };
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Render an offset in seconds as `Z` or `[+-]HH:MM`.
fn format_offset(seconds: i32) -> String {
    if seconds == 0 {
        return "Z".to_owned();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.abs();
    format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
}
