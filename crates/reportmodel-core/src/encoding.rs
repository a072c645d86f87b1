//! Numeric encoding of statuses, keyword types, log levels and times.
//!
//! The ordinals below are decoded by a static table in the viewer, so they
//! are part of the output format.

use crate::model::ModelValue;
use crate::result::{KeywordType, LogLevel, Status};
use crate::strings::StringIndex;
use chrono::NaiveDateTime;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y%m%d %H:%M:%S%.f",
    "%Y%m%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

pub fn status_code(status: Status) -> i64 {
    match status {
        Status::Fail => 0,
        Status::Pass => 1,
        Status::NotRun => 2,
    }
}

pub fn keyword_type_code(kw_type: KeywordType) -> i64 {
    match kw_type {
        KeywordType::Keyword => 0,
        KeywordType::Setup => 1,
        KeywordType::Teardown => 2,
        KeywordType::For => 3,
        KeywordType::ForItem => 4,
    }
}

pub fn level_code(level: LogLevel) -> i64 {
    match level {
        LogLevel::Trace => 0,
        LogLevel::Debug => 1,
        LogLevel::Info => 2,
        LogLevel::Warn => 3,
        LogLevel::Error => 4,
        LogLevel::Fail => 5,
    }
}

/// Parse a result timestamp. Empty, `N/A` and malformed values yield `None`.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("N/A") {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// [`parse_timestamp`] that warns about malformed values.
fn parse_logged(value: &str) -> Option<NaiveDateTime> {
    let parsed = parse_timestamp(value);
    let trimmed = value.trim();
    if parsed.is_none() && !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("N/A") {
        tracing::warn!(timestamp = value, "unparsable timestamp, encoding as null");
    }
    parsed
}

/// Milliseconds between `start` and `end`; 0 when either is unknown.
///
/// Start times are reported by [`TimestampEncoder::encode`], which sees
/// every node's start, so only a malformed end time is warned about here.
pub fn elapsed_ms(start: Option<&str>, end: Option<&str>) -> i64 {
    match (start.and_then(parse_timestamp), end.and_then(parse_logged)) {
        (Some(start), Some(end)) => (end - start).num_milliseconds().max(0),
        _ => 0,
    }
}

/// Encodes absolute times as millisecond offsets from a per-build epoch.
///
/// The first known timestamp seen becomes offset 0.
#[derive(Debug, Clone, Default)]
pub struct TimestampEncoder {
    epoch: Option<NaiveDateTime>,
}

impl TimestampEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode(&mut self, timestamp: Option<&str>) -> Option<i64> {
        let time = timestamp.and_then(parse_logged)?;
        let epoch = *self.epoch.get_or_insert(time);
        Some((time - epoch).num_milliseconds())
    }
}

/// `(status, start, elapsed[, message])`; the message slot exists only for
/// non-empty messages.
pub fn status_group(
    status: Status,
    start: Option<i64>,
    elapsed: i64,
    message: StringIndex,
) -> ModelValue {
    let mut group = vec![
        ModelValue::Int(status_code(status)),
        ModelValue::from(start),
        ModelValue::Int(elapsed),
    ];
    if !message.is_empty() {
        group.push(ModelValue::Text(message));
    }
    ModelValue::Tuple(group)
}
