//! Formatting helpers exposed to templates.

use chrono::{DateTime, Utc};
use minijinja::{Environment, State, Value};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Context key under which the renderer passes the request's base path.
pub const BASE_PATH_KEY: &str = "BasePath";

/// Escaped when a value stands for a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const COLOURS: [&str; 5] = ["primary", "success", "info", "warning", "danger"];
const DEFAULT_COLOUR: &str = "default";

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

pub fn register(env: &mut Environment<'_>) {
    env.add_function("TimeAgo", time_ago_now);
    env.add_function("Timestamp", timestamp);
    env.add_function("Colour", colour_label);
    env.add_function("URL", url);
    env.add_function("EventURL", event_url);
}

fn time_ago_now(timestamp: i64) -> String {
    time_ago(timestamp, Utc::now().timestamp())
}

fn colour_label(kind: String) -> String {
    colour(&kind).to_string()
}

/// Marked safe for HTML output; characters that could break out of an attribute
/// are percent-encoded instead.
fn url(state: &State, path: String) -> Value {
    Value::from_safe_string(encode_unsafe(&url_join(&base_path(state), &path)))
}

fn event_url(state: &State, id: String) -> Value {
    Value::from_safe_string(encode_unsafe(&event_path(&base_path(state), &id)))
}

fn base_path(state: &State) -> String {
    state
        .lookup(BASE_PATH_KEY)
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| "/".to_string())
}

fn encode_unsafe(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            '"' | '\'' | '<' | '>' | '&' | ' ' | '`' => {
                encoded.push_str(&format!("%{:02X}", u32::from(ch)));
            }
            ch if ch.is_control() => {
                let mut buf = [0u8; 4];
                for byte in ch.encode_utf8(&mut buf).bytes() {
                    encoded.push_str(&format!("%{byte:02X}"));
                }
            }
            ch => encoded.push(ch),
        }
    }
    encoded
}

/// Relative description of `timestamp` as seen from `now`.
pub fn time_ago(timestamp: i64, now: i64) -> String {
    let elapsed = now.saturating_sub(timestamp);
    if elapsed <= 0 {
        return "just now".to_string();
    }

    let (count, unit) = match elapsed {
        e if e < MINUTE => (e, "second"),
        e if e < HOUR => (e / MINUTE, "minute"),
        e if e < DAY => (e / HOUR, "hour"),
        e if e < MONTH => (e / DAY, "day"),
        e if e < YEAR => (e / MONTH, "month"),
        e => (e / YEAR, "year"),
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {unit}{plural} ago")
}

/// RFC 822 style rendering in UTC, e.g. `14 Nov 23 22:13 UTC`.
pub fn timestamp(timestamp: i64) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(at) => at.format("%d %b %y %H:%M UTC").to_string(),
        None => timestamp.to_string(),
    }
}

/// Stable colour label for an event type (FNV-1a over the type's bytes).
pub fn colour(kind: &str) -> &'static str {
    if kind.is_empty() {
        return DEFAULT_COLOUR;
    }
    let hash = kind.bytes().fold(0x811c_9dc5_u32, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
    });
    COLOURS[hash as usize % COLOURS.len()]
}

/// Encodes `value` so that it is routed back as exactly that one path segment.
pub fn encode_segment(value: &str) -> String {
    match value {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        value => utf8_percent_encode(value, SEGMENT).to_string(),
    }
}

/// Path of the event-detail page for `id`.
pub fn event_path(base: &str, id: &str) -> String {
    url_join(base, &format!("event/{}", encode_segment(id)))
}

/// Joins a base path and a logical path into a clean absolute path.
pub fn url_join(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
#[path = "tests/helpers_tests.rs"]
mod tests;
