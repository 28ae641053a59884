// SPDX-FileCopyrightText: 2026 Conclave Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row codec helpers for storage entities.
//!
//! The canonical types live in `conclave-core::types`; this module re-exports
//! them and provides the TEXT-column conversions (enums via their `Display`/
//! `FromStr` forms, timestamps as RFC 3339 with millisecond precision so
//! lexicographic order matches chronological order).

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

pub use conclave_core::types::{MemoryRecord, Message, PersonaConfig, Session};

use conclave_core::{MessageType, Persona, SessionStatus};

/// Renders a timestamp for TEXT storage.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Renders an optional timestamp for TEXT storage.
pub(crate) fn format_ts_opt(ts: &Option<DateTime<Utc>>) -> Option<String> {
    ts.as_ref().map(format_ts)
}

fn conversion_err(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn parse_ts(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e))
}

pub(crate) fn parse_ts_opt(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    value.map(|v| parse_ts(idx, v)).transpose()
}

pub(crate) fn parse_persona(idx: usize, value: String) -> rusqlite::Result<Persona> {
    Persona::from_str(&value).map_err(|e| conversion_err(idx, e))
}

pub(crate) fn parse_persona_opt(
    idx: usize,
    value: Option<String>,
) -> rusqlite::Result<Option<Persona>> {
    value.map(|v| parse_persona(idx, v)).transpose()
}

pub(crate) fn parse_status(idx: usize, value: String) -> rusqlite::Result<SessionStatus> {
    SessionStatus::from_str(&value).map_err(|e| conversion_err(idx, e))
}

pub(crate) fn parse_message_type(idx: usize, value: String) -> rusqlite::Result<MessageType> {
    MessageType::from_str(&value).map_err(|e| conversion_err(idx, e))
}
