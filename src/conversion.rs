//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Best-effort conversion of Data API strings into typed values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::types::{FieldValue, DATE_FORMAT, TIMESTAMP_FORMAT};

/// Guess the original type of a string returned by the Data API.
///
/// Older versions of the Data API returned every value as a string, and there
/// is no schema in the response to say what a field really holds. This tries,
/// in order:
///
/// 1. an integer (`"42"`)
/// 2. a finite floating point number (`"42.1"`)
/// 3. a FileMaker timestamp or date (`"12/01/2017 20:45:30"`, `"12/24/2016"`)
/// 4. a time or duration in `H:MM:SS` or `H:MM` form (`"23:59:59"`, `"48:61:01"`, `"9:05"`)
///
/// and falls back to the unchanged string. Results can be surprising (a text
/// field holding `"007"` becomes the integer 7), which is why conversion is
/// off unless enabled with
/// [`ServerBuilder::type_conversion()`](crate::ServerBuilder::type_conversion()).
pub fn convert_string_type(value: &str) -> FieldValue {
    let trimmed = value.trim();

    if let Ok(i) = trimmed.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(d) = trimmed.parse::<f64>() {
        // "inf" and "nan" parse as floats but are words here
        if d.is_finite() {
            return FieldValue::Double(d);
        }
    }

    if trimmed.contains('/') {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
            return FieldValue::Timestamp(ts);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return FieldValue::Timestamp(d.and_time(NaiveTime::MIN));
        }
    } else if let Some(d) = parse_duration(trimmed) {
        return FieldValue::Duration(d);
    }

    FieldValue::String(value.to_string())
}

// H:MM:SS or H:MM with any number of hours; minutes and seconds may overflow
fn parse_duration(value: &str) -> Option<TimeDelta> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let hours = parts[0].parse::<i64>().ok()?;
    let minutes = parts[1].parse::<i64>().ok()?;
    let seconds = match parts.get(2) {
        Some(s) => s.parse::<i64>().ok()?,
        None => 0,
    };
    TimeDelta::try_hours(hours)?
        .checked_add(&TimeDelta::try_minutes(minutes)?)?
        .checked_add(&TimeDelta::try_seconds(seconds)?)
}
