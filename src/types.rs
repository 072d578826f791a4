//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use std::result::Result;

use crate::error::ia_err;
use crate::error::FMError;
use crate::foundset::Foundset;
use crate::record::Record;

/// Format used by FileMaker for timestamps, both when returning and when accepting data.
pub(crate) const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";
/// Format used by FileMaker for dates.
pub(crate) const DATE_FORMAT: &str = "%m/%d/%Y";

/// A single field value of a FileMaker record.
///
/// The Data API returns most values as JSON strings. Values are kept as they
/// were returned unless type conversion was enabled on the
/// [`ServerBuilder`](crate::ServerBuilder), in which case strings that look like numbers,
/// timestamps or durations are converted once, when the record is built. See
/// [`convert_string_type()`](crate::convert_string_type()).
///
/// Related records from a portal are stored in the parent record as a
/// `FieldValue::Portal`, under the key `portal_<portal name>`.
#[derive(Debug, Clone, Default)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
    /// Any JSON value this library does not interpret (arrays, objects).
    Json(serde_json::Value),
    Portal(Foundset<Record>),
    #[default]
    Null,
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            // NaN equals itself, so setting a field to its own value stays a no-op
            (FieldValue::Double(a), FieldValue::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (FieldValue::Integer(a), FieldValue::Double(b)) => (*a as f64) == *b,
            (FieldValue::Double(a), FieldValue::Integer(b)) => *a == (*b as f64),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a == b,
            (FieldValue::Duration(a), FieldValue::Duration(b)) => a == b,
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::Portal(a), FieldValue::Portal(b)) => a.ptr_eq(b),
            (FieldValue::Null, FieldValue::Null) => true,
            _ => false,
        }
    }
}

impl FieldValue {
    /// Convert a decoded JSON value. Integral numbers become `Integer`, other
    /// numbers `Double`. Arrays and objects are kept as opaque `Json`.
    pub fn from_json(value: serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Boolean(b),
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Double(f)
                } else {
                    FieldValue::Json(serde_json::Value::Number(n))
                }
            }
            other => FieldValue::Json(other),
        }
    }

    /// Convert to JSON for sending back to the server.
    ///
    /// Timestamps are written in FileMaker's `MM/DD/YYYY HH:MM:SS` format and
    /// durations as `H:MM:SS`. A portal is written as an array of its records.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Double(d) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Timestamp(t) => {
                serde_json::Value::String(t.format(TIMESTAMP_FORMAT).to_string())
            }
            FieldValue::Duration(d) => serde_json::Value::String(format_duration(d)),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Portal(fs) => serde_json::Value::Array(
                fs.iter()
                    .map(|r| serde_json::Value::Object(r.to_json(true, true)))
                    .collect(),
            ),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        if let FieldValue::String(s) = self {
            return Some(s);
        }
        None
    }

    /// Get the value as an integer. Strings holding an integer (the way the
    /// Data API returns `recordId` and `modId`) are parsed.
    pub fn as_i64(&self) -> Result<i64, FMError> {
        match self {
            FieldValue::Integer(i) => Ok(*i),
            FieldValue::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(i),
                Err(_) => ia_err!("as_i64: string '{}' is not an integer", s),
            },
            _ => ia_err!("as_i64 called for {:?}", self),
        }
    }

    pub fn as_f64(&self) -> Result<f64, FMError> {
        match self {
            FieldValue::Integer(i) => Ok(*i as f64),
            FieldValue::Double(d) => Ok(*d),
            FieldValue::String(s) => match s.trim().parse::<f64>() {
                Ok(d) => Ok(d),
                Err(_) => ia_err!("as_f64: string '{}' is not a number", s),
            },
            _ => ia_err!("as_f64 called for {:?}", self),
        }
    }

    pub fn as_timestamp(&self) -> Option<&NaiveDateTime> {
        if let FieldValue::Timestamp(t) = self {
            return Some(t);
        }
        None
    }

    pub fn as_duration(&self) -> Option<&TimeDelta> {
        if let FieldValue::Duration(d) = self {
            return Some(d);
        }
        None
    }

    /// Get the related records of a portal field.
    pub fn as_foundset(&self) -> Option<&Foundset<Record>> {
        if let FieldValue::Portal(fs) = self {
            return Some(fs);
        }
        None
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Double(d) => write!(f, "{}", d),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
            FieldValue::Duration(d) => write!(f, "{}", format_duration(d)),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Portal(fs) => write!(f, "{:?}", fs),
            FieldValue::Null => write!(f, ""),
        }
    }
}

// FileMaker time format: hours are not wrapped at 24
pub(crate) fn format_duration(d: &TimeDelta) -> String {
    let total = d.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}
impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}
impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}
impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}
impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i as i64)
    }
}
impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        FieldValue::Double(d)
    }
}
impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}
impl From<NaiveDateTime> for FieldValue {
    fn from(t: NaiveDateTime) -> Self {
        FieldValue::Timestamp(t)
    }
}
impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Timestamp(d.and_time(chrono::NaiveTime::MIN))
    }
}
impl From<TimeDelta> for FieldValue {
    fn from(d: TimeDelta) -> Self {
        FieldValue::Duration(d)
    }
}
impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::from_json(v)
    }
}
impl From<Foundset<Record>> for FieldValue {
    fn from(fs: Foundset<Record>) -> Self {
        FieldValue::Portal(fs)
    }
}
impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(o: Option<T>) -> Self {
        match o {
            Some(v) => v.into(),
            None => FieldValue::Null,
        }
    }
}
