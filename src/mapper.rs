//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Mapping of decoded Data API responses to [`Record`]s and [`Foundset`]s.
//!
//! A response to a get, get-all or find request looks like:
//! ```text
//! { "data": [ { "fieldData": {...},
//!               "portalData": { "<portal>": [ {...}, ... ] },
//!               "recordId": "1", "modId": "0",
//!               "portalDataInfo": [ { "portalObjectName": .., "table": .., .. } ] },
//!             ... ],
//!   "dataInfo": { "foundCount": .., "returnedCount": .., "table": .., .. } }
//! ```
//! Records are built lazily, one row at a time, and the rows of each portal
//! are only built when that portal is first read.

use std::result::Result;
use tracing::trace;

use crate::error::{fm_err, FMError};
use crate::foundset::Foundset;
use crate::record::{Record, MOD_ID, PORTAL_PREFIX, RECORD_ID};
use crate::types::FieldValue;

type JsonMap = serde_json::Map<String, serde_json::Value>;

const DATA: &str = "data";
const DATA_INFO: &str = "dataInfo";
const FIELD_DATA: &str = "fieldData";
const PORTAL_DATA: &str = "portalData";
const PORTAL_DATA_INFO: &str = "portalDataInfo";
const PORTAL_OBJECT_NAME: &str = "portalObjectName";
const TABLE: &str = "table";

/// Map a response into a lazy sequence of records, one per row of its `data` array.
///
/// The shape of the response is checked up front: a missing `data` array, or a
/// row without a `fieldData` object, is a `BadResponse` error. The caller is
/// expected to have checked the response for a server error before.
pub fn map_records(
    response: JsonMap,
    type_conversion: bool,
) -> Result<impl Iterator<Item = Record> + Send + 'static, FMError> {
    let (rows, _) = split_response(response)?;
    Ok(rows
        .into_iter()
        .map(move |row| build_record(row, type_conversion)))
}

/// Map a single-row response (a get request) into its record.
pub fn map_single_record(response: JsonMap, type_conversion: bool) -> Result<Record, FMError> {
    match map_records(response, type_conversion)?.next() {
        Some(r) => Ok(r),
        None => fm_err!(BadResponse, "response contains no record data"),
    }
}

/// Map a response into a [`Foundset`] of records, with the response's
/// `dataInfo` block as its info.
pub fn map_foundset(response: JsonMap, type_conversion: bool) -> Result<Foundset<Record>, FMError> {
    let (rows, info) = split_response(response)?;
    trace!("mapping foundset of {} rows", rows.len());
    Ok(Foundset::with_info(
        rows.into_iter()
            .map(move |row| build_record(row, type_conversion)),
        info,
    ))
}

// Validate the response shape and take out the rows and the data info
fn split_response(mut response: JsonMap) -> Result<(Vec<JsonMap>, JsonMap), FMError> {
    let data = match response.remove(DATA) {
        Some(serde_json::Value::Array(a)) => a,
        Some(other) => {
            return fm_err!(BadResponse, "'{}' in response is not an array: {}", DATA, other)
        }
        None => return fm_err!(BadResponse, "response has no '{}' array", DATA),
    };
    let mut rows = Vec::with_capacity(data.len());
    for (i, row) in data.into_iter().enumerate() {
        match row {
            serde_json::Value::Object(o) if o.get(FIELD_DATA).is_some_and(|f| f.is_object()) => {
                rows.push(o)
            }
            _ => return fm_err!(BadResponse, "row {} in response has no '{}' object", i, FIELD_DATA),
        }
    }
    let info = match response.remove(DATA_INFO) {
        Some(serde_json::Value::Object(o)) => o,
        _ => JsonMap::new(),
    };
    Ok((rows, info))
}

// Build one record: field data, then recordId/modId, then one foundset per portal
fn build_record(mut row: JsonMap, type_conversion: bool) -> Record {
    let mut keys: Vec<String> = Vec::new();
    let mut values: Vec<FieldValue> = Vec::new();

    let mut fields = match row.remove(FIELD_DATA) {
        Some(serde_json::Value::Object(o)) => o,
        _ => JsonMap::new(),
    };
    // Same namespace as the layout fields: an existing field of that name is overwritten
    let record_id = row.remove(RECORD_ID).unwrap_or(serde_json::Value::Null);
    let mod_id = row.remove(MOD_ID).unwrap_or(serde_json::Value::Null);
    fields.insert(RECORD_ID.to_string(), record_id);
    fields.insert(MOD_ID.to_string(), mod_id);

    for (k, v) in fields {
        keys.push(k);
        values.push(FieldValue::from_json(v));
    }

    let mut portal_info = portal_info_by_name(row.remove(PORTAL_DATA_INFO));
    if let Some(serde_json::Value::Object(portals)) = row.remove(PORTAL_DATA) {
        for (name, related) in portals {
            let rows = match related {
                serde_json::Value::Array(a) => a,
                _ => Vec::new(),
            };
            let info = portal_info.remove(&name).unwrap_or_default();
            trace!("attaching portal {} with {} rows", name, rows.len());
            let related_records = rows
                .into_iter()
                .map(move |r| build_portal_record(r, type_conversion));
            keys.push(format!("{}{}", PORTAL_PREFIX, name));
            values.push(FieldValue::Portal(Foundset::with_info(related_records, info)));
        }
    }

    // keys come from a map, so they are unique and match the values
    Record::with_options(keys, values, false, type_conversion).unwrap_or_default()
}

fn build_portal_record(row: serde_json::Value, type_conversion: bool) -> Record {
    let (keys, values): (Vec<String>, Vec<FieldValue>) = match row {
        serde_json::Value::Object(o) => o
            .into_iter()
            .map(|(k, v)| (k, FieldValue::from_json(v)))
            .unzip(),
        _ => (Vec::new(), Vec::new()),
    };
    Record::with_options(keys, values, true, type_conversion).unwrap_or_default()
}

// A portal is identified by its object name or, if it has none, by its table occurrence
fn portal_info_by_name(info: Option<serde_json::Value>) -> std::collections::HashMap<String, JsonMap> {
    let mut by_name = std::collections::HashMap::new();
    if let Some(serde_json::Value::Array(entries)) = info {
        for entry in entries {
            if let serde_json::Value::Object(o) = entry {
                let name = o
                    .get(PORTAL_OBJECT_NAME)
                    .or_else(|| o.get(TABLE))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                if let Some(n) = name {
                    by_name.insert(n, o);
                }
            }
        }
    }
    by_name
}
