//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use serde_derive::Serialize;
use serde_json::{json, Map, Value};

/// Selects a portal to be returned with records, and the range of its related records.
#[derive(Debug, Clone, PartialEq)]
pub struct PortalSpec {
    /// Object name of the portal on the layout.
    pub name: String,
    /// First related record to return, 1-based. Default 1.
    pub offset: u32,
    /// Maximum number of related records to return. Default 50.
    pub limit: u32,
}

impl PortalSpec {
    pub fn new(name: &str) -> PortalSpec {
        PortalSpec {
            name: name.to_string(),
            offset: 1,
            limit: 50,
        }
    }
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Scripts to run as part of a request.
///
/// Each entry is a script name and an optional script parameter. `prerequest`
/// runs before the request is processed, `presort` after the records are found
/// but before they are sorted, and `after` once the request is done.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scripts {
    pub prerequest: Option<(String, Option<String>)>,
    pub presort: Option<(String, Option<String>)>,
    pub after: Option<(String, Option<String>)>,
}

impl Scripts {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn prerequest(mut self, name: &str, param: Option<&str>) -> Self {
        self.prerequest = Some((name.to_string(), param.map(|p| p.to_string())));
        self
    }
    pub fn presort(mut self, name: &str, param: Option<&str>) -> Self {
        self.presort = Some((name.to_string(), param.map(|p| p.to_string())));
        self
    }
    pub fn after(mut self, name: &str, param: Option<&str>) -> Self {
        self.after = Some((name.to_string(), param.map(|p| p.to_string())));
        self
    }
}

/// Sort order for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    /// `ascend`, `descend`, or the name of a value list.
    #[serde(rename = "sortOrder")]
    pub sort_order: String,
}

impl SortSpec {
    pub fn ascend(field_name: &str) -> SortSpec {
        SortSpec::new(field_name, "ascend")
    }
    pub fn descend(field_name: &str) -> SortSpec {
        SortSpec::new(field_name, "descend")
    }
    pub fn new(field_name: &str, sort_order: &str) -> SortSpec {
        SortSpec {
            field_name: field_name.to_string(),
            sort_order: sort_order.to_string(),
        }
    }
}

/// Build the portal parameters the Data API expects, such as
/// `portal=["Portal1", "Portal2"]&_offset.Portal1=1&_limit.Portal1=10`.
///
/// With `names_as_string` (query parameters of GET requests), the portal
/// list is rendered as a string and the range keys get a `_` prefix.
/// Otherwise (JSON bodies of find requests), the list is a JSON array.
pub fn build_portal_params(portals: &[PortalSpec], names_as_string: bool) -> Map<String, Value> {
    let mut params = Map::new();
    let names: Vec<&str> = portals.iter().map(|p| p.name.as_str()).collect();
    let prefix = if names_as_string {
        let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
        params.insert(
            "portal".to_string(),
            Value::String(format!("[{}]", quoted.join(", "))),
        );
        "_"
    } else {
        params.insert("portal".to_string(), json!(names));
        ""
    };
    for p in portals {
        params.insert(format!("{}offset.{}", prefix, p.name), json!(p.offset));
        params.insert(format!("{}limit.{}", prefix, p.name), json!(p.limit));
    }
    params
}

/// Build the script parameters the Data API expects. Only scripts and
/// parameters that are given are included.
pub fn build_script_params(scripts: &Scripts) -> Map<String, Value> {
    let mut params = Map::new();
    let entries = [
        (&scripts.prerequest, "script.prerequest"),
        (&scripts.presort, "script.presort"),
        (&scripts.after, "script"),
    ];
    for (entry, key) in entries {
        if let Some((name, param)) = entry {
            params.insert(key.to_string(), Value::String(name.clone()));
            if let Some(p) = param {
                params.insert(format!("{}.param", key), Value::String(p.clone()));
            }
        }
    }
    params
}

/// Get the file name from a container url. The Data API does not always
/// include an extension, so the last path segment is used as is.
pub fn filename_from_url(url: &str) -> String {
    let path = url.split('?').next().unwrap_or("");
    path.rsplit('/').next().unwrap_or("").to_string()
}

// Query parameters are sent as strings; string values without their JSON quotes
pub(crate) fn to_query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (k.clone(), s)
        })
        .collect()
}

// Path below the database for a layout: layouts/{layout}/{rest...}
pub(crate) fn layout_segments(layout: &str, rest: &[&str]) -> Vec<String> {
    let mut segments = vec!["layouts".to_string(), layout.to_string()];
    segments.extend(rest.iter().map(|s| s.to_string()));
    segments
}

// Ids come back as strings ("12"); accept numbers too
pub(crate) fn int_value(v: &Value) -> Option<i64> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

pub(crate) fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (k, v) in source {
        target.insert(k, v);
    }
}
