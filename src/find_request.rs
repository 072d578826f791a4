//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::foundset::Foundset;
use crate::mapper::map_foundset;
use crate::params::{
    build_portal_params, build_script_params, layout_segments, merge_into, PortalSpec, Scripts,
    SortSpec,
};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use reqwest::Method;
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for finding records with one or more find requests.
///
/// Each entry of the query is one find request, as `{field name: criteria}`.
/// Entries are combined with OR; an entry containing `"omit": "true"`
/// removes its matches from the found set:
/// ```no_run
/// # use filemaker_data_api::{FindRequest, Server, SortSpec};
/// # use serde_json::json;
/// # async fn run(server: &Server) -> Result<(), Box<dyn std::error::Error>> {
/// let query = vec![
///     json!({"drink": "Coffee"}).as_object().cloned().unwrap_or_default(),
///     json!({"id": "4", "omit": "true"}).as_object().cloned().unwrap_or_default(),
/// ];
/// let foundset = FindRequest::new("Contacts", query)
///     .sort(vec![SortSpec::descend("id")])
///     .execute(server)
///     .await?;
/// println!("found {:?} records", foundset.found_count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FindRequest {
    pub(crate) layout: String,
    pub(crate) query: Vec<Map<String, Value>>,
    pub(crate) sort: Vec<SortSpec>,
    pub(crate) offset: u32,
    pub(crate) limit: u32,
    pub(crate) portals: Vec<PortalSpec>,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) response_layout: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl FindRequest {
    /// Create a new `FindRequest` returning the first 100 matching records.
    pub fn new(layout: &str, query: Vec<Map<String, Value>>) -> FindRequest {
        FindRequest {
            layout: layout.to_string(),
            query,
            sort: Vec::new(),
            offset: 1,
            limit: 100,
            portals: Vec::new(),
            scripts: None,
            response_layout: None,
            timeout: None,
        }
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the timeout configured for the [`Server`](crate::ServerBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Sort the found records by the given fields, in order.
    pub fn sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// First matching record to return, 1-based. The default is 1.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Maximum number of records to return. The default is 100.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Portals to include in each record.
    pub fn portals(mut self, portals: Vec<PortalSpec>) -> Self {
        self.portals = portals;
        self
    }

    /// Scripts to run as part of the request.
    pub fn scripts(mut self, scripts: Scripts) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Return the records as they appear on a different layout.
    pub fn response_layout(mut self, layout: &str) -> Self {
        self.response_layout = Some(layout.to_string());
        self
    }

    pub(crate) fn payload(&self) -> Result<Value, FMError> {
        let mut body = Map::new();
        body.insert(
            "query".to_string(),
            Value::Array(self.query.iter().cloned().map(Value::Object).collect()),
        );
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), serde_json::to_value(&self.sort)?);
        }
        // limit and offset are sent as strings in find bodies
        body.insert("limit".to_string(), Value::String(self.limit.to_string()));
        body.insert("offset".to_string(), Value::String(self.offset.to_string()));
        if let Some(l) = &self.response_layout {
            body.insert("layout.response".to_string(), Value::String(l.clone()));
        }
        if let Some(s) = &self.scripts {
            merge_into(&mut body, build_script_params(s));
        }
        if !self.portals.is_empty() {
            merge_into(&mut body, build_portal_params(&self.portals, false));
        }
        // the Data API rejects null values
        body.retain(|_, v| !v.is_null());
        Ok(Value::Object(body))
    }

    /// Execute the request, returning a [`Foundset`] of the matching records.
    ///
    /// Note that FileMaker reports an empty result as an error: a
    /// `FileMakerError` with code 401.
    pub async fn execute(&self, server: &Server) -> Result<Foundset<Record>, FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        if self.query.is_empty() {
            return ia_err!("find query must contain at least one request");
        }
        let opts = SendOptions {
            method: Method::POST,
            segments: layout_segments(&self.layout, &["_find"]),
            body: Some(self.payload()?),
            timeout: server.get_timeout(&self.timeout),
            retryable: true,
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        map_foundset(resp, server.type_conversion())
    }
}
