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
    build_portal_params, build_script_params, layout_segments, merge_into, to_query_pairs,
    PortalSpec, Scripts, SortSpec,
};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for getting a range of records from a layout.
#[derive(Debug)]
pub struct GetRecordsRequest {
    pub(crate) layout: String,
    pub(crate) offset: u32,
    pub(crate) limit: u32,
    pub(crate) sort: Vec<SortSpec>,
    pub(crate) portals: Vec<PortalSpec>,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) response_layout: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl GetRecordsRequest {
    /// Create a new `GetRecordsRequest` for the first 100 records of a layout.
    pub fn new(layout: &str) -> GetRecordsRequest {
        GetRecordsRequest {
            layout: layout.to_string(),
            offset: 1,
            limit: 100,
            sort: Vec::new(),
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

    /// First record to return, 1-based. The default is 1.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Maximum number of records to return. The default is 100.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sort the records by the given fields, in order.
    pub fn sort(mut self, sort: Vec<SortSpec>) -> Self {
        self.sort = sort;
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

    pub(crate) fn query(&self) -> Result<Vec<(String, String)>, FMError> {
        let mut params = Map::new();
        if !self.portals.is_empty() {
            params = build_portal_params(&self.portals, true);
        }
        params.insert("_offset".to_string(), json!(self.offset));
        params.insert("_limit".to_string(), json!(self.limit));
        if let Some(l) = &self.response_layout {
            params.insert("layout.response".to_string(), Value::String(l.clone()));
        }
        if !self.sort.is_empty() {
            params.insert("_sort".to_string(), Value::String(serde_json::to_string(&self.sort)?));
        }
        if let Some(s) = &self.scripts {
            merge_into(&mut params, build_script_params(s));
        }
        Ok(to_query_pairs(&params))
    }

    /// Execute the request, returning a [`Foundset`] of the records.
    ///
    /// The foundset's [`info()`](Foundset::info()) holds the `dataInfo` block
    /// of the response, with `foundCount`, `returnedCount` and `totalRecordCount`.
    pub async fn execute(&self, server: &Server) -> Result<Foundset<Record>, FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        let opts = SendOptions {
            method: Method::GET,
            segments: layout_segments(&self.layout, &["records"]),
            query: self.query()?,
            timeout: server.get_timeout(&self.timeout),
            retryable: true,
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        map_foundset(resp, server.type_conversion())
    }
}
