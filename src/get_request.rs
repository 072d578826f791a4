//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::mapper::map_single_record;
use crate::params::{
    build_portal_params, build_script_params, layout_segments, merge_into, to_query_pairs,
    PortalSpec, Scripts,
};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use reqwest::Method;
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for getting a single record by its internal id.
#[derive(Default, Debug)]
pub struct GetRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: i64,
    pub(crate) portals: Vec<PortalSpec>,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) response_layout: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl GetRecordRequest {
    /// Create a new `GetRecordRequest`.
    ///
    /// `layout` is required and must be non-empty.
    pub fn new(layout: &str, record_id: i64) -> GetRecordRequest {
        GetRecordRequest {
            layout: layout.to_string(),
            record_id,
            ..Default::default()
        }
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the timeout configured for the [`Server`](crate::ServerBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Portals to include in the record. If none are given, the server
    /// returns all portals on the layout.
    pub fn portals(mut self, portals: Vec<PortalSpec>) -> Self {
        self.portals = portals;
        self
    }

    /// Scripts to run as part of the request.
    pub fn scripts(mut self, scripts: Scripts) -> Self {
        self.scripts = Some(scripts);
        self
    }

    /// Return the record as it appears on a different layout.
    pub fn response_layout(mut self, layout: &str) -> Self {
        self.response_layout = Some(layout.to_string());
        self
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut params = Map::new();
        if !self.portals.is_empty() {
            params = build_portal_params(&self.portals, true);
        }
        if let Some(l) = &self.response_layout {
            params.insert("layout.response".to_string(), Value::String(l.clone()));
        }
        if let Some(s) = &self.scripts {
            merge_into(&mut params, build_script_params(s));
        }
        to_query_pairs(&params)
    }

    /// Execute the request, returning the [`Record`].
    ///
    /// A record id that does not exist is reported by the server as a
    /// `FileMakerError` with code 101.
    pub async fn execute(&self, server: &Server) -> Result<Record, FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        let record_id = self.record_id.to_string();
        let opts = SendOptions {
            method: Method::GET,
            segments: layout_segments(&self.layout, &["records", &record_id]),
            query: self.query(),
            timeout: server.get_timeout(&self.timeout),
            retryable: true,
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        map_single_record(resp, server.type_conversion())
    }
}
