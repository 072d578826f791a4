//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::params::{build_script_params, int_value, layout_segments, merge_into, Scripts};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use crate::types::FieldValue;
use reqwest::Method;
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for creating a new record on a layout.
#[derive(Default, Debug)]
pub struct CreateRecordRequest {
    pub(crate) layout: String,
    pub(crate) field_data: Map<String, Value>,
    pub(crate) portals: Map<String, Value>,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) timeout: Option<Duration>,
}

/// Struct representing the result of a [`CreateRecordRequest`] operation.
#[derive(Default, Debug)]
pub struct CreateRecordResult {
    pub(crate) record_id: Option<i64>,
    pub(crate) mod_id: Option<i64>,
}

impl CreateRecordResult {
    /// The internal id of the new record.
    pub fn record_id(&self) -> Option<i64> {
        self.record_id
    }
    /// The modification id of the new record.
    pub fn mod_id(&self) -> Option<i64> {
        self.mod_id
    }
}

impl CreateRecordRequest {
    /// Create a new `CreateRecordRequest`.
    ///
    /// `layout` is required and must be non-empty.
    pub fn new(layout: &str) -> CreateRecordRequest {
        CreateRecordRequest {
            layout: layout.to_string(),
            ..Default::default()
        }
    }

    /// Create a request from the fields of a record.
    ///
    /// Portal fields and the `recordId`/`modId` fields are not sent, so a
    /// record fetched from the server can be used to create a copy of it.
    pub fn from_record(layout: &str, record: &Record) -> CreateRecordRequest {
        CreateRecordRequest::new(layout).field_data(record.to_json(false, false))
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the timeout configured for the [`Server`](crate::ServerBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Set all field values at once, as `{field name: value}`.
    pub fn field_data(mut self, field_data: Map<String, Value>) -> Self {
        self.field_data = field_data;
        self
    }

    /// Set the value of one field.
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.field_data.insert(name.to_string(), value.into().to_json());
        self
    }

    /// Related records to create along with the record, as
    /// `{portal name: [{"Table::field": value, ...}, ...]}`.
    pub fn portals(mut self, portals: Map<String, Value>) -> Self {
        self.portals = portals;
        self
    }

    /// Scripts to run as part of the request.
    pub fn scripts(mut self, scripts: Scripts) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub(crate) fn payload(&self) -> Value {
        let mut body = Map::new();
        body.insert("fieldData".to_string(), Value::Object(self.field_data.clone()));
        if !self.portals.is_empty() {
            body.insert("portalData".to_string(), Value::Object(self.portals.clone()));
        }
        if let Some(s) = &self.scripts {
            merge_into(&mut body, build_script_params(s));
        }
        Value::Object(body)
    }

    /// Execute the request, returning a [`CreateRecordResult`].
    ///
    /// Creating a record is never repeated, not even with auto re-login.
    pub async fn execute(&self, server: &Server) -> Result<CreateRecordResult, FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        let opts = SendOptions {
            method: Method::POST,
            segments: layout_segments(&self.layout, &["records"]),
            body: Some(self.payload()),
            timeout: server.get_timeout(&self.timeout),
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        Ok(CreateRecordResult {
            record_id: resp.get("recordId").and_then(int_value),
            mod_id: resp.get("modId").and_then(int_value),
        })
    }
}
