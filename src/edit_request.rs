//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError, FMErrorCode};
use crate::params::{build_script_params, int_value, layout_segments, merge_into, Scripts};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use crate::types::FieldValue;
use reqwest::Method;
use serde_json::{Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for changing the fields of an existing record.
#[derive(Default, Debug)]
pub struct EditRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: i64,
    pub(crate) field_data: Map<String, Value>,
    pub(crate) mod_id: Option<i64>,
    pub(crate) portals: Map<String, Value>,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) timeout: Option<Duration>,
}

/// Struct representing the result of an [`EditRecordRequest`] operation.
#[derive(Default, Debug)]
pub struct EditRecordResult {
    pub(crate) mod_id: Option<i64>,
}

impl EditRecordResult {
    /// The modification id of the record after the edit.
    pub fn mod_id(&self) -> Option<i64> {
        self.mod_id
    }
}

impl EditRecordRequest {
    /// Create a new `EditRecordRequest` for the record with the given internal id.
    pub fn new(layout: &str, record_id: i64) -> EditRecordRequest {
        EditRecordRequest {
            layout: layout.to_string(),
            record_id,
            ..Default::default()
        }
    }

    /// Create a request that writes back the changes made to a record with
    /// [`Record::set()`]. Only modified fields are sent.
    ///
    /// With `validate_mod_id`, the record's modification id is sent too, and
    /// the server rejects the edit (error 306) if the record was changed by
    /// someone else in the meantime.
    ///
    /// Fails with `RecordError` for records that were not fetched from the
    /// server and so have no `recordId`.
    pub fn from_record(
        layout: &str,
        record: &Record,
        validate_mod_id: bool,
    ) -> Result<EditRecordRequest, FMError> {
        let record_id = record.record_id().map_err(|e| {
            FMError::new(
                FMErrorCode::RecordError,
                &format!("cannot edit a record without a valid recordId: {}", e.message),
            )
        })?;
        let field_data = record
            .modifications()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        let mut req = EditRecordRequest::new(layout, record_id).field_data(field_data);
        if validate_mod_id {
            req.mod_id = record.modification_id()?;
        }
        Ok(req)
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the timeout configured for the [`Server`](crate::ServerBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Set all changed field values at once, as `{field name: value}`.
    pub fn field_data(mut self, field_data: Map<String, Value>) -> Self {
        self.field_data = field_data;
        self
    }

    /// Set the new value of one field.
    pub fn field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.field_data.insert(name.to_string(), value.into().to_json());
        self
    }

    /// Only apply the edit if the record's modification id still matches.
    pub fn mod_id(mut self, mod_id: i64) -> Self {
        self.mod_id = Some(mod_id);
        self
    }

    /// Related records to change or add, as `{portal name: [{...}, ...]}`.
    /// Existing related records are identified by a `recordId` entry.
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
        if let Some(m) = self.mod_id {
            body.insert("modId".to_string(), Value::String(m.to_string()));
        }
        if !self.portals.is_empty() {
            body.insert("portalData".to_string(), Value::Object(self.portals.clone()));
        }
        if let Some(s) = &self.scripts {
            merge_into(&mut body, build_script_params(s));
        }
        Value::Object(body)
    }

    /// Execute the request, returning an [`EditRecordResult`].
    ///
    /// A rejected modification id is reported as a `FileMakerError`, see
    /// [`FMError::is_mod_id_mismatch()`]. Edits are never repeated.
    pub async fn execute(&self, server: &Server) -> Result<EditRecordResult, FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        let record_id = self.record_id.to_string();
        let opts = SendOptions {
            method: Method::PATCH,
            segments: layout_segments(&self.layout, &["records", &record_id]),
            body: Some(self.payload()),
            timeout: server.get_timeout(&self.timeout),
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        Ok(EditRecordResult {
            mod_id: resp.get("modId").and_then(int_value),
        })
    }
}
