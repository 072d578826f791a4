//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError, FMErrorCode};
use crate::params::{build_script_params, layout_segments, to_query_pairs, Scripts};
use crate::record::Record;
use crate::server::{SendOptions, Server};
use reqwest::Method;
use std::result::Result;
use std::time::Duration;

/// Struct used for deleting a single record.
#[derive(Default, Debug)]
pub struct DeleteRecordRequest {
    pub(crate) layout: String,
    pub(crate) record_id: i64,
    pub(crate) scripts: Option<Scripts>,
    pub(crate) timeout: Option<Duration>,
}

impl DeleteRecordRequest {
    /// Create a new `DeleteRecordRequest` for the record with the given internal id.
    pub fn new(layout: &str, record_id: i64) -> DeleteRecordRequest {
        DeleteRecordRequest {
            layout: layout.to_string(),
            record_id,
            ..Default::default()
        }
    }

    /// Create a request deleting the given record.
    ///
    /// Fails with `RecordError` for records built locally, which have no `recordId`.
    pub fn from_record(layout: &str, record: &Record) -> Result<DeleteRecordRequest, FMError> {
        match record.record_id() {
            Ok(id) => Ok(DeleteRecordRequest::new(layout, id)),
            Err(e) => Err(FMError::new(
                FMErrorCode::RecordError,
                &format!(
                    "cannot delete a record without a valid recordId. Only records fetched from the server can be deleted: {}",
                    e.message
                ),
            )),
        }
    }

    /// Specify the timeout value for the request.
    ///
    /// If not set, the timeout configured for the [`Server`](crate::ServerBuilder::timeout()) is used.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Scripts to run as part of the request.
    pub fn scripts(mut self, scripts: Scripts) -> Self {
        self.scripts = Some(scripts);
        self
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        match &self.scripts {
            Some(s) => to_query_pairs(&build_script_params(s)),
            None => Vec::new(),
        }
    }

    /// Execute the request. Succeeds once the server confirmed the deletion.
    pub async fn execute(&self, server: &Server) -> Result<(), FMError> {
        if self.layout.is_empty() {
            return ia_err!("layout must be non-empty");
        }
        let record_id = self.record_id.to_string();
        let opts = SendOptions {
            method: Method::DELETE,
            segments: layout_segments(&self.layout, &["records", &record_id]),
            query: self.query(),
            timeout: server.get_timeout(&self.timeout),
            ..Default::default()
        };
        server.send(&opts).await?;
        Ok(())
    }
}
