//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::params::layout_segments;
use crate::server::Server;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::result::Result;
use std::time::Duration;
use tracing::trace;

/// Struct used for uploading a file into a container field of a record.
#[derive(Default, Debug)]
pub struct UploadContainerRequest {
    pub(crate) layout: String,
    pub(crate) record_id: i64,
    pub(crate) field: String,
    pub(crate) repetition: u32,
    pub(crate) file_name: String,
    pub(crate) mime_type: Option<String>,
    pub(crate) data: Bytes,
    pub(crate) timeout: Option<Duration>,
}

impl UploadContainerRequest {
    /// Create a new `UploadContainerRequest` for a container field of a record.
    pub fn new(layout: &str, record_id: i64, field: &str) -> UploadContainerRequest {
        UploadContainerRequest {
            layout: layout.to_string(),
            record_id,
            field: field.to_string(),
            repetition: 1,
            ..Default::default()
        }
    }

    /// Specify the timeout value for the request.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Name the file is stored under in the container.
    pub fn file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    /// MIME type of the file, for example `image/png`.
    pub fn mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }

    /// Repetition of the container field. The default is 1.
    pub fn repetition(mut self, repetition: u32) -> Self {
        self.repetition = repetition;
        self
    }

    /// The file contents.
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    pub(crate) fn segments(&self) -> Vec<String> {
        let record_id = self.record_id.to_string();
        let repetition = self.repetition.to_string();
        layout_segments(
            &self.layout,
            &["records", &record_id, "containers", &self.field, &repetition],
        )
    }

    /// Execute the request. Uploads are sent as multipart form data, in a
    /// part named `upload`, and are never repeated.
    pub async fn execute(&self, server: &Server) -> Result<(), FMError> {
        if self.layout.is_empty() || self.field.is_empty() {
            return ia_err!("layout and field name must be non-empty");
        }
        if self.file_name.is_empty() {
            return ia_err!("file name must be non-empty");
        }
        let mut part = Part::bytes(self.data.to_vec()).file_name(self.file_name.clone());
        if let Some(m) = &self.mime_type {
            part = part.mime_str(m)?;
        }
        trace!("uploading {} bytes to container {}", self.data.len(), self.field);
        let form = Form::new().part("upload", part);
        server
            .send_multipart(self.segments(), form, server.get_timeout(&self.timeout))
            .await?;
        Ok(())
    }
}
