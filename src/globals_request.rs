//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::server::{SendOptions, Server};
use crate::types::FieldValue;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::result::Result;
use std::time::Duration;

/// Struct used for setting global fields for the current session.
///
/// Global fields do not need to be placed on a layout. Field names must be
/// fully qualified with their table occurrence, e.g. `Contacts::gSearch`.
#[derive(Default, Debug)]
pub struct SetGlobalsRequest {
    pub(crate) globals: Map<String, Value>,
    pub(crate) timeout: Option<Duration>,
}

impl SetGlobalsRequest {
    pub fn new() -> SetGlobalsRequest {
        Default::default()
    }

    /// Specify the timeout value for the request.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// Set the value of one global field.
    pub fn global(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.globals.insert(name.to_string(), value.into().to_json());
        self
    }

    pub(crate) fn payload(&self) -> Value {
        json!({ "globalFields": self.globals })
    }

    /// Execute the request.
    pub async fn execute(&self, server: &Server) -> Result<(), FMError> {
        if self.globals.is_empty() {
            return ia_err!("no global fields given");
        }
        let opts = SendOptions {
            method: Method::PATCH,
            segments: vec!["globals".to_string()],
            body: Some(self.payload()),
            timeout: server.get_timeout(&self.timeout),
            ..Default::default()
        };
        server.send(&opts).await?;
        Ok(())
    }
}
