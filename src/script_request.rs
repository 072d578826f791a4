//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{ia_err, FMError};
use crate::params::layout_segments;
use crate::server::{code_value, SendOptions, Server};
use reqwest::Method;
use std::result::Result;
use std::time::Duration;

/// Struct used for running a script in the context of a layout.
#[derive(Default, Debug)]
pub struct PerformScriptRequest {
    pub(crate) layout: String,
    pub(crate) script: String,
    pub(crate) param: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl PerformScriptRequest {
    /// Create a new `PerformScriptRequest`.
    pub fn new(layout: &str, script: &str) -> PerformScriptRequest {
        PerformScriptRequest {
            layout: layout.to_string(),
            script: script.to_string(),
            ..Default::default()
        }
    }

    /// Specify the timeout value for the request.
    pub fn timeout(mut self, t: &Duration) -> Self {
        self.timeout = Some(*t);
        self
    }

    /// The script parameter.
    pub fn param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        match &self.param {
            Some(p) => vec![("script.param".to_string(), p.clone())],
            None => Vec::new(),
        }
    }

    /// Execute the request, returning the script error (`Some(0)` if the
    /// script ran without error) and the script result.
    pub async fn execute(&self, server: &Server) -> Result<(Option<i32>, Option<String>), FMError> {
        if self.layout.is_empty() || self.script.is_empty() {
            return ia_err!("layout and script name must be non-empty");
        }
        let opts = SendOptions {
            method: Method::GET,
            segments: layout_segments(&self.layout, &["script", &self.script]),
            query: self.query(),
            timeout: server.get_timeout(&self.timeout),
            ..Default::default()
        };
        let resp = server.send(&opts).await?;
        let script_error = resp.get("scriptError").and_then(code_value);
        let script_result = resp
            .get("scriptResult")
            .and_then(|r| r.as_str())
            .map(|r| r.to_string());
        Ok((script_error, script_result))
    }
}
