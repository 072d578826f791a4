//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! Builder for creating a [`Server`](crate::Server)
//!

use std::default::Default;
use std::env;
use std::result::Result;
use std::time::Duration;

use reqwest::{Certificate, Client};
use serde_derive::Serialize;

use crate::error::{ia_err, FMError};
use crate::file_utils::file_to_string;
use crate::server::Server;

/// Builder used to set all the parameters to create a [`Server`].
///
/// Setters return `Result` so they can be chained with `?`, and later calls
/// override earlier ones:
/// ```no_run
/// # use filemaker_data_api::Server;
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let server = Server::builder()
///     .url("https://fms.example.com")?
///     .database("Contacts")?
///     .credentials("admin", "admin")?
///     // anything set in FMREST_* variables overrides the above
///     .from_environment()?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Clone)]
pub struct ServerBuilder {
    pub(crate) url: String,
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) database: String,
    pub(crate) data_sources: Vec<DataSource>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) add_cert: Option<Certificate>,
    pub(crate) client: Option<Client>,
    pub(crate) accept_invalid_certs: bool,
    pub(crate) type_conversion: bool,
    pub(crate) auto_relogin: bool,
    pub(crate) auto_relogin_timeout: Option<Duration>,
    // For error messaging
    pub(crate) from_environment: bool,
}

/// Credentials for an additional database file the session needs access to,
/// for example for related tables that live in another file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSource {
    pub database: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("data_sources", &self.data_sources.len())
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("type_conversion", &self.type_conversion)
            .field("auto_relogin", &self.auto_relogin)
            .field("auto_relogin_timeout", &self.auto_relogin_timeout)
            .finish()
    }
}

impl ServerBuilder {
    /// Create a new, empty ServerBuilder.
    pub fn new() -> Self {
        ServerBuilder {
            ..Default::default()
        }
    }
    /// Build a new [`Server`].
    ///
    /// This validates the configuration and creates the http client. It does
    /// not contact the server: call [`Server::login()`] (or enable
    /// [`auto_relogin()`](ServerBuilder::auto_relogin())) before sending requests.
    pub fn build(self) -> Result<Server, FMError> {
        Server::new(self)
    }
    /// Gather configuration settings from the current environment.
    ///
    /// | variable | description |
    /// | -------- | ----------- |
    /// | `FMREST_URL` | Server url, see [`ServerBuilder::url()`]. |
    /// | `FMREST_USER` | Account name. |
    /// | `FMREST_PASSWORD` | Account password. |
    /// | `FMREST_AUTH_FILE` | File with `username=`/`password=` lines, see [`ServerBuilder::credentials_from_file()`]. |
    /// | `FMREST_DATABASE` | Database name. |
    /// | `FMREST_CA_CERT` | Path to a `pem` certificate to trust, see [`ServerBuilder::add_cert_from_pemfile()`]. |
    /// | `FMREST_ACCEPT_INVALID_CERTS` | If `1` or `true`, do not verify certificates. |
    /// | `FMREST_TIMEOUT` | Request timeout in seconds. |
    /// | `FMREST_TYPE_CONVERSION` | If `1` or `true`, convert string values, see [`ServerBuilder::type_conversion()`]. |
    pub fn from_environment(mut self) -> Result<Self, FMError> {
        self.from_environment = true;
        if let Ok(val) = env::var("FMREST_URL") {
            self = self.url(&val)?;
        }
        if let Ok(val) = env::var("FMREST_AUTH_FILE") {
            self = self.credentials_from_file(&val)?;
        }
        if let Ok(val) = env::var("FMREST_USER") {
            self.user = val;
        }
        if let Ok(val) = env::var("FMREST_PASSWORD") {
            self.password = val;
        }
        if let Ok(val) = env::var("FMREST_DATABASE") {
            self = self.database(&val)?;
        }
        if let Ok(val) = env::var("FMREST_CA_CERT") {
            self = self.add_cert_from_pemfile(&val)?;
        }
        if let Ok(val) = env::var("FMREST_ACCEPT_INVALID_CERTS") {
            self = self.danger_accept_invalid_certs(is_true(&val))?;
        }
        if let Ok(val) = env::var("FMREST_TIMEOUT") {
            match val.trim().parse::<u64>() {
                Ok(secs) => self = self.timeout(Duration::from_secs(secs))?,
                Err(_) => return ia_err!("invalid value '{}' for FMREST_TIMEOUT", val),
            }
        }
        if let Ok(val) = env::var("FMREST_TYPE_CONVERSION") {
            self = self.type_conversion(is_true(&val))?;
        }
        Ok(self)
    }
    /// Set the address of the FileMaker Server, for example `https://fms.example.com`.
    ///
    /// The Data API is only available over https.
    pub fn url(mut self, url: &str) -> Result<Self, FMError> {
        if !url.starts_with("https") {
            return ia_err!(
                "please use https for url {}, otherwise calls to the Data API will not work",
                url
            );
        }
        self.url = url.trim_end_matches('/').to_string();
        Ok(self)
    }
    /// Set the name of the database (file), without extension.
    pub fn database(mut self, database: &str) -> Result<Self, FMError> {
        self.database = database.to_string();
        Ok(self)
    }
    /// Set the account used to log in.
    ///
    /// The account needs a privilege set with the `fmrest` extended privilege.
    pub fn credentials(mut self, user: &str, password: &str) -> Result<Self, FMError> {
        self.user = user.to_string();
        self.password = password.to_string();
        Ok(self)
    }
    /// Read the login account from a file with one `key=value` pair per line:
    ///```text
    /// username=admin
    /// password=1234567
    ///```
    pub fn credentials_from_file(self, filename: &str) -> Result<Self, FMError> {
        let mut user = String::new();
        let mut pass = String::new();
        let data = file_to_string(filename)?;
        for line in data.lines() {
            if let Some((k, v)) = line.split_once('=') {
                match k.trim() {
                    // values are taken as written: passwords may have spaces
                    "username" => user = v.to_string(),
                    "password" => pass = v.to_string(),
                    _ => {}
                }
            }
        }
        if user.is_empty() {
            return ia_err!("username field missing from auth file {}", filename);
        }
        self.credentials(&user, &pass)
    }
    /// Add credentials for another database file the session must be
    /// authenticated to.
    pub fn data_source(mut self, database: &str, user: &str, password: &str) -> Result<Self, FMError> {
        self.data_sources.push(DataSource {
            database: database.to_string(),
            username: user.to_string(),
            password: password.to_string(),
        });
        Ok(self)
    }
    /// Specify the timeout used for requests. The default is 10 seconds.
    ///
    /// This can be overridden per request.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, FMError> {
        if timeout.is_zero() {
            return ia_err!("timeout must be greater than zero");
        }
        self.timeout = Some(timeout);
        Ok(self)
    }
    /// Trust the certificate in the given `pem` file, for servers using a
    /// custom certificate authority.
    pub fn add_cert_from_pemfile(self, pemfile: &str) -> Result<Self, FMError> {
        let buf = file_to_string(pemfile)?.into_bytes();
        match Certificate::from_pem(&buf) {
            Ok(cert) => self.add_cert(cert),
            Err(e) => ia_err!("error getting certificate from pemfile {}: {}", pemfile, e),
        }
    }
    /// Trust the given certificate.
    pub fn add_cert(mut self, cert: Certificate) -> Result<Self, FMError> {
        self.add_cert = Some(cert);
        Ok(self)
    }
    /// Allow https connections without validating certificates.
    ///
    /// **Warning:** This is only recommended for local testing purposes. See
    /// [`reqwest::ClientBuilder::danger_accept_invalid_certs()`] for details.
    pub fn danger_accept_invalid_certs(mut self, accept_invalid_certs: bool) -> Result<Self, FMError> {
        self.accept_invalid_certs = accept_invalid_certs;
        Ok(self)
    }
    /// Use an existing [`reqwest::Client`] for all connections, instead of
    /// creating a new one. Certificate and timeout settings of this builder
    /// do not apply to a client passed in here, except for per-request timeouts.
    pub fn reqwest_client(mut self, client: &Client) -> Result<Self, FMError> {
        self.client = Some(client.clone());
        Ok(self)
    }
    /// Convert string values of returned records into numbers, timestamps and
    /// durations where they look like one.
    ///
    /// Be cautious: results may differ from what you expect. See
    /// [`convert_string_type()`](crate::convert_string_type()).
    pub fn type_conversion(mut self, type_conversion: bool) -> Result<Self, FMError> {
        self.type_conversion = type_conversion;
        Ok(self)
    }
    /// Log in automatically before a request when there is no session yet, or
    /// when the session is older than
    /// [`auto_relogin_timeout()`](ServerBuilder::auto_relogin_timeout()).
    ///
    /// Reads (get, get-all, find) that fail because the server no longer
    /// accepts the session token (error 952) log in again and are repeated
    /// once. Writes are never repeated.
    pub fn auto_relogin(mut self, auto_relogin: bool) -> Result<Self, FMError> {
        self.auto_relogin = auto_relogin;
        Ok(self)
    }
    /// Maximum age of a session before auto re-login starts a new one. The
    /// default is 14 minutes, just under FileMaker Server's idle timeout.
    pub fn auto_relogin_timeout(mut self, timeout: Duration) -> Result<Self, FMError> {
        self.auto_relogin_timeout = Some(timeout);
        Ok(self)
    }
}

fn is_true(val: &str) -> bool {
    let lv = val.to_lowercase();
    lv == "true" || lv == "1"
}
