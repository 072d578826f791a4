//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
//! FileMaker Data API Rust SDK
//!
//! This is a Rust client for the FileMaker Data API, the REST interface of
//! [Claris FileMaker Server](https://www.claris.com/filemaker/server/). It lets
//! applications log into a hosted FileMaker database and create, read, edit,
//! find and delete records, run scripts, upload container data and set
//! global fields.
//!
//! This SDK supplies and uses Rust `async` methods throughout, using the [tokio](https://crates.io/crates/tokio) runtime. There is currently no blocking support.
//!
//! The general flow for an application using the Data API is:
//! - Create a [`ServerBuilder`] with all needed parameters
//! - Create a [`Server`] from the [`ServerBuilder`] that will be used throughout the application, across all tasks
//! - Log in with [`Server::login()`], or turn on [`ServerBuilder::auto_relogin()`]
//! - Interact with the database using the [`Server`] and Request structs such as [`GetRecordRequest`], [`FindRequest`], [`EditRecordRequest`], etc.
//!
//! ## Simple Example
//! The following code creates a [`Server`] from values in the current environment and then reads a single record.
//! ```no_run
//! use filemaker_data_api::{GetRecordRequest, Server};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!     let server = Server::builder()
//!         .from_environment()?
//!         .auto_relogin(true)?
//!         .build()?;
//!     let record = GetRecordRequest::new("Contacts", 1)
//!         .execute(&server)
//!         .await?;
//!     println!("{} name={}", record, record.get("name")?);
//!     Ok(())
//! }
//! ```
//!
//! ## Records, foundsets and portals
//!
//! A [`Record`] holds the fields placed on the layout, in layout order, plus
//! `recordId` and `modId`. Values are [`FieldValue`]s; with
//! [`ServerBuilder::type_conversion()`] the strings FileMaker returns are
//! converted into numbers, timestamps and durations where possible (see
//! [`convert_string_type()`]).
//!
//! Requests returning several records give a [`Foundset`]. Records in a
//! foundset are built from the response only when they are first read, and
//! are cached after that: a foundset can be iterated any number of times,
//! also from several tasks at once. The related records of each portal on
//! the layout are a foundset of their own, stored in the record under
//! `portal_<portal name>` and available through [`Record::portal()`].
//!
//! ```no_run
//! # use filemaker_data_api::{FindRequest, PortalSpec, Server};
//! # use serde_json::json;
//! # async fn run(server: &Server) -> Result<(), Box<dyn std::error::Error>> {
//! let query = vec![json!({"company": "Claris"}).as_object().cloned().unwrap_or_default()];
//! let foundset = FindRequest::new("Contacts", query)
//!     .portals(vec![PortalSpec::new("notes").limit(5)])
//!     .execute(server)
//!     .await?;
//! for record in &foundset {
//!     for note in &record.portal("notes")? {
//!         println!("{}: {}", record.get("name")?, note.get("Notes::text")?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Changing records
//!
//! Changes made with [`Record::set()`] are tracked, and
//! [`EditRecordRequest::from_record()`] sends only the changed fields.
//! Records read from a [`Foundset`] are copies; to change the records the
//! foundset itself holds, use [`Foundset::update()`] or
//! [`Foundset::update_all()`].
//! Portal fields cannot be set through a record; related records are
//! written with the `portals` payload of [`EditRecordRequest::portals()`].
//!
//! ## Configuring the SDK
//!
//! All settings can be given to the [`ServerBuilder`] directly, or taken from
//! `FMREST_*` environment variables with [`ServerBuilder::from_environment()`].
//! The Data API is only served over https. If the server uses a certificate that is
//! not trusted by the default system CA, use [`ServerBuilder::add_cert_from_pemfile()`]
//! or, for local testing only, [`ServerBuilder::danger_accept_invalid_certs()`].
//!
//! ## Logging
//!
//! The SDK logs through [tracing](https://crates.io/crates/tracing): sessions
//! at `debug` level, requests and lazy record mapping at `trace` level. Session
//! tokens and passwords are never logged.
//!
//! ## Quickstart
//!
//! A complete program can be found in `demos/quickstart/main.rs`. To run it:
//! ```text
//! FMREST_URL=https://fms.example.com FMREST_DATABASE=Contacts \
//! FMREST_USER=admin FMREST_PASSWORD=admin cargo run --example quickstart
//! ```
//!
//! ## License
//!
//! This SDK is licensed under the Universal Permissive License 1.0.
//!

pub(crate) mod container_request;
pub use crate::container_request::UploadContainerRequest;

pub(crate) mod conversion;
pub use crate::conversion::convert_string_type;

pub(crate) mod create_request;
pub use crate::create_request::{CreateRecordRequest, CreateRecordResult};

pub(crate) mod delete_request;
pub use crate::delete_request::DeleteRecordRequest;

pub(crate) mod edit_request;
pub use crate::edit_request::{EditRecordRequest, EditRecordResult};

pub(crate) mod error;
pub use crate::error::{FMError, FMErrorCode, FMSErrorCode};

pub(crate) mod file_utils;

pub(crate) mod find_request;
pub use crate::find_request::FindRequest;

pub(crate) mod foundset;
pub use crate::foundset::{Foundset, FoundsetIter};

pub(crate) mod get_records_request;
pub use crate::get_records_request::GetRecordsRequest;

pub(crate) mod get_request;
pub use crate::get_request::GetRecordRequest;

pub(crate) mod globals_request;
pub use crate::globals_request::SetGlobalsRequest;

pub mod mapper;

pub mod params;
pub use crate::params::{PortalSpec, Scripts, SortSpec};

pub(crate) mod record;
pub use crate::record::{Record, PORTAL_PREFIX};

pub(crate) mod script_request;
pub use crate::script_request::PerformScriptRequest;

pub(crate) mod server;
pub use crate::server::{FetchedFile, ScriptResult, Server};

pub(crate) mod server_builder;
pub use crate::server_builder::{DataSource, ServerBuilder};

pub mod types;
pub use crate::types::FieldValue;

#[cfg(test)]
pub(crate) mod conversion_tests;
#[cfg(test)]
pub(crate) mod foundset_tests;
#[cfg(test)]
pub(crate) mod record_tests;
#[cfg(test)]
pub(crate) mod request_tests;
