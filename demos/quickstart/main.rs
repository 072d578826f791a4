//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//

// This is an example program showing the basic record operations of the
// FileMaker Data API: it logs in, creates a record, reads it back, changes
// it, finds it, lists the related records of a portal and deletes it again.
//
// It expects a layout "Contacts" with the text fields "name" and "drink",
// and optionally a portal named "notes".

// To run this example:
//    FMREST_URL=https://fms.example.com FMREST_DATABASE=Contacts \
//    FMREST_USER=admin FMREST_PASSWORD=admin cargo run --example quickstart
//
// for extra output:
//    RUST_LOG=debug cargo run --example quickstart
//
// or, for a LOT of tracing output:
//    RUST_LOG=trace cargo run --example quickstart

use filemaker_data_api::{
    CreateRecordRequest, DeleteRecordRequest, EditRecordRequest, FMError, FindRequest,
    GetRecordRequest, GetRecordsRequest, PortalSpec, Scripts, Server, SortSpec,
};
use serde_json::json;
use std::error::Error;
use std::time::Duration;
use tracing::info;

const LAYOUT: &str = "Contacts";

// This method shows various ways to configure a Server.
fn get_server() -> Result<Server, FMError> {
    // Note: later methods called on this builder will override earlier methods.
    // This allows for setting desired defaults that can be overridden by, for example,
    // .from_environment().
    Server::builder()
        .url("https://localhost")?
        .database("Contacts")?
        //
        // Credentials, directly or from a file with username=/password= lines:
        // .credentials("admin", "admin")?
        // .credentials_from_file("~/.fmrest/auth")?
        //
        // For servers with a self-signed certificate:
        // .add_cert_from_pemfile("/path/to/certificate.pem")?
        //
        // To read all of the above from environment variables:
        // or, to override above from environment;
        .from_environment()?
        //
        // Optional: set a different default timeout (default is 10 seconds)
        .timeout(Duration::from_secs(15))?
        //
        // Optional: convert strings like "42" or "12/24/2016" into typed values
        .type_conversion(true)?
        //
        // Build the server
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set up a tracing subscriber to see output based on RUST_LOG environment setting
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_ansi(false)
        .compact()
        .init();

    // Create a server. This should be used throughout the program
    info!("Creating new server...");
    let server = get_server()?;
    server.login().await?;

    // Create a record
    let created = CreateRecordRequest::new(LAYOUT)
        .field("name", "Jane")
        .field("drink", "Water")
        .execute(&server)
        .await?;
    println!("CreateRecordResult={:?}", created);
    let record_id = created
        .record_id()
        .ok_or("CreateRecordRequest should have returned a record id, but did not")?;

    // Get the record back
    let mut record = GetRecordRequest::new(LAYOUT, record_id)
        .execute(&server)
        .await?;
    println!("{}", record);
    for (name, value) in record.iter() {
        println!("  {} = {}", name, value);
    }

    // Change one field and write back only that field, checking that nobody
    // else changed the record in the meantime
    record.set("drink", "Coffee")?;
    let edited = EditRecordRequest::from_record(LAYOUT, &record, true)?
        .execute(&server)
        .await?;
    println!("EditRecordResult={:?}", edited);

    // Find it, running a script after the find
    let query = vec![json!({"name": "==Jane"}).as_object().cloned().unwrap_or_default()];
    let found = FindRequest::new(LAYOUT, query)
        .sort(vec![SortSpec::ascend("name")])
        .scripts(Scripts::new().after("Log Find", Some("Jane")))
        .execute(&server)
        .await;
    match found {
        Ok(fs) => {
            println!("found {:?} records", fs.found_count());
            for r in &fs {
                println!("  {} drink={}", r, r.get("drink")?);
            }
        }
        // 104: the script does not exist in this database
        Err(e) if e.server_code == Some(104) => println!("no 'Log Find' script: {}", e),
        Err(e) => return Err(e.into()),
    }
    println!("script results: {:?}", server.last_script_result());

    // List a few records with their related notes
    let all = GetRecordsRequest::new(LAYOUT)
        .limit(3)
        .portals(vec![PortalSpec::new("notes").limit(2)])
        .execute(&server)
        .await;
    match all {
        Ok(fs) => {
            for r in &fs {
                println!("{}", r);
                if let Ok(notes) = r.portal("notes") {
                    for note in &notes {
                        println!("    note {}", note);
                    }
                }
            }
        }
        Err(e) => println!("GetRecordsRequest failed: {}", e),
    }

    // Delete the record
    DeleteRecordRequest::from_record(LAYOUT, &record)?
        .execute(&server)
        .await?;
    println!("deleted record {}", record_id);

    server.logout().await?;
    Ok(())
}
