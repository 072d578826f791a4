//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{FMErrorCode, FMSErrorCode};
use crate::params::{PortalSpec, Scripts, SortSpec};
use crate::record::Record;
use crate::server::{parse_response_data, Server};
use crate::types::FieldValue;
use crate::{
    CreateRecordRequest, DeleteRecordRequest, EditRecordRequest, FindRequest, GetRecordRequest,
    GetRecordsRequest, PerformScriptRequest, SetGlobalsRequest, UploadContainerRequest,
};
use serde_json::json;
use std::error::Error;
use std::io::Write;
use std::result::Result;
use std::time::Duration;

fn test_server() -> Result<Server, Box<dyn Error>> {
    Ok(Server::builder()
        .url("https://fms.example.com/")?
        .database("My DB")?
        .credentials("admin", "secret")?
        .build()?)
}

fn fetched_record() -> Result<Record, Box<dyn Error>> {
    Ok(Record::new(
        vec!["name", "drink", "recordId", "modId"],
        vec!["David", "Coffee", "12", "3"],
    )?)
}

#[test]
fn test_create_payload() -> Result<(), Box<dyn Error>> {
    let req = CreateRecordRequest::new("Contacts")
        .field("name", "Ann")
        .field("age", 31)
        .scripts(Scripts::new().after("log", Some("x")));
    assert_eq!(
        req.payload(),
        json!({
            "fieldData": {"name": "Ann", "age": 31},
            "script": "log",
            "script.param": "x"
        })
    );

    // a copy of a fetched record leaves out its ids
    let req = CreateRecordRequest::from_record("Contacts", &fetched_record()?);
    assert_eq!(
        req.payload(),
        json!({"fieldData": {"name": "David", "drink": "Coffee"}})
    );

    let portals = json!({"notes": [{"Notes::text": "hi"}]});
    let req = CreateRecordRequest::new("Contacts")
        .portals(portals.as_object().cloned().ok_or("not an object")?);
    assert_eq!(req.payload()["portalData"], portals);
    Ok(())
}

#[test]
fn test_edit_from_record() -> Result<(), Box<dyn Error>> {
    let mut r = fetched_record()?;
    r.set("drink", "Tea")?;
    let req = EditRecordRequest::from_record("Contacts", &r, false)?;
    assert_eq!(req.record_id, 12);
    assert_eq!(req.payload(), json!({"fieldData": {"drink": "Tea"}}));

    let req = EditRecordRequest::from_record("Contacts", &r, true)?;
    assert_eq!(
        req.payload(),
        json!({"fieldData": {"drink": "Tea"}, "modId": "3"})
    );

    let local = Record::new(vec!["name"], vec!["x"])?;
    let err = EditRecordRequest::from_record("Contacts", &local, false).unwrap_err();
    assert_eq!(err.code, FMErrorCode::RecordError);
    Ok(())
}

#[test]
fn test_edit_payload() -> Result<(), Box<dyn Error>> {
    let req = EditRecordRequest::new("Contacts", 4)
        .field("when", chrono::NaiveDate::from_ymd_opt(2024, 2, 29).ok_or("bad date")?)
        .mod_id(0);
    assert_eq!(
        req.payload(),
        json!({"fieldData": {"when": "02/29/2024 00:00:00"}, "modId": "0"})
    );
    Ok(())
}

#[test]
fn test_delete_request() -> Result<(), Box<dyn Error>> {
    let req = DeleteRecordRequest::from_record("Contacts", &fetched_record()?)?;
    assert_eq!(req.record_id, 12);
    assert!(req.query().is_empty());

    let req = req.scripts(Scripts::new().prerequest("check", None));
    assert_eq!(
        req.query(),
        vec![("script.prerequest".to_string(), "check".to_string())]
    );

    let local = Record::new(vec!["name"], vec!["x"])?;
    let err = DeleteRecordRequest::from_record("Contacts", &local).unwrap_err();
    assert_eq!(err.code, FMErrorCode::RecordError);
    Ok(())
}

#[test]
fn test_get_record_query() -> Result<(), Box<dyn Error>> {
    let req = GetRecordRequest::new("Contacts", 1);
    assert!(req.query().is_empty());

    let req = GetRecordRequest::new("Contacts", 1)
        .portals(vec![PortalSpec::new("notes").limit(5)])
        .response_layout("Contacts Detail");
    let q = req.query();
    assert!(q.contains(&("portal".to_string(), "[\"notes\"]".to_string())));
    assert!(q.contains(&("_limit.notes".to_string(), "5".to_string())));
    assert!(q.contains(&("layout.response".to_string(), "Contacts Detail".to_string())));
    Ok(())
}

#[test]
fn test_get_records_query() -> Result<(), Box<dyn Error>> {
    let q = GetRecordsRequest::new("Contacts").query()?;
    assert_eq!(
        q,
        vec![
            ("_offset".to_string(), "1".to_string()),
            ("_limit".to_string(), "100".to_string())
        ]
    );

    let q = GetRecordsRequest::new("Contacts")
        .offset(11)
        .limit(10)
        .sort(vec![SortSpec::descend("id")])
        .query()?;
    assert!(q.contains(&("_offset".to_string(), "11".to_string())));
    assert!(q.contains(&(
        "_sort".to_string(),
        r#"[{"fieldName":"id","sortOrder":"descend"}]"#.to_string()
    )));
    Ok(())
}

#[test]
fn test_find_payload() -> Result<(), Box<dyn Error>> {
    let query = vec![json!({"name": "=David"}).as_object().cloned().ok_or("not an object")?];
    let req = FindRequest::new("Contacts", query);
    assert_eq!(
        req.payload()?,
        json!({"query": [{"name": "=David"}], "limit": "100", "offset": "1"})
    );

    let query = vec![json!({"id": "1...5"}).as_object().cloned().ok_or("not an object")?];
    let body = FindRequest::new("Contacts", query)
        .sort(vec![SortSpec::ascend("id")])
        .limit(2)
        .portals(vec![PortalSpec::new("notes")])
        .scripts(Scripts::new().presort("s", None))
        .payload()?;
    assert_eq!(body["sort"], json!([{"fieldName": "id", "sortOrder": "ascend"}]));
    assert_eq!(body["limit"], json!("2"));
    assert_eq!(body["portal"], json!(["notes"]));
    assert_eq!(body["offset.notes"], json!(1));
    assert_eq!(body["script.presort"], json!("s"));
    assert!(body.get("layout.response").is_none());
    assert!(body.as_object().ok_or("not an object")?.values().all(|v| !v.is_null()));
    Ok(())
}

#[test]
fn test_other_requests() -> Result<(), Box<dyn Error>> {
    let req = PerformScriptRequest::new("Contacts", "Do Things").param("7");
    assert_eq!(req.query(), vec![("script.param".to_string(), "7".to_string())]);
    assert!(PerformScriptRequest::new("Contacts", "x").query().is_empty());

    let req = SetGlobalsRequest::new()
        .global("Contacts::gSearch", "abc")
        .global("Contacts::gCount", 3);
    assert_eq!(
        req.payload(),
        json!({"globalFields": {"Contacts::gSearch": "abc", "Contacts::gCount": 3}})
    );

    let req = UploadContainerRequest::new("Contacts", 12, "photo")
        .file_name("me.png")
        .data(vec![1u8, 2, 3]);
    assert_eq!(
        req.segments(),
        vec!["layouts", "Contacts", "records", "12", "containers", "photo", "1"]
    );
    assert_eq!(req.data.len(), 3);
    Ok(())
}

#[test]
fn test_parse_response_data() -> Result<(), Box<dyn Error>> {
    let parsed = parse_response_data(json!({
        "response": {
            "scriptResult.prerequest": "pre",
            "scriptError.prerequest": "0",
            "scriptError": "3",
            "data": []
        },
        "messages": [{"code": "0", "message": "OK"}]
    }))?;
    assert_eq!(parsed.code, 0);
    assert_eq!(parsed.message, "OK");
    assert!(parsed.response.contains_key("data"));
    assert_eq!(parsed.script_results.len(), 2);
    let pre = &parsed.script_results["prerequest"];
    assert_eq!(pre.error, 0);
    assert_eq!(pre.result.as_deref(), Some("pre"));
    let after = &parsed.script_results["after"];
    assert_eq!(after.error, 3);
    assert_eq!(after.result, None);
    assert!(!parsed.script_results.contains_key("presort"));

    // numeric codes, missing code, missing response
    let parsed = parse_response_data(json!({"messages": [{"code": 401, "message": "No records match the request"}]}))?;
    assert_eq!(parsed.code, 401);
    assert!(parsed.response.is_empty());
    let parsed = parse_response_data(json!({"messages": [{}], "response": {}}))?;
    assert_eq!(parsed.code, -1);

    let err = parse_response_data(json!({"response": {}})).unwrap_err();
    assert_eq!(err.code, FMErrorCode::BadResponse);
    let err = parse_response_data(json!([1, 2])).unwrap_err();
    assert_eq!(err.code, FMErrorCode::BadResponse);
    Ok(())
}

#[tokio::test]
async fn test_server_response_handling() -> Result<(), Box<dyn Error>> {
    let server = test_server()?;
    assert_eq!(server.last_error(), None);
    assert!(!server.is_logged_in());

    let resp = server.handle_response_data(json!({
        "response": {"scriptError": "0", "scriptResult": "done", "recordId": "8"},
        "messages": [{"code": "0", "message": "OK"}]
    }))?;
    assert_eq!(resp.get("recordId"), Some(&json!("8")));
    assert_eq!(server.last_error(), Some(0));
    let sr = server.last_script_result();
    assert_eq!(sr["after"].result.as_deref(), Some("done"));

    let err = server
        .handle_response_data(json!({
            "response": {},
            "messages": [{"code": "952", "message": "Invalid FileMaker Data API token (*)"}]
        }))
        .unwrap_err();
    assert_eq!(err.code, FMErrorCode::FileMakerError);
    assert_eq!(err.server_code, Some(952));
    assert_eq!(err.fms_error_code(), Some(FMSErrorCode::InvalidDataApiToken));
    assert!(err.message.contains("Invalid FileMaker Data API token"));
    assert_eq!(server.last_error(), Some(952));
    assert!(server.last_script_result().is_empty());

    let err = server
        .handle_response_data(json!({"response": {}, "messages": [{"code": "306", "message": "Record modification ID does not match"}]}))
        .unwrap_err();
    assert!(err.is_mod_id_mismatch());
    Ok(())
}

#[tokio::test]
async fn test_endpoint_encoding() -> Result<(), Box<dyn Error>> {
    let server = test_server()?;
    let url = server.endpoint(&["layouts".to_string(), "A/B Layout".to_string(), "records".to_string()])?;
    assert_eq!(
        url.as_str(),
        "https://fms.example.com/fmi/data/v1/databases/My%20DB/layouts/A%2FB%20Layout/records"
    );
    assert_eq!(server.database(), "My DB");
    assert_eq!(server.to_string(), "<Server logged_in=false database=My DB>");
    Ok(())
}

#[tokio::test]
async fn test_builder_validation() -> Result<(), Box<dyn Error>> {
    let err = Server::builder().url("http://fms.example.com").unwrap_err();
    assert_eq!(err.code, FMErrorCode::IllegalArgument);
    assert!(err.message.contains("https"));

    let err = Server::builder().database("x")?.build().unwrap_err();
    assert!(err.message.contains("no url"));
    let err = Server::builder().url("https://h")?.build().unwrap_err();
    assert!(err.message.contains("no database"));

    assert!(Server::builder().timeout(Duration::ZERO).is_err());

    // the password is never part of debug output
    let b = Server::builder().credentials("admin", "very-secret")?;
    assert!(!format!("{:?}", b).contains("very-secret"));

    let server = test_server()?;
    assert_eq!(server.get_timeout(&None), Duration::from_secs(10));
    assert_eq!(
        server.get_timeout(&Some(Duration::from_secs(3))),
        Duration::from_secs(3)
    );
    Ok(())
}

#[test]
fn test_credentials_from_file() -> Result<(), Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "# FileMaker account")?;
    writeln!(file, "username =admin")?;
    writeln!(file, "password=p=w")?;
    let path = file.path().to_str().ok_or("bad path")?.to_string();
    let b = Server::builder().credentials_from_file(&path)?;
    assert_eq!(b.user, "admin");
    assert_eq!(b.password, "p=w");

    // surrounding spaces are part of the password
    let mut spaced = tempfile::NamedTempFile::new()?;
    write!(spaced, "username=admin\r\npassword= secret \r\n")?;
    let path = spaced.path().to_str().ok_or("bad path")?.to_string();
    let b = Server::builder().credentials_from_file(&path)?;
    assert_eq!(b.user, "admin");
    assert_eq!(b.password, " secret ");

    let mut empty = tempfile::NamedTempFile::new()?;
    writeln!(empty, "password=x")?;
    let path = empty.path().to_str().ok_or("bad path")?.to_string();
    assert!(Server::builder().credentials_from_file(&path).is_err());
    assert!(Server::builder()
        .credentials_from_file("/nonexistent/fmrest/auth")
        .is_err());
    Ok(())
}

#[test]
fn test_field_value_json() -> Result<(), Box<dyn Error>> {
    assert_eq!(FieldValue::from(1.5).to_json(), json!(1.5));
    assert_eq!(FieldValue::Null.to_json(), serde_json::Value::Null);
    let d = chrono::TimeDelta::try_seconds(3725).ok_or("bad duration")?;
    assert_eq!(FieldValue::from(d).to_json(), json!("1:02:05"));
    assert_eq!(FieldValue::from(Some(3)), FieldValue::Integer(3));
    assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
    assert_eq!(FieldValue::Integer(2), FieldValue::Double(2.0));
    Ok(())
}

#[tokio::test]
async fn test_failed_logout_keeps_session() -> Result<(), Box<dyn Error>> {
    let err = test_server()?.logout().await.unwrap_err();
    assert_eq!(err.code, FMErrorCode::IllegalArgument);

    // nothing listens on this port, so the logout request cannot complete
    let server = Server::builder()
        .url("https://127.0.0.1:1")?
        .database("Contacts")?
        .timeout(Duration::from_secs(2))?
        .build()?;
    server.set_token("abc123");
    assert!(server.is_logged_in());

    let err = server.logout().await.unwrap_err();
    assert!(matches!(
        err.code,
        FMErrorCode::RequestError | FMErrorCode::RequestTimeout
    ));
    assert!(server.is_logged_in());
    Ok(())
}
