//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::FMErrorCode;
use crate::foundset::Foundset;
use crate::record::{Record, PORTAL_PREFIX};
use crate::types::FieldValue;
use chrono::NaiveDate;
use std::error::Error;
use std::result::Result;

fn sample() -> Result<Record, Box<dyn Error>> {
    let r = Record::new(
        vec!["name", "drink", "recordId", "modId"],
        vec![
            FieldValue::from("David"),
            FieldValue::from("Coffee"),
            FieldValue::from("12"),
            FieldValue::from("3"),
        ],
    )?;
    Ok(r)
}

#[test]
fn test_construct_lengths() -> Result<(), Box<dyn Error>> {
    let r = Record::new(vec!["a", "b"], vec![1, 2])?;
    assert_eq!(r.len(), 2);
    assert_eq!(r.get("a")?, &FieldValue::Integer(1));

    let empty: Record = Record::new(Vec::<String>::new(), Vec::<FieldValue>::new())?;
    assert!(empty.is_empty());

    let err = Record::new(vec!["a", "b"], vec![1]).unwrap_err();
    assert_eq!(err.code, FMErrorCode::IllegalArgument);
    let err = Record::new(vec!["a"], vec![1, 2]).unwrap_err();
    assert_eq!(err.code, FMErrorCode::IllegalArgument);
    Ok(())
}

#[test]
fn test_keys_keep_order() -> Result<(), Box<dyn Error>> {
    let r = Record::new(vec!["z", "a", "m"], vec!["1", "2", "3"])?;
    let keys: Vec<&String> = r.keys().collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
    let values: Vec<String> = r.values().map(|v| v.to_string()).collect();
    assert_eq!(values, vec!["1", "2", "3"]);
    Ok(())
}

#[test]
fn test_get_missing_field() -> Result<(), Box<dyn Error>> {
    let r = sample()?;
    let err = r.get("nope").unwrap_err();
    assert_eq!(err.code, FMErrorCode::FieldNotFound);
    assert!(err.message.contains("placed on your FileMaker layout"));
    assert!(r.field("nope").is_none());

    let err = r.attr("nope").unwrap_err();
    assert_eq!(err.code, FMErrorCode::AttributeNotFound);
    assert_eq!(r.attr("name")?, &FieldValue::from("David"));
    Ok(())
}

#[test]
fn test_set_same_value_is_noop() -> Result<(), Box<dyn Error>> {
    let mut r = sample()?;
    let keys: Vec<String> = r.keys().cloned().collect();
    for k in keys {
        let current = r.get(&k)?.clone();
        r.set(&k, current)?;
    }
    assert!(!r.is_dirty());
    assert!(r.modifications().is_empty());
    Ok(())
}

#[test]
fn test_set_same_nan_is_noop() -> Result<(), Box<dyn Error>> {
    let mut r = Record::new(vec!["ratio"], vec![FieldValue::Double(f64::NAN)])?;
    let current = r.get("ratio")?.clone();
    r.set("ratio", current)?;
    assert!(!r.is_dirty());

    r.set("ratio", 0.5)?;
    assert!(r.is_dirty());
    assert_eq!(r.get("ratio")?, &FieldValue::Double(0.5));
    Ok(())
}

#[test]
fn test_set_new_value() -> Result<(), Box<dyn Error>> {
    let mut r = sample()?;
    r.set("drink", "Dr. Pepper")?;
    assert!(r.is_dirty());
    assert_eq!(r.get("drink")?, &FieldValue::from("Dr. Pepper"));
    assert_eq!(
        r.modifications().get("drink"),
        Some(&FieldValue::from("Dr. Pepper"))
    );
    assert_eq!(r.modifications().len(), 1);

    // setting it back keeps the field in modifications, with the latest value
    r.set("drink", "Coffee")?;
    assert_eq!(r.modifications().get("drink"), Some(&FieldValue::from("Coffee")));

    r.set_attr("name", "Dave")?;
    assert_eq!(r.modifications().len(), 2);
    Ok(())
}

#[test]
fn test_set_unknown_and_portal_fields() -> Result<(), Box<dyn Error>> {
    let mut r = Record::new(
        vec!["name".to_string(), format!("{}notes", PORTAL_PREFIX)],
        vec![
            FieldValue::from("x"),
            FieldValue::Portal(Foundset::new(Vec::<Record>::new())),
        ],
    )?;
    let err = r.set("unknown", 1).unwrap_err();
    assert_eq!(err.code, FMErrorCode::FieldNotFound);
    let err = r.set_attr("unknown", 1).unwrap_err();
    assert_eq!(err.code, FMErrorCode::AttributeNotFound);

    let err = r.set("portal_notes", 1).unwrap_err();
    assert_eq!(err.code, FMErrorCode::PortalWriteNotSupported);
    // the portal prefix is checked before the field's existence
    let err = r.set("portal_other", 1).unwrap_err();
    assert_eq!(err.code, FMErrorCode::PortalWriteNotSupported);
    assert!(!r.is_dirty());
    Ok(())
}

#[test]
fn test_ids() -> Result<(), Box<dyn Error>> {
    let r = sample()?;
    assert_eq!(r.record_id()?, 12);
    assert_eq!(r.modification_id()?, Some(3));

    let local = Record::new(vec!["name"], vec!["x"])?;
    assert_eq!(local.record_id().unwrap_err().code, FMErrorCode::FieldNotFound);

    let related = Record::with_options(vec!["recordId", "modId"], vec!["5", "1"], true, false)?;
    assert!(related.in_portal());
    assert_eq!(related.record_id()?, 5);
    assert_eq!(related.modification_id()?, None);
    Ok(())
}

#[test]
fn test_to_map_and_pop() -> Result<(), Box<dyn Error>> {
    let mut r = Record::new(
        vec!["name", "portal_x", "recordId", "modId"],
        vec![
            FieldValue::from("n"),
            FieldValue::Portal(Foundset::new(Vec::<Record>::new())),
            FieldValue::from("1"),
            FieldValue::from("2"),
        ],
    )?;
    let m = r.to_map(false, true);
    assert_eq!(
        m.keys().collect::<Vec<_>>(),
        vec!["name", "recordId", "modId"]
    );
    let m = r.to_map(false, false);
    assert_eq!(m.keys().collect::<Vec<_>>(), vec!["name"]);
    assert_eq!(r.to_map(true, true).len(), 4);

    let j = r.to_json(false, false);
    assert_eq!(j.get("name"), Some(&serde_json::json!("n")));

    assert_eq!(r.pop("name", FieldValue::Null), FieldValue::from("n"));
    assert_eq!(r.pop("name", FieldValue::from("gone")), FieldValue::from("gone"));
    assert!(r.field("name").is_none());
    Ok(())
}

#[test]
fn test_type_conversion_at_construction() -> Result<(), Box<dyn Error>> {
    let r = Record::with_options(
        vec!["int", "float", "ts", "text"],
        vec!["42", "4.5", "12/24/2016 10:00:01", "hello"],
        false,
        true,
    )?;
    assert_eq!(r.get("int")?, &FieldValue::Integer(42));
    assert_eq!(r.get("float")?, &FieldValue::Double(4.5));
    let expected = NaiveDate::from_ymd_opt(2016, 12, 24)
        .and_then(|d| d.and_hms_opt(10, 0, 1))
        .ok_or("bad date")?;
    assert_eq!(r.get("ts")?, &FieldValue::Timestamp(expected));
    assert_eq!(r.get("text")?, &FieldValue::from("hello"));

    // values set later are not converted
    let mut r = r;
    r.set("text", "7")?;
    assert_eq!(r.get("text")?, &FieldValue::from("7"));
    Ok(())
}

#[test]
fn test_display() -> Result<(), Box<dyn Error>> {
    let mut r = sample()?;
    assert_eq!(r.to_string(), "<Record id=12 modification_id=3 is_dirty=false>");
    r.set("name", "x")?;
    assert_eq!(r.to_string(), "<Record id=12 modification_id=3 is_dirty=true>");
    let local = Record::new(vec!["a"], vec![1])?;
    assert_eq!(local.to_string(), "<Record id=None modification_id=None is_dirty=false>");
    Ok(())
}
