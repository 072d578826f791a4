//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::conversion::convert_string_type;
use crate::types::FieldValue;
use chrono::{NaiveDate, TimeDelta};
use std::error::Error;
use std::result::Result;

#[test]
fn test_numbers() -> Result<(), Box<dyn Error>> {
    assert_eq!(convert_string_type("42"), FieldValue::Integer(42));
    assert_eq!(convert_string_type(" -7 "), FieldValue::Integer(-7));
    assert_eq!(convert_string_type("007"), FieldValue::Integer(7));
    assert_eq!(convert_string_type("42.1"), FieldValue::Double(42.1));
    assert_eq!(convert_string_type("1e3"), FieldValue::Double(1000.0));
    // words that parse as floats stay strings
    assert_eq!(convert_string_type("inf"), FieldValue::from("inf"));
    assert_eq!(convert_string_type("NaN"), FieldValue::from("NaN"));
    Ok(())
}

#[test]
fn test_timestamps_and_dates() -> Result<(), Box<dyn Error>> {
    let ts = NaiveDate::from_ymd_opt(2017, 12, 1)
        .and_then(|d| d.and_hms_opt(20, 45, 30))
        .ok_or("bad timestamp")?;
    assert_eq!(
        convert_string_type("12/01/2017 20:45:30"),
        FieldValue::Timestamp(ts)
    );
    let midnight = NaiveDate::from_ymd_opt(2016, 12, 24)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("bad date")?;
    assert_eq!(convert_string_type("12/24/2016"), FieldValue::Timestamp(midnight));
    assert_eq!(convert_string_type("13/45/2016"), FieldValue::from("13/45/2016"));
    assert_eq!(convert_string_type("and/or"), FieldValue::from("and/or"));
    Ok(())
}

#[test]
fn test_durations() -> Result<(), Box<dyn Error>> {
    let expected = TimeDelta::try_hours(23)
        .and_then(|h| h.checked_add(&TimeDelta::try_minutes(59)?))
        .and_then(|h| h.checked_add(&TimeDelta::try_seconds(59)?))
        .ok_or("bad duration")?;
    assert_eq!(convert_string_type("23:59:59"), FieldValue::Duration(expected));

    // hours past a day, minutes and seconds past 59
    let d = convert_string_type("48:61:01");
    assert_eq!(
        d.as_duration().map(|d| d.num_seconds()),
        Some(48 * 3600 + 61 * 60 + 1)
    );
    assert_eq!(d.to_string(), "49:01:01");

    // a time of day without seconds
    assert_eq!(
        convert_string_type("9:05").as_duration().map(|d| d.num_seconds()),
        Some(9 * 3600 + 5 * 60)
    );
    assert_eq!(convert_string_type("10:30").to_string(), "10:30:00");
    assert_eq!(convert_string_type("1:2:3:4"), FieldValue::from("1:2:3:4"));
    assert_eq!(convert_string_type("a:b:c"), FieldValue::from("a:b:c"));
    Ok(())
}

#[test]
fn test_fallback_keeps_original() -> Result<(), Box<dyn Error>> {
    assert_eq!(convert_string_type("hello"), FieldValue::from("hello"));
    assert_eq!(convert_string_type(""), FieldValue::from(""));
    // the untrimmed value is kept
    assert_eq!(convert_string_type(" x "), FieldValue::from(" x "));
    Ok(())
}
