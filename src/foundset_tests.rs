//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use crate::error::{FMError, FMErrorCode};
use crate::foundset::Foundset;
use serde_json::json;
use std::error::Error;
use std::result::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// A foundset of 0..n that counts how often its producer was advanced
fn counted(n: usize) -> (Foundset<usize>, Arc<AtomicUsize>) {
    let produced = Arc::new(AtomicUsize::new(0));
    let p = produced.clone();
    let fs = Foundset::new((0..n).map(move |i| {
        p.fetch_add(1, Ordering::SeqCst);
        i
    }));
    (fs, produced)
}

#[test]
fn test_iterate_twice_produces_once() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(5);
    assert_eq!(produced.load(Ordering::SeqCst), 0);
    let first: Vec<usize> = fs.iter().collect();
    let second: Vec<usize> = fs.iter().collect();
    assert_eq!(first, vec![0, 1, 2, 3, 4]);
    assert_eq!(first, second);
    assert_eq!(produced.load(Ordering::SeqCst), 5);
    assert!(fs.is_complete());
    Ok(())
}

#[test]
fn test_index_access() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(4);
    assert_eq!(fs.get(2)?, 2);
    // only what was needed is produced
    assert_eq!(produced.load(Ordering::SeqCst), 3);
    assert_eq!(fs.consumed(), 3);
    assert!(!fs.is_complete());

    let all: Vec<usize> = fs.iter().collect();
    for (i, item) in all.iter().enumerate() {
        assert_eq!(fs.get(i)?, *item);
    }
    let err = fs.get(4).unwrap_err();
    assert_eq!(err.code, FMErrorCode::IndexOutOfRange);
    assert_eq!(produced.load(Ordering::SeqCst), 4);
    Ok(())
}

#[test]
fn test_out_of_range_completes() -> Result<(), Box<dyn Error>> {
    let (fs, _) = counted(2);
    assert_eq!(fs.get(10).unwrap_err().code, FMErrorCode::IndexOutOfRange);
    assert!(fs.is_complete());
    assert_eq!(fs.consumed(), 2);

    let empty: Foundset<usize> = Foundset::new(Vec::new());
    assert_eq!(empty.iter().count(), 0);
    assert_eq!(empty.get(0).unwrap_err().code, FMErrorCode::IndexOutOfRange);
    Ok(())
}

#[test]
fn test_interleaved_iterators() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(6);
    let mut a = fs.iter();
    let mut b = fs.iter();
    assert_eq!(a.next(), Some(0));
    assert_eq!(a.next(), Some(1));
    assert_eq!(b.next(), Some(0));
    assert_eq!(a.next(), Some(2));
    let rest_b: Vec<usize> = b.collect();
    let rest_a: Vec<usize> = a.collect();
    assert_eq!(rest_b, vec![1, 2, 3, 4, 5]);
    assert_eq!(rest_a, vec![3, 4, 5]);
    assert_eq!(produced.load(Ordering::SeqCst), 6);
    Ok(())
}

#[test]
fn test_partial_iteration_then_full() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(5);
    let first_two: Vec<usize> = fs.iter().take(2).collect();
    assert_eq!(first_two, vec![0, 1]);
    assert!(!fs.is_complete());
    let all: Vec<usize> = (&fs).into_iter().collect();
    assert_eq!(all, vec![0, 1, 2, 3, 4]);
    assert_eq!(produced.load(Ordering::SeqCst), 5);
    Ok(())
}

#[test]
fn test_concurrent_iteration() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(1000);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fs = fs.clone();
            thread::spawn(move || fs.iter().collect::<Vec<usize>>())
        })
        .collect();
    for h in handles {
        let items = h.join().map_err(|_| "iterating thread panicked")?;
        assert_eq!(items, (0..1000).collect::<Vec<usize>>());
    }
    assert_eq!(produced.load(Ordering::SeqCst), 1000);
    Ok(())
}

#[test]
fn test_info() -> Result<(), Box<dyn Error>> {
    let info = json!({
        "database": "Contacts",
        "layout": "Contacts",
        "table": "Contacts",
        "totalRecordCount": 123,
        "foundCount": "10",
        "returnedCount": 2
    });
    let fs = Foundset::with_info(vec![1, 2], info.as_object().cloned().ok_or("not an object")?);
    assert_eq!(fs.table(), Some("Contacts"));
    assert_eq!(fs.total_record_count(), Some(123));
    assert_eq!(fs.found_count(), Some(10));
    assert_eq!(fs.returned_count(), Some(2));
    assert_eq!(fs.info().get("layout"), Some(&json!("Contacts")));

    let bare = Foundset::new(vec![1]);
    assert!(bare.info().is_empty());
    assert_eq!(bare.found_count(), None);
    Ok(())
}

#[test]
fn test_clone_shares_items() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(3);
    let other = fs.clone();
    assert!(fs.ptr_eq(&other));
    let _: Vec<usize> = other.iter().collect();
    assert!(fs.is_complete());
    assert_eq!(fs.iter().count(), 3);
    assert_eq!(produced.load(Ordering::SeqCst), 3);
    assert_eq!(format!("{:?}", fs), "<Foundset consumed_records=3 is_complete=true>");
    Ok(())
}

#[test]
fn test_update_changes_cached_item() -> Result<(), Box<dyn Error>> {
    let (fs, produced) = counted(4);
    // producing up to index 2 happens inside update
    let old = fs.update(2, |v| std::mem::replace(v, 20))?;
    assert_eq!(old, 2);
    assert_eq!(produced.load(Ordering::SeqCst), 3);
    assert_eq!(fs.get(2)?, 20);

    // a clone of the foundset sees the change too
    let other = fs.clone();
    assert_eq!(other.iter().collect::<Vec<_>>(), vec![0, 1, 20, 3]);

    let err = fs.update(4, |v| *v).unwrap_err();
    assert_eq!(err.code, FMErrorCode::IndexOutOfRange);
    assert_eq!(produced.load(Ordering::SeqCst), 4);
    Ok(())
}

#[test]
fn test_update_all() -> Result<(), Box<dyn Error>> {
    let (fs, _) = counted(3);
    let _ = fs.get(0)?;
    fs.update_all(|v| -> Result<(), FMError> {
        *v += 100;
        Ok(())
    })?;
    assert!(fs.is_complete());
    assert_eq!(fs.iter().collect::<Vec<_>>(), vec![100, 101, 102]);

    // stops at the first error
    let mut seen = 0;
    let res = fs.update_all(|v| {
        seen += 1;
        if *v == 101 {
            return Err("stop");
        }
        *v = 0;
        Ok(())
    });
    assert_eq!(res, Err("stop"));
    assert_eq!(seen, 2);
    assert_eq!(fs.iter().collect::<Vec<_>>(), vec![0, 101, 102]);

    let empty: Foundset<usize> = Foundset::new(Vec::new());
    empty.update_all(|_| Err(FMError::new(FMErrorCode::UnknownError, "no items")))?;
    Ok(())
}
