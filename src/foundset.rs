//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use std::result::Result;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{fm_err, FMError};

type Producer<T> = Box<dyn Iterator<Item = T> + Send>;

/// An ordered set of items, typically [`Record`](crate::Record)s, produced lazily.
///
/// Foundsets are returned by [`GetRecordsRequest`](crate::GetRecordsRequest) and
/// [`FindRequest`](crate::FindRequest), and hold the related records of a portal.
/// Items are built from the response only when they are first asked for, and
/// are then cached: the underlying producer is drained at most once, no matter
/// how many times the foundset is iterated or indexed, and no matter how many
/// iterators are pulling from it at the same time.
///
/// Cloning a `Foundset` is cheap and returns a handle to the same items.
/// [`get()`](Foundset::get()) and iteration hand out clones of the cached
/// items. To change the records held by the foundset itself, for example to
/// write the dirty ones back later, use [`update()`](Foundset::update()) or
/// [`update_all()`](Foundset::update_all()).
///
/// ```
/// use filemaker_data_api::Foundset;
///
/// let fs = Foundset::new((1..=3).map(|i| i * 10));
/// assert_eq!(fs.get(1).unwrap(), 20);
/// assert!(!fs.is_complete());
/// let all: Vec<i32> = fs.iter().collect();
/// assert_eq!(all, vec![10, 20, 30]);
/// assert!(fs.is_complete());
/// ```
pub struct Foundset<T> {
    inner: Arc<FoundsetRef<T>>,
}

struct FoundsetRef<T> {
    info: serde_json::Map<String, serde_json::Value>,
    // Cached items, completion and the producer change together, under one lock
    state: Mutex<FoundsetState<T>>,
}

struct FoundsetState<T> {
    cache: Vec<T>,
    complete: bool,
    producer: Option<Producer<T>>,
}

impl<T> Clone for Foundset<T> {
    fn clone(&self) -> Self {
        Foundset {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Foundset<T> {
    /// Create a foundset from a (lazy) producer of items, with empty info.
    pub fn new<I>(items: I) -> Foundset<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Foundset::with_info(items, serde_json::Map::new())
    }

    /// Create a foundset from a (lazy) producer of items and the info block
    /// delivered by the server (`dataInfo` for foundsets, the matching
    /// `portalDataInfo` entry for portals).
    pub fn with_info<I>(items: I, info: serde_json::Map<String, serde_json::Value>) -> Foundset<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Foundset {
            inner: Arc::new(FoundsetRef {
                info,
                state: Mutex::new(FoundsetState {
                    cache: Vec::new(),
                    complete: false,
                    producer: Some(Box::new(items.into_iter())),
                }),
            }),
        }
    }

    /// Get the item at `index`, producing items up to it if needed.
    ///
    /// Fails with `IndexOutOfRange` if the foundset has fewer items.
    pub fn get(&self, index: usize) -> Result<T, FMError> {
        match self.fetch(index) {
            Some(item) => Ok(item),
            None => fm_err!(
                IndexOutOfRange,
                "index {} out of range for foundset with {} items",
                index,
                self.consumed()
            ),
        }
    }

    /// Iterate over all items: cached items first, then newly produced ones.
    pub fn iter(&self) -> FoundsetIter<T> {
        FoundsetIter {
            foundset: self.clone(),
            pos: 0,
        }
    }

    /// Change the cached item at `index` in place, producing items up to it
    /// if needed, and return what `f` returns.
    ///
    /// Items handed out by [`get()`](Foundset::get()) and [`iter()`](Foundset::iter())
    /// are copies; this is how a change becomes visible to every later read of
    /// the foundset:
    /// ```
    /// use filemaker_data_api::{FieldValue, Foundset, Record};
    ///
    /// let rec = Record::new(vec!["name"], vec![FieldValue::from("a")]).unwrap();
    /// let fs = Foundset::new(vec![rec]);
    /// fs.update(0, |r| r.set("name", "b")).unwrap().unwrap();
    /// assert!(fs.get(0).unwrap().is_dirty());
    /// ```
    ///
    /// `f` runs while the foundset is locked and must not use the same foundset.
    pub fn update<R, F>(&self, index: usize, f: F) -> Result<R, FMError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut state = self.lock();
        state.produce_to(index);
        let consumed = state.cache.len();
        match state.cache.get_mut(index) {
            Some(item) => Ok(f(item)),
            None => fm_err!(
                IndexOutOfRange,
                "index {} out of range for foundset with {} items",
                index,
                consumed
            ),
        }
    }

    /// Call `f` on every item in place, in order, producing all remaining
    /// items. Stops at the first error returned by `f`.
    ///
    /// As with [`update()`](Foundset::update()), `f` must not use the same foundset.
    pub fn update_all<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&mut T) -> Result<(), E>,
    {
        let mut index = 0;
        loop {
            let mut state = self.lock();
            state.produce_to(index);
            let Some(item) = state.cache.get_mut(index) else {
                return Ok(());
            };
            f(item)?;
            index += 1;
        }
    }

    fn fetch(&self, index: usize) -> Option<T> {
        let mut state = self.lock();
        state.produce_to(index);
        state.cache.get(index).cloned()
    }
}

impl<T> FoundsetState<T> {
    // Produce until the cache holds index, or the producer is exhausted
    fn produce_to(&mut self, index: usize) {
        while index >= self.cache.len() && !self.complete {
            let next = self.producer.as_mut().and_then(|p| p.next());
            match next {
                Some(item) => self.cache.push(item),
                None => {
                    self.complete = true;
                    self.producer = None;
                }
            }
        }
    }
}

impl<T> Foundset<T> {
    fn lock(&self) -> MutexGuard<'_, FoundsetState<T>> {
        // a panic while producing leaves the cache consistent
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns true once every item has been produced.
    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    /// The number of items produced so far.
    pub fn consumed(&self) -> usize {
        self.lock().cache.len()
    }

    /// The info block given at construction, 1:1 as delivered by the server.
    pub fn info(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.inner.info
    }

    /// Total number of records matching the request (`foundCount`).
    pub fn found_count(&self) -> Option<i64> {
        self.info_i64("foundCount")
    }

    /// Number of records included in this response (`returnedCount`).
    pub fn returned_count(&self) -> Option<i64> {
        self.info_i64("returnedCount")
    }

    /// Number of records in the table (`totalRecordCount`).
    pub fn total_record_count(&self) -> Option<i64> {
        self.info_i64("totalRecordCount")
    }

    /// The table occurrence the records belong to.
    pub fn table(&self) -> Option<&str> {
        self.inner.info.get("table")?.as_str()
    }

    fn info_i64(&self, key: &str) -> Option<i64> {
        match self.inner.info.get(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns true if both foundsets are handles to the same items.
    pub fn ptr_eq(&self, other: &Foundset<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> std::fmt::Debug for Foundset<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let state = self.lock();
        write!(
            f,
            "<Foundset consumed_records={} is_complete={}>",
            state.cache.len(),
            state.complete
        )
    }
}

/// Iterator over the items of a [`Foundset`].
///
/// Several iterators over the same foundset share one producer: an item is
/// produced once, by whichever iterator reaches it first.
pub struct FoundsetIter<T> {
    foundset: Foundset<T>,
    pos: usize,
}

impl<T: Clone + Send + 'static> Iterator for FoundsetIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.foundset.fetch(self.pos)?;
        self.pos += 1;
        Some(item)
    }
}

impl<T: Clone + Send + 'static> IntoIterator for &Foundset<T> {
    type Item = T;
    type IntoIter = FoundsetIter<T>;

    fn into_iter(self) -> FoundsetIter<T> {
        self.iter()
    }
}
