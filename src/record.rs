//
// Copyright (c) 2024, 2025 Oracle and/or its affiliates. All rights reserved.
//
// Licensed under the Universal Permissive License v 1.0 as shown at
//  https://oss.oracle.com/licenses/upl/
//
use indexmap::IndexMap;
use std::result::Result;

use crate::conversion::convert_string_type;
use crate::error::{fm_err, FMError, FMErrorCode};
use crate::foundset::Foundset;
use crate::types::FieldValue;

/// Prefix of the keys under which portals (related records) are stored in a [`Record`].
pub const PORTAL_PREFIX: &str = "portal_";

pub(crate) const RECORD_ID: &str = "recordId";
pub(crate) const MOD_ID: &str = "modId";

/// A single FileMaker record.
///
/// Records returned by the server hold the fields placed on the layout, plus
/// two fields added by this library: `recordId` (the internal record id) and
/// `modId` (the modification id). Each portal on the layout is available as a
/// [`Foundset`] of related records under the key `portal_<portal name>`.
///
/// Fields can be changed with [`set()`](Record::set()). Changed fields are
/// tracked, so that only those are written back with
/// [`EditRecordRequest::from_record()`](crate::EditRecordRequest::from_record()):
///
/// ```no_run
/// # use filemaker_data_api::{EditRecordRequest, GetRecordRequest, Server};
/// # async fn run(server: &Server) -> Result<(), Box<dyn std::error::Error>> {
/// let mut record = GetRecordRequest::new("Contacts", 42).execute(server).await?;
/// record.set("drink", "Dr. Pepper")?;
/// if record.is_dirty() {
///     EditRecordRequest::from_record("Contacts", &record, true)?
///         .execute(server)
///         .await?;
/// }
/// # Ok(())
/// # }
/// ```
///
/// Note: `recordId` and `modId` share the namespace of the layout's fields. If a
/// layout has a field that is literally named `recordId` or `modId`, the value
/// returned by the server for the record wins.
#[derive(Debug, Clone, Default)]
pub struct Record {
    fields: IndexMap<String, FieldValue>,
    in_portal: bool,
    modifications: IndexMap<String, FieldValue>,
}

impl Record {
    /// Create a record from a list of keys and a list of values of the same length.
    ///
    /// A record created this way has no `recordId` and cannot be used for edit
    /// or delete requests. It can be sent with
    /// [`CreateRecordRequest::from_record()`](crate::CreateRecordRequest::from_record()).
    pub fn new<K, V>(keys: Vec<K>, values: Vec<V>) -> Result<Record, FMError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Record::with_options(keys, values, false, false)
    }

    /// Create a record, optionally marked as a related record from a portal and
    /// optionally converting string values (see
    /// [`convert_string_type()`](crate::convert_string_type())).
    pub fn with_options<K, V>(
        keys: Vec<K>,
        values: Vec<V>,
        in_portal: bool,
        type_conversion: bool,
    ) -> Result<Record, FMError>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        if keys.len() != values.len() {
            return fm_err!(
                IllegalArgument,
                "length of keys ({}) does not match length of values ({})",
                keys.len(),
                values.len()
            );
        }
        let mut fields = IndexMap::with_capacity(keys.len());
        for (k, v) in keys.into_iter().zip(values) {
            let mut value: FieldValue = v.into();
            if type_conversion {
                if let FieldValue::String(s) = &value {
                    value = convert_string_type(s);
                }
            }
            fields.insert(k.into(), value);
        }
        Ok(Record {
            fields,
            in_portal,
            modifications: IndexMap::new(),
        })
    }

    /// Create a record from an ordered map of fields.
    pub fn from_fields(fields: IndexMap<String, FieldValue>) -> Record {
        Record {
            fields,
            ..Default::default()
        }
    }

    /// Get the value of a field.
    ///
    /// Returns a `FieldNotFound` error if the record has no such field.
    pub fn get(&self, name: &str) -> Result<&FieldValue, FMError> {
        match self.fields.get(name) {
            Some(v) => Ok(v),
            None => fm_err!(
                FieldNotFound,
                "No field named {}. Note that the Data API only returns fields placed on your FileMaker layout.",
                name
            ),
        }
    }

    /// Get the value of a field, or `None` if the record has no such field.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Attribute-style variant of [`get()`](Record::get()): a missing field is
    /// reported as `AttributeNotFound`.
    pub fn attr(&self, name: &str) -> Result<&FieldValue, FMError> {
        self.get(name).map_err(as_attribute_error)
    }

    /// Change the value of an existing field.
    ///
    /// If the new value differs from the current one, the change is recorded in
    /// [`modifications()`](Record::modifications()). Setting a field to its
    /// current value does nothing.
    ///
    /// Portal fields can never be set here (`PortalWriteNotSupported`); related
    /// records are written through the `portals` payload of
    /// [`EditRecordRequest`](crate::EditRecordRequest). Fields that do not exist
    /// cannot be added (`FieldNotFound`).
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FMError> {
        if name.starts_with(PORTAL_PREFIX) {
            return fm_err!(
                PortalWriteNotSupported,
                "Portal data cannot be set through the record instance. To edit portal data, pass it to EditRecordRequest::portals()."
            );
        }
        let value = value.into();
        let Some(current) = self.fields.get_mut(name) else {
            return fm_err!(FieldNotFound, "{} is not a valid field name.", name);
        };
        if *current != value {
            *current = value.clone();
            self.modifications.insert(name.to_string(), value);
        }
        Ok(())
    }

    /// Attribute-style variant of [`set()`](Record::set()): a missing field is
    /// reported as `AttributeNotFound`.
    pub fn set_attr(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FMError> {
        self.set(name, value).map_err(as_attribute_error)
    }

    /// The fields changed since the record was built, as `{field: new value}`.
    pub fn modifications(&self) -> &IndexMap<String, FieldValue> {
        &self.modifications
    }

    /// Returns true if any field has been changed.
    pub fn is_dirty(&self) -> bool {
        !self.modifications.is_empty()
    }

    /// The internal record id.
    ///
    /// Fails with `FieldNotFound` for records that did not come from the server.
    pub fn record_id(&self) -> Result<i64, FMError> {
        self.get(RECORD_ID)?.as_i64()
    }

    /// The modification id, or `None` for related records from a portal (the
    /// Data API does not track it for those).
    pub fn modification_id(&self) -> Result<Option<i64>, FMError> {
        if self.in_portal {
            return Ok(None);
        }
        Ok(Some(self.get(MOD_ID)?.as_i64()?))
    }

    /// Returns true if this is a related record from a portal.
    pub fn in_portal(&self) -> bool {
        self.in_portal
    }

    /// Get the related records of the portal with the given name (without the
    /// `portal_` prefix).
    pub fn portal(&self, name: &str) -> Result<Foundset<Record>, FMError> {
        let key = format!("{}{}", PORTAL_PREFIX, name);
        match self.get(&key)? {
            FieldValue::Portal(fs) => Ok(fs.clone()),
            other => fm_err!(IllegalArgument, "field {} is not a portal: {:?}", key, other),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy the fields into a plain map.
    ///
    /// With `include_portals == false` the `portal_` fields are left out, and with
    /// `include_internal_ids == false` the `recordId` and `modId` fields are left
    /// out. Dropping both gives the field data for creating a copy of the record.
    pub fn to_map(
        &self,
        include_portals: bool,
        include_internal_ids: bool,
    ) -> IndexMap<String, FieldValue> {
        self.fields
            .iter()
            .filter(|(k, _)| include_portals || !k.starts_with(PORTAL_PREFIX))
            .filter(|(k, _)| include_internal_ids || (*k != RECORD_ID && *k != MOD_ID))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Same as [`to_map()`](Record::to_map()), with values converted to JSON.
    pub fn to_json(
        &self,
        include_portals: bool,
        include_internal_ids: bool,
    ) -> serde_json::Map<String, serde_json::Value> {
        self.to_map(include_portals, include_internal_ids)
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    /// Remove a field from the record and return its value, or `default` if
    /// there is no such field.
    pub fn pop(&mut self, name: &str, default: FieldValue) -> FieldValue {
        self.fields.shift_remove(name).unwrap_or(default)
    }
}

fn as_attribute_error(e: FMError) -> FMError {
    if e.code == FMErrorCode::FieldNotFound {
        return FMError::new(FMErrorCode::AttributeNotFound, &e.message);
    }
    e
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let id = match self.record_id() {
            Ok(i) => i.to_string(),
            Err(_) => "None".to_string(),
        };
        let mod_id = match self.modification_id() {
            Ok(Some(i)) => i.to_string(),
            _ => "None".to_string(),
        };
        write!(
            f,
            "<Record id={} modification_id={} is_dirty={}>",
            id,
            mod_id,
            self.is_dirty()
        )
    }
}
