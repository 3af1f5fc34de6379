//! Query and update payload shapes exchanged with adapters.

use crate::{Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Update document with one section per update rule surface.
///
/// `set` assigns field values, `unset` clears fields, `push` appends single
/// elements to array fields, `pull` removes elements from array fields. The
/// wire aliases follow the conventional `$set`/`$unset`/`$push`/`$pull`
/// spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateDocument {
    /// Field assignments
    #[serde(rename = "$set", alias = "set", skip_serializing_if = "BTreeMap::is_empty")]
    pub set: Record,

    /// Fields to clear
    #[serde(
        rename = "$unset",
        alias = "unset",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub unset: Record,

    /// Single elements appended to array fields
    #[serde(
        rename = "$push",
        alias = "push",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub push: Record,

    /// Elements removed from array fields
    #[serde(
        rename = "$pull",
        alias = "pull",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub pull: Record,
}

impl UpdateDocument {
    /// Update document with a single `set` section.
    pub fn set(fields: Record) -> Self {
        Self {
            set: fields,
            ..Self::default()
        }
    }

    /// True when no section carries any field.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.unset.is_empty() && self.push.is_empty() && self.pull.is_empty()
    }
}

/// Options accompanying read, query, and delete calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Field inclusion/exclusion map; filled from the compiled projection
    /// when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<BTreeMap<String, u8>>,

    /// Maximum number of results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Number of results to skip
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,

    /// Sort directions per field (`1` ascending, `-1` descending)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<BTreeMap<String, i8>>,
}

/// Builds an update document setting a single field.
pub fn set_field(field: impl Into<String>, value: impl Into<Value>) -> UpdateDocument {
    let mut set = Record::new();
    set.insert(field.into(), value.into());
    UpdateDocument::set(set)
}
