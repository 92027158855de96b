//! Core record types for HIT publishing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from CSV column (or answer field) name to value.
pub type FieldMap = BTreeMap<String, String>;

/// A reusable HTML form, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTemplate {
    pub id: i64,
    /// Absolute path of the template file it was published from.
    pub name: String,
    /// Raw HTML, stored verbatim.
    pub form: String,
    pub created_at: i64,
}

/// One unit of work: a template bound to a row of input data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub id: i64,
    pub template_id: i64,
    pub input_csv_fields: FieldMap,
    pub completed: bool,
    /// Submitted answers; empty until the HIT is completed.
    pub answers: FieldMap,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Record counts reported by `hits stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub templates: i64,
    pub hits: i64,
    pub completed_hits: i64,
}
