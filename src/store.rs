//! Persistence port used by the publish and dump commands.
//!
//! The commands only need these three operations, so they are written
//! against this trait rather than against [`Database`] directly.

use crate::db::Database;
use crate::types::{FieldMap, Hit, HitTemplate};
use anyhow::Result;

pub trait HitStore {
    /// Return the template named `name`, creating it with `form` if absent.
    /// The flag is true when a new template was created.
    fn find_or_create_template(&self, name: &str, form: &str) -> Result<(HitTemplate, bool)>;

    /// Create one HIT bound to `template_id`.
    fn create_hit(&self, template_id: i64, fields: &FieldMap) -> Result<Hit>;

    /// Completed HITs in creation order, optionally only those of one template.
    fn completed_hits(&self, template_name: Option<&str>) -> Result<Vec<Hit>>;
}

impl HitStore for Database {
    fn find_or_create_template(&self, name: &str, form: &str) -> Result<(HitTemplate, bool)> {
        Database::find_or_create_template(self, name, form)
    }

    fn create_hit(&self, template_id: i64, fields: &FieldMap) -> Result<Hit> {
        Database::create_hit(self, template_id, fields)
    }

    fn completed_hits(&self, template_name: Option<&str>) -> Result<Vec<Hit>> {
        Database::completed_hits(self, template_name)
    }
}
