//! # Schema Gate
//!
//! Decides whether profile generation may run.
//!
//! Schema resolution is a best-effort lookup: it can return normally without
//! having found anything. The gate therefore looks at the filesystem itself
//! and ignores whatever the stage claimed. Only existence is checked, not
//! content or freshness.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of the post-resolution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// The schema identifier file exists.
    Confirmed,
    /// The schema identifier file is absent.
    Missing,
}

impl GateDecision {
    /// Check if profile generation may run.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self, GateDecision::Confirmed)
    }
}

/// Existence check on the schema identifier file.
pub struct SchemaGate;

impl SchemaGate {
    /// Check `schema_id_file` at this moment.
    #[must_use]
    pub fn check(schema_id_file: &Path) -> GateDecision {
        if schema_id_file.exists() {
            GateDecision::Confirmed
        } else {
            GateDecision::Missing
        }
    }
}
