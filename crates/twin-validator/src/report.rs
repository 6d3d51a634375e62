//! Validation run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use twin_schema::SchemaDigest;
use uuid::Uuid;

use crate::issue::{Issue, IssueKind};

/// Outcome of one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub run_id: Uuid,
    /// Digest of the schema document the run checked against
    pub schema_digest: SchemaDigest,
    pub root_source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Asset records validated, counting revisits through different links
    pub assets_visited: u64,
    /// Findings in discovery order
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    /// Whether every validated asset conformed.
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count_by_kind(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Rendered issue lines, in discovery order.
    pub fn lines(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}
