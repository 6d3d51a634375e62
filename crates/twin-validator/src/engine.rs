//! Recursive schema-driven asset validation.
//!
//! For a schema node the engine resolves the asset ids to check, fetches
//! each asset, checks its dot-path properties and then follows each declared
//! link type to the linked asset, validating it against the link's target
//! schema node. All findings are appended to one [`IssueLog`].
//!
//! Processing is strictly sequential: one asset, including everything
//! reachable through its links, is finished before the next id starts.
//!
//! A `(source, id)` pair that is already on the active recursion path is
//! not entered again, so link cycles in live data (or `$ref` cycles in the
//! schema) terminate. The guard is path-local: the same asset reached via
//! two sibling branches is validated on each of them.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use futures::future::BoxFuture;
use tracing::{debug, info, instrument, warn};
use twin_directory::{AssetDirectory, AssetRecord, DirectoryResult};
use twin_schema::{AssetSchema, SchemaDocument};
use uuid::Uuid;

use crate::error::Result;
use crate::issue::{Issue, IssueKind, IssueLog};
use crate::lookup::{conforms, lookup_path};
use crate::report::ValidationReport;

static NO_DEFINITIONS: BTreeMap<String, AssetSchema> = BTreeMap::new();

/// Mutable state threaded through one validation walk.
struct Walk<'w> {
    definitions: &'w BTreeMap<String, AssetSchema>,
    issues: &'w mut IssueLog,
    active: HashSet<(String, String)>,
    assets_visited: u64,
}

impl<'w> Walk<'w> {
    fn new(definitions: &'w BTreeMap<String, AssetSchema>, issues: &'w mut IssueLog) -> Self {
        Self {
            definitions,
            issues,
            active: HashSet::new(),
            assets_visited: 0,
        }
    }

    fn is_active(&self, source: &str, id: &str) -> bool {
        self.active.contains(&(source.to_string(), id.to_string()))
    }
}

/// Validates live assets from an [`AssetDirectory`] against schemas.
pub struct AssetValidator<D> {
    directory: D,
}

impl<D> AssetValidator<D>
where
    D: AssetDirectory,
{
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Validate every asset selected by `document.root`, appending findings
    /// to `issues`.
    ///
    /// Only a failure of the directory itself is returned as an error; all
    /// data problems become issues.
    pub async fn validate(
        &self,
        document: &SchemaDocument,
        issues: &mut IssueLog,
    ) -> DirectoryResult<()> {
        self.traverse(&document.root, &document.definitions, issues)
            .await
            .map(|_| ())
    }

    /// Validate a self-contained schema tree (no `$ref` targets).
    pub async fn validate_schema(
        &self,
        schema: &AssetSchema,
        issues: &mut IssueLog,
    ) -> DirectoryResult<()> {
        self.traverse(schema, &NO_DEFINITIONS, issues).await.map(|_| ())
    }

    /// Structurally check `document`, validate it and wrap the outcome in a
    /// [`ValidationReport`].
    pub async fn run(&self, document: &SchemaDocument) -> Result<ValidationReport> {
        document.validate_structure()?;
        let schema_digest = document.digest()?;
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();

        info!(%run_id, schema = %schema_digest.short(), "Starting validation run");

        let mut issues = IssueLog::new();
        let assets_visited = self
            .traverse(&document.root, &document.definitions, &mut issues)
            .await?;

        Ok(ValidationReport {
            run_id,
            schema_digest,
            root_source: document.root.source.clone(),
            started_at,
            finished_at: Utc::now(),
            assets_visited,
            issues: issues.into_vec(),
        })
    }

    #[instrument(skip_all, fields(source = %root.source))]
    async fn traverse(
        &self,
        root: &AssetSchema,
        definitions: &BTreeMap<String, AssetSchema>,
        issues: &mut IssueLog,
    ) -> DirectoryResult<u64> {
        let issues_before = issues.len();
        let mut walk = Walk::new(definitions, issues);

        let ids = match root.explicit_ids() {
            Some(ids) => ids.to_vec(),
            None => self.directory.list_ids(&root.source).await?,
        };
        info!(assets = ids.len(), "Validating assets");

        for id in &ids {
            match self.directory.get_asset(id, &root.source).await? {
                Some(record) => self.visit(root, &root.source, id, record, &mut walk).await?,
                None => walk
                    .issues
                    .record(Issue::new(IssueKind::NotFound, &root.source, id)),
            }
        }

        let found = walk.issues.len() - issues_before;
        info!(
            assets_visited = walk.assets_visited,
            issues = found,
            "Validation finished"
        );
        Ok(walk.assets_visited)
    }

    /// Validate one fetched asset against `schema`, then follow its links.
    fn visit<'a>(
        &'a self,
        schema: &'a AssetSchema,
        source: &'a str,
        id: &'a str,
        record: AssetRecord,
        walk: &'a mut Walk<'_>,
    ) -> BoxFuture<'a, DirectoryResult<()>> {
        Box::pin(async move {
            let key = (source.to_string(), id.to_string());
            walk.active.insert(key.clone());
            walk.assets_visited += 1;
            debug!(source, id, depth = walk.active.len(), "Visiting asset");

            check_properties(schema, source, id, &record, walk.issues);
            let result = self.check_links(schema, source, id, &record, walk).await;

            walk.active.remove(&key);
            result
        })
    }

    async fn check_links(
        &self,
        schema: &AssetSchema,
        source: &str,
        id: &str,
        record: &AssetRecord,
        walk: &mut Walk<'_>,
    ) -> DirectoryResult<()> {
        if schema.links.is_empty() {
            return Ok(());
        }

        if record.links().is_empty() {
            let required: Vec<&str> = schema.required_link_types().collect();
            walk.issues.record(
                Issue::new(IssueKind::PropertyMissing, source, id)
                    .with_detail(format!("links[{}]", required.join(","))),
            );
            return Ok(());
        }

        let definitions = walk.definitions;
        for constraint in &schema.links {
            let Some(link) = record.first_link(&constraint.link_type) else {
                walk.issues.record(
                    Issue::new(IssueKind::NotFound, source, id)
                        .with_detail(constraint.link_type.as_str()),
                );
                continue;
            };

            let Some(target) = constraint.asset.resolve_in(definitions) else {
                warn!(
                    source,
                    id,
                    link_type = %constraint.link_type,
                    "Link target schema does not resolve; skipping"
                );
                continue;
            };

            if walk.is_active(&link.source, &link.id) {
                debug!(
                    source = %link.source,
                    id = %link.id,
                    "Asset already on the validation path; not re-entering"
                );
                continue;
            }

            match self.directory.get_asset(&link.id, &link.source).await? {
                Some(linked) => {
                    self.visit(target, &link.source, &link.id, linked, walk)
                        .await?
                }
                None => walk.issues.record(
                    Issue::new(IssueKind::NotFound, source, id).with_detail(format!(
                        "{} -> {}/{}",
                        constraint.link_type, link.source, link.id
                    )),
                ),
            }
        }

        Ok(())
    }
}

fn check_properties(
    schema: &AssetSchema,
    source: &str,
    id: &str,
    record: &AssetRecord,
    issues: &mut IssueLog,
) {
    for (path, constraint) in &schema.properties {
        match lookup_path(record.document(), path) {
            None => issues.record(
                Issue::new(IssueKind::PropertyMissing, source, id).with_detail(path.as_str()),
            ),
            Some(value) if !conforms(value, constraint.expected_type) => issues.record(
                Issue::new(IssueKind::TypeMismatch, source, id).with_detail(path.as_str()),
            ),
            Some(_) => {}
        }
    }
}
