use crate::error::{DatabaseError, DatabaseErrorExt};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

/// A versioned schema script owned by a feature slice.
///
/// Scripts are applied once per `(slice, version)` pair, inside a transaction,
/// in the order they were registered on the [`crate::DatabaseBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    fn label(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();

        for migration in migrations {
            if self.is_applied(migration).await? {
                report.skipped.push(migration.label());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.label());
        }

        Ok(report)
    }

    async fn is_applied(&self, migration: &Migration) -> Result<bool, DatabaseError> {
        let versions = self
            .db
            .query("SELECT VALUE version FROM migration WHERE slice = $slice")
            .bind(("slice", migration.slice))
            .await
            .context("Loading applied migrations")?
            .take::<Vec<String>>(0)
            .context("Parsing applied migrations")?;

        Ok(versions.iter().any(|v| v == migration.version))
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        if migration.script.trim().is_empty() {
            return Err(DatabaseError::Migration {
                migration: migration.label(),
                message: "empty script".into(),
            });
        }

        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{ slice: $slice, version: $version, applied_at: time::now() }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice))
            .bind(("version", migration.version))
            .await
            .context(format!("SQL execution failed at {}", migration.label()))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                migration: migration.label(),
                message: e.to_string().into(),
            })?;

        Ok(())
    }
}
