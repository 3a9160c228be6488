use crate::error::{DatabaseError, DatabaseErrorExt};
use moringa_domain::constants::MIGRATION;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Schema scripts in application order. Never edit an applied script; append a new one.
const MIGRATIONS: &[Migration] = &[Migration::new(
    "0001",
    "Contact submissions table",
    include_str!("../migrations/0001_contact.surql"),
)];

#[derive(Debug)]
pub(crate) struct Migration {
    pub version: &'static str,
    pub description: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub(crate) const fn new(
        version: &'static str,
        description: &'static str,
        script: &'static str,
    ) -> Self {
        Self { version, description, script }
    }

    fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }
}

/// Outcome of a migration run, by version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, SurrealValue)]
struct AppliedMigration {
    version: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
}

impl<'a> MigrationRunner<'a> {
    #[must_use]
    pub(crate) const fn new(db: &'a Surreal<Any>) -> Self {
        Self { db }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.bootstrap().await?;

        let mut report = MigrationReport::default();
        let applied = self.applied_checksums().await?;

        for migration in MIGRATIONS {
            let checksum = migration.checksum();
            if let Some(existing) = applied.get(migration.version) {
                ensure_checksum_match(migration, existing, &checksum)?;
                report.skipped.push(migration.version.to_owned());
                continue;
            }

            self.apply(migration, checksum).await?;
            report.applied.push(migration.version.to_owned());
        }

        Ok(report)
    }

    async fn bootstrap(&self) -> Result<(), DatabaseError> {
        let query = format!("DEFINE TABLE IF NOT EXISTS {MIGRATION} SCHEMALESS;");
        self.db
            .query(&query)
            .await
            .context("Defining migration table")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Defining migration table")?;
        Ok(())
    }

    async fn applied_checksums(&self) -> Result<HashMap<String, String>, DatabaseError> {
        let query = format!("SELECT version, checksum FROM {MIGRATION}");
        let entries = self
            .db
            .query(&query)
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries.into_iter().map(|entry| (entry.version, entry.checksum)).collect())
    }

    async fn apply(&self, migration: &Migration, checksum: String) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE {MIGRATION} CONTENT {{
                version: $version,
                description: $description,
                checksum: $checksum,
                applied_at: time::now()
            }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(&query)
            .bind(("version", migration.version))
            .bind(("description", migration.description))
            .bind(("checksum", checksum))
            .await
            .context(format!("Executing migration {}", migration.version))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Migration {} rejected", migration.version))?;

        Ok(())
    }
}

fn ensure_checksum_match(
    migration: &Migration,
    existing: &str,
    expected: &str,
) -> Result<(), DatabaseError> {
    if existing != expected {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (recorded {existing}, bundled {expected})",
                migration.version
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_are_unique_and_ordered() {
        let versions: Vec<_> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
    }

    #[test]
    fn checksum_is_stable_hex_sha256() {
        let migration = &MIGRATIONS[0];
        let checksum = migration.checksum();
        assert_eq!(checksum.len(), 64);
        assert_eq!(checksum, migration.checksum());
    }

    #[test]
    fn checksum_mismatch_is_rejected() {
        let err = ensure_checksum_match(&MIGRATIONS[0], "deadbeef", "cafebabe").unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }
}
