//! Schema migrations for chirp.duckdb
//!
//! Each step is applied together with its `sys_migrations` row in one
//! transaction, so a step that fails halfway leaves neither its tables nor
//! its record behind and is retried on the next open.

use duckdb::Connection;

use crate::domain::result::Result;
use crate::migrations::MIGRATIONS;

/// Creates `sys_migrations` itself; safe to run on every open
const BOOTSTRAP_MIGRATION: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

/// Applies an ordered list of named SQL steps to one connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
    migrations: &'a [(&'a str, &'a str)],
}

impl<'a> MigrationService<'a> {
    /// Service over the schema embedded in the crate
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_migrations(conn, MIGRATIONS)
    }

    pub fn with_migrations(conn: &'a Connection, migrations: &'a [(&'a str, &'a str)]) -> Self {
        Self { conn, migrations }
    }

    /// Apply every step not yet recorded, in list order
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let fresh = !self.migrations_table_exists()?;
        self.bootstrap()?;

        let recorded = self.get_applied()?;
        let mut applied = Vec::new();
        let mut already_applied = 0;

        for (name, sql) in self.migrations {
            if recorded.iter().any(|r| r == name) {
                if fresh && *name == BOOTSTRAP_MIGRATION {
                    applied.push(name.to_string());
                } else {
                    already_applied += 1;
                }
                continue;
            }
            self.apply(name, sql)?;
            applied.push(name.to_string());
        }

        Ok(MigrationResult {
            applied,
            already_applied,
        })
    }

    /// Names recorded in `sys_migrations`
    pub fn get_applied(&self) -> Result<Vec<String>> {
        if !self.migrations_table_exists()? {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Names in the list that are not recorded yet
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let recorded = self.get_applied()?;
        Ok(self
            .migrations
            .iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| !recorded.contains(name))
            .collect())
    }

    fn bootstrap(&self) -> Result<()> {
        let Some((name, sql)) = self
            .migrations
            .iter()
            .find(|(n, _)| *n == BOOTSTRAP_MIGRATION)
        else {
            return Ok(());
        };
        self.conn.execute_batch(sql)?;
        self.conn.execute(
            "INSERT INTO sys_migrations (migration_name) VALUES (?) ON CONFLICT DO NOTHING",
            [*name],
        )?;
        Ok(())
    }

    fn apply(&self, name: &str, sql: &str) -> Result<()> {
        self.conn.execute_batch("BEGIN TRANSACTION")?;
        let step = self.conn.execute_batch(sql).and_then(|_| {
            self.conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [name],
            )
        });
        match step {
            Ok(_) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(e.into())
            }
        }
    }

    fn migrations_table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
