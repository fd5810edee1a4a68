//! Schema migration runner for the entry database.
//!
//! Migrations run in version order, each inside its own transaction — a
//! failure rolls back cleanly with no partial schema state. The
//! `schema_version` table tracks applied versions, so running the
//! migrator is idempotent.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

/// A single migration with a version number and SQL to execute.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in version order.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "entries table, shortcut uniqueness, scope index",
    sql: "CREATE TABLE entries (
            id           TEXT    PRIMARY KEY,
            value        TEXT    NOT NULL,
            label        TEXT,
            context_type TEXT    NOT NULL CHECK (context_type IN
                           ('fieldOnly', 'url', 'domain', 'all', 'urlPattern')),
            context_key  TEXT,
            shortcut     TEXT,
            sort_order   INTEGER,
            created_at   INTEGER NOT NULL
          );
          CREATE UNIQUE INDEX idx_entries_shortcut
            ON entries(shortcut) WHERE shortcut IS NOT NULL;
          CREATE INDEX idx_entries_context_type ON entries(context_type);",
}];

/// Run all pending migrations on the given connection.
///
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version <= current {
            debug!(
                version = migration.version,
                description = migration.description,
                "migration already applied, skipping"
            );
            continue;
        }

        info!(
            version = migration.version,
            description = migration.description,
            "applying migration"
        );
        apply_migration(conn, migration)?;
        applied += 1;
    }

    if applied > 0 {
        info!(applied, "migrations complete");
    }
    Ok(applied)
}

/// Return the highest applied migration version, or 0 if none.
pub fn current_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Migration {
            message: format!("failed to read schema_version: {e}"),
        })?;
    Ok(version)
}

/// Return the latest migration version defined in code.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal
// ─────────────────────────────────────────────────────────────────────────────

fn ensure_version_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
           version     INTEGER PRIMARY KEY,
           applied_at  TEXT    NOT NULL,
           description TEXT
         );",
    )
    .map_err(|e| StoreError::Migration {
        message: format!("failed to create schema_version table: {e}"),
    })?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    let run = || -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch("BEGIN")?;
        conn.execute_batch(migration.sql)?;
        let _ = conn.execute(
            "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                migration.version,
                chrono::Utc::now().to_rfc3339(),
                migration.description
            ],
        )?;
        conn.execute_batch("COMMIT")?;
        Ok(())
    };
    run().map_err(|e| {
        let _ = conn.execute_batch("ROLLBACK");
        StoreError::Migration {
            message: format!("migration v{} failed: {e}", migration.version),
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
