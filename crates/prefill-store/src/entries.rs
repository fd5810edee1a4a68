//! Entry repository and store facade.
//!
//! [`EntryRepo`] is stateless row-level CRUD — every method takes a
//! `&Connection`. [`EntryStore`] wraps the pool, enforces shortcut
//! uniqueness with a typed error, and broadcasts a fresh snapshot after
//! every successful mutation. That broadcast is the resolver's cache
//! invalidation signal.

use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::broadcast;
use tracing::{debug, instrument};
use uuid::Uuid;

use prefill_core::entry::{ContextScope, Entry};

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};

/// Snapshot broadcast channel capacity. Mutations are user-paced, so a
/// small buffer is plenty.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Caller-supplied fields for creating or replacing an entry.
#[derive(Clone, Debug)]
pub struct EntryData<'a> {
    /// Text payload.
    pub value: &'a str,
    /// Optional display label.
    pub label: Option<&'a str>,
    /// Matching strategy.
    pub scope: ContextScope,
    /// Strategy-specific key.
    pub context_key: Option<&'a str>,
    /// Optional keyboard shortcut (must be unique).
    pub shortcut: Option<&'a str>,
    /// Optional explicit sort position.
    pub sort_order: Option<i64>,
}

/// Entry repository — stateless, every method takes `&Connection`.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert a new entry. The ID and creation time are assigned here.
    pub fn create(conn: &Connection, data: &EntryData<'_>) -> Result<Entry> {
        let id = format!("ent_{}", Uuid::now_v7());
        let created_at = chrono::Utc::now().timestamp_millis();
        let _ = conn.execute(
            "INSERT INTO entries (id, value, label, context_type, context_key,
                                  shortcut, sort_order, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                data.value,
                data.label,
                data.scope.as_str(),
                data.context_key,
                data.shortcut,
                data.sort_order,
                created_at
            ],
        )?;
        Ok(Entry {
            id,
            value: data.value.to_owned(),
            label: data.label.map(ToOwned::to_owned),
            scope: data.scope,
            context_key: data.context_key.map(ToOwned::to_owned),
            shortcut: data.shortcut.map(ToOwned::to_owned),
            sort_order: data.sort_order,
            created_at,
        })
    }

    /// Get an entry by ID.
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Entry>> {
        conn.query_row(
            "SELECT id, value, label, context_type, context_key, shortcut,
                    sort_order, created_at
             FROM entries WHERE id = ?1",
            params![id],
            row_to_entry,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List the full collection in creation order.
    pub fn list(conn: &Connection) -> Result<Vec<Entry>> {
        let mut stmt = conn.prepare(
            "SELECT id, value, label, context_type, context_key, shortcut,
                    sort_order, created_at
             FROM entries ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map([], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Replace every caller-editable field of an entry. `id` and
    /// `created_at` are immutable. Returns `true` if a row changed.
    pub fn update(conn: &Connection, id: &str, data: &EntryData<'_>) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE entries
             SET value = ?1, label = ?2, context_type = ?3, context_key = ?4,
                 shortcut = ?5, sort_order = ?6
             WHERE id = ?7",
            params![
                data.value,
                data.label,
                data.scope.as_str(),
                data.context_key,
                data.shortcut,
                data.sort_order,
                id
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete an entry. Returns `true` if a row was deleted.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let changed = conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// ID of the entry holding a shortcut, if any.
    pub fn shortcut_owner(conn: &Connection, shortcut: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT id FROM entries WHERE shortcut = ?1",
            params![shortcut],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Count stored entries.
    pub fn count(conn: &Connection) -> Result<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> std::result::Result<Entry, rusqlite::Error> {
    let scope_raw: String = row.get(3)?;
    let scope = ContextScope::parse(&scope_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown context type '{scope_raw}'").into(),
        )
    })?;
    Ok(Entry {
        id: row.get(0)?,
        value: row.get(1)?,
        label: row.get(2)?,
        scope,
        context_key: row.get(4)?,
        shortcut: row.get(5)?,
        sort_order: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Pool-owning store facade with change notification.
pub struct EntryStore {
    pool: ConnectionPool,
    changes: broadcast::Sender<Vec<Entry>>,
}

impl EntryStore {
    /// Create a store over an already-migrated pool.
    pub fn new(pool: ConnectionPool) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { pool, changes }
    }

    /// Subscribe to snapshot broadcasts. A receiver gets the full entry
    /// list after every successful mutation.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Entry>> {
        self.changes.subscribe()
    }

    /// List the full collection.
    pub fn list(&self) -> Result<Vec<Entry>> {
        let conn = self.pool.get()?;
        EntryRepo::list(&conn)
    }

    /// Get one entry.
    pub fn get(&self, id: &str) -> Result<Option<Entry>> {
        let conn = self.pool.get()?;
        EntryRepo::get_by_id(&conn, id)
    }

    /// Count stored entries.
    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        EntryRepo::count(&conn)
    }

    /// Create an entry, rejecting shortcut collisions.
    #[instrument(skip_all, fields(scope = %data.scope))]
    pub fn create(&self, data: &EntryData<'_>) -> Result<Entry> {
        let conn = self.pool.get()?;
        self.check_shortcut(&conn, data.shortcut, None)?;
        let entry = EntryRepo::create(&conn, data)?;
        debug!(id = %entry.id, "entry created");
        self.notify(&conn);
        Ok(entry)
    }

    /// Replace an entry's editable fields, rejecting shortcut collisions.
    #[instrument(skip_all, fields(id))]
    pub fn update(&self, id: &str, data: &EntryData<'_>) -> Result<Entry> {
        let conn = self.pool.get()?;
        self.check_shortcut(&conn, data.shortcut, Some(id))?;
        if !EntryRepo::update(&conn, id, data)? {
            return Err(StoreError::NotFound { id: id.to_owned() });
        }
        debug!(id, "entry updated");
        self.notify(&conn);
        EntryRepo::get_by_id(&conn, id)?.ok_or_else(|| StoreError::NotFound { id: id.to_owned() })
    }

    /// Delete an entry.
    #[instrument(skip_all, fields(id))]
    pub fn delete(&self, id: &str) -> Result<()> {
        let conn = self.pool.get()?;
        if !EntryRepo::delete(&conn, id)? {
            return Err(StoreError::NotFound { id: id.to_owned() });
        }
        debug!(id, "entry deleted");
        self.notify(&conn);
        Ok(())
    }

    fn check_shortcut(
        &self,
        conn: &Connection,
        shortcut: Option<&str>,
        updating: Option<&str>,
    ) -> Result<()> {
        let Some(shortcut) = shortcut.filter(|s| !s.is_empty()) else {
            return Ok(());
        };
        if let Some(owner) = EntryRepo::shortcut_owner(conn, shortcut)? {
            if updating != Some(owner.as_str()) {
                return Err(StoreError::ShortcutTaken {
                    shortcut: shortcut.to_owned(),
                    owner,
                });
            }
        }
        Ok(())
    }

    fn notify(&self, conn: &Connection) {
        match EntryRepo::list(conn) {
            // No subscribers is fine (resolver not wired yet).
            Ok(snapshot) => {
                let _ = self.changes.send(snapshot);
            }
            Err(e) => tracing::warn!(error = %e, "failed to build change snapshot"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::connection::{ConnectionConfig, new_in_memory};
    use crate::migrations::run_migrations;

    fn store() -> EntryStore {
        let pool = new_in_memory(&ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            run_migrations(&conn).unwrap();
        }
        EntryStore::new(pool)
    }

    fn data<'a>(value: &'a str, shortcut: Option<&'a str>) -> EntryData<'a> {
        EntryData {
            value,
            label: None,
            scope: ContextScope::All,
            context_key: Some("*"),
            shortcut,
            sort_order: None,
        }
    }

    // ── create / get / list ──────────────────────────────────────────────

    #[test]
    fn create_assigns_id_and_timestamp() {
        let store = store();
        let entry = store.create(&data("hello", None)).unwrap();
        assert!(entry.id.starts_with("ent_"));
        assert!(entry.created_at > 0);
        assert_eq!(entry.value, "hello");
    }

    #[test]
    fn created_entry_is_retrievable() {
        let store = store();
        let entry = store.create(&data("hello", None)).unwrap();
        let found = store.get(&entry.id).unwrap().unwrap();
        assert_eq!(found, entry);
    }

    #[test]
    fn get_unknown_is_none() {
        let store = store();
        assert!(store.get("ent_nope").unwrap().is_none());
    }

    #[test]
    fn list_returns_creation_order() {
        let store = store();
        let a = store.create(&data("a", None)).unwrap();
        let b = store.create(&data("b", None)).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
    }

    #[test]
    fn round_trips_all_fields() {
        let store = store();
        let entry = store
            .create(&EntryData {
                value: "john@example.com",
                label: Some("Email"),
                scope: ContextScope::FieldOnly,
                context_key: Some("https://a.com|/p|#email"),
                shortcut: Some("Ctrl+Shift+E"),
                sort_order: Some(2),
            })
            .unwrap();
        let found = store.get(&entry.id).unwrap().unwrap();
        assert_eq!(found.label.as_deref(), Some("Email"));
        assert_eq!(found.scope, ContextScope::FieldOnly);
        assert_eq!(found.context_key.as_deref(), Some("https://a.com|/p|#email"));
        assert_eq!(found.shortcut.as_deref(), Some("Ctrl+Shift+E"));
        assert_eq!(found.sort_order, Some(2));
    }

    // ── update / delete ──────────────────────────────────────────────────

    #[test]
    fn update_replaces_fields() {
        let store = store();
        let entry = store.create(&data("old", None)).unwrap();
        let updated = store
            .update(
                &entry.id,
                &EntryData {
                    value: "new",
                    label: Some("L"),
                    scope: ContextScope::Domain,
                    context_key: Some("https://a.com"),
                    shortcut: None,
                    sort_order: Some(1),
                },
            )
            .unwrap();
        assert_eq!(updated.value, "new");
        assert_eq!(updated.scope, ContextScope::Domain);
        assert_eq!(updated.id, entry.id);
        assert_eq!(updated.created_at, entry.created_at);
    }

    #[test]
    fn update_unknown_is_not_found() {
        let store = store();
        let err = store.update("ent_nope", &data("v", None)).unwrap_err();
        assert_matches!(err, StoreError::NotFound { .. });
    }

    #[test]
    fn delete_removes_entry() {
        let store = store();
        let entry = store.create(&data("v", None)).unwrap();
        store.delete(&entry.id).unwrap();
        assert!(store.get(&entry.id).unwrap().is_none());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let store = store();
        let err = store.delete("ent_nope").unwrap_err();
        assert_matches!(err, StoreError::NotFound { .. });
    }

    // ── shortcut uniqueness ──────────────────────────────────────────────

    #[test]
    fn shortcut_collision_rejected_on_create() {
        let store = store();
        let first = store.create(&data("a", Some("Ctrl+1"))).unwrap();
        let err = store.create(&data("b", Some("Ctrl+1"))).unwrap_err();
        assert_matches!(err, StoreError::ShortcutTaken { owner, .. } if owner == first.id);
    }

    #[test]
    fn shortcut_collision_rejected_on_update() {
        let store = store();
        let _holder = store.create(&data("a", Some("Ctrl+1"))).unwrap();
        let other = store.create(&data("b", None)).unwrap();
        let err = store.update(&other.id, &data("b", Some("Ctrl+1"))).unwrap_err();
        assert_matches!(err, StoreError::ShortcutTaken { .. });
    }

    #[test]
    fn update_may_keep_own_shortcut() {
        let store = store();
        let entry = store.create(&data("a", Some("Ctrl+1"))).unwrap();
        let updated = store.update(&entry.id, &data("a2", Some("Ctrl+1"))).unwrap();
        assert_eq!(updated.shortcut.as_deref(), Some("Ctrl+1"));
    }

    #[test]
    fn empty_shortcut_is_not_a_collision() {
        let store = store();
        store.create(&data("a", Some(""))).unwrap();
        store.create(&data("b", Some(""))).unwrap();
    }

    // ── change notification ──────────────────────────────────────────────

    #[test]
    fn create_broadcasts_snapshot() {
        let store = store();
        let mut rx = store.subscribe();
        let entry = store.create(&data("a", None)).unwrap();

        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, entry.id);
    }

    #[test]
    fn update_and_delete_broadcast_snapshots() {
        let store = store();
        let entry = store.create(&data("a", None)).unwrap();

        let mut rx = store.subscribe();
        store.update(&entry.id, &data("b", None)).unwrap();
        let after_update = rx.try_recv().unwrap();
        assert_eq!(after_update[0].value, "b");

        store.delete(&entry.id).unwrap();
        let after_delete = rx.try_recv().unwrap();
        assert!(after_delete.is_empty());
    }

    #[test]
    fn failed_mutation_broadcasts_nothing() {
        let store = store();
        let mut rx = store.subscribe();
        let _ = store.delete("ent_nope").unwrap_err();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn snapshot_is_full_collection() {
        let store = store();
        store.create(&data("a", None)).unwrap();
        store.create(&data("b", None)).unwrap();

        let mut rx = store.subscribe();
        store.create(&data("c", None)).unwrap();
        let snapshot = rx.try_recv().unwrap();
        assert_eq!(snapshot.len(), 3);
    }
}
