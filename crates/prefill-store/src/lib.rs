//! # prefill-store
//!
//! `SQLite`-backed durable entry store.
//!
//! The store owns the entry collection; everything the resolver holds is
//! a disposable snapshot of it. After every successful mutation the store
//! broadcasts a fresh full snapshot — that notification channel is what
//! drives resolver cache invalidation, so its latency (not event
//! frequency) bounds staleness.
//!
//! - **Connection**: r2d2 pool with WAL-mode pragmas
//! - **Migrations**: versioned, idempotent, transactional
//! - **Entries**: [`EntryRepo`] row-level CRUD and the [`EntryStore`]
//!   facade with shortcut-collision rejection and change broadcast
//!
//! ## Crate Position
//!
//! Storage layer. Depends on: prefill-core.
//! Depended on by: prefill-server, prefill.

#![deny(unsafe_code)]

pub mod connection;
pub mod entries;
pub mod errors;
pub mod migrations;

pub use connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use entries::{EntryData, EntryRepo, EntryStore};
pub use errors::{Result, StoreError};
pub use migrations::run_migrations;
