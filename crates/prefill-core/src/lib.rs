//! # prefill-core
//!
//! Foundation types for the Prefill companion service.
//!
//! This crate provides the shared vocabulary that all other Prefill crates
//! depend on:
//!
//! - **Entries**: [`entry::Entry`] stored value records and their
//!   [`entry::ContextScope`] matching strategy
//! - **Context keys**: [`key::ContextKey`] — the scope-specific key string
//!   parsed once into a structured matching strategy
//! - **Page contexts**: [`context::PageContext`] — the URL/origin/pathname/
//!   selector tuple a resolution is evaluated against
//! - **Results**: [`resolution::MatchResult`] with ranked quick slots and
//!   grouped menu sections
//! - **Globs**: [`glob::Glob`] — the `*`/`?` wildcard compiler used by all
//!   pattern matching
//! - **Text**: [`text`] — character-safe truncation for presentation titles
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by all other prefill crates.

#![deny(unsafe_code)]

pub mod constants;
pub mod context;
pub mod entry;
pub mod glob;
pub mod key;
pub mod resolution;
pub mod text;
