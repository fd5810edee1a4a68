//! # prefill-resolver
//!
//! The context-resolution engine.
//!
//! - **Matcher**: pure predicate — does a stored entry apply to a page/field
//!   context?
//! - **Rank**: total specificity order over matching entries
//! - **Cache**: invalidation-driven snapshot of the durable entry list
//! - **Tabs**: per-tab record of the last-known page/field context
//! - **Service**: full match list, capped quick slots, grouped menu sections,
//!   predictive-tracking decision
//! - **Coordinator**: single event-queue task owning all mutable resolver
//!   state, publishing results on a broadcast channel
//!
//! ## Crate Position
//!
//! Engine layer. Depends on: prefill-core.
//! Depended on by: prefill-server, prefill.

#![deny(unsafe_code)]

pub mod cache;
pub mod coordinator;
pub mod events;
pub mod matcher;
pub mod rank;
pub mod service;
pub mod tabs;

pub use cache::{CachedEntry, EntryCache};
pub use coordinator::{Coordinator, ResolutionUpdate};
pub use events::ResolverEvent;
pub use service::resolve;
pub use tabs::TabTracker;
