//! # prefill-server
//!
//! Axum HTTP + WebSocket surface for the Prefill service.
//!
//! The extension's surfaces (content scripts, context menu, floating
//! menu, side panel) connect over WebSocket. Inbound messages are a
//! tagged [`protocol::ClientRequest`] enum dispatched exhaustively;
//! resolver output is fanned out as [`protocol::ServerMessage`]s by the
//! [`broadcast::BroadcastManager`], with per-tab filtering for bound
//! connections.
//!
//! - **Connection**: per-client send channel, drop accounting, tab binding
//! - **Broadcast**: fan-out with slow-client disconnect
//! - **Handler**: request parsing and dispatch
//! - **Event bridge**: store snapshots → resolver, resolver updates → clients
//! - **Server**: router (`/health`, `/metrics`, `/ws`) and serve loop
//!
//! ## Crate Position
//!
//! Surface layer. Depends on: prefill-core, prefill-resolver,
//! prefill-store. Depended on by: prefill.

#![deny(unsafe_code)]

pub mod broadcast;
pub mod connection;
pub mod event_bridge;
pub mod handler;
pub mod health;
pub mod metrics;
pub mod protocol;
pub mod server;

pub use server::{AppState, ServerConfig, build_router, serve};
