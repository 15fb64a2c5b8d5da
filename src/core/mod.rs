//! core
//!
//! Core domain types, schemas, and storage for linkvault.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RelPath, Digest, VaultId, etc.
//! - [`paths`] - Centralized path routing for linkvault storage
//! - [`hash`] - Streaming content digests
//! - [`ops`] - Atomic writes and advisory locking
//! - [`manifest`] - Per-project manifest schema and storage
//! - [`registry`] - Per-user registry of project vaults
//! - [`project`] - Project discovery and path conversion
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Every durable write is an atomic replace
//! - Every read-modify-write holds an advisory lock

pub mod config;
pub mod hash;
pub mod manifest;
pub mod ops;
pub mod paths;
pub mod project;
pub mod registry;
pub mod types;
