//! core::manifest
//!
//! Per-project manifest schema and storage.
//!
//! # Modules
//!
//! - [`schema`] - Manifest and entry types (v1)
//! - [`store`] - Locked, atomic storage under `.linkvault/`

pub mod schema;
pub mod store;

pub use schema::{parse_manifest, FileEntry, Manifest, SchemaError, MANIFEST_VERSION};
pub use store::{ManifestError, ManifestStore};
