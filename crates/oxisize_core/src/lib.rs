//! Core utilities for oxisize tools.
//!
//! This crate provides shared functionality for measuring JavaScript/TypeScript
//! packages, including:
//! - Typed errors for the size tooling
//! - Reading `package.json` manifests
//! - Choosing a parser source type for declaration files and bundles
//! - Locating the workspace (git) root

mod error;
mod manifest;
mod source;
mod workspace;

// Re-export public API
pub use error::{Result, SizeError};
pub use manifest::{MANIFEST_FILE, PackageManifest};
pub use source::{read_input, source_type_for};
pub use workspace::{find_git_root, find_git_root_from};
