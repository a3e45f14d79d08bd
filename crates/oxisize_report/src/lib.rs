//! Per-export bundle size reports for JavaScript/TypeScript packages.
//!
//! For every symbol a module's type declarations export, this crate
//! estimates how many bytes of the module's bundle the symbol pulls in and
//! which other exports come along with it.
//!
//! # Examples
//!
//! ## Adhoc report
//!
//! ```no_run
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let json = oxisize_report::build_report(
//!     Path::new("dist/analytics-public.d.ts"),
//!     Path::new("dist/index.esm2017.js"),
//! )?;
//! println!("{json}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Batch run
//!
//! ```no_run
//! use oxisize_report::{Config, run_export_size};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     input_module: Some(vec![]),
//!     output: Some("reports".into()),
//!     root: Some("packages".into()),
//!     ..Config::default()
//! };
//! let summary = run_export_size(cfg)?;
//! for module in &summary.modules {
//!     println!("{} -> {}", module.name, module.artifact);
//! }
//! # Ok(())
//! # }
//! ```

mod bundle;
mod config;
mod declarations;
mod module;
mod parser;
mod report;
mod runner;
mod sink;
mod traverse;
mod types;

// Re-export public API
pub use bundle::{BundleAnalyzer, BundleGraph, DependencyExtractor};
pub use config::{Config, Mode, RunPlan};
pub use declarations::{DeclarationExtractor, DtsExtractor};
pub use module::{ModuleGate, ModuleOutcome, artifact_name};
pub use report::{build_report, build_report_with, collect_report, to_json};
pub use runner::{RunSummary, run_export_size};
pub use sink::{CiUploadStub, DirectoryWriter, FileWriter, ReportSink};
pub use traverse::{traverse, workspace_packages};
pub use types::{ExportData, MemberList, Report, SymbolKind, SymbolTypeIndex};
