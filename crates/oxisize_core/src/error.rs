use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = SizeError> = std::result::Result<T, E>;

/// Errors raised while building export size reports.
///
/// Every variant is fatal for the current run. Callers propagate them to the
/// top-level invocation; nothing is downgraded to a warning.
#[derive(Error, Debug)]
pub enum SizeError {
    /// A declaration or bundle path does not resolve to an existing file
    #[error("Input file not found: {}", path.display())]
    MissingInput { path: PathBuf },

    /// The manifest declares typings but no bundle to measure them against
    #[error("{} declares typings but has no '{field}' bundle entry", manifest.display())]
    BundleMissing { manifest: PathBuf, field: String },

    /// The CLI flags select neither adhoc nor batch mode
    #[error(
        "Invalid flag combination: pass --inputModule for batch mode, or both --inputDtsFile and --inputBundleFile for adhoc mode"
    )]
    InvalidFlagCombination,

    /// The report has nowhere to go
    #[error("No report destination: pass --output (required in adhoc mode) or --ci")]
    ReportRedirection,

    /// Requested modules that no discovered manifest is named after
    #[error("Requested modules not found under {}: {}", root.display(), names.join(", "))]
    ModuleNotFound { names: Vec<String>, root: PathBuf },

    /// A `workspaces` entry of the root manifest is not a valid glob
    #[error("Invalid workspace pattern '{pattern}': {message}")]
    WorkspacePattern { pattern: String, message: String },

    /// An exported symbol could not be located in the bundle
    #[error("Symbol '{symbol}' is not exported by bundle {}", bundle.display())]
    SymbolNotFound { symbol: String, bundle: PathBuf },

    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Invalid manifest {}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report")]
    Serialize(#[from] serde_json::Error),
}

impl SizeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
