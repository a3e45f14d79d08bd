use clap::Parser;
use log::debug;
use std::path::PathBuf;

use oxisize_core::{Result, SizeError};

#[derive(Debug, Clone, Parser)]
#[command(name = "export-size")]
#[command(about = "Estimate the bundle size contributed by each exported symbol")]
pub struct Config {
    /// Packages to analyze; pass the flag with no names to analyze every module
    #[arg(long = "inputModule", visible_alias = "im", num_args = 0..)]
    pub input_module: Option<Vec<String>>,

    /// Declaration file for adhoc analysis
    #[arg(long = "inputDtsFile", visible_alias = "if")]
    pub input_dts_file: Option<PathBuf>,

    /// Bundle file for adhoc analysis
    #[arg(long = "inputBundleFile", visible_alias = "ib")]
    pub input_bundle_file: Option<PathBuf>,

    /// Forward reports to the CI upload hook
    #[arg(long)]
    pub ci: bool,

    /// Report file (adhoc) or directory (batch)
    #[arg(long, visible_alias = "o")]
    pub output: Option<PathBuf>,

    /// Root directory to discover modules under (defaults to git root)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// How many directory levels below each workspace package (or the root,
    /// when it declares no workspaces) to search for modules
    #[arg(long, default_value = "1")]
    pub depth: usize,

    /// Manifest field that points at the bundle to measure
    #[arg(long = "bundleField", default_value = "esm2017")]
    pub bundle_field: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_module: None,
            input_dts_file: None,
            input_bundle_file: None,
            ci: false,
            output: None,
            root: None,
            depth: 1,
            bundle_field: "esm2017".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// One explicit declaration/bundle pair
    Adhoc { declaration_file: PathBuf, bundle_file: PathBuf },
    /// Discovered modules, optionally narrowed to `modules`
    Batch { modules: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: Mode,
    pub output: Option<PathBuf>,
    pub ci: bool,
}

impl Config {
    /// Validates the flag combination without touching the filesystem.
    pub fn resolve(&self) -> Result<RunPlan> {
        let mode = match (&self.input_module, &self.input_dts_file, &self.input_bundle_file) {
            (Some(modules), None, None) => Mode::Batch { modules: modules.clone() },
            (None, Some(dts), Some(bundle)) => {
                Mode::Adhoc { declaration_file: dts.clone(), bundle_file: bundle.clone() }
            }
            _ => return Err(SizeError::InvalidFlagCombination),
        };

        if self.output.is_none() && !self.ci {
            return Err(SizeError::ReportRedirection);
        }
        if matches!(mode, Mode::Adhoc { .. }) && self.output.is_none() {
            return Err(SizeError::ReportRedirection);
        }

        debug!("Resolved run plan: {:?}, output={:?}, ci={}", mode, self.output, self.ci);
        Ok(RunPlan { mode, output: self.output.clone(), ci: self.ci })
    }
}
