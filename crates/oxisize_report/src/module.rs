use log::{debug, info, trace};
use std::path::Path;

use oxisize_core::{PackageManifest, Result, SizeError};

use crate::{
    bundle::BundleAnalyzer,
    declarations::DtsExtractor,
    report::{collect_report, to_json},
    sink::ReportSink,
};

/// Result of analyzing one module directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub name: String,
    pub artifact: String,
    pub symbols: usize,
}

/// Which modules to analyze and where their reports go.
pub struct ModuleGate<'a> {
    /// Manifest field holding the bundle path
    pub bundle_field: &'a str,
    /// Package names (full or unscoped) to keep; empty keeps everything
    pub modules: &'a [String],
    pub sinks: &'a [Box<dyn ReportSink>],
}

impl ModuleGate<'_> {
    /// Analyzes `dir` if it holds a public module.
    ///
    /// Directories without a manifest, or whose manifest has no typings, are
    /// not modules and yield `Ok(None)`. A manifest with typings but no bundle
    /// is a broken module and fails with `BundleMissing`.
    pub fn analyze(&self, dir: &Path) -> Result<Option<ModuleOutcome>> {
        let Some(manifest) = PackageManifest::load(dir)? else {
            return Ok(None);
        };
        let Some(typings) = manifest.typings() else {
            trace!("{} has no typings, not a public module", manifest.path().display());
            return Ok(None);
        };
        if !self.selected(&manifest) {
            trace!("{} not selected, skipping", manifest.path().display());
            return Ok(None);
        }
        let bundle = manifest.field(self.bundle_field).ok_or_else(|| {
            SizeError::BundleMissing {
                manifest: manifest.path().to_path_buf(),
                field: self.bundle_field.to_string(),
            }
        })?;

        let name = manifest
            .name
            .clone()
            .unwrap_or_else(|| dir.file_name().unwrap_or_default().to_string_lossy().into_owned());
        let base_name = manifest.base_name().unwrap_or(&name).to_string();
        let artifact = artifact_name(&base_name);

        let declaration_file = manifest.resolve(typings);
        let bundle_file = manifest.resolve(bundle);
        debug!(
            "Module {}: typings={}, bundle={}",
            name,
            declaration_file.display(),
            bundle_file.display()
        );

        let report = collect_report(
            &DtsExtractor,
            &BundleAnalyzer::new(),
            &declaration_file,
            &bundle_file,
        )?;
        let json = to_json(&report)?;
        for sink in self.sinks {
            sink.deliver(&artifact, &json)?;
        }

        info!("Analyzed {} ({} exports)", name, report.len());
        Ok(Some(ModuleOutcome { name, artifact, symbols: report.len() }))
    }

    fn selected(&self, manifest: &PackageManifest) -> bool {
        if self.modules.is_empty() {
            return true;
        }
        self.modules.iter().any(|m| {
            manifest.name.as_deref() == Some(m.as_str()) || manifest.base_name() == Some(m.as_str())
        })
    }
}

/// `<base-name>-dependency.json`
pub fn artifact_name(base_name: &str) -> String {
    format!("{base_name}-dependency.json")
}
