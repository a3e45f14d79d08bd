use anyhow::Result;
use log::{debug, info, warn};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use oxisize_core::{SizeError, find_git_root};

use crate::{
    bundle::BundleAnalyzer,
    config::{Config, Mode},
    declarations::DtsExtractor,
    module::{ModuleGate, ModuleOutcome, artifact_name},
    report::{collect_report, to_json},
    sink::{CiUploadStub, DirectoryWriter, FileWriter, ReportSink},
    traverse::{traverse, workspace_packages},
};

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub modules: Vec<ModuleOutcome>,
}

/// Runs one CLI invocation: resolves the mode, builds every report and
/// hands each one to its destinations. Modules are processed one at a time.
pub fn run_export_size(cfg: Config) -> Result<RunSummary> {
    info!("Starting export size analysis");
    let plan = cfg.resolve()?;

    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    let mut summary = RunSummary::default();

    match plan.mode {
        Mode::Adhoc { declaration_file, bundle_file } => {
            if let Some(output) = &plan.output {
                sinks.push(Box::new(FileWriter::new(output)));
            }
            if plan.ci {
                sinks.push(Box::new(CiUploadStub));
            }

            let report = collect_report(
                &DtsExtractor,
                &BundleAnalyzer::new(),
                &declaration_file,
                &bundle_file,
            )?;
            let json = to_json(&report)?;
            let artifact = artifact_name(&adhoc_base_name(&declaration_file));
            for sink in &sinks {
                sink.deliver(&artifact, &json)?;
            }
            summary.modules.push(ModuleOutcome {
                name: declaration_file.display().to_string(),
                artifact,
                symbols: report.len(),
            });
        }
        Mode::Batch { modules } => {
            if let Some(output) = &plan.output {
                sinks.push(Box::new(DirectoryWriter::new(output)));
            }
            if plan.ci {
                sinks.push(Box::new(CiUploadStub));
            }

            let root = match cfg.root {
                Some(r) => {
                    debug!("Using provided root directory: {:?}", r);
                    r.canonicalize().map_err(|e| SizeError::io(&r, e))?
                }
                None => {
                    debug!("No root provided, searching for git root");
                    find_git_root()?
                }
            };

            let mut search_roots = workspace_packages(&root)?;
            if search_roots.is_empty() {
                search_roots.push(root.clone());
            }
            info!(
                "Discovering modules under {} search roots of {} (depth {})",
                search_roots.len(),
                root.display(),
                cfg.depth
            );

            let gate =
                ModuleGate { bundle_field: &cfg.bundle_field, modules: &modules, sinks: &sinks };
            let mut analyzed: HashSet<PathBuf> = HashSet::new();
            for search_root in &search_roots {
                traverse(search_root, cfg.depth, |dir| {
                    // Nested workspace globs can reach one directory twice
                    if !analyzed.insert(dir.to_path_buf()) {
                        return Ok(());
                    }
                    if let Some(outcome) = gate.analyze(dir)? {
                        summary.modules.push(outcome);
                    }
                    Ok(())
                })?;
            }

            let missing: Vec<String> = modules
                .iter()
                .filter(|wanted| {
                    !summary.modules.iter().any(|m| {
                        m.name == **wanted || m.name.rsplit('/').next() == Some(wanted.as_str())
                    })
                })
                .cloned()
                .collect();
            if !missing.is_empty() {
                warn!("{} requested modules were not found", missing.len());
                return Err(SizeError::ModuleNotFound { names: missing, root }.into());
            }
        }
    }

    info!("Export size analysis complete. {} reports generated", summary.modules.len());
    Ok(summary)
}

/// Stem of a declaration file name: `dist/app.d.ts` -> `app`.
fn adhoc_base_name(declaration_file: &Path) -> String {
    let name = declaration_file.file_name().unwrap_or_default().to_string_lossy();
    let stem = [".d.ts", ".d.mts", ".d.cts", ".ts"]
        .iter()
        .find_map(|ext| name.strip_suffix(*ext))
        .unwrap_or(name.as_ref());
    stem.to_string()
}
