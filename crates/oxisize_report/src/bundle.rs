use dashmap::DashMap;
use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::Visit;
use oxc_span::GetSpan;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use oxisize_core::{Result, SizeError, read_input};

use crate::{
    parser::{bound_names, parse_program},
    types::{ExportData, SymbolKind, SymbolTypeIndex},
};

/// Computes what one exported symbol drags into a bundle.
pub trait DependencyExtractor {
    fn extract(
        &self,
        symbol: &str,
        bundle_file: &Path,
        index: &SymbolTypeIndex,
    ) -> Result<ExportData>;
}

/// One top-level statement of a bundle.
#[derive(Debug, Clone)]
struct Node {
    /// Top-level bindings the statement declares; empty for side effects
    names: Vec<String>,
    size: u64,
    edges: Vec<usize>,
}

/// Top-level declaration graph of an ES module bundle.
///
/// Each declaration is a node sized by its source span; an edge means the
/// declaration references another top-level binding. Statements that declare
/// nothing (prototype patches, enum initializers, registration calls) are
/// attached to every binding they mention, so they are kept whenever one of
/// those bindings is.
#[derive(Debug, Clone, Default)]
pub struct BundleGraph {
    nodes: Vec<Node>,
    by_local: HashMap<String, usize>,
    /// exported name -> local binding
    exports: HashMap<String, String>,
    /// local bindings that back at least one export
    exported_locals: HashSet<String>,
}

impl BundleGraph {
    pub fn from_file(path: &Path) -> Result<Self> {
        let src = read_input(path)?;
        Self::from_source(path, &src)
    }

    pub fn from_source(path: &Path, src: &str) -> Result<Self> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, path, src)?;

        let mut graph = BundleGraph::default();
        let mut references: Vec<HashSet<String>> = Vec::new();

        for stmt in &program.body {
            let mut collector = ReferenceCollector::default();
            let (names, size) = match stmt {
                Statement::ImportDeclaration(_) | Statement::ExportAllDeclaration(_) => continue,
                Statement::ExportNamedDeclaration(export) => match &export.declaration {
                    Some(decl) => {
                        collector.visit_declaration(decl);
                        let names = binding_names(decl);
                        for name in &names {
                            graph.exports.insert(name.clone(), name.clone());
                        }
                        (names, decl.span().size())
                    }
                    None => {
                        if let Some(source) = &export.source {
                            debug!("Skipping re-export from external module '{}'", source.value);
                            continue;
                        }
                        for spec in &export.specifiers {
                            let local = spec.local.name().to_string();
                            let exported = spec.exported.name().to_string();
                            trace!("Export '{}' -> local '{}'", exported, local);
                            graph.exports.insert(exported, local);
                        }
                        continue;
                    }
                },
                Statement::ExportDefaultDeclaration(export) => {
                    let id = match &export.declaration {
                        ExportDefaultDeclarationKind::FunctionDeclaration(f) => f.id.as_ref(),
                        ExportDefaultDeclarationKind::ClassDeclaration(c) => c.id.as_ref(),
                        _ => None,
                    };
                    collector.visit_export_default_declaration(export);
                    let names: Vec<String> = id.map(|i| i.name.to_string()).into_iter().collect();
                    if let Some(name) = names.first() {
                        graph.exports.insert("default".to_string(), name.clone());
                    }
                    (names, export.declaration.span().size())
                }
                _ => {
                    match stmt.as_declaration() {
                        Some(decl) => {
                            collector.visit_declaration(decl);
                            (binding_names(decl), decl.span().size())
                        }
                        None => {
                            collector.visit_statement(stmt);
                            (Vec::new(), stmt.span().size())
                        }
                    }
                }
            };

            let idx = graph.nodes.len();
            for name in &names {
                graph.by_local.entry(name.clone()).or_insert(idx);
            }
            graph.nodes.push(Node { names, size: u64::from(size), edges: Vec::new() });
            references.push(collector.names);
        }

        graph.exported_locals = graph.exports.values().cloned().collect();
        graph.link(references);
        debug!(
            "Bundle {} has {} top-level statements and {} exports",
            path.display(),
            graph.nodes.len(),
            graph.exports.len()
        );
        Ok(graph)
    }

    fn link(&mut self, references: Vec<HashSet<String>>) {
        for (idx, refs) in references.into_iter().enumerate() {
            let mut targets: Vec<usize> = refs
                .iter()
                .filter_map(|name| self.by_local.get(name).copied())
                .filter(|&target| target != idx)
                .collect();
            targets.sort_unstable();
            targets.dedup();

            let side_effect = self.nodes[idx].names.is_empty();
            for &target in &targets {
                if side_effect {
                    self.nodes[target].edges.push(idx);
                }
            }
            self.nodes[idx].edges.extend(targets);
        }
    }

    /// Local binding that backs an exported name.
    fn local_for<'g>(&'g self, symbol: &'g str) -> Option<&'g str> {
        match self.exports.get(symbol) {
            Some(local) => Some(local.as_str()),
            None if self.by_local.contains_key(symbol) => Some(symbol),
            None => None,
        }
    }

    /// Statement indices reachable from `start`, in bundle order.
    fn closure(&self, start: usize) -> Vec<usize> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(cur) = stack.pop() {
            if seen[cur] {
                continue;
            }
            seen[cur] = true;
            stack.extend(self.nodes[cur].edges.iter().copied().filter(|&n| !seen[n]));
        }
        seen.iter().enumerate().filter(|(_, s)| **s).map(|(i, _)| i).collect()
    }

    /// Size and exported dependencies of `symbol`.
    pub fn analyze(
        &self,
        symbol: &str,
        index: &SymbolTypeIndex,
        bundle_file: &Path,
    ) -> Result<ExportData> {
        let not_found = || SizeError::SymbolNotFound {
            symbol: symbol.to_string(),
            bundle: bundle_file.to_path_buf(),
        };
        let local = self.local_for(symbol).ok_or_else(not_found)?;
        let start = *self.by_local.get(local).ok_or_else(not_found)?;

        let reached = self.closure(start);
        let size = reached.iter().map(|&i| self.nodes[i].size).sum();

        let reached_locals: HashSet<&str> = reached
            .iter()
            .flat_map(|&i| self.nodes[i].names.iter().map(String::as_str))
            .collect();

        let mut dependencies: Vec<(SymbolKind, usize, String)> = Vec::new();
        let mut push = |exported: &str, local: &str| {
            if exported == symbol {
                return;
            }
            if let (Some(kind), Some(&pos)) = (index.get(exported), self.by_local.get(local)) {
                dependencies.push((kind, pos, exported.to_string()));
            }
        };
        for (exported, local) in &self.exports {
            if reached_locals.contains(local.as_str()) {
                push(exported.as_str(), local.as_str());
            }
        }
        for &local in &reached_locals {
            if !self.exports.contains_key(local) && !self.exported_locals.contains(local) {
                push(local, local);
            }
        }

        dependencies.sort();
        dependencies.dedup_by(|a, b| a.2 == b.2);
        let dependencies: Vec<String> = dependencies.into_iter().map(|(_, _, name)| name).collect();

        trace!("'{}': {} bytes, {} dependencies", symbol, size, dependencies.len());
        Ok(ExportData { dependencies, size })
    }
}

/// Bundle-backed `DependencyExtractor`; each bundle is parsed once.
#[derive(Debug, Default)]
pub struct BundleAnalyzer {
    graphs: DashMap<PathBuf, Arc<BundleGraph>>,
}

impl BundleAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn graph_for(&self, bundle_file: &Path) -> Result<Arc<BundleGraph>> {
        if let Some(graph) = self.graphs.get(bundle_file) {
            trace!("Cache hit for bundle: {}", bundle_file.display());
            return Ok(Arc::clone(&graph));
        }
        trace!("Parsing bundle: {}", bundle_file.display());
        let graph = Arc::new(BundleGraph::from_file(bundle_file)?);
        self.graphs.insert(bundle_file.to_path_buf(), Arc::clone(&graph));
        Ok(graph)
    }
}

impl DependencyExtractor for BundleAnalyzer {
    fn extract(
        &self,
        symbol: &str,
        bundle_file: &Path,
        index: &SymbolTypeIndex,
    ) -> Result<ExportData> {
        self.graph_for(bundle_file)?.analyze(symbol, index, bundle_file)
    }
}

fn binding_names(decl: &Declaration) -> Vec<String> {
    match decl {
        Declaration::VariableDeclaration(var) => {
            let mut names = Vec::new();
            for declarator in &var.declarations {
                bound_names(&declarator.id, &mut names);
            }
            names
        }
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::TSEnumDeclaration(enumeration) => vec![enumeration.id.name.to_string()],
        _ => Vec::new(),
    }
}

/// Collects every identifier a statement reads or writes.
#[derive(Default)]
struct ReferenceCollector {
    names: HashSet<String>,
}

impl<'a> Visit<'a> for ReferenceCollector {
    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.names.insert(ident.name.to_string());
    }
}
