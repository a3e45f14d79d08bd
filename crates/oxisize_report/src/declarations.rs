use log::{debug, trace, warn};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use path_clean::PathClean;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

use oxisize_core::{Result, read_input};

use crate::{
    parser::{bound_names, parse_program},
    types::{MemberList, SymbolKind},
};

/// Produces the public exports of a type-declaration file.
pub trait DeclarationExtractor {
    fn extract(&self, declaration_file: &Path) -> Result<MemberList>;
}

/// Reads `.d.ts` files with the oxc parser.
///
/// Only runtime-bearing exports are listed (classes, functions, variables,
/// enums); interfaces and type aliases have no bundle footprint. Relative
/// re-exports (`export * from './x'`, `export { a } from './x'`) are followed
/// into sibling declaration files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DtsExtractor;

impl DeclarationExtractor for DtsExtractor {
    fn extract(&self, declaration_file: &Path) -> Result<MemberList> {
        let members = MemberCollector::default().members_of(declaration_file)?;
        debug!(
            "Extracted {} exports from {} ({} classes, {} functions, {} variables, {} enums)",
            members.len(),
            declaration_file.display(),
            members.classes.len(),
            members.functions.len(),
            members.variables.len(),
            members.enums.len()
        );
        Ok(members)
    }
}

/// Walks one declaration file and the relative re-exports it pulls in.
#[derive(Default)]
struct MemberCollector {
    /// Files whose exports are fully known
    finished: HashMap<PathBuf, MemberList>,
    /// Files on the current re-export chain
    in_progress: HashSet<PathBuf>,
}

impl MemberCollector {
    fn members_of(&mut self, file: &Path) -> Result<MemberList> {
        if let Some(members) = self.finished.get(file) {
            trace!("Reusing exports of {}", file.display());
            return Ok(members.clone());
        }
        if !self.in_progress.insert(file.to_path_buf()) {
            trace!("{} is already being collected, skipping re-export cycle", file.display());
            return Ok(MemberList::default());
        }

        let members = self.collect(file)?;
        self.in_progress.remove(file);
        self.finished.insert(file.to_path_buf(), members.clone());
        Ok(members)
    }

    fn collect(&mut self, file: &Path) -> Result<MemberList> {
        let mut members = MemberList::default();
        let src = read_input(file)?;
        let allocator = Allocator::default();
        let program = parse_program(&allocator, file, &src)?;

        // Locally declared names, so `export { Foo }` can be classified
        let mut locals: HashMap<String, SymbolKind> = HashMap::new();
        for stmt in &program.body {
            if let Some(decl) = stmt.as_declaration() {
                for (kind, name) in declared_names(decl) {
                    locals.entry(name).or_insert(kind);
                }
            }
        }

        for stmt in &program.body {
            match stmt {
                Statement::ExportNamedDeclaration(export) => {
                    // `export declare ...` is ambient and typed as a type export by
                    // the parser; the declaration kind decides instead.
                    if let Some(decl) = &export.declaration {
                        for (kind, name) in declared_names(decl) {
                            trace!("Found exported {:?} '{}'", kind, name);
                            members.insert(kind, name);
                        }
                        continue;
                    }
                    if export.export_kind.is_type() {
                        continue;
                    }

                    let source_members = match &export.source {
                        Some(source) => match reexport_target(file, &source.value) {
                            Some(target) => Some(self.members_of(&target)?),
                            None => continue,
                        },
                        None => None,
                    };

                    for spec in &export.specifiers {
                        if spec.export_kind.is_type() {
                            continue;
                        }
                        let local = spec.local.name();
                        let exported = spec.exported.name();
                        let kind = match &source_members {
                            Some(target) => kind_in(target, &local),
                            None => locals.get(local.as_str()).copied(),
                        };
                        match kind {
                            Some(kind) => {
                                trace!(
                                    "Found exported {:?} '{}' (local '{}')",
                                    kind, exported, local
                                );
                                members.insert(kind, exported.to_string());
                            }
                            None => trace!("'{}' is not a runtime export, skipping", local),
                        }
                    }
                }
                Statement::ExportAllDeclaration(export) => {
                    if export.export_kind.is_type() {
                        continue;
                    }
                    if export.exported.is_some() {
                        debug!("Skipping namespace re-export from '{}'", export.source.value);
                        continue;
                    }
                    if let Some(target) = reexport_target(file, &export.source.value) {
                        let target_members = self.members_of(&target)?;
                        for (kind, name) in target_members.iter() {
                            members.insert(kind, name);
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(members)
    }
}

/// Runtime-bearing names introduced by a declaration.
fn declared_names(decl: &Declaration) -> Vec<(SymbolKind, String)> {
    match decl {
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| (SymbolKind::Class, id.name.to_string())).collect()
        }
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| (SymbolKind::Function, id.name.to_string())).collect()
        }
        Declaration::VariableDeclaration(var) => {
            let mut names = Vec::new();
            for declarator in &var.declarations {
                bound_names(&declarator.id, &mut names);
            }
            names.into_iter().map(|name| (SymbolKind::Variable, name)).collect()
        }
        Declaration::TSEnumDeclaration(enumeration) => {
            vec![(SymbolKind::Enum, enumeration.id.name.to_string())]
        }
        _ => Vec::new(),
    }
}

fn kind_in(members: &MemberList, name: &str) -> Option<SymbolKind> {
    members.iter().find(|(_, n)| *n == name).map(|(k, _)| k)
}

/// Maps a relative re-export request onto a sibling declaration file.
fn reexport_target(from_file: &Path, request: &str) -> Option<PathBuf> {
    if !(request.starts_with("./") || request.starts_with("../")) {
        debug!("Skipping re-export from package '{}'", request);
        return None;
    }
    let base = from_file.parent().unwrap_or_else(|| Path::new("."));
    let stem = request.trim_end_matches(".js");
    let candidates = [format!("{stem}.d.ts"), format!("{stem}/index.d.ts")];

    for candidate in candidates {
        let path = base.join(&candidate).clean();
        if path.is_file() {
            trace!("Resolved re-export '{}' to {}", request, path.display());
            return Some(path);
        }
    }
    warn!("Could not resolve re-export '{}' from {}", request, from_file.display());
    None
}
