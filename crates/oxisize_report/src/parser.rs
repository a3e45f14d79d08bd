use log::trace;
use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingPattern, BindingPatternKind, Program};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use std::path::Path;

use oxisize_core::{Result, SizeError, source_type_for};

/// Parses `src` (read from `path`) into an AST owned by `allocator`.
///
/// Any syntax error is fatal: a report over a half-parsed file would be
/// silently incomplete.
pub(crate) fn parse_program<'a>(
    allocator: &'a Allocator,
    path: &Path,
    src: &'a str,
) -> Result<Program<'a>> {
    let st = source_type_for(path);
    trace!("Parsing {} ({} bytes)", path.display(), src.len());
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(allocator, src, st).parse();

    if panicked || !errors.is_empty() {
        let message = errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(SizeError::Parse { path: path.to_path_buf(), message });
    }
    Ok(program)
}

/// Every identifier a binding pattern introduces, in source order.
/// `const { a, b: [c, ...d] = [], ...e } = x` binds `a`, `c`, `d` and `e`.
pub(crate) fn bound_names(pattern: &BindingPattern, out: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(ident) => out.push(ident.name.to_string()),
        BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                bound_names(&property.value, out);
            }
            if let Some(rest) = &object.rest {
                bound_names(&rest.argument, out);
            }
        }
        BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                bound_names(element, out);
            }
            if let Some(rest) = &array.rest {
                bound_names(&rest.argument, out);
            }
        }
        BindingPatternKind::AssignmentPattern(assignment) => bound_names(&assignment.left, out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_ast::ast::Declaration;

    fn variable_names(src: &str) -> Vec<String> {
        let allocator = Allocator::default();
        let program = parse_program(&allocator, Path::new("index.js"), src).unwrap();
        let mut names = Vec::new();
        for stmt in &program.body {
            if let Some(Declaration::VariableDeclaration(var)) = stmt.as_declaration() {
                for declarator in &var.declarations {
                    bound_names(&declarator.id, &mut names);
                }
            }
        }
        names
    }

    #[test]
    fn test_bound_names_plain_identifier() {
        assert_eq!(variable_names("const a = 1, b = 2;"), vec!["a", "b"]);
    }

    #[test]
    fn test_bound_names_nested_patterns() {
        let names = variable_names("const { a, b: [c, , ...d] = [], ...e } = cfg;");
        assert_eq!(names, vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_syntax_error_reported_as_parse() {
        let allocator = Allocator::default();
        let err = parse_program(&allocator, Path::new("index.js"), "function {").unwrap_err();
        assert!(matches!(err, SizeError::Parse { .. }));
    }
}
