use log::{debug, info, trace};
use serde::{Serialize, ser::Error as _};
use serde_json::ser::PrettyFormatter;
use std::path::Path;

use oxisize_core::{Result, SizeError};

use crate::{
    bundle::{BundleAnalyzer, DependencyExtractor},
    declarations::{DeclarationExtractor, DtsExtractor},
    types::{ExportData, Report, SymbolTypeIndex},
};

const INDENT: &[u8] = b"    ";

/// Builds the size report for one module with the built-in extractors.
pub fn build_report(declaration_file: &Path, bundle_file: &Path) -> Result<String> {
    build_report_with(&DtsExtractor, &BundleAnalyzer::new(), declaration_file, bundle_file)
}

/// Builds the size report for one module.
///
/// Every exported symbol is measured, classes first, then functions,
/// variables and enums, each in declaration order. The first extractor
/// failure aborts the whole report.
pub fn build_report_with<D, X>(
    declarations: &D,
    dependencies: &X,
    declaration_file: &Path,
    bundle_file: &Path,
) -> Result<String>
where
    D: DeclarationExtractor + ?Sized,
    X: DependencyExtractor + ?Sized,
{
    let report = collect_report(declarations, dependencies, declaration_file, bundle_file)?;
    to_json(&report)
}

/// Same as [`build_report_with`], returning the report before serialization.
pub fn collect_report<D, X>(
    declarations: &D,
    dependencies: &X,
    declaration_file: &Path,
    bundle_file: &Path,
) -> Result<Report>
where
    D: DeclarationExtractor + ?Sized,
    X: DependencyExtractor + ?Sized,
{
    for input in [declaration_file, bundle_file] {
        if !input.is_file() {
            return Err(SizeError::MissingInput { path: input.to_path_buf() });
        }
    }
    info!(
        "Building report for {} against {}",
        declaration_file.display(),
        bundle_file.display()
    );

    let members = declarations.extract(declaration_file)?;
    let index = SymbolTypeIndex::from(&members);
    debug!("Measuring {} exported symbols", index.len());

    let mut report = Report::new();
    for (kind, symbol) in members.iter() {
        trace!("Measuring {} '{}'", kind.label(), symbol);
        let data: ExportData = dependencies.extract(symbol, bundle_file, &index)?;
        report.insert(symbol, data);
    }
    Ok(report)
}

/// Serializes a report with 4-space indentation.
pub fn to_json(report: &Report) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| SizeError::Serialize(serde_json::Error::custom(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberList, SymbolKind};
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
        fs,
        path::PathBuf,
    };
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    struct FixedDeclarations(MemberList);

    impl DeclarationExtractor for FixedDeclarations {
        fn extract(&self, _: &Path) -> Result<MemberList> {
            Ok(self.0.clone())
        }
    }

    /// Canned per-symbol results; records the order symbols were asked for.
    #[derive(Default)]
    struct FixedDependencies {
        data: HashMap<String, ExportData>,
        calls: RefCell<Vec<String>>,
        fail_on: Option<String>,
    }

    impl DependencyExtractor for FixedDependencies {
        fn extract(&self, symbol: &str, bundle: &Path, _: &SymbolTypeIndex) -> Result<ExportData> {
            self.calls.borrow_mut().push(symbol.to_string());
            if self.fail_on.as_deref() == Some(symbol) {
                return Err(SizeError::SymbolNotFound {
                    symbol: symbol.to_string(),
                    bundle: bundle.to_path_buf(),
                });
            }
            Ok(self.data.get(symbol).cloned().unwrap_or_default())
        }
    }

    struct CountingDeclarations(Cell<usize>);

    impl DeclarationExtractor for CountingDeclarations {
        fn extract(&self, _: &Path) -> Result<MemberList> {
            self.0.set(self.0.get() + 1);
            Ok(MemberList::default())
        }
    }

    fn inputs(temp_dir: &TempDir) -> (PathBuf, PathBuf) {
        let dts = create_test_file(temp_dir.path(), "dist/index.d.ts", "export {};\n");
        let bundle = create_test_file(temp_dir.path(), "dist/index.esm2017.js", "");
        (dts, bundle)
    }

    #[test]
    fn test_foo_bar_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let (dts, bundle) = inputs(&temp_dir);

        let mut members = MemberList::default();
        members.insert(SymbolKind::Function, "foo");
        members.insert(SymbolKind::Class, "Bar");
        let deps = FixedDependencies {
            data: HashMap::from([
                ("foo".to_string(), ExportData { dependencies: vec![], size: 10 }),
                ("Bar".to_string(), ExportData { dependencies: vec!["foo".to_string()], size: 25 }),
            ]),
            ..Default::default()
        };

        let json = build_report_with(&FixedDeclarations(members), &deps, &dts, &bundle).unwrap();
        let expected = r#"{
    "Bar": {
        "dependencies": [
            "foo"
        ],
        "size": 25
    },
    "foo": {
        "dependencies": [],
        "size": 10
    }
}"#;
        assert_eq!(json, expected);
        assert_eq!(*deps.calls.borrow(), vec!["Bar", "foo"]);
    }

    #[test]
    fn test_empty_exports_yield_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let (dts, bundle) = inputs(&temp_dir);

        let json = build_report_with(
            &FixedDeclarations(MemberList::default()),
            &FixedDependencies::default(),
            &dts,
            &bundle,
        )
        .unwrap();
        assert_eq!(json, "{}");
        assert_eq!(serde_json::from_str::<serde_json::Value>(&json).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_keys_match_member_list_exactly() {
        let temp_dir = TempDir::new().unwrap();
        let (dts, bundle) = inputs(&temp_dir);

        let mut members = MemberList::default();
        members.insert(SymbolKind::Enum, "LogLevel");
        members.insert(SymbolKind::Variable, "VERSION");
        members.insert(SymbolKind::Function, "logEvent");
        members.insert(SymbolKind::Class, "Analytics");
        members.insert(SymbolKind::Function, "setConsent");

        let json = build_report_with(
            &FixedDeclarations(members.clone()),
            &FixedDependencies::default(),
            &dts,
            &bundle,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

        assert_eq!(keys.len(), members.len());
        for (_, name) in members.iter() {
            assert!(keys.iter().any(|k| k.as_str() == name), "missing key {name}");
        }
    }

    #[test]
    fn test_extractor_failure_aborts_report() {
        let temp_dir = TempDir::new().unwrap();
        let (dts, bundle) = inputs(&temp_dir);

        let mut members = MemberList::default();
        members.insert(SymbolKind::Function, "a");
        members.insert(SymbolKind::Function, "broken");
        members.insert(SymbolKind::Function, "c");
        let deps = FixedDependencies { fail_on: Some("broken".to_string()), ..Default::default() };

        let err = build_report_with(&FixedDeclarations(members), &deps, &dts, &bundle).unwrap_err();
        assert!(matches!(err, SizeError::SymbolNotFound { .. }));
        assert_eq!(*deps.calls.borrow(), vec!["a", "broken"]);
    }

    #[test]
    fn test_missing_inputs_checked_before_extraction() {
        let temp_dir = TempDir::new().unwrap();
        let (dts, _) = inputs(&temp_dir);
        let declarations = CountingDeclarations(Cell::new(0));

        let missing = temp_dir.path().join("dist/missing.js");
        let err =
            build_report_with(&declarations, &FixedDependencies::default(), &dts, &missing)
                .unwrap_err();
        assert!(matches!(err, SizeError::MissingInput { path } if path == missing));
        assert_eq!(declarations.0.get(), 0);

        let err = build_report(&temp_dir.path().join("nope.d.ts"), &missing).unwrap_err();
        assert!(matches!(err, SizeError::MissingInput { .. }));
    }

    #[test]
    fn test_real_extractors_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let dts = create_test_file(
            temp_dir.path(),
            "dist/index.d.ts",
            "export declare function foo(): number;\nexport declare class Bar {\n    run(): number;\n}\n",
        );
        let foo = "function foo() { return 10; }";
        let bar = "class Bar { run() { return foo(); } }";
        let bundle = create_test_file(
            temp_dir.path(),
            "dist/index.esm2017.js",
            &format!("{foo}\n{bar}\nexport {{ Bar, foo }};\n"),
        );

        let json = build_report(&dts, &bundle).unwrap();
        let expected = format!(
            "{{\n    \"Bar\": {{\n        \"dependencies\": [\n            \"foo\"\n        ],\n        \"size\": {}\n    }},\n    \"foo\": {{\n        \"dependencies\": [],\n        \"size\": {}\n    }}\n}}",
            foo.len() + bar.len(),
            foo.len()
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_repeated_runs_are_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let dts = create_test_file(
            temp_dir.path(),
            "index.d.ts",
            r#"
export declare const VERSION: string;
export declare enum LogLevel { DEBUG = 0 }
export declare function a(): void;
export declare function b(): void;
export declare function c(): void;
export declare class X {}
export declare class Y {}
"#,
        );
        let bundle = create_test_file(
            temp_dir.path(),
            "index.esm2017.js",
            r#"
const VERSION = "1";
var LogLevel;
(function (LogLevel) { LogLevel[LogLevel["DEBUG"] = 0] = "DEBUG"; })(LogLevel || (LogLevel = {}));
function a() { return b() + c(); }
function b() { return VERSION; }
function c() { return LogLevel.DEBUG; }
class X { m() { return a(); } }
class Y extends X {}
export { LogLevel, VERSION, X, Y, a, b, c };
"#,
        );

        let first = build_report(&dts, &bundle).unwrap();
        let second = build_report(&dts, &bundle).unwrap();
        assert_eq!(first, second);

        let value: serde_json::Value = serde_json::from_str(&first).unwrap();
        assert_eq!(value["Y"]["dependencies"], serde_json::json!(["X", "a", "b", "c", "VERSION", "LogLevel"]));
    }
}
