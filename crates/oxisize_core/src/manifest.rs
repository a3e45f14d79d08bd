use log::trace;
use path_clean::PathClean;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{Result, SizeError};

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a `package.json` the size tooling reads.
///
/// Bundle entries are looked up by field name at runtime (`esm2017`,
/// `module`, ...), so every other top-level field is kept around.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    typings: Option<String>,
    types: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
    #[serde(skip)]
    path: PathBuf,
}

impl PackageManifest {
    /// Reads `package.json` from `dir`. Returns `Ok(None)` when the directory
    /// has no manifest at all.
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(MANIFEST_FILE);
        if !path.is_file() {
            trace!("No manifest at {}", path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| SizeError::io(&path, e))?;
        let mut manifest: PackageManifest = serde_json::from_str(&content)
            .map_err(|source| SizeError::Manifest { path: path.clone(), source })?;
        manifest.path = path;
        Ok(Some(manifest))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Relative path of the type declarations, from `typings` or `types`.
    pub fn typings(&self) -> Option<&str> {
        self.typings.as_deref().or(self.types.as_deref())
    }

    /// String value of an arbitrary top-level field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Joins a manifest-relative path onto the module directory.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.dir().join(relative).clean()
    }

    /// Workspace package globs, from either `"workspaces": [..]` or
    /// `"workspaces": { "packages": [..] }`.
    pub fn workspaces(&self) -> Vec<&str> {
        let patterns = match self.fields.get("workspaces") {
            Some(Value::Array(items)) => items,
            Some(Value::Object(obj)) => match obj.get("packages") {
                Some(Value::Array(items)) => items,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        patterns.iter().filter_map(Value::as_str).collect()
    }

    /// Package name without its `@scope/` prefix.
    pub fn base_name(&self) -> Option<&str> {
        self.name.as_deref().map(|n| n.rsplit('/').next().unwrap_or(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_manifest(dir: &Path, content: &str) {
        fs::create_dir_all(dir).expect("Failed to create module directory");
        fs::write(dir.join(MANIFEST_FILE), content).expect("Failed to write manifest");
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PackageManifest::load(temp_dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_reads_typings_and_bundle_field() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(
            temp_dir.path(),
            r#"{"name": "@acme/app", "typings": "dist/app.d.ts", "esm2017": "dist/index.esm2017.js"}"#,
        );

        let manifest = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("@acme/app"));
        assert_eq!(manifest.typings(), Some("dist/app.d.ts"));
        assert_eq!(manifest.field("esm2017"), Some("dist/index.esm2017.js"));
        assert_eq!(manifest.field("module"), None);
    }

    #[test]
    fn test_types_field_is_accepted() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), r#"{"name": "util", "types": "index.d.ts"}"#);

        let manifest = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(manifest.typings(), Some("index.d.ts"));
    }

    #[test]
    fn test_workspaces_array_and_object_forms() {
        let temp_dir = TempDir::new().unwrap();
        let array = temp_dir.path().join("array");
        let object = temp_dir.path().join("object");
        create_manifest(&array, r#"{"private": true, "workspaces": ["packages/*", "repo-scripts/*"]}"#);
        create_manifest(&object, r#"{"workspaces": {"packages": ["packages/*"], "nohoist": ["**"]}}"#);

        let manifest = PackageManifest::load(&array).unwrap().unwrap();
        assert_eq!(manifest.workspaces(), vec!["packages/*", "repo-scripts/*"]);
        let manifest = PackageManifest::load(&object).unwrap().unwrap();
        assert_eq!(manifest.workspaces(), vec!["packages/*"]);
    }

    #[test]
    fn test_no_workspaces() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), r#"{"name": "util"}"#);
        let manifest = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert!(manifest.workspaces().is_empty());
    }

    #[test]
    fn test_non_string_fields_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), r#"{"name": "util", "esm2017": {"nested": true}}"#);

        let manifest = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(manifest.field("esm2017"), None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), "{ not json");

        let err = PackageManifest::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SizeError::Manifest { .. }));
    }

    #[test]
    fn test_resolve_cleans_relative_segments() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), r#"{"name": "util"}"#);

        let manifest = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        let resolved = manifest.resolve("./dist/../lib/index.d.ts");
        assert_eq!(resolved, temp_dir.path().join("lib/index.d.ts"));
    }

    #[test]
    fn test_base_name_strips_scope() {
        let temp_dir = TempDir::new().unwrap();
        create_manifest(temp_dir.path(), r#"{"name": "@firebase/analytics"}"#);
        let scoped = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(scoped.base_name(), Some("analytics"));

        create_manifest(temp_dir.path(), r#"{"name": "firebase"}"#);
        let plain = PackageManifest::load(temp_dir.path()).unwrap().unwrap();
        assert_eq!(plain.base_name(), Some("firebase"));
    }
}
