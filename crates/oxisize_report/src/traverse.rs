use ignore::{WalkBuilder, overrides::OverrideBuilder};
use log::{debug, trace};
use std::path::{Path, PathBuf};

use oxisize_core::{PackageManifest, Result, SizeError};

/// Directories never worth scanning for publishable modules.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

/// Calls `action` on `root` and then on every directory at most
/// `depth_limit` levels below it, parents before children, siblings sorted
/// by name. The first error from `action` stops the walk.
pub fn traverse<F>(root: &Path, depth_limit: usize, mut action: F) -> Result<()>
where
    F: FnMut(&Path) -> Result<()>,
{
    debug!("Traversing {} (depth limit {})", root.display(), depth_limit);
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .max_depth(Some(depth_limit))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
        })
        .build();

    for res in walker {
        let dent = res.map_err(|e| SizeError::io(root, std::io::Error::other(e)))?;
        if !dent.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        trace!("Visiting directory: {}", dent.path().display());
        action(dent.path())?;
    }
    Ok(())
}

/// Package directories named by the `workspaces` globs of `root`'s manifest,
/// sorted by path. Empty when the root declares no workspaces.
pub fn workspace_packages(root: &Path) -> Result<Vec<PathBuf>> {
    let Some(manifest) = PackageManifest::load(root)? else {
        return Ok(Vec::new());
    };
    let patterns = manifest.workspaces();
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    debug!("Resolving workspace packages from {:?}", patterns);

    let mut builder = OverrideBuilder::new(root);
    let mut max_depth = Some(0);
    for pattern in &patterns {
        let glob = pattern.trim_start_matches("./").trim_end_matches('/');
        let invalid = |e: ignore::Error| SizeError::WorkspacePattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        };
        builder.add(glob).map_err(invalid)?;

        let body = glob.trim_start_matches('!');
        max_depth = match max_depth {
            Some(depth) if !body.contains("**") => Some(depth.max(body.split('/').count())),
            _ => None,
        };
    }
    let overrides = builder.build().map_err(|e| SizeError::WorkspacePattern {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .max_depth(max_depth)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_name().to_str().is_some_and(|name| SKIPPED_DIRS.contains(&name))
        })
        .build();

    let mut packages = Vec::new();
    for res in walker {
        let dent = res.map_err(|e| SizeError::io(root, std::io::Error::other(e)))?;
        if dent.depth() == 0 || !dent.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        if overrides.matched(dent.path(), true).is_whitelist() {
            trace!("Workspace package: {}", dent.path().display());
            packages.push(dent.path().to_path_buf());
        }
    }
    debug!("Found {} workspace packages", packages.len());
    Ok(packages)
}
