use anyhow::{Result, anyhow};
use log::{debug, trace};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Finds the enclosing git checkout of the current directory.
pub fn find_git_root() -> Result<PathBuf> {
    let cwd = env::current_dir()?;
    find_git_root_from(&cwd)
}

pub fn find_git_root_from(start: &Path) -> Result<PathBuf> {
    debug!("Searching for git root from: {}", start.display());

    for dir in start.ancestors() {
        let git_dir = dir.join(".git");
        trace!("Checking for .git at: {:?}", git_dir);
        if git_dir.exists() {
            debug!("Found git root at: {:?}", dir);
            return Ok(dir.to_path_buf());
        }
    }

    debug!("Could not find .git directory in any parent folder");
    Err(anyhow!("Could not find .git directory above {}", start.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_git_root_from_nested_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();

        let subdir = root.join("packages").join("app");
        fs::create_dir_all(&subdir).unwrap();

        let git_root = find_git_root_from(&subdir).unwrap();
        assert_eq!(git_root, root);
    }

    #[test]
    fn test_find_git_root_from_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("nested").join("deep");
        fs::create_dir_all(&subdir).unwrap();

        // Only meaningful when the temp dir is not inside a checkout
        if temp_dir.path().ancestors().any(|d| d.join(".git").exists()) {
            return;
        }
        assert!(find_git_root_from(&subdir).is_err());
    }
}
