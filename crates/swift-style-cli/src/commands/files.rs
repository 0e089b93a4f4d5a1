//! Swift source discovery.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use swift_style::FilesConfig;
use tracing::debug;

/// Collects the `.swift` files under `root`, honouring `.gitignore` (when
/// enabled) and the exclude globs. A file path is returned as is.
///
/// # Errors
///
/// Returns an error for an invalid glob or an unreadable directory entry.
pub fn discover(root: &Path, files: &FilesConfig) -> Result<Vec<PathBuf>> {
    let patterns = files
        .exclude
        .iter()
        .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude pattern `{p}`")))
        .collect::<Result<Vec<_>>>()?;

    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(files.respect_gitignore)
        .git_global(files.respect_gitignore)
        .git_exclude(files.respect_gitignore)
        .require_git(false);

    let mut found = Vec::new();
    for entry in builder.build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("swift") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        if patterns
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
        {
            debug!("Excluding: {}", path.display());
            continue;
        }
        found.push(path.to_path_buf());
    }

    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "let a = 1\n").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn finds_swift_files_and_applies_excludes() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "Sources/App/Main.swift");
        touch(tmp.path(), "Sources/App/Readme.md");
        touch(tmp.path(), ".build/checkouts/Dep.swift");
        touch(tmp.path(), "Pods/Lib/Lib.swift");
        touch(tmp.path(), "Tests/AppTests/MainTests.swift");

        let found = discover(tmp.path(), &FilesConfig::default()).unwrap();
        assert_eq!(
            names(tmp.path(), &found),
            vec!["Sources/App/Main.swift", "Tests/AppTests/MainTests.swift"]
        );
    }

    #[test]
    fn respects_gitignore() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".gitignore"), "Generated/\n").unwrap();
        touch(tmp.path(), "Generated/Model.swift");
        touch(tmp.path(), "Sources/Model.swift");

        let found = discover(tmp.path(), &FilesConfig::default()).unwrap();
        assert_eq!(names(tmp.path(), &found), vec!["Sources/Model.swift"]);

        let config = FilesConfig {
            respect_gitignore: false,
            ..FilesConfig::default()
        };
        assert_eq!(discover(tmp.path(), &config).unwrap().len(), 2);
    }

    #[test]
    fn rejects_invalid_patterns() {
        let tmp = TempDir::new().unwrap();
        let config = FilesConfig {
            exclude: vec!["[".to_string()],
            ..FilesConfig::default()
        };
        assert!(discover(tmp.path(), &config).is_err());
    }
}
